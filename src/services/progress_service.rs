use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    AddProgressRequest, CreateProgressRecord, Progress, ProgressDetails, SessionStatus,
    UpdateProgressRecord,
};

const DUPLICATE_PROGRESS: &str = "Progress for this user and session already exists";

#[derive(Clone)]
pub struct ProgressService {
    db: PgPool,
}

impl ProgressService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// The client's records, most recent session first
    pub async fn client_progress(&self, client_id: Uuid) -> GymResult<Vec<ProgressDetails>> {
        let progress = sqlx::query_as::<_, ProgressDetails>(
            "SELECT p.id, p.session_id, ts.session_date, ts.start_time,
                    tt.title AS training_type,
                    t.first_name || ' ' || t.last_name AS trainer_name,
                    p.result, p.feedback, p.created_at
             FROM progress p
             JOIN training_sessions ts ON ts.id = p.session_id
             JOIN training_types tt ON tt.id = ts.training_type_id
             JOIN trainers t ON t.id = ts.trainer_id
             WHERE p.client_id = $1
             ORDER BY ts.session_date DESC, ts.start_time DESC",
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(progress)
    }

    /// Records a result for a registered client of a completed session run by `trainer_id`.
    pub async fn add(
        &self,
        trainer_id: Uuid,
        session_id: Uuid,
        request: AddProgressRequest,
    ) -> GymResult<Progress> {
        request.validate()?;

        let mut tx = self.db.begin().await?;

        let completed: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM training_sessions
             WHERE id = $1 AND trainer_id = $2 AND status = $3
             FOR SHARE",
        )
        .bind(session_id)
        .bind(trainer_id)
        .bind(SessionStatus::Completed)
        .fetch_optional(&mut *tx)
        .await?;

        if completed.is_none() {
            return Err(GymError::SessionNotCompleted);
        }

        let client_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)")
                .bind(request.client_id)
                .fetch_one(&mut *tx)
                .await?;
        if !client_exists {
            return Err(GymError::NotFound("Client"));
        }

        let registered: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM registrations WHERE client_id = $1 AND session_id = $2
             )",
        )
        .bind(request.client_id)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;
        if !registered {
            return Err(GymError::NotRegistered);
        }

        let progress = sqlx::query_as::<_, Progress>(
            "INSERT INTO progress (id, client_id, session_id, result, feedback)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, client_id, session_id, result, feedback, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(request.client_id)
        .bind(session_id)
        .bind(&request.result)
        .bind(&request.feedback)
        .fetch_one(&mut *tx)
        .await
        .map_err(on_unique_violation(
            "Progress for this client and session has already been recorded",
        ))?;

        tx.commit().await?;

        tracing::info!(
            "Trainer {} recorded progress for client {} in session {}",
            trainer_id,
            progress.client_id,
            session_id
        );
        Ok(progress)
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<Progress>> {
        let progress = sqlx::query_as::<_, Progress>(
            "SELECT id, client_id, session_id, result, feedback, created_at FROM progress
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(progress)
    }

    pub async fn create_record(&self, record: CreateProgressRecord) -> GymResult<Progress> {
        record.validate()?;

        sqlx::query_as::<_, Progress>(
            "INSERT INTO progress (id, client_id, session_id, result, feedback)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, client_id, session_id, result, feedback, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(record.client_id)
        .bind(record.session_id)
        .bind(&record.result)
        .bind(&record.feedback)
        .fetch_one(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or session", DUPLICATE_PROGRESS))
    }

    pub async fn get_record(&self, id: Uuid) -> GymResult<Progress> {
        sqlx::query_as::<_, Progress>(
            "SELECT id, client_id, session_id, result, feedback, created_at FROM progress
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Progress"))
    }

    pub async fn update_record(&self, id: Uuid, record: UpdateProgressRecord) -> GymResult<Progress> {
        record.validate()?;

        sqlx::query_as::<_, Progress>(
            "UPDATE progress SET
                 client_id = COALESCE($2, client_id),
                 session_id = COALESCE($3, session_id),
                 result = COALESCE($4, result),
                 feedback = COALESCE($5, feedback)
             WHERE id = $1
             RETURNING id, client_id, session_id, result, feedback, created_at",
        )
        .bind(id)
        .bind(record.client_id)
        .bind(record.session_id)
        .bind(record.result)
        .bind(record.feedback)
        .fetch_optional(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or session", DUPLICATE_PROGRESS))?
        .ok_or(GymError::NotFound("Progress"))
    }

    pub async fn delete_record(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM progress WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Progress"));
        }
        Ok(())
    }
}

