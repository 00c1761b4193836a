use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::{
    validate_schedule, BookedSlot, SessionQuery, SessionRegistrant, SessionStatus,
    TrainingSession, TrainingSessionDetails, TrainingSessionRequest, SESSION_COLUMNS,
};

pub(crate) const DETAILS_SELECT: &str = "SELECT ts.id, ts.trainer_id,
        t.first_name || ' ' || t.last_name AS trainer_name,
        ts.training_type_id, tt.title AS training_type,
        ts.gym_id, g.name AS gym_name,
        ts.location_id, l.name AS location_name,
        ts.session_date, ts.start_time, ts.end_time, ts.max_participants, ts.status,
        (SELECT COUNT(*) FROM registrations r WHERE r.session_id = ts.id) AS registered_count
     FROM training_sessions ts
     JOIN trainers t ON t.id = ts.trainer_id
     JOIN training_types tt ON tt.id = ts.training_type_id
     JOIN gyms g ON g.id = ts.gym_id
     JOIN locations l ON l.id = ts.location_id";

#[derive(Clone)]
pub struct TrainingSessionService {
    db: PgPool,
}

impl TrainingSessionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Sessions of one trainer, or of everyone when `trainer_id` is `None`
    pub async fn list(
        &self,
        trainer_id: Option<Uuid>,
        query: &SessionQuery,
    ) -> GymResult<Vec<TrainingSessionDetails>> {
        let sessions = sqlx::query_as::<_, TrainingSessionDetails>(&format!(
            "{DETAILS_SELECT}
             WHERE ($1::uuid IS NULL OR ts.trainer_id = $1)
               AND ($2::session_status IS NULL OR ts.status = $2)
               AND ($3::date IS NULL OR ts.session_date >= $3)
               AND ($4::date IS NULL OR ts.session_date <= $4)
             ORDER BY ts.session_date, ts.start_time"
        ))
        .bind(trainer_id)
        .bind(query.status)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(&self.db)
        .await?;

        Ok(sessions)
    }

    pub async fn get(&self, id: Uuid) -> GymResult<TrainingSessionDetails> {
        sqlx::query_as::<_, TrainingSessionDetails>(&format!("{DETAILS_SELECT} WHERE ts.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(GymError::NotFound("Training session"))
    }

    /// The session, provided `owner` (when given) runs it
    pub async fn get_owned(&self, id: Uuid, owner: Option<Uuid>) -> GymResult<TrainingSession> {
        sqlx::query_as::<_, TrainingSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM training_sessions
             WHERE id = $1 AND ($2::uuid IS NULL OR trainer_id = $2)"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Training session"))
    }

    pub async fn create(
        &self,
        trainer_id: Uuid,
        request: TrainingSessionRequest,
        now: NaiveDateTime,
    ) -> GymResult<TrainingSession> {
        let mut tx = self.db.begin().await?;

        self.check_schedule(&mut tx, &request, None, now).await?;

        let session = sqlx::query_as::<_, TrainingSession>(&format!(
            "INSERT INTO training_sessions (id, trainer_id, training_type_id, gym_id, location_id,
                 session_date, start_time, end_time, max_participants, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(trainer_id)
        .bind(request.training_type_id)
        .bind(request.gym_id)
        .bind(request.location_id)
        .bind(request.session_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.max_participants)
        .bind(request.status.unwrap_or(SessionStatus::Planned))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Trainer {} scheduled session {} on {} {}-{}",
            trainer_id,
            session.id,
            session.session_date,
            session.start_time,
            session.end_time
        );
        Ok(session)
    }

    pub async fn update(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
        request: TrainingSessionRequest,
        now: NaiveDateTime,
    ) -> GymResult<TrainingSession> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, TrainingSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM training_sessions
             WHERE id = $1 AND ($2::uuid IS NULL OR trainer_id = $2)
             FOR UPDATE"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GymError::NotFound("Training session"))?;

        self.check_schedule(&mut tx, &request, Some(id), now).await?;

        let session = sqlx::query_as::<_, TrainingSession>(&format!(
            "UPDATE training_sessions SET training_type_id = $2, gym_id = $3, location_id = $4,
                 session_date = $5, start_time = $6, end_time = $7, max_participants = $8,
                 status = $9, updated_at = NOW()
             WHERE id = $1 AND ($10::uuid IS NULL OR trainer_id = $10)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(request.training_type_id)
        .bind(request.gym_id)
        .bind(request.location_id)
        .bind(request.session_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.max_participants)
        .bind(request.status.unwrap_or(current.status))
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GymError::NotFound("Training session"))?;

        tx.commit().await?;

        tracing::info!("Updated training session {}", session.id);
        Ok(session)
    }

    pub async fn delete(&self, id: Uuid, owner: Option<Uuid>) -> GymResult<()> {
        let result = sqlx::query(
            "DELETE FROM training_sessions WHERE id = $1 AND ($2::uuid IS NULL OR trainer_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Training session"));
        }

        tracing::info!("Deleted training session {}", id);
        Ok(())
    }

    /// Moves a planned session to `status`.
    pub async fn finish_with(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
        status: SessionStatus,
    ) -> GymResult<TrainingSession> {
        let session = self.get_owned(id, owner).await?;
        if !session.is_planned() {
            return Err(GymError::SessionNotPlanned);
        }

        let session = sqlx::query_as::<_, TrainingSession>(&format!(
            "UPDATE training_sessions SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(SessionStatus::Planned)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::SessionNotPlanned)?;

        tracing::info!("Training session {} marked {:?}", session.id, session.status);
        Ok(session)
    }

    pub async fn registrants(&self, id: Uuid, owner: Option<Uuid>) -> GymResult<Vec<SessionRegistrant>> {
        self.get_owned(id, owner).await?;

        let registrants = sqlx::query_as::<_, SessionRegistrant>(
            "SELECT r.id AS registration_id, c.id AS client_id, c.first_name, c.last_name,
                    c.email, c.phone, r.registered_at,
                    EXISTS (
                        SELECT 1 FROM progress p
                        WHERE p.client_id = c.id AND p.session_id = r.session_id
                    ) AS has_progress
             FROM registrations r
             JOIN clients c ON c.id = r.client_id
             WHERE r.session_id = $1
             ORDER BY r.registered_at",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(registrants)
    }

    /// Validates against the location's other planned sessions that day.
    /// The location row stays locked until the transaction ends.
    async fn check_schedule(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        request: &TrainingSessionRequest,
        editing: Option<Uuid>,
        now: NaiveDateTime,
    ) -> GymResult<()> {
        let type_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM training_types WHERE id = $1)")
                .bind(request.training_type_id)
                .fetch_one(&mut **tx)
                .await?;
        if !type_exists {
            return Err(GymError::NotFound("Training type"));
        }

        let location_gym_id: Uuid =
            sqlx::query_scalar("SELECT gym_id FROM locations WHERE id = $1 FOR UPDATE")
                .bind(request.location_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(GymError::NotFound("Location"))?;

        let booked = sqlx::query_as::<_, BookedSlot>(
            "SELECT id, start_time, end_time FROM training_sessions
             WHERE location_id = $1 AND session_date = $2 AND status = $3",
        )
        .bind(request.location_id)
        .bind(request.session_date)
        .bind(SessionStatus::Planned)
        .fetch_all(&mut **tx)
        .await?;

        validate_schedule(request, location_gym_id, &booked, editing, now)?;
        Ok(())
    }
}
