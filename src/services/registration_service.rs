use std::collections::HashSet;

use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    ensure_capacity, Client, ClientSessionView, ClientTrainings, CreateRegistrationRecord,
    Registration, SessionStatus, TrainerSummary, TrainingSession, TrainingSessionDetails,
    UpdateRegistrationRecord, SESSION_COLUMNS,
};
use crate::services::training_session_service::DETAILS_SELECT;

const DUPLICATE_REGISTRATION: &str = "Registration for this user and session already exists";

#[derive(Clone)]
pub struct RegistrationService {
    db: PgPool,
}

impl RegistrationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Planned sessions of the client's trainer, flagged for the client.
    ///
    /// Requires at least one subscription; without a trainer the list is empty.
    pub async fn client_trainings(
        &self,
        client: &Client,
        now: NaiveDateTime,
    ) -> GymResult<ClientTrainings> {
        let has_subscription: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM client_subscriptions WHERE client_id = $1)",
        )
        .bind(client.id)
        .fetch_one(&self.db)
        .await?;

        if !has_subscription {
            return Err(GymError::NoSubscription);
        }

        let Some(trainer_id) = client.trainer_id else {
            return Ok(ClientTrainings {
                trainer: None,
                sessions: Vec::new(),
            });
        };

        let trainer = sqlx::query_as::<_, TrainerSummary>(
            "SELECT id, first_name, last_name, phone, specialization FROM trainers WHERE id = $1",
        )
        .bind(trainer_id)
        .fetch_optional(&self.db)
        .await?;

        let sessions = sqlx::query_as::<_, TrainingSessionDetails>(&format!(
            "{DETAILS_SELECT}
             WHERE ts.trainer_id = $1 AND ts.status = $2
             ORDER BY ts.session_date, ts.start_time"
        ))
        .bind(trainer_id)
        .bind(SessionStatus::Planned)
        .fetch_all(&self.db)
        .await?;

        let registered: HashSet<Uuid> = sqlx::query_scalar::<_, Uuid>(
            "SELECT session_id FROM registrations WHERE client_id = $1",
        )
        .bind(client.id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        let sessions = sessions
            .into_iter()
            .map(|session| ClientSessionView {
                is_registered: registered.contains(&session.id),
                is_finished: session.is_finished(now),
                session,
            })
            .collect();

        Ok(ClientTrainings { trainer, sessions })
    }

    /// Registers the client for a planned session of their own trainer.
    pub async fn register(&self, client: &Client, session_id: Uuid) -> GymResult<Registration> {
        let trainer_id = client.trainer_id.ok_or(GymError::NoAssignedTrainer)?;

        let mut tx = self.db.begin().await?;

        // Registrations for one session are serialized on its row
        let session = sqlx::query_as::<_, TrainingSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM training_sessions WHERE id = $1 FOR UPDATE"
        ))
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(TrainingSession::is_planned)
        .ok_or(GymError::SessionNotPlanned)?;

        if session.trainer_id != trainer_id {
            return Err(GymError::ForeignSession);
        }

        let registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE session_id = $1")
                .bind(session.id)
                .fetch_one(&mut *tx)
                .await?;

        ensure_capacity(registered, session.max_participants)?;

        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, client_id, session_id) VALUES ($1, $2, $3)
             RETURNING id, client_id, session_id, registered_at",
        )
        .bind(Uuid::new_v4())
        .bind(client.id)
        .bind(session.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(on_unique_violation("You are already registered for this session"))?;

        tx.commit().await?;

        tracing::info!("Client {} registered for session {}", client.id, session.id);
        Ok(registration)
    }

    pub async fn cancel(&self, client: &Client, session_id: Uuid) -> GymResult<()> {
        let status: Option<SessionStatus> =
            sqlx::query_scalar("SELECT status FROM training_sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(&self.db)
                .await?;

        if status != Some(SessionStatus::Planned) {
            return Err(GymError::SessionNotPlanned);
        }

        let result = sqlx::query("DELETE FROM registrations WHERE client_id = $1 AND session_id = $2")
            .bind(client.id)
            .bind(session_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotRegistered);
        }

        tracing::info!("Client {} cancelled registration for session {}", client.id, session_id);
        Ok(())
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, client_id, session_id, registered_at FROM registrations
             ORDER BY registered_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(registrations)
    }

    pub async fn create_record(&self, record: CreateRegistrationRecord) -> GymResult<Registration> {
        sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, client_id, session_id) VALUES ($1, $2, $3)
             RETURNING id, client_id, session_id, registered_at",
        )
        .bind(Uuid::new_v4())
        .bind(record.client_id)
        .bind(record.session_id)
        .fetch_one(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or session", DUPLICATE_REGISTRATION))
    }

    pub async fn get_record(&self, id: Uuid) -> GymResult<Registration> {
        sqlx::query_as::<_, Registration>(
            "SELECT id, client_id, session_id, registered_at FROM registrations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Registration"))
    }

    pub async fn update_record(
        &self,
        id: Uuid,
        record: UpdateRegistrationRecord,
    ) -> GymResult<Registration> {
        sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET
                 client_id = COALESCE($2, client_id),
                 session_id = COALESCE($3, session_id)
             WHERE id = $1
             RETURNING id, client_id, session_id, registered_at",
        )
        .bind(id)
        .bind(record.client_id)
        .bind(record.session_id)
        .fetch_optional(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or session", DUPLICATE_REGISTRATION))?
        .ok_or(GymError::NotFound("Registration"))
    }

    pub async fn delete_record(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Registration"));
        }
        Ok(())
    }
}

