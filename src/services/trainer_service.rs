use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{on_unique_violation, GymError, GymResult};
use crate::models::{
    FeedbackDetails, Trainer, TrainerListEntry, TrainerProfileRequest, TRAINER_COLUMNS,
};

const DUPLICATE_PHONE: &str = "Trainer with this phone already exists";

const LIST_SELECT: &str = "SELECT t.id, t.user_id, t.first_name, t.last_name, t.birth, t.gender,
        t.phone, t.qualification, t.specialization, t.bio, t.photo, t.client_qty_constraint,
        t.created_at, t.updated_at, COUNT(c.id) AS client_count
     FROM trainers t
     LEFT JOIN clients c ON c.trainer_id = t.id";

#[derive(Clone)]
pub struct TrainerService {
    db: PgPool,
}

impl TrainerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_trainers(&self) -> GymResult<Vec<TrainerListEntry>> {
        let trainers = sqlx::query_as::<_, TrainerListEntry>(&format!(
            "{LIST_SELECT} GROUP BY t.id ORDER BY t.last_name, t.first_name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(trainers)
    }

    pub async fn get_trainer(&self, trainer_id: Uuid) -> GymResult<TrainerListEntry> {
        sqlx::query_as::<_, TrainerListEntry>(&format!(
            "{LIST_SELECT} WHERE t.id = $1 GROUP BY t.id"
        ))
        .bind(trainer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Trainer"))
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> GymResult<Option<Trainer>> {
        let trainer = sqlx::query_as::<_, Trainer>(&format!(
            "SELECT {TRAINER_COLUMNS} FROM trainers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(trainer)
    }

    pub async fn require_profile(&self, user_id: Uuid) -> GymResult<Trainer> {
        self.find_by_user(user_id)
            .await?
            .ok_or(GymError::TrainerProfileMissing)
    }

    pub async fn create_profile(
        &self,
        user_id: Uuid,
        request: TrainerProfileRequest,
        today: NaiveDate,
    ) -> GymResult<Trainer> {
        let request = request.validated(today)?;

        if self.find_by_user(user_id).await?.is_some() {
            return Err(GymError::Conflict("Trainer profile already created".to_string()));
        }

        let trainer = sqlx::query_as::<_, Trainer>(&format!(
            "INSERT INTO trainers (id, user_id, first_name, last_name, birth, gender, phone,
                 qualification, specialization, bio, photo, client_qty_constraint)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {TRAINER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.birth)
        .bind(request.gender)
        .bind(&request.phone)
        .bind(&request.qualification)
        .bind(&request.specialization)
        .bind(&request.bio)
        .bind(&request.photo)
        .bind(request.client_qty_constraint)
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation(DUPLICATE_PHONE))?;

        tracing::info!("Created trainer profile {} for user {}", trainer.id, user_id);
        Ok(trainer)
    }

    pub async fn update_profile(
        &self,
        trainer_id: Uuid,
        request: TrainerProfileRequest,
        today: NaiveDate,
    ) -> GymResult<Trainer> {
        let request = request.validated(today)?;

        let trainer = sqlx::query_as::<_, Trainer>(&format!(
            "UPDATE trainers SET first_name = $2, last_name = $3, birth = $4, gender = $5,
                 phone = $6, qualification = $7, specialization = $8, bio = $9, photo = $10,
                 client_qty_constraint = $11, updated_at = NOW()
             WHERE id = $1
             RETURNING {TRAINER_COLUMNS}"
        ))
        .bind(trainer_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.birth)
        .bind(request.gender)
        .bind(&request.phone)
        .bind(&request.qualification)
        .bind(&request.specialization)
        .bind(&request.bio)
        .bind(&request.photo)
        .bind(request.client_qty_constraint)
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation(DUPLICATE_PHONE))?
        .ok_or(GymError::NotFound("Trainer"))?;

        tracing::info!("Updated trainer profile {}", trainer.id);
        Ok(trainer)
    }

    /// Assigned clients fall back to no trainer through the foreign key.
    pub async fn delete_trainer(&self, trainer_id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM trainers WHERE id = $1")
            .bind(trainer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Trainer"));
        }

        tracing::info!("Deleted trainer {}", trainer_id);
        Ok(())
    }

    /// Feedback left about the trainer, newest first
    pub async fn feedbacks(&self, trainer_id: Uuid) -> GymResult<Vec<FeedbackDetails>> {
        let feedbacks = sqlx::query_as::<_, FeedbackDetails>(
            "SELECT f.id, f.client_id, f.trainer_id, f.title, f.description, f.rating,
                    f.feedback_date, f.created_at,
                    c.first_name || ' ' || c.last_name AS client_name,
                    t.first_name || ' ' || t.last_name AS trainer_name
             FROM feedbacks f
             JOIN clients c ON c.id = f.client_id
             JOIN trainers t ON t.id = f.trainer_id
             WHERE f.trainer_id = $1
             ORDER BY f.feedback_date DESC, f.created_at DESC",
        )
        .bind(trainer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(feedbacks)
    }
}
