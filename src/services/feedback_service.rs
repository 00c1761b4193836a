use chrono::{Local, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    Client, CreateFeedbackRecord, EditFeedbackRequest, Feedback, FeedbackDetails,
    FeedbackRequest, UpdateFeedbackRecord, FEEDBACK_COLUMNS,
};

const DUPLICATE_FEEDBACK: &str = "Feedback for this user, trainer, and date already exists";

const DETAILS_SELECT: &str = "SELECT f.id, f.client_id, f.trainer_id, f.title, f.description,
        f.rating, f.feedback_date, f.created_at,
        c.first_name || ' ' || c.last_name AS client_name,
        t.first_name || ' ' || t.last_name AS trainer_name
     FROM feedbacks f
     JOIN clients c ON c.id = f.client_id
     JOIN trainers t ON t.id = f.trainer_id";

#[derive(Clone)]
pub struct FeedbackService {
    db: PgPool,
}

impl FeedbackService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> GymResult<Vec<FeedbackDetails>> {
        let feedbacks = sqlx::query_as::<_, FeedbackDetails>(&format!(
            "{DETAILS_SELECT} ORDER BY f.feedback_date DESC, f.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(feedbacks)
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> GymResult<Vec<FeedbackDetails>> {
        let feedbacks = sqlx::query_as::<_, FeedbackDetails>(&format!(
            "{DETAILS_SELECT} WHERE f.client_id = $1
             ORDER BY f.feedback_date DESC, f.created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(feedbacks)
    }

    /// Feedback about the client's assigned trainer, one per day.
    pub async fn add(
        &self,
        client: &Client,
        request: FeedbackRequest,
        today: NaiveDate,
    ) -> GymResult<Feedback> {
        request.validate()?;
        let trainer_id = client.trainer_id.ok_or(GymError::NoAssignedTrainer)?;

        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedbacks
                 (id, client_id, trainer_id, title, description, rating, feedback_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(client.id)
        .bind(trainer_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.rating)
        .bind(today)
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation(
            "You have already left feedback for your trainer today",
        ))?;

        tracing::info!("Client {} left feedback {} for trainer {}", client.id, feedback.id, trainer_id);
        Ok(feedback)
    }

    pub async fn edit(
        &self,
        client_id: Uuid,
        id: Uuid,
        request: EditFeedbackRequest,
    ) -> GymResult<Feedback> {
        request.validate()?;

        sqlx::query_as::<_, Feedback>(&format!(
            "UPDATE feedbacks SET
                 title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 rating = COALESCE($5, rating)
             WHERE id = $1 AND client_id = $2
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(id)
        .bind(client_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.rating)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Feedback"))
    }

    /// `owner` restricts the delete to that client's feedback; `None` deletes any.
    pub async fn delete(&self, id: Uuid, owner: Option<Uuid>) -> GymResult<()> {
        let result = sqlx::query(
            "DELETE FROM feedbacks WHERE id = $1 AND ($2::uuid IS NULL OR client_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Feedback"));
        }

        tracing::info!("Deleted feedback {}", id);
        Ok(())
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<Feedback>> {
        let feedbacks = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedbacks ORDER BY feedback_date DESC, created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(feedbacks)
    }

    pub async fn create_record(&self, record: CreateFeedbackRecord) -> GymResult<Feedback> {
        record.validate()?;
        let feedback_date = record
            .feedback_date
            .unwrap_or_else(|| Local::now().date_naive());

        sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedbacks
                 (id, client_id, trainer_id, title, description, rating, feedback_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record.client_id)
        .bind(record.trainer_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.rating)
        .bind(feedback_date)
        .fetch_one(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or trainer", DUPLICATE_FEEDBACK))
    }

    pub async fn get_record(&self, id: Uuid) -> GymResult<Feedback> {
        sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Feedback"))
    }

    pub async fn update_record(&self, id: Uuid, record: UpdateFeedbackRecord) -> GymResult<Feedback> {
        record.validate()?;

        sqlx::query_as::<_, Feedback>(&format!(
            "UPDATE feedbacks SET
                 client_id = COALESCE($2, client_id),
                 trainer_id = COALESCE($3, trainer_id),
                 title = COALESCE($4, title),
                 description = COALESCE($5, description),
                 rating = COALESCE($6, rating),
                 feedback_date = COALESCE($7, feedback_date)
             WHERE id = $1
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(id)
        .bind(record.client_id)
        .bind(record.trainer_id)
        .bind(record.title)
        .bind(record.description)
        .bind(record.rating)
        .bind(record.feedback_date)
        .fetch_optional(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or trainer", DUPLICATE_FEEDBACK))?
        .ok_or(GymError::NotFound("Feedback"))
    }
}

