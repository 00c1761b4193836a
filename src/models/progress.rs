use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Progress {
    pub id: Uuid,
    pub client_id: Uuid,
    pub session_id: Uuid,
    pub result: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressDetails {
    pub id: Uuid,
    pub session_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub training_type: String,
    pub trainer_name: String,
    pub result: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddProgressRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "Result cannot be empty"))]
    pub result: String,
    #[validate(length(min = 1, message = "Feedback cannot be empty"))]
    pub feedback: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProgressRecord {
    pub client_id: Uuid,
    pub session_id: Uuid,
    #[validate(length(min = 1))]
    pub result: String,
    #[validate(length(min = 1))]
    pub feedback: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProgressRecord {
    pub client_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub result: Option<String>,
    #[validate(length(min = 1))]
    pub feedback: Option<String>,
}
