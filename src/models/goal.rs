use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientGoal {
    pub id: Uuid,
    pub client_id: Uuid,
    pub goal_id: Uuid,
    pub description: String,
    pub assigned_at: DateTime<Utc>,
    pub assigned_on: NaiveDate,
    pub is_achieved: bool,
}

pub const CLIENT_GOAL_COLUMNS: &str =
    "id, client_id, goal_id, description, assigned_at, assigned_on, is_achieved";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientGoalDetails {
    pub id: Uuid,
    pub client_id: Uuid,
    pub goal_id: Uuid,
    pub goal_name: String,
    pub description: String,
    pub assigned_at: DateTime<Utc>,
    pub is_achieved: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddGoalRequest {
    pub goal_id: Uuid,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditGoalRequest {
    pub goal_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub is_achieved: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRecord {
    pub client_id: Uuid,
    pub goal_id: Uuid,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_achieved: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGoalRecord {
    pub client_id: Option<Uuid>,
    pub goal_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub is_achieved: Option<bool>,
}
