use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::UserInfo;
use crate::models::{ClientGoalDetails, TrainerSummary};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth: NaiveDate,
    pub gender: Gender,
    pub balance: Decimal,
    pub trainer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub const CLIENT_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, birth, gender, \
     balance, trainer_id, created_at, updated_at";

/// Profile form used both for creation and for a full update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: String,
    pub birth: NaiveDate,
    pub gender: Gender,
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AssignTrainerRequest {
    pub trainer_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TrainerAssignment {
    pub client: Client,
    pub trainer: TrainerSummary,
    /// false when the trainer was already assigned
    pub changed: bool,
}

/// Own profile page: the client row plus the assigned trainer
#[derive(Debug, Serialize)]
pub struct ClientProfile {
    #[serde(flatten)]
    pub client: Client,
    pub trainer: Option<TrainerSummary>,
}

/// Trainer view of one of their clients
#[derive(Debug, Serialize)]
pub struct ClientWithGoals {
    #[serde(flatten)]
    pub client: Client,
    pub goals: Vec<ClientGoalDetails>,
}

/// Admin view: every client-role account, with the profile when one exists
#[derive(Debug, Serialize)]
pub struct ClientAccount {
    pub user: UserInfo,
    pub profile: Option<Client>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ClientListing {
    Trainer { clients: Vec<ClientWithGoals> },
    Admin { accounts: Vec<ClientAccount> },
}

/// REST mirror body; `user_id` names the owning account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRecord {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    pub birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub balance: Decimal,
    pub trainer_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientRecord {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub balance: Option<Decimal>,
    /// `null` unassigns, absence keeps the current trainer
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub trainer_id: Option<Option<Uuid>>,
}
