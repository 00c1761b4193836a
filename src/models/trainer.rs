use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{GymError, GymResult};
use crate::models::{normalize_phone, validate_trainer_age, Gender};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trainer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub qualification: String,
    pub specialization: String,
    pub bio: String,
    pub photo: Option<String>,
    pub client_qty_constraint: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trainer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub const TRAINER_COLUMNS: &str = "id, user_id, first_name, last_name, birth, gender, phone, \
     qualification, specialization, bio, photo, client_qty_constraint, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub specialization: String,
}

/// Listing row with the current head count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainerListEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub trainer: Trainer,
    pub client_count: i64,
}

impl TrainerListEntry {
    pub fn has_free_places(&self) -> bool {
        self.client_count < i64::from(self.trainer.client_qty_constraint)
    }
}

/// Fails once a trainer already coaches `client_qty_constraint` clients.
pub fn ensure_trainer_capacity(trainer: &Trainer, current_clients: i64) -> GymResult<()> {
    if current_clients >= i64::from(trainer.client_qty_constraint) {
        return Err(GymError::TrainerAtCapacity(trainer.full_name()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrainerProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: String,
    #[validate(length(min = 1, max = 255))]
    pub qualification: String,
    #[validate(length(min = 1, max = 255))]
    pub specialization: String,
    #[serde(default)]
    pub bio: String,
    #[validate(url(message = "Photo must be a URL"))]
    pub photo: Option<String>,
    #[validate(range(min = 0, message = "Client limit cannot be negative"))]
    pub client_qty_constraint: i32,
}

impl TrainerProfileRequest {
    /// Field checks plus the age rule; returns the request with a normalized phone.
    pub fn validated(mut self, today: NaiveDate) -> GymResult<Self> {
        self.validate()?;
        validate_trainer_age(self.birth, today)?;
        self.phone = normalize_phone(&self.phone)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request() -> TrainerProfileRequest {
        TrainerProfileRequest {
            first_name: "Taras".to_string(),
            last_name: "Shevchuk".to_string(),
            birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: Gender::Male,
            phone: "380671112233".to_string(),
            qualification: "Master of sport".to_string(),
            specialization: "Powerlifting".to_string(),
            bio: String::new(),
            photo: None,
            client_qty_constraint: 10,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    #[test]
    fn test_phone_gets_plus_prefix() {
        let validated = request().validated(today()).unwrap();
        assert_eq!(validated.phone, "+380671112233");
    }

    #[test]
    fn test_underage_trainer_rejected() {
        let mut req = request();
        req.birth = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        assert_matches!(req.validated(today()), Err(GymError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_client_limit_rejected() {
        let mut req = request();
        req.client_qty_constraint = -1;
        assert_matches!(req.validated(today()), Err(GymError::Validation(_)));
    }

    fn trainer(limit: i32) -> Trainer {
        let req = request();
        Trainer {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: req.first_name,
            last_name: req.last_name,
            birth: req.birth,
            gender: req.gender,
            phone: "+380671112233".to_string(),
            qualification: req.qualification,
            specialization: req.specialization,
            bio: req.bio,
            photo: None,
            client_qty_constraint: limit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_trainer_capacity() {
        assert!(ensure_trainer_capacity(&trainer(2), 1).is_ok());
        assert_matches!(
            ensure_trainer_capacity(&trainer(2), 2),
            Err(GymError::TrainerAtCapacity(name)) if name == "Taras Shevchuk"
        );
        assert_matches!(
            ensure_trainer_capacity(&trainer(0), 0),
            Err(GymError::TrainerAtCapacity(_))
        );
    }

    #[test]
    fn test_zero_client_limit_accepted() {
        let mut req = request();
        req.client_qty_constraint = 0;
        assert!(req.validated(today()).is_ok());
    }
}
