use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{GymError, GymResult};
use crate::models::validate_min_chars;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GymRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LocationRequest {
    pub gym_id: Uuid,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub gym_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_days: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscriptionPlanRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 1, message = "Duration must be at least one day"))]
    pub duration_days: i32,
}

impl SubscriptionPlanRequest {
    pub fn validated(self) -> GymResult<Self> {
        self.validate()?;
        if self.price.is_sign_negative() {
            return Err(GymError::InvalidInput("Price cannot be negative".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub goal_name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoalRequest {
    #[validate(length(min = 1, max = 150))]
    pub goal_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingType {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TrainingTypeRequest {
    #[validate(length(max = 150))]
    pub title: String,
    pub description: String,
}

impl TrainingTypeRequest {
    pub fn validated(self) -> GymResult<Self> {
        self.validate()?;
        validate_min_chars("Title", &self.title, 3)?;
        validate_min_chars("Description", &self.description, 10)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn test_training_type_lengths() {
        let ok = TrainingTypeRequest {
            title: "Yoga".to_string(),
            description: "Morning stretching flow".to_string(),
        };
        assert!(ok.validated().is_ok());

        let short_title = TrainingTypeRequest {
            title: "Yo".to_string(),
            description: "Morning stretching flow".to_string(),
        };
        assert_matches!(short_title.validated(), Err(GymError::InvalidInput(msg)) if msg.starts_with("Title"));

        let short_description = TrainingTypeRequest {
            title: "Yoga".to_string(),
            description: "Stretch".to_string(),
        };
        assert_matches!(
            short_description.validated(),
            Err(GymError::InvalidInput(msg)) if msg.starts_with("Description")
        );
    }

    #[test]
    fn test_plan_price_and_duration() {
        let negative = SubscriptionPlanRequest {
            name: "Monthly".to_string(),
            description: String::new(),
            price: dec!(-1),
            duration_days: 30,
        };
        assert_matches!(negative.validated(), Err(GymError::InvalidInput(_)));

        let zero_days = SubscriptionPlanRequest {
            name: "Monthly".to_string(),
            description: String::new(),
            price: dec!(500),
            duration_days: 0,
        };
        assert_matches!(zero_days.validated(), Err(GymError::Validation(_)));
    }
}
