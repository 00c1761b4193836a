use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub title: String,
    pub description: String,
    pub rating: i16,
    pub feedback_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub const FEEDBACK_COLUMNS: &str =
    "id, client_id, trainer_id, title, description, rating, feedback_date, created_at";

/// Feedback with both party names, as shown on listing pages
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub feedback: Feedback,
    pub client_name: String,
    pub trainer_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditFeedbackRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeedbackRecord {
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    pub feedback_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFeedbackRecord {
    pub client_id: Option<Uuid>,
    pub trainer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i16>,
    pub feedback_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut request = FeedbackRequest {
            title: "Great coach".to_string(),
            description: "Clear explanations".to_string(),
            rating: 5,
        };
        assert!(request.validate().is_ok());

        request.rating = 6;
        assert!(request.validate().is_err());

        request.rating = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_partial_edit_validates_present_fields_only() {
        let edit = EditFeedbackRequest {
            rating: Some(3),
            ..Default::default()
        };
        assert!(edit.validate().is_ok());

        let bad = EditFeedbackRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
