use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{GymError, GymResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub client_id: Uuid,
    pub session_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

/// Registered client as seen by the session's trainer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionRegistrant {
    pub registration_id: Uuid,
    pub client_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
    pub has_progress: bool,
}

/// Fails with `SessionFull` once `registered` has reached `max_participants`.
pub fn ensure_capacity(registered: i64, max_participants: i32) -> GymResult<()> {
    if registered >= i64::from(max_participants) {
        return Err(GymError::SessionFull);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRecord {
    pub client_id: Uuid,
    pub session_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRegistrationRecord {
    pub client_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_capacity() {
        assert!(ensure_capacity(0, 1).is_ok());
        assert!(ensure_capacity(9, 10).is_ok());
        assert_matches!(ensure_capacity(10, 10), Err(GymError::SessionFull));
        assert_matches!(ensure_capacity(12, 10), Err(GymError::SessionFull));
    }
}
