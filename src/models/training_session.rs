use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Planned,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingSession {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub training_type_id: Uuid,
    pub gym_id: Uuid,
    pub location_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_participants: i32,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingSession {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.session_date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.session_date.and_time(self.end_time)
    }

    pub fn is_planned(&self) -> bool {
        self.status == SessionStatus::Planned
    }
}

pub const SESSION_COLUMNS: &str = "id, trainer_id, training_type_id, gym_id, location_id, \
     session_date, start_time, end_time, max_participants, status, created_at, updated_at";

/// Session joined with its catalog names and the current registration count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingSessionDetails {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub trainer_name: String,
    pub training_type_id: Uuid,
    pub training_type: String,
    pub gym_id: Uuid,
    pub gym_name: String,
    pub location_id: Uuid,
    pub location_name: String,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_participants: i32,
    pub status: SessionStatus,
    pub registered_count: i64,
}

impl TrainingSessionDetails {
    pub fn is_finished(&self, now: NaiveDateTime) -> bool {
        is_finished(self.session_date, self.end_time, now)
    }

    pub fn free_places(&self) -> i64 {
        (i64::from(self.max_participants) - self.registered_count).max(0)
    }
}

/// A session has finished once its end time has passed.
pub fn is_finished(session_date: NaiveDate, end_time: NaiveTime, now: NaiveDateTime) -> bool {
    session_date.and_time(end_time) <= now
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSessionRequest {
    /// Required when an administrator schedules for a trainer
    #[serde(default)]
    pub trainer_id: Option<Uuid>,
    pub training_type_id: Uuid,
    pub gym_id: Uuid,
    pub location_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_participants: i32,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub status: Option<SessionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Start and end of another planned session in the same location and day
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BookedSlot {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Hour that must separate two sessions sharing a location
pub const LOCATION_GAP_MINUTES: i64 = 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Session date cannot be in the past")]
    DateInPast,
    #[error("Session must allow at least one participant")]
    NoParticipants,
    #[error("Start time must be earlier than end time")]
    StartNotBeforeEnd,
    #[error("Session date and time cannot be in the past")]
    StartInPast,
    #[error("Location does not belong to the selected gym")]
    LocationOutsideGym,
    #[error("At least one hour must separate sessions in the same location")]
    LocationBusy,
}

/// Checks a create or update against the clock and the location's other planned sessions.
///
/// `booked` holds the planned sessions at the same location on the same date;
/// `editing` excludes the session being updated.
pub fn validate_schedule(
    request: &TrainingSessionRequest,
    location_gym_id: Uuid,
    booked: &[BookedSlot],
    editing: Option<Uuid>,
    now: NaiveDateTime,
) -> Result<(), ScheduleError> {
    if request.session_date < now.date() {
        return Err(ScheduleError::DateInPast);
    }

    if request.max_participants < 1 {
        return Err(ScheduleError::NoParticipants);
    }

    if request.start_time >= request.end_time {
        return Err(ScheduleError::StartNotBeforeEnd);
    }

    let start = request.session_date.and_time(request.start_time);
    if start < now {
        return Err(ScheduleError::StartInPast);
    }

    if location_gym_id != request.gym_id {
        return Err(ScheduleError::LocationOutsideGym);
    }

    let end = request.session_date.and_time(request.end_time);
    let gap = Duration::minutes(LOCATION_GAP_MINUTES);
    let clashes = booked
        .iter()
        .filter(|slot| Some(slot.id) != editing)
        .any(|slot| {
            let other_start = request.session_date.and_time(slot.start_time);
            let other_end = request.session_date.and_time(slot.end_time);
            start < other_end + gap && other_start < end + gap
        });

    if clashes {
        return Err(ScheduleError::LocationBusy);
    }

    Ok(())
}

/// Training list entry for a client of the session's trainer
#[derive(Debug, Serialize)]
pub struct ClientSessionView {
    #[serde(flatten)]
    pub session: TrainingSessionDetails,
    pub is_registered: bool,
    pub is_finished: bool,
}

#[derive(Debug, Serialize)]
pub struct ClientTrainings {
    pub trainer: Option<crate::models::TrainerSummary>,
    pub sessions: Vec<ClientSessionView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn morning_of_day_before() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 19).unwrap().and_time(time(8, 0))
    }

    fn request(start: NaiveTime, end: NaiveTime) -> (TrainingSessionRequest, Uuid) {
        let gym_id = Uuid::new_v4();
        let request = TrainingSessionRequest {
            trainer_id: None,
            training_type_id: Uuid::new_v4(),
            gym_id,
            location_id: Uuid::new_v4(),
            session_date: day(),
            start_time: start,
            end_time: end,
            max_participants: 10,
            status: None,
        };
        (request, gym_id)
    }

    fn slot(start: NaiveTime, end: NaiveTime) -> BookedSlot {
        BookedSlot {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_valid_schedule() {
        let (req, gym) = request(time(10, 0), time(11, 0));
        let booked = [slot(time(7, 0), time(9, 0)), slot(time(12, 0), time(13, 0))];
        assert!(validate_schedule(&req, gym, &booked, None, morning_of_day_before()).is_ok());
    }

    #[test]
    fn test_past_date_and_time() {
        let (req, gym) = request(time(10, 0), time(11, 0));
        let next_day = NaiveDate::from_ymd_opt(2024, 5, 21).unwrap().and_time(time(8, 0));
        assert_eq!(
            validate_schedule(&req, gym, &[], None, next_day),
            Err(ScheduleError::DateInPast)
        );

        let same_day_later = day().and_time(time(10, 30));
        assert_eq!(
            validate_schedule(&req, gym, &[], None, same_day_later),
            Err(ScheduleError::StartInPast)
        );
    }

    #[test]
    fn test_field_rules() {
        let (mut req, gym) = request(time(11, 0), time(10, 0));
        assert_eq!(
            validate_schedule(&req, gym, &[], None, morning_of_day_before()),
            Err(ScheduleError::StartNotBeforeEnd)
        );

        req.end_time = time(12, 0);
        req.max_participants = 0;
        assert_eq!(
            validate_schedule(&req, gym, &[], None, morning_of_day_before()),
            Err(ScheduleError::NoParticipants)
        );

        req.max_participants = 5;
        assert_eq!(
            validate_schedule(&req, Uuid::new_v4(), &[], None, morning_of_day_before()),
            Err(ScheduleError::LocationOutsideGym)
        );
    }

    #[test]
    fn test_one_hour_gap_in_location() {
        let (req, gym) = request(time(10, 0), time(11, 0));

        // ends 09:30, new one starts 10:00
        let too_close_before = [slot(time(8, 30), time(9, 30))];
        assert_matches!(
            validate_schedule(&req, gym, &too_close_before, None, morning_of_day_before()),
            Err(ScheduleError::LocationBusy)
        );

        // starts 11:30, new one ends 11:00
        let too_close_after = [slot(time(11, 30), time(12, 30))];
        assert_matches!(
            validate_schedule(&req, gym, &too_close_after, None, morning_of_day_before()),
            Err(ScheduleError::LocationBusy)
        );

        let exactly_one_hour = [slot(time(8, 0), time(9, 0)), slot(time(12, 0), time(13, 0))];
        assert!(validate_schedule(&req, gym, &exactly_one_hour, None, morning_of_day_before()).is_ok());
    }

    #[test]
    fn test_update_ignores_own_slot() {
        let (req, gym) = request(time(10, 0), time(11, 0));
        let own = slot(time(10, 0), time(11, 0));
        assert!(validate_schedule(&req, gym, &[own], Some(own.id), morning_of_day_before()).is_ok());
        assert_eq!(
            validate_schedule(&req, gym, &[own], None, morning_of_day_before()),
            Err(ScheduleError::LocationBusy)
        );
    }

    #[test]
    fn test_is_finished() {
        let end = time(11, 0);
        assert!(!is_finished(day(), end, day().and_time(time(10, 59))));
        assert!(is_finished(day(), end, day().and_time(time(11, 0))));
    }
}
