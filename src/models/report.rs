use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{GymError, GymResult};

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceQuery {
    pub trainer_id: Option<Uuid>,
    pub training_type_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Rejects a period whose start lies after its end.
pub fn check_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> GymResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(GymError::InvalidInput(
            "Start date must not be after end date".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRow {
    pub session_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub trainer_name: String,
    pub training_type: String,
    pub location_name: String,
    pub registered: i64,
    pub max_participants: i32,
}

impl AttendanceRow {
    /// Percentage of places taken, rounded to one decimal
    pub fn fill_rate(&self) -> f64 {
        if self.max_participants <= 0 {
            return 0.0;
        }
        let rate = self.registered as f64 * 100.0 / f64::from(self.max_participants);
        (rate * 10.0).round() / 10.0
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub row: AttendanceRow,
    pub fill_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AttendanceReport {
    pub sessions: Vec<AttendanceEntry>,
    pub total_registrations: i64,
    pub total_capacity: i64,
}

impl AttendanceReport {
    pub fn from_rows(rows: Vec<AttendanceRow>) -> Self {
        let total_registrations = rows.iter().map(|row| row.registered).sum();
        let total_capacity = rows.iter().map(|row| i64::from(row.max_participants)).sum();
        let sessions = rows
            .into_iter()
            .map(|row| AttendanceEntry {
                fill_rate: row.fill_rate(),
                row,
            })
            .collect();

        Self {
            sessions,
            total_registrations,
            total_capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankingRow {
    pub id: Uuid,
    pub name: String,
    pub registrations: i64,
}
