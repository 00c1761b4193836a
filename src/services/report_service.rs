use sqlx::PgPool;

use crate::errors::GymResult;
use crate::models::{check_period, AttendanceQuery, AttendanceReport, AttendanceRow, PeriodQuery, RankingRow};

/// Admin reports over registrations
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn attendance(&self, query: &AttendanceQuery) -> GymResult<AttendanceReport> {
        check_period(query.start_date, query.end_date)?;

        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT ts.id AS session_id, ts.session_date, ts.start_time,
                    t.first_name || ' ' || t.last_name AS trainer_name,
                    tt.title AS training_type, l.name AS location_name,
                    COUNT(r.id) AS registered, ts.max_participants
             FROM training_sessions ts
             JOIN trainers t ON t.id = ts.trainer_id
             JOIN training_types tt ON tt.id = ts.training_type_id
             JOIN locations l ON l.id = ts.location_id
             LEFT JOIN registrations r ON r.session_id = ts.id
             WHERE ($1::uuid IS NULL OR ts.trainer_id = $1)
               AND ($2::uuid IS NULL OR ts.training_type_id = $2)
               AND ($3::date IS NULL OR ts.session_date >= $3)
               AND ($4::date IS NULL OR ts.session_date <= $4)
             GROUP BY ts.id, t.first_name, t.last_name, tt.title, l.name
             ORDER BY ts.session_date, ts.start_time",
        )
        .bind(query.trainer_id)
        .bind(query.training_type_id)
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(AttendanceReport::from_rows(rows))
    }

    pub async fn training_type_ranking(&self, period: &PeriodQuery) -> GymResult<Vec<RankingRow>> {
        check_period(period.start_date, period.end_date)?;

        let rows = sqlx::query_as::<_, RankingRow>(
            "SELECT tt.id, tt.title AS name, COUNT(r.id) AS registrations
             FROM registrations r
             JOIN training_sessions ts ON ts.id = r.session_id
             JOIN training_types tt ON tt.id = ts.training_type_id
             WHERE ($1::date IS NULL OR ts.session_date >= $1)
               AND ($2::date IS NULL OR ts.session_date <= $2)
             GROUP BY tt.id, tt.title
             ORDER BY registrations DESC, tt.title",
        )
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    pub async fn location_ranking(&self, period: &PeriodQuery) -> GymResult<Vec<RankingRow>> {
        check_period(period.start_date, period.end_date)?;

        let rows = sqlx::query_as::<_, RankingRow>(
            "SELECT l.id, g.name || ' / ' || l.name AS name, COUNT(r.id) AS registrations
             FROM registrations r
             JOIN training_sessions ts ON ts.id = r.session_id
             JOIN locations l ON l.id = ts.location_id
             JOIN gyms g ON g.id = l.gym_id
             WHERE ($1::date IS NULL OR ts.session_date >= $1)
               AND ($2::date IS NULL OR ts.session_date <= $2)
             GROUP BY l.id, l.name, g.name
             ORDER BY registrations DESC, 2",
        )
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
