use axum::{
    extract::{Query, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use super::QueryParams;
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserSession};
use crate::errors::GymResult;
use crate::models::{AttendanceQuery, AttendanceReport, PeriodQuery, RankingRow};
use crate::services::ReportService;

pub fn reports_routes(db: PgPool, auth_service: AuthService) -> Router {
    Router::new()
        .route("/attendance", get(attendance))
        .route("/training-types", get(training_type_ranking))
        .route("/locations", get(location_ranking))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(ReportService::new(db))
}

pub async fn attendance(
    State(reports): State<ReportService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): QueryParams<AttendanceQuery>,
) -> GymResult<Json<AttendanceReport>> {
    session.require(Permission::view(Resource::Reports))?;
    Ok(Json(reports.attendance(&query).await?))
}

/// Training types by number of registrations in the period
pub async fn training_type_ranking(
    State(reports): State<ReportService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(period), _): QueryParams<PeriodQuery>,
) -> GymResult<Json<Vec<RankingRow>>> {
    session.require(Permission::view(Resource::Reports))?;
    Ok(Json(reports.training_type_ranking(&period).await?))
}

pub async fn location_ranking(
    State(reports): State<ReportService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(period), _): QueryParams<PeriodQuery>,
) -> GymResult<Json<Vec<RankingRow>>> {
    session.require(Permission::view(Resource::Reports))?;
    Ok(Json(reports.location_ranking(&period).await?))
}
