use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::api::{JsonBody, PathId};
use crate::auth::{Permission, Resource, UserSession};
use crate::errors::GymResult;
use crate::models::{Feedback, CreateFeedbackRecord, UpdateFeedbackRecord};
use crate::services::FeedbackService;

const RESOURCE: Resource = Resource::ClientFeedbacks;

pub fn routes(db: PgPool) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).patch(update).delete(destroy))
        .with_state(FeedbackService::new(db))
}

async fn list(
    State(service): State<FeedbackService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<Feedback>>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(service.list_records().await?))
}

async fn create(
    State(service): State<FeedbackService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(record), _): JsonBody<CreateFeedbackRecord>,
) -> GymResult<(StatusCode, Json<Feedback>)> {
    session.require(Permission::add(RESOURCE))?;
    Ok((StatusCode::CREATED, Json(service.create_record(record).await?)))
}

async fn show(
    State(service): State<FeedbackService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<Feedback>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(service.get_record(id).await?))
}

async fn update(
    State(service): State<FeedbackService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(record), _): JsonBody<UpdateFeedbackRecord>,
) -> GymResult<Json<Feedback>> {
    session.require(Permission::change(RESOURCE))?;
    Ok(Json(service.update_record(id, record).await?))
}

/// No ownership check here, the permission alone decides
async fn destroy(
    State(service): State<FeedbackService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(RESOURCE))?;
    service.delete(id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}
