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
use crate::models::{Progress, CreateProgressRecord, UpdateProgressRecord};
use crate::services::ProgressService;

const RESOURCE: Resource = Resource::ClientProgress;

pub fn routes(db: PgPool) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).patch(update).delete(destroy))
        .with_state(ProgressService::new(db))
}

async fn list(
    State(service): State<ProgressService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<Progress>>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(service.list_records().await?))
}

async fn create(
    State(service): State<ProgressService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(record), _): JsonBody<CreateProgressRecord>,
) -> GymResult<(StatusCode, Json<Progress>)> {
    session.require(Permission::add(RESOURCE))?;
    Ok((StatusCode::CREATED, Json(service.create_record(record).await?)))
}

async fn show(
    State(service): State<ProgressService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<Progress>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(service.get_record(id).await?))
}

async fn update(
    State(service): State<ProgressService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(record), _): JsonBody<UpdateProgressRecord>,
) -> GymResult<Json<Progress>> {
    session.require(Permission::change(RESOURCE))?;
    Ok(Json(service.update_record(id, record).await?))
}

async fn destroy(
    State(service): State<ProgressService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(RESOURCE))?;
    service.delete_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
