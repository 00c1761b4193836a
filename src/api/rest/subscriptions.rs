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
use crate::models::{ClientSubscription, CreateSubscriptionRecord, UpdateSubscriptionRecord};
use crate::services::SubscriptionService;

const RESOURCE: Resource = Resource::ClientSubscriptions;

pub fn routes(db: PgPool) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).patch(update).delete(destroy))
        .with_state(SubscriptionService::new(db))
}

async fn list(
    State(subscriptions): State<SubscriptionService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<ClientSubscription>>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(subscriptions.list_records().await?))
}

async fn create(
    State(subscriptions): State<SubscriptionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(record), _): JsonBody<CreateSubscriptionRecord>,
) -> GymResult<(StatusCode, Json<ClientSubscription>)> {
    session.require(Permission::add(RESOURCE))?;
    Ok((StatusCode::CREATED, Json(subscriptions.create_record(record).await?)))
}

async fn show(
    State(subscriptions): State<SubscriptionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<ClientSubscription>> {
    session.require(Permission::view(RESOURCE))?;
    Ok(Json(subscriptions.get_record(id).await?))
}

async fn update(
    State(subscriptions): State<SubscriptionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(record), _): JsonBody<UpdateSubscriptionRecord>,
) -> GymResult<Json<ClientSubscription>> {
    session.require(Permission::change(RESOURCE))?;
    Ok(Json(subscriptions.update_record(id, record).await?))
}

async fn destroy(
    State(subscriptions): State<SubscriptionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(RESOURCE))?;
    subscriptions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
