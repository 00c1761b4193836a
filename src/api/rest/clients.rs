use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use sqlx::PgPool;

use crate::api::{JsonBody, PathId};
use crate::auth::{Permission, Resource, UserSession};
use crate::errors::GymResult;
use crate::models::{Client, CreateClientRecord, UpdateClientRecord};
use crate::services::ClientService;

const CLIENTS: Resource = Resource::Clients;

/// Client profiles, addressed by the owning account's id
pub fn routes(db: PgPool) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:user_id", get(show).patch(update).delete(destroy))
        .with_state(ClientService::new(db))
}

async fn list(
    State(clients): State<ClientService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<Client>>> {
    session.require(Permission::view(CLIENTS))?;
    Ok(Json(clients.list_records().await?))
}

async fn create(
    State(clients): State<ClientService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(record), _): JsonBody<CreateClientRecord>,
) -> GymResult<(StatusCode, Json<Client>)> {
    session.require(Permission::add(CLIENTS))?;
    Ok((StatusCode::CREATED, Json(clients.create_record(record, Utc::now()).await?)))
}

async fn show(
    State(clients): State<ClientService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(user_id), _): PathId,
) -> GymResult<Json<Client>> {
    session.require(Permission::view(CLIENTS))?;
    Ok(Json(clients.get_record(user_id).await?))
}

async fn update(
    State(clients): State<ClientService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(user_id), _): PathId,
    WithRejection(Json(record), _): JsonBody<UpdateClientRecord>,
) -> GymResult<Json<Client>> {
    session.require(Permission::change(CLIENTS))?;
    Ok(Json(clients.update_record(user_id, record, Utc::now()).await?))
}

async fn destroy(
    State(clients): State<ClientService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(user_id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CLIENTS))?;
    clients.delete_record(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
