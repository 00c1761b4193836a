use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use super::{ActionResponse, JsonBody, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::GymResult;
use crate::models::{AddProgressRequest, Progress, ProgressDetails};
use crate::services::{ClientService, ProgressService, TrainerService};

#[derive(Clone)]
pub struct ProgressAppState {
    pub progress: ProgressService,
    pub clients: ClientService,
    pub trainers: TrainerService,
}

pub fn progress_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = ProgressAppState {
        progress: ProgressService::new(db.clone()),
        clients: ClientService::new(db.clone()),
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(client_progress))
        .route("/sessions/:session_id", post(add_progress))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

pub async fn client_progress(
    State(state): State<ProgressAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<ProgressDetails>>> {
    session.require(Permission::view(Resource::ClientProgress))?;
    session.require_role(UserRole::Client, "Only clients have a progress history")?;

    let client = state.clients.require_profile(session.user_id).await?;
    let progress = state.progress.client_progress(client.id).await?;
    Ok(Json(progress))
}

/// A trainer records how a registered client did in a completed session.
#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn add_progress(
    State(state): State<ProgressAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
    WithRejection(Json(request), _): JsonBody<AddProgressRequest>,
) -> GymResult<Json<ActionResponse<Progress>>> {
    session.require(Permission::add(Resource::ClientProgress))?;
    session.require_role(UserRole::Trainer, "Only trainers record client progress")?;

    let trainer = state.trainers.require_profile(session.user_id).await?;
    let progress = state.progress.add(trainer.id, session_id, request).await?;
    Ok(ActionResponse::new("Progress saved", progress))
}
