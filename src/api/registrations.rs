use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;
use sqlx::PgPool;

use super::{ActionResponse, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::GymResult;
use crate::models::{ClientTrainings, Registration};
use crate::services::{ClientService, RegistrationService};

const CLIENT_ONLY: &str = "Only clients register for trainings";

#[derive(Clone)]
pub struct RegistrationsAppState {
    pub registrations: RegistrationService,
    pub clients: ClientService,
}

pub fn registrations_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = RegistrationsAppState {
        registrations: RegistrationService::new(db.clone()),
        clients: ClientService::new(db),
    };

    Router::new()
        .route("/", get(client_trainings))
        .route(
            "/:session_id/registration",
            post(register_for_session).delete(cancel_registration),
        )
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

/// Planned sessions of the client's trainer with registration flags
pub async fn client_trainings(
    State(state): State<RegistrationsAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<ActionResponse<ClientTrainings>>> {
    session.require(Permission::view(Resource::ClientTrainingRegistrations))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    let trainings = state
        .registrations
        .client_trainings(&client, Local::now().naive_local())
        .await?;

    let message = match (&trainings.trainer, trainings.sessions.is_empty()) {
        (None, _) => "You have no assigned trainer yet",
        (Some(_), true) => "Your trainer has no planned sessions",
        (Some(_), false) => "Upcoming sessions of your trainer",
    };
    Ok(ActionResponse::new(message, trainings))
}

#[tracing::instrument(skip(state, session), fields(user = %session.username))]
pub async fn register_for_session(
    State(state): State<RegistrationsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<ActionResponse<Registration>>> {
    session.require(Permission::add(Resource::ClientTrainingRegistrations))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    let registration = state.registrations.register(&client, session_id).await?;
    Ok(ActionResponse::new(
        "You are registered for the session",
        registration,
    ))
}

#[tracing::instrument(skip(state, session), fields(user = %session.username))]
pub async fn cancel_registration(
    State(state): State<RegistrationsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::ClientTrainingRegistrations))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    state.registrations.cancel(&client, session_id).await?;
    Ok(ActionResponse::new("Registration cancelled", ()))
}
