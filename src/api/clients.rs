use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use sqlx::PgPool;

use super::{ActionResponse, JsonBody, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::{GymError, GymResult};
use crate::models::{
    AssignTrainerRequest, Client, ClientListing, ClientProfile, ClientProfileRequest,
    TopUpRequest, TrainerAssignment,
};
use crate::services::{ClientService, TrainerService};

const CLIENT_ONLY: &str = "Only clients have a client profile";

#[derive(Clone)]
pub struct ClientsAppState {
    pub clients: ClientService,
    pub trainers: TrainerService,
}

pub fn clients_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = ClientsAppState {
        clients: ClientService::new(db.clone()),
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_clients))
        .route(
            "/me",
            get(get_profile).post(create_profile).put(update_profile),
        )
        .route("/me/balance", post(top_up_balance))
        .route("/me/trainer", post(assign_trainer))
        .route("/:user_id", delete(delete_client))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

/// Trainers see their own clients with goals, admins see every client account.
pub async fn list_clients(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<ClientListing>> {
    session.require(Permission::view(Resource::Clients))?;

    let listing = match session.role {
        UserRole::Trainer => {
            let trainer = state.trainers.require_profile(session.user_id).await?;
            ClientListing::Trainer {
                clients: state.clients.list_for_trainer(trainer.id).await?,
            }
        }
        UserRole::Admin => ClientListing::Admin {
            accounts: state.clients.list_accounts().await?,
        },
        UserRole::Client => {
            return Err(GymError::RoleNotAllowed(
                "Only trainers and administrators can view clients",
            ))
        }
    };

    Ok(Json(listing))
}

pub async fn get_profile(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<ClientProfile>> {
    session.require(Permission::view(Resource::Clients))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let profile = state.clients.get_profile(session.user_id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn create_profile(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<ClientProfileRequest>,
) -> GymResult<Json<ActionResponse<Client>>> {
    session.require(Permission::change(Resource::Clients))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.create_profile(session.user_id, request).await?;
    Ok(ActionResponse::new("Profile created", client))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn update_profile(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<ClientProfileRequest>,
) -> GymResult<Json<ActionResponse<Client>>> {
    session.require(Permission::change(Resource::Clients))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.update_profile(session.user_id, request).await?;
    Ok(ActionResponse::new("Profile updated", client))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn top_up_balance(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<TopUpRequest>,
) -> GymResult<Json<ActionResponse<Client>>> {
    session.require(Permission::change(Resource::Clients))?;
    session.require_role(UserRole::Client, "Only clients can top up a balance")?;

    let client = state
        .clients
        .top_up_balance(session.user_id, request.amount)
        .await?;
    Ok(ActionResponse::new(
        format!("Balance topped up by {}", request.amount),
        client,
    ))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn assign_trainer(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<AssignTrainerRequest>,
) -> GymResult<Json<ActionResponse<TrainerAssignment>>> {
    session.require(Permission::change(Resource::Clients))?;
    session.require_role(UserRole::Client, "Only clients can choose a trainer")?;

    let assignment = state
        .clients
        .assign_trainer(session.user_id, request.trainer_id, Utc::now())
        .await?;

    let message = if assignment.changed {
        format!(
            "{} {} is now your trainer",
            assignment.trainer.first_name, assignment.trainer.last_name
        )
    } else {
        "This trainer is already assigned to you".to_string()
    };
    Ok(ActionResponse::new(message, assignment))
}

/// Removes the client's whole account, profile included
pub async fn delete_client(
    State(state): State<ClientsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(user_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::Clients))?;

    state.clients.delete_account(user_id).await?;
    Ok(ActionResponse::new("Client deleted", ()))
}
