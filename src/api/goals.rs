use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use sqlx::PgPool;

use super::{ActionResponse, JsonBody, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::GymResult;
use crate::models::{AddGoalRequest, ClientGoal, ClientGoalDetails, EditGoalRequest};
use crate::services::{ClientService, GoalService};

const CLIENT_ONLY: &str = "Only clients have personal goals";

#[derive(Clone)]
pub struct GoalsAppState {
    pub goals: GoalService,
    pub clients: ClientService,
}

pub fn goals_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = GoalsAppState {
        goals: GoalService::new(db.clone()),
        clients: ClientService::new(db),
    };

    Router::new()
        .route("/", get(list_goals).post(add_goal))
        .route("/:goal_id", put(edit_goal).delete(delete_goal))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

/// Goals of the authenticated client
pub async fn list_goals(
    State(state): State<GoalsAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<ClientGoalDetails>>> {
    session.require(Permission::view(Resource::ClientGoals))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    let goals = state.goals.list_for_client(client.id).await?;
    Ok(Json(goals))
}

pub async fn add_goal(
    State(state): State<GoalsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<AddGoalRequest>,
) -> GymResult<Json<ActionResponse<ClientGoal>>> {
    session.require(Permission::add(Resource::ClientGoals))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    let goal = state.goals.add(client.id, request, Utc::now()).await?;
    Ok(ActionResponse::new("Goal added", goal))
}

pub async fn edit_goal(
    State(state): State<GoalsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): PathId,
    WithRejection(Json(request), _): JsonBody<EditGoalRequest>,
) -> GymResult<Json<ActionResponse<ClientGoal>>> {
    session.require(Permission::change(Resource::ClientGoals))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    let goal = state.goals.edit(client.id, goal_id, request).await?;
    Ok(ActionResponse::new("Goal updated", goal))
}

pub async fn delete_goal(
    State(state): State<GoalsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::ClientGoals))?;
    session.require_role(UserRole::Client, CLIENT_ONLY)?;

    let client = state.clients.require_profile(session.user_id).await?;
    state.goals.delete(client.id, goal_id).await?;
    Ok(ActionResponse::new("Goal deleted", ()))
}
