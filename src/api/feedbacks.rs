use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;
use sqlx::PgPool;

use super::{ActionResponse, JsonBody, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::GymResult;
use crate::models::{EditFeedbackRequest, Feedback, FeedbackDetails, FeedbackRequest};
use crate::services::{ClientService, FeedbackService, TrainerService};

#[derive(Clone)]
pub struct FeedbacksAppState {
    pub feedbacks: FeedbackService,
    pub clients: ClientService,
    pub trainers: TrainerService,
}

pub fn feedbacks_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = FeedbacksAppState {
        feedbacks: FeedbackService::new(db.clone()),
        clients: ClientService::new(db.clone()),
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_feedbacks).post(add_feedback))
        .route("/:feedback_id", put(edit_feedback).delete(delete_feedback))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

pub async fn list_feedbacks(
    State(state): State<FeedbacksAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<FeedbackDetails>>> {
    session.require(Permission::view(Resource::ClientFeedbacks))?;

    let feedbacks = match session.role {
        UserRole::Admin => state.feedbacks.list_all().await?,
        UserRole::Trainer => {
            let trainer = state.trainers.require_profile(session.user_id).await?;
            state.trainers.feedbacks(trainer.id).await?
        }
        UserRole::Client => {
            let client = state.clients.require_profile(session.user_id).await?;
            state.feedbacks.list_for_client(client.id).await?
        }
    };

    Ok(Json(feedbacks))
}

/// Feedback always targets the client's current trainer
#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn add_feedback(
    State(state): State<FeedbacksAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<FeedbackRequest>,
) -> GymResult<Json<ActionResponse<Feedback>>> {
    session.require(Permission::add(Resource::ClientFeedbacks))?;
    session.require_role(UserRole::Client, "Only clients can leave feedback")?;

    let client = state.clients.require_profile(session.user_id).await?;
    let feedback = state
        .feedbacks
        .add(&client, request, Local::now().date_naive())
        .await?;
    Ok(ActionResponse::new("Thank you for your feedback", feedback))
}

pub async fn edit_feedback(
    State(state): State<FeedbacksAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(feedback_id), _): PathId,
    WithRejection(Json(request), _): JsonBody<EditFeedbackRequest>,
) -> GymResult<Json<ActionResponse<Feedback>>> {
    session.require(Permission::change(Resource::ClientFeedbacks))?;
    session.require_role(UserRole::Client, "Only the author can edit feedback")?;

    let client = state.clients.require_profile(session.user_id).await?;
    let feedback = state.feedbacks.edit(client.id, feedback_id, request).await?;
    Ok(ActionResponse::new("Feedback updated", feedback))
}

/// Administrators delete any feedback, clients only their own.
pub async fn delete_feedback(
    State(state): State<FeedbacksAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(feedback_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::ClientFeedbacks))?;

    let owner = if session.is_admin() {
        None
    } else {
        Some(state.clients.require_profile(session.user_id).await?.id)
    };
    state.feedbacks.delete(feedback_id, owner).await?;
    Ok(ActionResponse::new("Feedback deleted", ()))
}
