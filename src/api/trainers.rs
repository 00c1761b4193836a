use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;
use sqlx::PgPool;

use super::{ActionResponse, JsonBody, PathId};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::GymResult;
use crate::models::{FeedbackDetails, Trainer, TrainerListEntry, TrainerProfileRequest};
use crate::services::TrainerService;

const TRAINER_ONLY: &str = "Only trainers have a trainer profile";

#[derive(Clone)]
pub struct TrainersAppState {
    pub trainers: TrainerService,
}

pub fn trainers_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = TrainersAppState {
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_trainers))
        .route(
            "/me",
            get(get_own_profile)
                .post(create_profile)
                .put(update_profile),
        )
        .route("/me/feedbacks", get(own_feedbacks))
        .route("/:trainer_id", get(get_trainer).delete(delete_trainer))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

/// Every trainer with the number of clients they coach
pub async fn list_trainers(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<TrainerListEntry>>> {
    session.require(Permission::view(Resource::Trainers))?;

    let trainers = state.trainers.list_trainers().await?;
    Ok(Json(trainers))
}

pub async fn get_trainer(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(trainer_id), _): PathId,
) -> GymResult<Json<TrainerListEntry>> {
    session.require(Permission::view(Resource::Trainers))?;

    let trainer = state.trainers.get_trainer(trainer_id).await?;
    Ok(Json(trainer))
}

pub async fn get_own_profile(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Trainer>> {
    session.require(Permission::view(Resource::Trainers))?;
    session.require_role(UserRole::Trainer, TRAINER_ONLY)?;

    let trainer = state.trainers.require_profile(session.user_id).await?;
    Ok(Json(trainer))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn create_profile(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<TrainerProfileRequest>,
) -> GymResult<Json<ActionResponse<Trainer>>> {
    session.require(Permission::add(Resource::Trainers))?;
    session.require_role(UserRole::Trainer, TRAINER_ONLY)?;

    let trainer = state
        .trainers
        .create_profile(session.user_id, request, Local::now().date_naive())
        .await?;
    Ok(ActionResponse::new("Trainer profile created", trainer))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn update_profile(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<TrainerProfileRequest>,
) -> GymResult<Json<ActionResponse<Trainer>>> {
    session.require(Permission::change(Resource::Trainers))?;
    session.require_role(UserRole::Trainer, TRAINER_ONLY)?;

    let current = state.trainers.require_profile(session.user_id).await?;
    let trainer = state
        .trainers
        .update_profile(current.id, request, Local::now().date_naive())
        .await?;
    Ok(ActionResponse::new("Trainer profile updated", trainer))
}

/// Feedback clients left about the calling trainer
pub async fn own_feedbacks(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<FeedbackDetails>>> {
    session.require(Permission::view(Resource::ClientFeedbacks))?;
    session.require_role(UserRole::Trainer, TRAINER_ONLY)?;

    let trainer = state.trainers.require_profile(session.user_id).await?;
    let feedbacks = state.trainers.feedbacks(trainer.id).await?;
    Ok(Json(feedbacks))
}

pub async fn delete_trainer(
    State(state): State<TrainersAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(trainer_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::Trainers))?;

    state.trainers.delete_trainer(trainer_id).await?;
    Ok(ActionResponse::new("Trainer deleted", ()))
}
