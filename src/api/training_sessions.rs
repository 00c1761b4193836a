use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ActionResponse, JsonBody, PathId, QueryParams};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserRole, UserSession};
use crate::errors::{GymError, GymResult};
use crate::models::{
    SessionQuery, SessionRegistrant, SessionStatus, TrainingSession, TrainingSessionDetails,
    TrainingSessionRequest,
};
use crate::services::{TrainerService, TrainingSessionService};

#[derive(Clone)]
pub struct TrainingSessionsAppState {
    pub sessions: TrainingSessionService,
    pub trainers: TrainerService,
}

impl TrainingSessionsAppState {
    /// Trainers act on their own sessions, administrators on any (`None`).
    async fn owner(&self, session: &UserSession) -> GymResult<Option<Uuid>> {
        match session.role {
            UserRole::Admin => Ok(None),
            UserRole::Trainer => Ok(Some(self.trainers.require_profile(session.user_id).await?.id)),
            UserRole::Client => Err(GymError::RoleNotAllowed(
                "Only trainers and administrators can manage training sessions",
            )),
        }
    }
}

pub fn training_sessions_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = TrainingSessionsAppState {
        sessions: TrainingSessionService::new(db.clone()),
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route(
            "/:session_id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/:session_id/complete", post(complete_session))
        .route("/:session_id/cancel", post(cancel_session))
        .route("/:session_id/registrations", get(list_registrants))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

pub async fn list_sessions(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): QueryParams<SessionQuery>,
) -> GymResult<Json<Vec<TrainingSessionDetails>>> {
    session.require(Permission::view(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    let sessions = state.sessions.list(owner, &query).await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<TrainingSessionDetails>> {
    session.require(Permission::view(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    state.sessions.get_owned(session_id, owner).await?;
    Ok(Json(state.sessions.get(session_id).await?))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn create_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<TrainingSessionRequest>,
) -> GymResult<Json<ActionResponse<TrainingSession>>> {
    session.require(Permission::add(Resource::TrainingSessions))?;

    let trainer_id = match state.owner(&session).await? {
        Some(trainer_id) => trainer_id,
        None => {
            let trainer_id = request.trainer_id.ok_or_else(|| {
                GymError::InvalidInput("trainer_id is required when scheduling for a trainer".to_string())
            })?;
            state.trainers.get_trainer(trainer_id).await?.trainer.id
        }
    };

    let created = state
        .sessions
        .create(trainer_id, request, Local::now().naive_local())
        .await?;
    Ok(ActionResponse::new("Training session created", created))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn update_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
    WithRejection(Json(request), _): JsonBody<TrainingSessionRequest>,
) -> GymResult<Json<ActionResponse<TrainingSession>>> {
    session.require(Permission::change(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    let updated = state
        .sessions
        .update(session_id, owner, request, Local::now().naive_local())
        .await?;
    Ok(ActionResponse::new("Training session updated", updated))
}

pub async fn delete_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    state.sessions.delete(session_id, owner).await?;
    Ok(ActionResponse::new("Training session deleted", ()))
}

pub async fn complete_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<ActionResponse<TrainingSession>>> {
    session.require(Permission::change(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    let completed = state
        .sessions
        .finish_with(session_id, owner, SessionStatus::Completed)
        .await?;
    Ok(ActionResponse::new("Training session completed", completed))
}

pub async fn cancel_session(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<ActionResponse<TrainingSession>>> {
    session.require(Permission::change(Resource::TrainingSessions))?;

    let owner = state.owner(&session).await?;
    let cancelled = state
        .sessions
        .finish_with(session_id, owner, SessionStatus::Cancelled)
        .await?;
    Ok(ActionResponse::new("Training session cancelled", cancelled))
}

/// Clients registered for the session, flagged when progress is recorded
pub async fn list_registrants(
    State(state): State<TrainingSessionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(session_id), _): PathId,
) -> GymResult<Json<Vec<SessionRegistrant>>> {
    session.require(Permission::view(Resource::ClientTrainingRegistrations))?;

    let owner = state.owner(&session).await?;
    let registrants = state.sessions.registrants(session_id, owner).await?;
    Ok(Json(registrants))
}
