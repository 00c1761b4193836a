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
use crate::errors::GymResult;
use crate::models::{ClientSubscriptionDetails, PurchaseReceipt, PurchaseRequest};
use crate::services::{ClientService, SubscriptionService, TrainerService};

#[derive(Clone)]
pub struct SubscriptionsAppState {
    pub subscriptions: SubscriptionService,
    pub clients: ClientService,
    pub trainers: TrainerService,
}

pub fn subscriptions_routes(db: PgPool, auth_service: AuthService) -> Router {
    let shared_state = SubscriptionsAppState {
        subscriptions: SubscriptionService::new(db.clone()),
        clients: ClientService::new(db.clone()),
        trainers: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_subscriptions))
        .route("/purchase", post(purchase_subscription))
        .route("/:id", delete(delete_subscription))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(shared_state)
}

/// Clients see their own subscriptions, trainers those of their clients,
/// administrators all of them.
pub async fn list_subscriptions(
    State(state): State<SubscriptionsAppState>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<ClientSubscriptionDetails>>> {
    session.require(Permission::view(Resource::ClientSubscriptions))?;

    let subscriptions = match session.role {
        UserRole::Client => {
            let client = state.clients.require_profile(session.user_id).await?;
            state.subscriptions.list_for_client(client.id).await?
        }
        UserRole::Trainer => {
            let trainer = state.trainers.require_profile(session.user_id).await?;
            state.subscriptions.list_for_trainer(trainer.id).await?
        }
        UserRole::Admin => state.subscriptions.list_all().await?,
    };

    Ok(Json(subscriptions))
}

#[tracing::instrument(skip(state, session, request), fields(user = %session.username))]
pub async fn purchase_subscription(
    State(state): State<SubscriptionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<PurchaseRequest>,
) -> GymResult<Json<ActionResponse<PurchaseReceipt>>> {
    session.require(Permission::add(Resource::ClientSubscriptions))?;
    session.require_role(UserRole::Client, "Only clients can buy subscriptions")?;

    let receipt = state
        .subscriptions
        .purchase(session.user_id, request.subscription_id, Utc::now())
        .await?;

    Ok(ActionResponse::new(
        format!(
            "Subscription \"{}\" purchased. Remaining balance: {}",
            receipt.plan_name, receipt.remaining_balance
        ),
        receipt,
    ))
}

pub async fn delete_subscription(
    State(state): State<SubscriptionsAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<ActionResponse<()>>> {
    session.require(Permission::delete(Resource::ClientSubscriptions))?;

    state.subscriptions.delete(id).await?;
    Ok(ActionResponse::new("Subscription deleted", ()))
}
