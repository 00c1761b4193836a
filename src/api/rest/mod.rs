// Raw record CRUD, gated by model permissions only

pub mod clients;
pub mod feedbacks;
pub mod goals;
pub mod progress;
pub mod registrations;
pub mod subscriptions;

use axum::{middleware, Router};
use sqlx::PgPool;

use crate::auth::{jwt_auth_middleware, AuthService};

pub fn rest_routes(db: PgPool, auth_service: AuthService) -> Router {
    Router::new()
        .nest("/clients", clients::routes(db.clone()))
        .nest("/subscriptions", subscriptions::routes(db.clone()))
        .nest("/goals", goals::routes(db.clone()))
        .nest("/feedbacks", feedbacks::routes(db.clone()))
        .nest("/registrations", registrations::routes(db.clone()))
        .nest("/progress", progress::routes(db))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
}
