use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use super::auth::{admin_routes, auth_routes};
use super::catalog::catalog_routes;
use super::clients::clients_routes;
use super::feedbacks::feedbacks_routes;
use super::goals::goals_routes;
use super::health::health_check;
use super::progress::progress_routes;
use super::registrations::registrations_routes;
use super::reports::reports_routes;
use super::rest::rest_routes;
use super::subscriptions::subscriptions_routes;
use super::trainers::trainers_routes;
use super::training_sessions::training_sessions_routes;
use crate::auth::{cors_layer, security_headers_layer, AuthService};

pub fn create_routes(db: PgPool, jwt_secret: &str) -> Router {
    let auth_service = AuthService::new(db.clone(), jwt_secret);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/auth", auth_routes(auth_service.clone()))
        .nest("/api/v1/admin", admin_routes(auth_service.clone()))
        .nest("/api/v1/clients", clients_routes(db.clone(), auth_service.clone()))
        .nest("/api/v1/trainers", trainers_routes(db.clone(), auth_service.clone()))
        .nest("/api/v1/catalog", catalog_routes(db.clone(), auth_service.clone()))
        .nest(
            "/api/v1/subscriptions",
            subscriptions_routes(db.clone(), auth_service.clone()),
        )
        .nest("/api/v1/goals", goals_routes(db.clone(), auth_service.clone()))
        .nest("/api/v1/feedbacks", feedbacks_routes(db.clone(), auth_service.clone()))
        .nest(
            "/api/v1/training-sessions",
            training_sessions_routes(db.clone(), auth_service.clone()),
        )
        .nest(
            "/api/v1/trainings",
            registrations_routes(db.clone(), auth_service.clone()),
        )
        .nest("/api/v1/progress", progress_routes(db.clone(), auth_service.clone()))
        .nest("/api/v1/reports", reports_routes(db.clone(), auth_service.clone()))
        .nest("/api/v1/rest", rest_routes(db, auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer())
}
