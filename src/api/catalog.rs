use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use super::{JsonBody, PathId, QueryParams};
use crate::auth::{jwt_auth_middleware, AuthService, Permission, Resource, UserSession};
use crate::errors::GymResult;
use crate::models::{
    Goal, GoalRequest, Gym, GymRequest, Location, LocationQuery, LocationRequest,
    SubscriptionPlan, SubscriptionPlanRequest, TrainingType, TrainingTypeRequest,
};
use crate::services::CatalogService;

const CATALOG: Resource = Resource::Catalog;

/// Gyms, locations, plans, goals and training types. Anyone signed in may
/// read them; only administrators hold the write permissions.
pub fn catalog_routes(db: PgPool, auth_service: AuthService) -> Router {
    Router::new()
        .route("/gyms", get(list_gyms).post(create_gym))
        .route("/gyms/:id", get(get_gym).put(update_gym).delete(delete_gym))
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/:id",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/:id", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/:id", get(get_goal).put(update_goal).delete(delete_goal))
        .route(
            "/training-types",
            get(list_training_types).post(create_training_type),
        )
        .route(
            "/training-types/:id",
            get(get_training_type)
                .put(update_training_type)
                .delete(delete_training_type),
        )
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(CatalogService::new(db))
}

// Gyms

pub async fn list_gyms(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<Gym>>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.list_gyms().await?))
}

pub async fn get_gym(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<Gym>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.get_gym(id).await?))
}

pub async fn create_gym(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<GymRequest>,
) -> GymResult<(StatusCode, Json<Gym>)> {
    session.require(Permission::add(CATALOG))?;
    Ok((StatusCode::CREATED, Json(catalog.create_gym(request).await?)))
}

pub async fn update_gym(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(request), _): JsonBody<GymRequest>,
) -> GymResult<Json<Gym>> {
    session.require(Permission::change(CATALOG))?;
    Ok(Json(catalog.update_gym(id, request).await?))
}

pub async fn delete_gym(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CATALOG))?;
    catalog.delete_gym(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Locations

pub async fn list_locations(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): QueryParams<LocationQuery>,
) -> GymResult<Json<Vec<Location>>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.list_locations(query.gym_id).await?))
}

pub async fn get_location(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<Location>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.get_location(id).await?))
}

pub async fn create_location(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<LocationRequest>,
) -> GymResult<(StatusCode, Json<Location>)> {
    session.require(Permission::add(CATALOG))?;
    Ok((StatusCode::CREATED, Json(catalog.create_location(request).await?)))
}

pub async fn update_location(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(request), _): JsonBody<LocationRequest>,
) -> GymResult<Json<Location>> {
    session.require(Permission::change(CATALOG))?;
    Ok(Json(catalog.update_location(id, request).await?))
}

pub async fn delete_location(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CATALOG))?;
    catalog.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Subscription plans

pub async fn list_plans(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<SubscriptionPlan>>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.list_plans().await?))
}

pub async fn get_plan(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<SubscriptionPlan>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.get_plan(id).await?))
}

pub async fn create_plan(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<SubscriptionPlanRequest>,
) -> GymResult<(StatusCode, Json<SubscriptionPlan>)> {
    session.require(Permission::add(CATALOG))?;
    Ok((StatusCode::CREATED, Json(catalog.create_plan(request).await?)))
}

pub async fn update_plan(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(request), _): JsonBody<SubscriptionPlanRequest>,
) -> GymResult<Json<SubscriptionPlan>> {
    session.require(Permission::change(CATALOG))?;
    Ok(Json(catalog.update_plan(id, request).await?))
}

pub async fn delete_plan(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CATALOG))?;
    catalog.delete_plan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Goals

pub async fn list_goals(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<Goal>>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.list_goals().await?))
}

pub async fn get_goal(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<Goal>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.get_goal(id).await?))
}

pub async fn create_goal(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<GoalRequest>,
) -> GymResult<(StatusCode, Json<Goal>)> {
    session.require(Permission::add(CATALOG))?;
    Ok((StatusCode::CREATED, Json(catalog.create_goal(request).await?)))
}

pub async fn update_goal(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(request), _): JsonBody<GoalRequest>,
) -> GymResult<Json<Goal>> {
    session.require(Permission::change(CATALOG))?;
    Ok(Json(catalog.update_goal(id, request).await?))
}

pub async fn delete_goal(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CATALOG))?;
    catalog.delete_goal(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Training types

pub async fn list_training_types(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
) -> GymResult<Json<Vec<TrainingType>>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.list_training_types().await?))
}

pub async fn get_training_type(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<Json<TrainingType>> {
    session.require(Permission::view(CATALOG))?;
    Ok(Json(catalog.get_training_type(id).await?))
}

pub async fn create_training_type(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): JsonBody<TrainingTypeRequest>,
) -> GymResult<(StatusCode, Json<TrainingType>)> {
    session.require(Permission::add(CATALOG))?;
    Ok((
        StatusCode::CREATED,
        Json(catalog.create_training_type(request).await?),
    ))
}

pub async fn update_training_type(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
    WithRejection(Json(request), _): JsonBody<TrainingTypeRequest>,
) -> GymResult<Json<TrainingType>> {
    session.require(Permission::change(CATALOG))?;
    Ok(Json(catalog.update_training_type(id, request).await?))
}

pub async fn delete_training_type(
    State(catalog): State<CatalogService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): PathId,
) -> GymResult<StatusCode> {
    session.require(Permission::delete(CATALOG))?;
    catalog.delete_training_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
