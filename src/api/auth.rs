use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use axum_extra::{
    extract::WithRejection,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::auth::{
    admin_only_middleware, jwt_auth_middleware, AuthError, AuthResponse, AuthService,
    CreateUserRequest, ListUsersQuery, LoginRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest, TokenResponse, UpdateRoleRequest, UserInfo, UserSession,
};

/// Authentication routes
pub fn auth_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route(
            "/profile",
            get(get_profile).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .with_state(auth_service)
}

/// Self-registration, always as a client
#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, request))]
async fn refresh_token(
    State(auth_service): State<AuthService>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
async fn logout(
    State(auth_service): State<AuthService>,
    WithRejection(TypedHeader(Authorization(bearer)), _): WithRejection<
        TypedHeader<Authorization<Bearer>>,
        AuthError,
    >,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.logout(bearer.token()).await?;
    Ok(Json(response))
}

async fn get_profile(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<UserInfo>, AuthError> {
    let user = auth_service.get_user_info(session.user_id).await?;
    Ok(Json(user))
}

/// Account administration
pub fn admin_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/role", put(update_user_role))
        // Layers run outermost-last: authenticate, then check the role
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            jwt_auth_middleware,
        ))
        .with_state(auth_service)
}

async fn list_users(
    State(auth_service): State<AuthService>,
    Query(params): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserInfo>>, AuthError> {
    let users = auth_service.list_users(params.role).await?;
    Ok(Json(users))
}

#[tracing::instrument(skip(auth_service, request), fields(admin = %session.username))]
async fn create_user(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), AuthError> {
    let user = auth_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip(auth_service, session, request))]
async fn update_user_role(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserInfo>, AuthError> {
    if user_id == session.user_id {
        return Err(AuthError::InvalidRequest(
            "Administrators cannot change their own role".to_string(),
        ));
    }

    let user = auth_service.update_user_role(user_id, request.role).await?;
    Ok(Json(user))
}
