//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::identity::Identity;
use common::policy::AccessRequirement;

use crate::{
    AppState,
    error::AuthServiceError,
    middleware::{auth_middleware, enforce},
    models::{NewUser, UserSummary},
    session::{
        ACCESS_TOKEN_COOKIE, DEBUG_TOKEN_COOKIE, debug_mirror_cookie, removal_cookie,
        session_cookie,
    },
    validation::validate_new_user,
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: Identity,
}

/// Response for token verification
#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Identity,
}

/// Response carrying the authenticated profile
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: Identity,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let user_read = Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route_layer(middleware::from_fn_with_state(
            AccessRequirement::any_of(["user.read"]),
            enforce,
        ));

    let user_write = Router::new()
        .route("/users", post(create_user))
        .route_layer(middleware::from_fn_with_state(
            AccessRequirement::all_of(["user.read", "user.write"]),
            enforce,
        ));

    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/auth/verify", get(verify))
        .merge(user_read)
        .merge(user_write)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/auth/login", post(login))
        .merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
///
/// Sets the session cookie on success. Unknown usernames and wrong passwords
/// answer identically.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    info!("Login attempt for user: {}", payload.username);

    if !state.rate_limiter.is_allowed(&payload.username).await? {
        return Err(AuthServiceError::TooManyAttempts);
    }

    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await?
        .ok_or(AuthServiceError::InvalidCredentials)?;

    if !state
        .user_repository
        .verify_password(&payload.password, &user.password_hash)?
    {
        return Err(AuthServiceError::InvalidCredentials);
    }

    // Snapshot role and permissions at issuance time; lookups degrade rather
    // than failing the login.
    let role = state.role_repository.resolve_role_name(user.role_id).await;
    let permissions = state
        .role_repository
        .resolve_permissions(user.role_id)
        .await;

    let identity = Identity {
        id: user.id,
        username: user.username,
        role,
        permissions,
    };

    let access_token = state.token_service.issue(&identity)?;

    state.rate_limiter.record_success(&identity.username).await;
    info!("User {} logged in", identity.username);

    let mut jar = jar.add(session_cookie(&access_token, &state.cookies));
    if !state.cookies.environment.is_production() {
        jar = jar.add(debug_mirror_cookie(&access_token, &state.cookies));
    }

    let response = LoginResponse {
        access_token,
        user: identity,
    };

    Ok((jar, Json(response)))
}

/// Logout endpoint
///
/// Clears the session cookie. Issued tokens are not revoked server-side; they
/// stay valid until natural expiry.
pub async fn logout(
    jar: CookieJar,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AuthServiceError> {
    info!("User {} logged out", identity.username);

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(DEBUG_TOKEN_COOKIE));

    Ok((
        jar,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Get the authenticated user's profile
pub async fn profile(
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AuthServiceError> {
    Ok(Json(ProfileResponse { user: identity }))
}

/// Re-validate the caller's token and echo the identity it carries
pub async fn verify(
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AuthServiceError> {
    Ok(Json(VerifyResponse {
        valid: true,
        user: identity,
    }))
}

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let users = state.user_repository.list().await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| AuthServiceError::NotFound("User not found".to_string()))?;

    Ok(Json(UserSummary::from(user)))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AuthServiceError> {
    validate_new_user(&payload).map_err(AuthServiceError::Validation)?;

    if state
        .user_repository
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        warn!("Rejected duplicate username: {}", payload.username);
        return Err(AuthServiceError::Validation(vec![
            "Username is already taken".to_string(),
        ]));
    }

    let user = state.user_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(UserSummary::from(user))))
}
