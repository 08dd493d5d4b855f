//! Request guards
//!
//! Two composable layers protect endpoints. `auth_middleware` authenticates:
//! it extracts the token (bearer header first, session cookie as fallback),
//! verifies it, and attaches the resolved [`Identity`] to the request.
//! `enforce` authorizes: installed per route with its [`AccessRequirement`],
//! it evaluates the attached identity and answers 403 on mismatch, distinct
//! from the 401 the authentication layer produces.
//!
//! Neither layer mutates the token or extends its lifetime.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use common::identity::Identity;
use common::policy::{AccessDecision, AccessRequirement};

use crate::{AppState, error::AuthServiceError, session::ACCESS_TOKEN_COOKIE};

/// Pull the token out of the request: `Authorization: Bearer` first, then the
/// session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Authentication layer: verify the token and attach the identity.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthServiceError> {
    let token = extract_token(req.headers()).ok_or(AuthServiceError::Unauthorized)?;

    let claims = state.token_service.verify(&token).map_err(|e| {
        warn!("Token rejected: {}", e);
        AuthServiceError::Unauthorized
    })?;

    req.extensions_mut().insert(claims.into_identity());

    Ok(next.run(req).await)
}

/// Authorization layer: evaluate the route's requirement against the identity
/// attached by [`auth_middleware`].
pub async fn enforce(
    State(requirement): State<AccessRequirement>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthServiceError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(AuthServiceError::Unauthorized)?;

    match requirement.evaluate(identity) {
        AccessDecision::Granted => Ok(next.run(req).await),
        AccessDecision::Denied { missing } => Err(AuthServiceError::Forbidden { missing }),
    }
}
