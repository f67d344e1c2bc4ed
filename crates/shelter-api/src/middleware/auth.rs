//! Bearer token authentication middleware.
//!
//! Runs on every request. A request without an `Authorization` header
//! continues anonymously; a request with one must carry a valid bearer token
//! or it is rejected here with a fixed 401 body.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use shelter_auth::{AuthError, AuthenticatedContext, TokenError};
use shelter_core::error::AppError;

use crate::state::AppState;

/// Verifies the bearer token, if any, and stores the
/// [`AuthenticatedContext`] in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return next.run(request).await;
    };

    let verified = bearer_token(header)
        .ok_or(TokenError::Malformed)
        .and_then(|token| state.codec.verify(token));

    match verified {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedContext::from(&claims));
            next.run(request).await
        }
        Err(reason) => {
            warn!(
                reason = reason.as_str(),
                method = %request.method(),
                path = %request.uri().path(),
                "Bearer token rejected"
            );
            AppError::from(AuthError::from(reason)).into_response()
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value.
fn bearer_token(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
