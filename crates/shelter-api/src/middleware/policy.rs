//! Route policy enforcement middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::info;

use shelter_auth::{AuthError, AuthenticatedContext, Decision, DenyReason};
use shelter_core::error::AppError;

use crate::state::AppState;

/// Evaluates the route policy against the caller's context.
///
/// Must run after [`authenticate`](super::auth::authenticate).
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let context = request.extensions().get::<AuthenticatedContext>().copied();

    let decision = state
        .policy
        .authorize(request.method(), request.uri().path(), context.as_ref());

    match decision {
        Decision::Permit => next.run(request).await,
        Decision::Deny(reason) => {
            info!(
                method = %request.method(),
                path = %request.uri().path(),
                subject_id = ?context.map(|c| c.subject_id),
                ?reason,
                "Request denied by route policy"
            );
            match reason {
                DenyReason::Unauthenticated => {
                    AppError::authentication("Authentication required").into_response()
                }
                DenyReason::Forbidden => AppError::from(AuthError::Forbidden).into_response(),
            }
        }
    }
}
