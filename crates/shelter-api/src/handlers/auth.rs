//! Auth handlers: sign-in, refresh, me, credential update.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use shelter_auth::CredentialPatch;
use shelter_core::error::AppError;

use crate::dto::request::{RefreshRequest, SigninRequest};
use crate::dto::response::{MeResponse, TokenResponse};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = state.gate.login(&req.identifier, &req.password).await?;
    Ok(Json(issued.into()))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = state.codec.refresh(&req.token).inspect_err(|e| {
        tracing::info!(error = %e, "Token refresh rejected");
    })?;
    Ok(Json(issued.into()))
}

/// GET /auth/me
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        subject_id: auth.subject_id,
        role: auth.role,
    })
}

/// PATCH /auth/credentials
pub async fn update_credentials(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(patch): ValidJson<CredentialPatch>,
) -> Result<StatusCode, AppError> {
    state.merger.apply(auth.subject_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}
