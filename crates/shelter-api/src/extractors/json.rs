//! JSON body extractor with a fixed rejection.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::debug;

use shelter_core::error::AppError;

/// Message returned for any body that cannot be decoded.
pub const INVALID_BODY: &str = "Invalid request body";

/// Like [`Json`], but every rejection becomes the same 400 response.
///
/// The underlying reason (missing field, wrong type, bad content type) is
/// only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(status = %rejection.status(), "Request body rejected");
                Err(AppError::validation(INVALID_BODY))
            }
        }
    }
}
