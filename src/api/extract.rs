//! Extractors whose rejections use the `{"error"}` body

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::Error;

/// `Json<T>` whose rejections are reported as `400 {"error": ...}`
///
/// axum's own rejection answers with plain text and 415/422 statuses.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(Error::Validation(format!(
                    "Invalid JSON body: {}",
                    rejection.body_text()
                )))
            }
        }
    }
}

/// `Path<T>` whose rejections are reported as `{"error": ...}`
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(rejection) if rejection.status().is_server_error() => {
                Err(Error::Internal(rejection.body_text()))
            }
            Err(rejection) => Err(Error::Validation(rejection.body_text())),
        }
    }
}
