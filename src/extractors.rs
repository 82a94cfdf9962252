use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::response::AppError;
use crate::store::keys::CollectionKind;

/// `axum::Json<T>` whose rejection is an `AppError` envelope instead of
/// axum's plain-text body.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_app_error(rejection)),
        }
    }
}

fn json_rejection_to_app_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
        _ => "Request body could not be read",
    };
    tracing::warn!(error = %rejection, "JSON body rejected");
    AppError::bad_request("INVALID_REQUEST_BODY", message)
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// First path segment parameter parsed as a collection kind.
pub struct KindPath(pub CollectionKind);

#[axum::async_trait]
impl<S> FromRequestParts<S> for KindPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<Vec<String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_PATH", "Malformed path parameters"))?;
        let raw = params
            .first()
            .ok_or_else(|| AppError::bad_request("INVALID_PATH", "Missing collection kind"))?;
        raw.parse::<CollectionKind>()
            .map(KindPath)
            .map_err(|_| AppError::not_found(&format!("Unknown collection '{raw}'")))
    }
}
