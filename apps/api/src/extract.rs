//! Request extractors.
//!
//! [`AuthUser`] runs the token half of the guard: bearer header, then
//! signature and expiry. Policies are evaluated by the services.
//! [`ApiJson`] replaces axum's plain-text body rejections with [`ApiError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bazaar_core::policy::extract_bearer_token;
use bazaar_core::Identity;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;
use crate::SharedState;

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(AuthUser(identity): AuthUser) -> String {
///     identity.user_id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = extract_bearer_token(header).inspect_err(|_| {
            warn!(path = %parts.uri.path(), "Request without bearer token");
        })?;

        let identity = state.jwt.verify_token(token).inspect_err(|_| {
            warn!(path = %parts.uri.path(), "Request with invalid token");
        })?;

        Ok(AuthUser(identity))
    }
}

/// JSON body extractor with [`ApiError`] rejections.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// Hides parser positions; keeps the gist for the client.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
        JsonRejection::JsonDataError(_) => "Invalid fields in request body",
        _ => "Invalid request body",
    };
    ApiError::validation(message)
}
