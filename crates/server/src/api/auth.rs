//! Bearer token extractor for protected routes.

use crate::AppResources;
use crate::clock;
use crate::error::ApiError;
use crate::oauth2::{Identity, authenticate};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Axum extractor that validates `Authorization: Bearer <token>`.
///
/// The identity lives for the current request only; every request hits the
/// token store again.
///
/// ```ignore
/// async fn handler(BearerAuth(identity): BearerAuth) -> impl IntoResponse {
///     format!("Hello, player {}", identity.player_id)
/// }
/// ```
pub struct BearerAuth(pub Identity);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiError::Internal
            })?;

        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());

        let identity = authenticate(resources.db.as_ref(), header, clock::now()).await?;
        Ok(BearerAuth(identity))
    }
}
