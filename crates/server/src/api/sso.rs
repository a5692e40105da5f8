use crate::AppResources;
use crate::api::auth::BearerAuth;
use crate::error::{ApiError, ErrorResponse};
use crate::oauth2::AUTH_TAG;
use crate::sso::{SsoTokenResponse, SsoTokenService};
use axum::{Extension, Json};
use utoipa_axum::{router::OpenApiRouter, routes};

pub(crate) fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(sso_token))
}

#[utoipa::path(
    get,
    path = "/sso-token",
    tag = AUTH_TAG,
    operation_id = "Issue SSO Token",
    summary = "Issue a single sign-on token for the game client",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token issued", body = SsoTokenResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn sso_token(
    Extension(resources): Extension<AppResources>,
    BearerAuth(identity): BearerAuth,
) -> Result<Json<SsoTokenResponse>, ApiError> {
    let token = SsoTokenService::new(&resources)
        .issue(identity.player_id)
        .await?;
    Ok(Json(token.into()))
}
