//! Self-service account settings.

use crate::AppResources;
use crate::api::MessageResponse;
use crate::api::accounts::ACCOUNTS_TAG;
use crate::api::auth::BearerAuth;
use crate::error::{ApiError, ErrorResponse};
use crate::settings::{SettingsService, SettingsUpdate};
use axum::{Extension, Json, extract::rejection::JsonRejection};
use utoipa_axum::{router::OpenApiRouter, routes};

pub(crate) fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(update_settings))
}

#[utoipa::path(
    post,
    path = "/settings",
    tag = ACCOUNTS_TAG,
    operation_id = "Update Settings",
    summary = "Change email, motto and optionally the password",
    description = "Requires the current password. `new_password` is optional; without it the \
                   password is left unchanged.",
    security(("bearer_auth" = [])),
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Changes saved", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token, or wrong current password", body = ErrorResponse),
        (status = 403, description = "Invalid email, motto too long, new password too short or email taken", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_settings(
    Extension(resources): Extension<AppResources>,
    BearerAuth(identity): BearerAuth,
    body: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(update) = body?;
    SettingsService::new(&resources)
        .update(identity.player_id, update)
        .await?;
    Ok(Json(MessageResponse::new("Your changes have been saved")))
}
