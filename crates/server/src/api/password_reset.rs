//! Password reset endpoints.

use crate::AppResources;
use crate::api::MessageResponse;
use crate::error::{ApiError, ErrorResponse};
use crate::password_reset::{NewPassword, PasswordResetService, ResetLinkResponse, ResetRequest};
use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const PASSWORD_RESET_TAG: &str = "Password Reset";

pub(crate) fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(send_email))
        .routes(routes!(get_link, reset_password))
}

#[utoipa::path(
    post,
    path = "/reset-password/send-email",
    tag = PASSWORD_RESET_TAG,
    operation_id = "Request Password Reset",
    summary = "Email a password reset link",
    description = "Sends a reset link to the account registered with this email. The response \
                   is the same whether or not such an account exists.",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 429, description = "Too many reset requests for this account", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn send_email(
    Extension(resources): Extension<AppResources>,
    body: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = body?;
    PasswordResetService::new(&resources)
        .request_reset(&body.email)
        .await?;
    Ok(Json(MessageResponse::new(
        "If an account with that email exists, a reset link is on its way",
    )))
}

#[utoipa::path(
    get,
    path = "/reset-password/{token}",
    tag = PASSWORD_RESET_TAG,
    operation_id = "Get Password Reset Link",
    summary = "Check a reset link",
    params(("token" = String, Path, description = "Token from the reset email")),
    responses(
        (status = 200, description = "Link is active", body = ResetLinkResponse),
        (status = 404, description = "Unknown, expired or already used link", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_link(
    Extension(resources): Extension<AppResources>,
    Path(token): Path<String>,
) -> Result<Json<ResetLinkResponse>, ApiError> {
    let link = PasswordResetService::new(&resources).lookup(&token).await?;
    Ok(Json(link.into()))
}

#[utoipa::path(
    post,
    path = "/reset-password/{token}",
    tag = PASSWORD_RESET_TAG,
    operation_id = "Reset Password",
    summary = "Set a new password through a reset link",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = NewPassword,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Passwords differ or the password is too short", body = ErrorResponse),
        (status = 404, description = "Unknown, expired or already used link", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    Extension(resources): Extension<AppResources>,
    Path(token): Path<String>,
    body: Result<Json<NewPassword>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(body) = body?;
    PasswordResetService::new(&resources)
        .consume(&token, &body.password, &body.password_confirm)
        .await?;
    Ok(Json(MessageResponse::new("Your password has been changed")))
}
