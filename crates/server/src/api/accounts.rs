//! Account registration endpoint.

use crate::AppResources;
use crate::error::{ApiError, ErrorResponse};
use crate::registration::{AccountResponse, NewAccount, RegistrationService};
use crate::utils::ClientIp;
use axum::{Extension, Json, extract::rejection::JsonRejection};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const ACCOUNTS_TAG: &str = "Accounts";

pub(crate) fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(create_account))
}

#[utoipa::path(
    post,
    path = "/auth/create",
    tag = ACCOUNTS_TAG,
    operation_id = "Create Account",
    summary = "Register a new player account",
    description = "Creates the account and its default game data in one transaction.\n\n\
                   **Checks, in order:** username length, email syntax, password length, \
                   password confirmation, username and email availability, and the number of \
                   accounts already registered from the caller's address.",
    request_body = NewAccount,
    responses(
        (status = 200, description = "Account created", body = AccountResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "Validation failed, name or email taken, or too many accounts from this address", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_account(
    Extension(resources): Extension<AppResources>,
    ClientIp(ip): ClientIp,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let Json(account) = body?;
    let player = RegistrationService::new(&resources)
        .register(account, &ip)
        .await?;
    Ok(Json(player.into()))
}
