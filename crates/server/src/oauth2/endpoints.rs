//! HTTP endpoints for the password grant.

use crate::AppResources;
use crate::api::auth::BearerAuth;
use crate::entity::player;
use crate::error::{ApiError, ErrorResponse};
use crate::oauth2::{AUTH_TAG, PasswordGrant, TokenIssuer, TokenResponse};
use crate::registration::AccountResponse;
use axum::{
    Extension, Form, Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::HeaderMap,
};
use base64::Engine;
use sea_orm::EntityTrait;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(token))
        .routes(routes!(login))
        .routes(routes!(me))
}

/// Password grant parameters. Read from the query string on GET and from a
/// form body on POST.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct TokenRequest {
    /// Must be `password`
    pub grant_type: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// May instead be sent with HTTP Basic auth
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Space separated; falls back to the configured default
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    method(get, post),
    path = "/auth/token",
    tag = AUTH_TAG,
    operation_id = "Password Grant",
    summary = "Exchange player credentials for an access token",
    description = "OAuth2 resource owner password grant. Parameters are read from the query string \
                   on GET and from an `application/x-www-form-urlencoded` body on POST.\n\n\
                   **Client authentication:** HTTP Basic auth, or `client_id` and `client_secret` \
                   as parameters.\n\n\
                   An unknown username and a wrong password produce the same response.",
    params(TokenRequest),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Malformed request or unsupported grant type", body = ErrorResponse),
        (status = 401, description = "Invalid client or player credentials", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn token(
    Extension(resources): Extension<AppResources>,
    headers: HeaderMap,
    params: Result<Form<TokenRequest>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(params) = params?;

    if params.grant_type != "password" {
        return Err(ApiError::UnsupportedGrantType);
    }

    let (client_id, client_secret) = extract_client_credentials(&headers, &params);
    let client_id =
        client_id.ok_or_else(|| ApiError::MalformedRequest("client_id is required".into()))?;
    let client_secret = client_secret.unwrap_or_default();
    let username = params
        .username
        .as_deref()
        .ok_or_else(|| ApiError::MalformedRequest("username is required".into()))?;
    let password = params
        .password
        .as_deref()
        .ok_or_else(|| ApiError::MalformedRequest("password is required".into()))?;

    let response = TokenIssuer::new(&resources)
        .issue(PasswordGrant {
            client_id: &client_id,
            client_secret: &client_secret,
            username,
            password,
            scope: params.scope.as_deref(),
        })
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = AUTH_TAG,
    operation_id = "Login",
    summary = "Log in with username and password",
    description = "Issues an access token under the service's own client. The response has the \
                   same shape as `/auth/token`.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    Extension(resources): Extension<AppResources>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = body?;
    let response = TokenIssuer::new(&resources)
        .login(&body.username, &body.password)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = AUTH_TAG,
    operation_id = "Current Account",
    summary = "Account behind the bearer token",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(
    Extension(resources): Extension<AppResources>,
    BearerAuth(identity): BearerAuth,
) -> Result<Json<AccountResponse>, ApiError> {
    let player = player::Entity::find_by_id(identity.player_id)
        .one(resources.db.as_ref())
        .await?
        .ok_or_else(|| {
            tracing::warn!("Valid token for a player that no longer exists");
            ApiError::InvalidToken
        })?;
    Ok(Json(player.into()))
}

/// Client credentials from HTTP Basic auth, falling back to the request parameters.
fn extract_client_credentials(
    headers: &HeaderMap,
    params: &TokenRequest,
) -> (Option<String>, Option<String>) {
    if let Some(auth) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        && let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(auth.trim())
        && let Ok(creds) = String::from_utf8(decoded)
        && let Some((id, secret)) = creds.split_once(':')
    {
        return (Some(id.to_string()), Some(secret.to_string()));
    }

    (params.client_id.clone(), params.client_secret.clone())
}
