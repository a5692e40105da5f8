//! Bearer token validation.
//!
//! Every call goes to the token table; nothing is cached between requests.

use crate::entity::oauth_token;
use crate::error::ApiError;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use time::OffsetDateTime;

/// Who a validated bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub player_id: i64,
    pub client_id: String,
    pub scopes: Vec<String>,
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn parse_authorization(header: Option<&str>) -> Result<&str, ApiError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingToken)?
        .trim();
    if token.is_empty() {
        return Err(ApiError::InvalidToken);
    }
    Ok(token)
}

/// Validate the raw `Authorization` header against the token store at `now`.
pub async fn authenticate(
    db: &DatabaseConnection,
    authorization: Option<&str>,
    now: OffsetDateTime,
) -> Result<Identity, ApiError> {
    let access_token = parse_authorization(authorization)?;

    let token = oauth_token::Entity::find()
        .filter(oauth_token::Column::AccessToken.eq(access_token))
        .one(db)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    if !token.is_valid_at(now) {
        tracing::debug!(token_id = %token.id, "Rejected expired access token");
        return Err(ApiError::InvalidToken);
    }

    let player_id = token.user_id.parse::<i64>().map_err(|_| {
        tracing::warn!(token_id = %token.id, "Access token bound to a malformed user id");
        ApiError::InvalidToken
    })?;

    Ok(Identity {
        player_id,
        scopes: token.scopes_list(),
        client_id: token.client_id,
    })
}
