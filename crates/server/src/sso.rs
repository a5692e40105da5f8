//! Single sign-on handoff tokens.
//!
//! The game server consumes these out-of-band; this service only issues them.

use crate::AppResources;
use crate::clock;
use crate::entity::player_sso_token;
use crate::error::ApiError;
use crate::tokens::generate_token;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SsoTokenResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl From<player_sso_token::Model> for SsoTokenResponse {
    fn from(model: player_sso_token::Model) -> Self {
        Self {
            token: model.token,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

#[derive(Clone)]
pub struct SsoTokenService {
    db: Arc<DatabaseConnection>,
    lifetime: Duration,
}

impl SsoTokenService {
    pub fn new(resources: &AppResources) -> Self {
        Self {
            db: resources.db.clone(),
            lifetime: Duration::seconds(resources.config.auth.sso_token_lifetime),
        }
    }

    /// Issue a token for an already authenticated player.
    pub async fn issue(&self, player_id: i64) -> Result<player_sso_token::Model, ApiError> {
        self.issue_at(player_id, clock::now()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn issue_at(
        &self,
        player_id: i64,
        now: OffsetDateTime,
    ) -> Result<player_sso_token::Model, ApiError> {
        let token = player_sso_token::ActiveModel {
            player_id: Set(player_id),
            token: Set(generate_token()),
            created_at: Set(now),
            expires_at: Set(now + self.lifetime),
            ..Default::default()
        };
        let token = token.insert(self.db.as_ref()).await?;
        tracing::info!(token_id = token.id, "Issued SSO token");
        Ok(token)
    }
}
