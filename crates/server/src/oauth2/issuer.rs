//! Password grant token issuance.

use crate::AppResources;
use crate::clock;
use crate::entity::{oauth_client, oauth_token, player};
use crate::error::ApiError;
use crate::oauth2::{ClientRegistry, password};
use crate::tokens::generate_access_token;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub const TOKEN_TYPE: &str = "Bearer";

/// Credentials of a password grant request.
pub struct PasswordGrant<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub scope: Option<&'a str>,
}

/// Token envelope returned by `/auth/token` and `/auth/login`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub scope: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    db: Arc<DatabaseConnection>,
    clients: Arc<ClientRegistry>,
    lifetime: i64,
    default_scope: String,
}

impl TokenIssuer {
    pub fn new(resources: &AppResources) -> Self {
        Self {
            db: resources.db.clone(),
            clients: resources.clients.clone(),
            lifetime: resources.config.auth.access_token_lifetime,
            default_scope: resources.config.auth.default_scope.clone(),
        }
    }

    /// Full password grant: authenticate the client, then the player.
    #[tracing::instrument(
        skip_all,
        fields(client_id = %grant.client_id, username = %grant.username)
    )]
    pub async fn issue(&self, grant: PasswordGrant<'_>) -> Result<TokenResponse, ApiError> {
        let client = self
            .clients
            .authenticate(grant.client_id, grant.client_secret)
            .ok_or(ApiError::InvalidClient)?;
        self.issue_for(client, grant.username, grant.password, grant.scope)
            .await
    }

    /// Issue under the service client without client credentials.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.issue_for(self.clients.service_client(), username, password, None)
            .await
    }

    async fn issue_for(
        &self,
        client: &oauth_client::Model,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> Result<TokenResponse, ApiError> {
        let player = self.check_credentials(username, password).await?;
        let scope = scope
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_scope)
            .to_string();

        let access_token = generate_access_token();
        let token = oauth_token::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            access_token: Set(access_token.clone()),
            token_type: Set(TOKEN_TYPE.to_string()),
            client_id: Set(client.client_id()),
            user_id: Set(player.id.to_string()),
            scope: Set(scope.clone()),
            issued_at: Set(clock::now()),
            access_expires_in: Set(self.lifetime),
        };
        token.insert(self.db.as_ref()).await?;

        tracing::info!(player_id = player.id, client_id = client.id, "Issued access token");

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.lifetime,
            scope,
        })
    }

    /// Unknown user and wrong password are indistinguishable, in result and in cost.
    async fn check_credentials(
        &self,
        username: &str,
        candidate: &str,
    ) -> Result<player::Model, ApiError> {
        let found = player::Entity::find()
            .filter(player::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;

        match found {
            Some(player) if password::verify_password(candidate, &player.password_hash) => {
                Ok(player)
            }
            Some(_) => Err(ApiError::InvalidCredentials),
            None => {
                password::verify_against_dummy(candidate);
                Err(ApiError::InvalidCredentials)
            }
        }
    }
}
