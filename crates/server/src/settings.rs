//! Account settings changed by the player themselves.
//!
//! Every change is confirmed with the current password. As with registration,
//! the email pre-check only produces the friendly error; the unique index on
//! `player.email` decides.

use crate::AppResources;
use crate::config::AppConfig;
use crate::entity::{player, player_avatar};
use crate::error::ApiError;
use crate::oauth2::{hash_password, verify_password};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
    sea_query::Expr,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub email: String,
    pub motto: String,
    /// Current password
    pub password: String,
    /// Replaces the current password when present
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Field checks that need no database access.
pub fn validate_settings(update: &SettingsUpdate, config: &AppConfig) -> Result<(), ApiError> {
    if update.email.parse::<lettre::Address>().is_err() {
        return Err(ApiError::InvalidEmail);
    }
    if update.motto.chars().count() > config.validation.motto_max_length {
        return Err(ApiError::MottoTooLong);
    }
    Ok(())
}

#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
    config: Arc<AppConfig>,
}

impl SettingsService {
    pub fn new(resources: &AppResources) -> Self {
        Self {
            db: resources.db.clone(),
            config: resources.config.clone(),
        }
    }

    /// Apply `update` to the player's account and avatar in one transaction.
    #[tracing::instrument(skip(self, update))]
    pub async fn update(&self, player_id: i64, update: SettingsUpdate) -> Result<(), ApiError> {
        validate_settings(&update, &self.config)?;

        let db = self.db.as_ref();
        let player = player::Entity::find_by_id(player_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Valid token for a player that no longer exists");
                ApiError::InvalidToken
            })?;

        if !verify_password(&update.password, &player.password_hash) {
            tracing::info!("Settings change refused, current password did not match");
            return Err(ApiError::InvalidCredentials);
        }

        let password_hash = match update.new_password.as_deref() {
            Some(new_password) => {
                if new_password.chars().count() < self.config.validation.password_min_length {
                    return Err(ApiError::PasswordTooShort);
                }
                let hash = hash_password(new_password).map_err(|e| {
                    tracing::error!(error = %e, "Failed to hash password");
                    ApiError::Internal
                })?;
                Some(hash)
            }
            None => None,
        };

        if player::Entity::find()
            .filter(player::Column::Email.eq(&update.email))
            .filter(player::Column::Id.ne(player_id))
            .count(db)
            .await?
            > 0
        {
            return Err(ApiError::EmailTaken);
        }

        let password_changed = password_hash.is_some();
        let txn = self.db.begin().await?;

        let mut account = player::Entity::update_many()
            .col_expr(player::Column::Email, Expr::value(update.email))
            .filter(player::Column::Id.eq(player_id));
        if let Some(hash) = password_hash {
            account = account.col_expr(player::Column::PasswordHash, Expr::value(hash));
        }
        account.exec(&txn).await.map_err(ApiError::from_write)?;

        let avatar = player_avatar::Entity::update_many()
            .col_expr(player_avatar::Column::Motto, Expr::value(update.motto))
            .filter(player_avatar::Column::PlayerId.eq(player_id))
            .exec(&txn)
            .await?;
        if avatar.rows_affected == 0 {
            tracing::error!("Player has no avatar row");
            return Err(ApiError::Internal);
        }

        txn.commit().await?;

        tracing::info!(password_changed, "Settings updated");
        Ok(())
    }
}
