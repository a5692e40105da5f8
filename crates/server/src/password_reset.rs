//! Password reset links: request, look up, consume.
//!
//! A link is `Active` until it is used or its expiry passes; both end states
//! are terminal. Callers never learn which of the two a dead link is in.

use crate::AppResources;
use crate::clock;
use crate::config::AppConfig;
use crate::email_templates::PasswordResetEmailTemplate;
use crate::entity::password_reset_link::{self, LinkState};
use crate::entity::player;
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::oauth2::hash_password;
use crate::tokens::generate_token;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

/// Window the request ceiling applies to.
const RATE_WINDOW: Duration = Duration::hours(1);

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewPassword {
    pub password: String,
    pub password_confirm: String,
}

/// Public view of an active link.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetLinkResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl From<password_reset_link::Model> for ResetLinkResponse {
    fn from(link: password_reset_link::Model) -> Self {
        Self {
            token: link.token,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Clone)]
pub struct PasswordResetService {
    db: Arc<DatabaseConnection>,
    mailer: Arc<dyn Mailer>,
    config: Arc<AppConfig>,
}

impl PasswordResetService {
    pub fn new(resources: &AppResources) -> Self {
        Self {
            db: resources.db.clone(),
            mailer: resources.mailer.clone(),
            config: resources.config.clone(),
        }
    }

    fn lifetime(&self) -> Duration {
        Duration::seconds(self.config.auth.password_reset_lifetime)
    }

    pub async fn request_reset(&self, email: &str) -> Result<(), ApiError> {
        self.request_reset_at(email, clock::now()).await
    }

    /// Create a link for the account behind `email` and mail it out.
    ///
    /// An unknown address succeeds without doing anything.
    #[tracing::instrument(skip(self))]
    pub async fn request_reset_at(&self, email: &str, now: OffsetDateTime) -> Result<(), ApiError> {
        let db = self.db.as_ref();

        let Some(player) = player::Entity::find()
            .filter(player::Column::Email.eq(email))
            .one(db)
            .await?
        else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let recent = password_reset_link::Entity::find()
            .filter(password_reset_link::Column::PlayerId.eq(player.id))
            .filter(
                Condition::any()
                    .add(password_reset_link::Column::CreatedAt.gt(now - RATE_WINDOW))
                    .add(password_reset_link::active_at(now)),
            )
            .count(db)
            .await?;

        if recent >= self.config.auth.max_password_resets_per_hour {
            tracing::warn!(player_id = player.id, recent, "Password reset rate limit hit");
            return Err(ApiError::RateLimited);
        }

        let link = password_reset_link::ActiveModel {
            player_id: Set(player.id),
            token: Set(generate_token()),
            created_at: Set(now),
            expires_at: Set(now + self.lifetime()),
            used_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if let Err(e) = self.send_link(&player, &link).await {
            tracing::error!(
                player_id = player.id,
                error = %e,
                "Failed to send password reset email"
            );
            // Don't leave a link behind that nobody received.
            link.delete(db).await?;
            return Err(ApiError::Internal);
        }

        tracing::info!(player_id = player.id, link_id = link.id, "Password reset link sent");
        Ok(())
    }

    async fn send_link(
        &self,
        player: &player::Model,
        link: &password_reset_link::Model,
    ) -> Result<(), crate::mail::MailError> {
        let email = PasswordResetEmailTemplate {
            site_name: self.config.site.name.clone(),
            username: player.username.clone(),
            reset_url: format!(
                "{}/password-reset/{}",
                self.config.site.url.trim_end_matches('/'),
                link.token
            ),
            lifetime_minutes: self.lifetime().whole_minutes(),
        }
        .into_email(&player.email)?;
        self.mailer.send(email).await
    }

    pub async fn lookup(&self, token: &str) -> Result<password_reset_link::Model, ApiError> {
        self.lookup_at(token, clock::now()).await
    }

    /// Return the link only while it is active. Used and expired links are
    /// reported exactly like unknown ones.
    pub async fn lookup_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<password_reset_link::Model, ApiError> {
        let link = password_reset_link::Entity::find()
            .filter(password_reset_link::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await?
            .ok_or(ApiError::NotFound)?;

        match link.state_at(now) {
            LinkState::Active => Ok(link),
            state => {
                tracing::debug!(link_id = link.id, ?state, "Reset link is no longer usable");
                Err(ApiError::NotFound)
            }
        }
    }

    pub async fn consume(
        &self,
        token: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), ApiError> {
        self.consume_at(token, password, confirm, clock::now()).await
    }

    /// Set a new password through an active link and retire the link.
    ///
    /// Both writes share one transaction. The link update is conditional on the
    /// link still being active, so of two concurrent consumers only one wins.
    #[tracing::instrument(skip(self, token, password, confirm))]
    pub async fn consume_at(
        &self,
        token: &str,
        password: &str,
        confirm: &str,
        now: OffsetDateTime,
    ) -> Result<(), ApiError> {
        let link = self.lookup_at(token, now).await?;

        if password != confirm {
            return Err(ApiError::PasswordMismatch);
        }
        if password.chars().count() < self.config.validation.password_min_length {
            return Err(ApiError::PasswordTooShort);
        }

        let password_hash = hash_password(password).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            ApiError::Internal
        })?;

        let txn = self.db.begin().await?;

        let retired = password_reset_link::Entity::update_many()
            .col_expr(password_reset_link::Column::UsedAt, Expr::value(now))
            .filter(password_reset_link::Column::Id.eq(link.id))
            .filter(password_reset_link::active_at(now))
            .exec(&txn)
            .await?;
        if retired.rows_affected == 0 {
            // Someone else consumed it between lookup and update.
            return Err(ApiError::NotFound);
        }

        let updated = player::Entity::update_many()
            .col_expr(player::Column::PasswordHash, Expr::value(password_hash))
            .filter(player::Column::Id.eq(link.player_id))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            tracing::error!(player_id = link.player_id, "Reset link points at a missing player");
            return Err(ApiError::Internal);
        }

        txn.commit().await?;

        tracing::info!(player_id = link.player_id, link_id = link.id, "Password reset completed");
        Ok(())
    }
}
