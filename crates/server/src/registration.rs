//! Account creation and the checks that guard it.
//!
//! The username and email pre-checks only exist to give a friendly error; the
//! unique indexes on `player` are what actually enforce uniqueness, and a
//! violation there is mapped onto the same errors.

use crate::AppResources;
use crate::clock;
use crate::config::AppConfig;
use crate::email_templates::WelcomeEmailTemplate;
use crate::entity::{
    player, player_avatar, player_data, player_game_settings, player_navigator_settings,
    player_website_data,
};
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::oauth2::hash_password;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// An account as returned to its owner. The password hash is never included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<player::Model> for AccountResponse {
    fn from(player: player::Model) -> Self {
        Self {
            id: player.id,
            username: player.username,
            email: player.email,
            created_at: player.created_at,
        }
    }
}

/// Field checks that need no database access.
pub fn validate_new_account(account: &NewAccount, config: &AppConfig) -> Result<(), ApiError> {
    let rules = &config.validation;

    let username_len = account.username.chars().count();
    if username_len < rules.username_min_length || username_len > rules.username_max_length {
        return Err(ApiError::UsernameLength {
            min: rules.username_min_length,
            max: rules.username_max_length,
        });
    }

    if account.email.parse::<lettre::Address>().is_err() {
        return Err(ApiError::InvalidEmail);
    }

    if account.password.chars().count() < rules.password_min_length {
        return Err(ApiError::PasswordTooShort);
    }

    if account.password != account.password_confirm {
        return Err(ApiError::PasswordMismatch);
    }

    Ok(())
}

#[derive(Clone)]
pub struct RegistrationService {
    db: Arc<DatabaseConnection>,
    mailer: Arc<dyn Mailer>,
    config: Arc<AppConfig>,
}

impl RegistrationService {
    pub fn new(resources: &AppResources) -> Self {
        Self {
            db: resources.db.clone(),
            mailer: resources.mailer.clone(),
            config: resources.config.clone(),
        }
    }

    /// Validate and create an account registered from `ip`.
    #[tracing::instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, account: NewAccount, ip: &str) -> Result<player::Model, ApiError> {
        validate_new_account(&account, &self.config)?;

        let db = self.db.as_ref();

        if player::Entity::find()
            .filter(player::Column::Username.eq(&account.username))
            .count(db)
            .await?
            > 0
        {
            return Err(ApiError::UsernameTaken);
        }

        if player::Entity::find()
            .filter(player::Column::Email.eq(&account.email))
            .count(db)
            .await?
            > 0
        {
            return Err(ApiError::EmailTaken);
        }

        let ceiling = self.config.registration.max_accounts_per_ip;
        if ceiling > 0 {
            let from_ip = player_website_data::Entity::find()
                .filter(player_website_data::Column::InitialIp.eq(ip))
                .count(db)
                .await?;
            if from_ip >= ceiling {
                tracing::warn!(
                    ip,
                    from_ip,
                    "Registration refused, too many accounts from this address"
                );
                return Err(ApiError::TooManyAccounts);
            }
        }

        let password_hash = hash_password(&account.password).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            ApiError::Internal
        })?;

        let txn = self.db.begin().await?;
        let player = self
            .create_rows(&txn, &account, password_hash, ip, clock::now())
            .await?;
        txn.commit().await?;

        tracing::info!(player_id = player.id, "Account created");

        if self.config.registration.send_welcome_email {
            self.send_welcome(&player).await;
        }

        Ok(player)
    }

    async fn create_rows<C: ConnectionTrait>(
        &self,
        conn: &C,
        account: &NewAccount,
        password_hash: String,
        ip: &str,
        now: OffsetDateTime,
    ) -> Result<player::Model, ApiError> {
        let defaults = &self.config.registration.defaults;

        let player = player::ActiveModel {
            username: Set(account.username.clone()),
            email: Set(account.email.clone()),
            password_hash: Set(password_hash),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(ApiError::from_write)?;

        player_data::ActiveModel {
            player_id: Set(player.id),
            home_room_id: Set(0),
            credit_balance: Set(defaults.credits),
            pixel_balance: Set(defaults.pixels),
            seasonal_balance: Set(defaults.seasonal),
            gotw_points: Set(0),
            last_online: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        player_avatar::ActiveModel {
            player_id: Set(player.id),
            figure_code: Set(defaults.figure_code.clone()),
            motto: Set(defaults.motto.clone()),
            gender: Set(defaults.gender.clone()),
            chat_bubble_id: Set(defaults.chat_bubble_id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        player_game_settings::ActiveModel {
            player_id: Set(player.id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        player_navigator_settings::ActiveModel {
            player_id: Set(player.id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        player_website_data::ActiveModel {
            player_id: Set(player.id),
            initial_ip: Set(ip.to_string()),
            last_ip: Set(ip.to_string()),
            last_login: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(player)
    }

    async fn send_welcome(&self, player: &player::Model) {
        let email = WelcomeEmailTemplate {
            site_name: self.config.site.name.clone(),
            site_url: self.config.site.url.clone(),
            username: player.username.clone(),
        }
        .into_email(&player.email);

        let result = match email {
            Ok(email) => self.mailer.send(email).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::error!(player_id = player.id, error = %e, "Failed to send welcome email");
        }
    }
}
