//! Account, credential and token service for a hotel game.
//!
//! Players register here, exchange credentials for bearer access tokens,
//! fetch single sign-on tokens for the game client, change their own settings
//! and recover forgotten passwords through emailed reset links.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::mail::Mailer;
use crate::oauth2::ClientRegistry;

pub mod api;
pub mod clock;
pub mod config;
pub mod email_templates;
pub mod entity;
pub mod error;
pub mod mail;
pub mod oauth2;
pub mod password_reset;
pub mod registration;
pub mod settings;
pub mod sso;
pub mod tokens;
pub mod utils;

/// Shared handles every request handler and service is built from.
#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
    pub clients: Arc<ClientRegistry>,
}
