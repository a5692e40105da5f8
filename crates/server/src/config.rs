use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Public URL of the website; reset links point below it.
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// Client used by `/auth/login`. Defaults to the registered client with the lowest id.
    #[serde(default)]
    pub service_client_id: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,
    #[serde(default = "default_scope")]
    pub default_scope: String,
    /// SSO token lifetime in seconds
    #[serde(default = "default_sso_token_lifetime")]
    pub sso_token_lifetime: i64,
    /// Password reset link lifetime in seconds
    #[serde(default = "default_password_reset_lifetime")]
    pub password_reset_lifetime: i64,
    #[serde(default = "default_max_password_resets")]
    pub max_password_resets_per_hour: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            service_client_id: None,
            access_token_lifetime: default_access_token_lifetime(),
            default_scope: default_scope(),
            sso_token_lifetime: default_sso_token_lifetime(),
            password_reset_lifetime: default_password_reset_lifetime(),
            max_password_resets_per_hour: default_max_password_resets(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_username_min_length")]
    pub username_min_length: usize,
    #[serde(default = "default_username_max_length")]
    pub username_max_length: usize,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
    #[serde(default = "default_motto_max_length")]
    pub motto_max_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            username_min_length: default_username_min_length(),
            username_max_length: default_username_max_length(),
            password_min_length: default_password_min_length(),
            motto_max_length: default_motto_max_length(),
        }
    }
}

/// Initial values written to the rows created with every new account.
#[derive(Clone, Debug, Deserialize)]
pub struct PlayerDefaults {
    #[serde(default = "default_credits")]
    pub credits: i64,
    #[serde(default = "default_pixels")]
    pub pixels: i64,
    #[serde(default = "default_seasonal")]
    pub seasonal: i64,
    #[serde(default)]
    pub figure_code: String,
    #[serde(default)]
    pub motto: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default = "default_chat_bubble_id")]
    pub chat_bubble_id: i32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            credits: default_credits(),
            pixels: default_pixels(),
            seasonal: default_seasonal(),
            figure_code: String::new(),
            motto: String::new(),
            gender: default_gender(),
            chat_bubble_id: default_chat_bubble_id(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegistrationConfig {
    /// Accounts allowed per registration IP. `0` disables the check.
    #[serde(default = "default_max_accounts_per_ip")]
    pub max_accounts_per_ip: u64,
    #[serde(default)]
    pub send_welcome_email: bool,
    #[serde(default)]
    pub defaults: PlayerDefaults,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_accounts_per_ip: default_max_accounts_per_ip(),
            send_welcome_email: false,
            defaults: PlayerDefaults::default(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub site: SiteConfig,
    /// Without an SMTP section outgoing mail is only logged.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

fn default_site_name() -> String {
    "Hotel".to_string()
}
fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_access_token_lifetime() -> i64 {
    7200
}
fn default_scope() -> String {
    "read".to_string()
}
fn default_sso_token_lifetime() -> i64 {
    30 * 60
}
fn default_password_reset_lifetime() -> i64 {
    10 * 60
}
fn default_max_password_resets() -> u64 {
    5
}
fn default_username_min_length() -> usize {
    3
}
fn default_username_max_length() -> usize {
    20
}
fn default_password_min_length() -> usize {
    10
}
fn default_motto_max_length() -> usize {
    30
}
fn default_credits() -> i64 {
    10_000
}
fn default_pixels() -> i64 {
    10_000
}
fn default_seasonal() -> i64 {
    500
}
fn default_gender() -> String {
    "M".to_string()
}
fn default_chat_bubble_id() -> i32 {
    1
}
fn default_max_accounts_per_ip() -> u64 {
    5
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.url.trim().is_empty() {
            return Err(ConfigError::Validation("site.url must not be empty".into()));
        }
        if self.auth.access_token_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "auth.access_token_lifetime must be > 0".into(),
            ));
        }
        if self.auth.sso_token_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "auth.sso_token_lifetime must be > 0".into(),
            ));
        }
        if self.auth.password_reset_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "auth.password_reset_lifetime must be > 0".into(),
            ));
        }
        if self.auth.max_password_resets_per_hour == 0 {
            return Err(ConfigError::Validation(
                "auth.max_password_resets_per_hour must be > 0".into(),
            ));
        }
        if self.validation.password_min_length == 0 {
            return Err(ConfigError::Validation(
                "validation.password_min_length must be > 0".into(),
            ));
        }
        if self.validation.username_min_length > self.validation.username_max_length {
            return Err(ConfigError::Validation(
                "validation.username_min_length must not exceed username_max_length".into(),
            ));
        }
        if let Some(smtp) = &self.smtp
            && smtp.port == 0
        {
            return Err(ConfigError::Validation("smtp.port must be > 0".into()));
        }
        Ok(())
    }
}

/// Load application configuration from `config.yaml` (or `$CONFIG_PATH`) plus
/// environment overrides.
///
/// Any environment variable matching a key path separated by double
/// underscores (e.g. `AUTH__ACCESS_TOKEN_LIFETIME`) overrides the file value.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_config_from(&path)
}

pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}
