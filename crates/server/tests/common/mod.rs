//! Shared fixtures: in-memory SQLite schema, config, mail doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use player_auth::{
    AppResources,
    config::{AppConfig, AuthConfig, RegistrationConfig, SiteConfig, ValidationConfig},
    entity::player,
    mail::{MailError, Mailer, OutgoingEmail},
    oauth2::{ClientRegistry, hash_password},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Statement,
};
use std::sync::{Arc, Mutex};

pub const CLIENT_ID: &str = "1";
pub const CLIENT_SECRET: &str = "hotel-client-secret";
pub const PASSWORD: &str = "correct horse battery";

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE player (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    );"#,
    r#"CREATE TABLE player_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id),
        home_room_id INTEGER NOT NULL DEFAULT 0,
        credit_balance INTEGER NOT NULL DEFAULT 0,
        pixel_balance INTEGER NOT NULL DEFAULT 0,
        seasonal_balance INTEGER NOT NULL DEFAULT 0,
        gotw_points INTEGER NOT NULL DEFAULT 0,
        last_online TEXT NOT NULL
    );"#,
    r#"CREATE TABLE player_avatar_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id),
        figure_code TEXT NOT NULL DEFAULT '',
        motto TEXT NOT NULL DEFAULT '',
        gender TEXT NOT NULL DEFAULT 'M',
        chat_bubble_id INTEGER NOT NULL DEFAULT 1
    );"#,
    r#"CREATE TABLE player_game_settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id)
    );"#,
    r#"CREATE TABLE player_navigator_settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id)
    );"#,
    r#"CREATE TABLE player_website_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id),
        initial_ip TEXT NOT NULL,
        last_ip TEXT NOT NULL,
        last_login TEXT NOT NULL
    );"#,
    r#"CREATE TABLE oauth_client (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        secret TEXT NOT NULL,
        domain TEXT NOT NULL
    );"#,
    r#"CREATE TABLE oauth_token (
        id TEXT PRIMARY KEY,
        access_token TEXT NOT NULL UNIQUE,
        token_type TEXT NOT NULL DEFAULT 'Bearer',
        client_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        scope TEXT NOT NULL,
        issued_at TEXT NOT NULL,
        access_expires_in INTEGER NOT NULL
    );"#,
    r#"CREATE TABLE player_sso_token (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id),
        token TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    );"#,
    r#"CREATE TABLE player_password_reset_link (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES player(id),
        token TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        used_at TEXT NULL
    );"#,
];

/// In-memory database with every table and two registered clients.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    for sql in SCHEMA {
        db.execute(Statement::from_string(DbBackend::Sqlite, *sql))
            .await
            .expect("create table");
    }

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        format!(
            "INSERT INTO oauth_client (id, secret, domain) VALUES (1, '{CLIENT_SECRET}', 'hotel.example.com'), (2, 'other-secret', 'partner.example.com');"
        ),
    ))
    .await
    .expect("insert clients");

    db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        listen_addr: "127.0.0.1:0".into(),
        site: SiteConfig {
            name: "Hotel".into(),
            url: "https://hotel.example.com/".into(),
        },
        smtp: None,
        auth: AuthConfig::default(),
        validation: ValidationConfig::default(),
        registration: RegistrationConfig::default(),
    }
}

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Mailer whose relay is always down.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Address(
            "relay-down".parse::<lettre::Address>().unwrap_err(),
        ))
    }
}

pub async fn test_resources_with(config: AppConfig, mailer: Arc<dyn Mailer>) -> AppResources {
    let db = create_test_db().await;
    let clients = ClientRegistry::load(&db, config.auth.service_client_id.as_deref())
        .await
        .expect("load clients");
    AppResources {
        db: Arc::new(db),
        mailer,
        config: Arc::new(config),
        clients: Arc::new(clients),
    }
}

/// Resources plus a handle on the recording mailer behind them.
pub async fn test_resources() -> (AppResources, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let resources = test_resources_with(test_config(), mailer.clone()).await;
    (resources, mailer)
}

/// Insert a bare player row with [`PASSWORD`] as its password.
pub async fn create_player(db: &DatabaseConnection, username: &str, email: &str) -> player::Model {
    player::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD).expect("hash")),
        created_at: Set(player_auth::clock::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert player")
}
