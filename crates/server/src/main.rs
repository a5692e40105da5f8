use color_eyre::eyre::WrapErr;
use player_auth::AppResources;
use player_auth::api::start_webserver;
use player_auth::config::load_config;
use player_auth::mail;
use player_auth::oauth2::ClientRegistry;
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "player_auth=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    initialize_tracing();

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        tracing::warn!(error = %e, "Failed to read .env file");
    }

    let config = Arc::new(load_config().wrap_err("Failed to load configuration")?);

    CryptoProvider::install_default(crypto::ring::default_provider())
        .map_err(|_| color_eyre::eyre::eyre!("Failed to install crypto provider"))?;

    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .wrap_err("Failed to connect to database")?,
    );

    let clients = Arc::new(
        ClientRegistry::load(&db, config.auth.service_client_id.as_deref())
            .await
            .wrap_err("Failed to load oauth clients")?,
    );
    tracing::info!(clients = clients.len(), "Client registry loaded");

    let mailer = mail::from_config(&config).wrap_err("Failed to set up mailer")?;

    let resources = AppResources {
        db,
        mailer,
        config,
        clients,
    };

    start_webserver(resources).await
}
