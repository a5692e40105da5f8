//! HTTP surface of the service.
//!
//! - `accounts` - Registration (`/auth/create`)
//! - `password_reset` - Reset links (`/reset-password/*`)
//! - `settings` - Email, motto and password changes (`/settings`)
//! - `sso` - Game client handoff tokens (`/sso-token`)
//! - `health` - `/healthz` and `/ping`
//! - `auth` - Bearer token extractor
//! - `openapi` - OpenAPI/Utoipa configuration
//!
//! The token endpoints live in [`crate::oauth2`].

pub mod accounts;
pub mod auth;
pub mod health;
pub mod openapi;
pub mod password_reset;
pub mod settings;
pub mod sso;

use crate::{AppResources, oauth2};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Body of successful responses that carry no data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub response_text: String,
}

impl MessageResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            response_text: text.into(),
        }
    }
}

/// Assemble every route plus the docs, with resources and middleware attached.
pub fn build_router(app_resources: AppResources) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(oauth2::router())
        .merge(accounts::router())
        .merge(password_reset::router())
        .merge(settings::router())
        .merge(sso::router())
        .routes(routes!(health::health))
        .routes(routes!(health::ping))
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server on the configured listen address.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let addr = app_resources.config.listen_addr.clone();
    let router = build_router(app_resources);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
