//! In-memory registry of OAuth clients.
//!
//! Loaded once at startup and read-only afterwards, so it is shared behind an
//! `Arc` without any locking.

use crate::entity::oauth_client;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("You must register at least one oauth client")]
    Empty,
    #[error("Configured service client {0} is not registered")]
    UnknownServiceClient(String),
    #[error("Failed to load oauth clients: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug)]
pub struct ClientRegistry {
    clients: HashMap<String, oauth_client::Model>,
    service_client_id: String,
}

impl ClientRegistry {
    /// Load every registered client from the database.
    pub async fn load(
        db: &DatabaseConnection,
        service_client_id: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let clients = oauth_client::Entity::find()
            .order_by_asc(oauth_client::Column::Id)
            .all(db)
            .await?;
        Self::from_clients(clients, service_client_id)
    }

    /// Build a registry from already loaded clients.
    ///
    /// Without an explicit service client the first client in the list is used.
    pub fn from_clients(
        clients: Vec<oauth_client::Model>,
        service_client_id: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let first = clients.first().ok_or(RegistryError::Empty)?.client_id();
        let service_client_id = service_client_id.map(str::to_string).unwrap_or(first);

        let clients: HashMap<String, oauth_client::Model> = clients
            .into_iter()
            .map(|client| {
                tracing::info!(
                    client_id = client.id,
                    domain = %client.domain,
                    "Registered oauth client"
                );
                (client.client_id(), client)
            })
            .collect();

        if !clients.contains_key(&service_client_id) {
            return Err(RegistryError::UnknownServiceClient(service_client_id));
        }

        Ok(Self {
            clients,
            service_client_id,
        })
    }

    pub fn resolve(&self, client_id: &str) -> Option<&oauth_client::Model> {
        self.clients.get(client_id)
    }

    /// Resolve a client and check its secret in constant time.
    pub fn authenticate(&self, client_id: &str, secret: &str) -> Option<&oauth_client::Model> {
        let client = self.resolve(client_id)?;
        bool::from(client.secret.as_bytes().ct_eq(secret.as_bytes())).then_some(client)
    }

    /// The client that tokens from `/auth/login` are issued under.
    pub fn service_client(&self) -> &oauth_client::Model {
        // Presence is checked in `from_clients` and the map never changes.
        &self.clients[&self.service_client_id]
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
