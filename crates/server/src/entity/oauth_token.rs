//! OAuth access token entity (password grant only, no refresh tokens).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub access_token: String,
    pub token_type: String,
    pub client_id: String,
    /// Identity bound at issuance (the player id).
    #[sea_orm(indexed)]
    pub user_id: String,
    pub scope: String,
    pub issued_at: OffsetDateTime,
    /// Lifetime in seconds, counted from `issued_at`.
    pub access_expires_in: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn expires_at(&self) -> OffsetDateTime {
        self.issued_at + time::Duration::seconds(self.access_expires_in)
    }

    /// A token is usable from issuance until (exclusive) its expiry instant.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.issued_at <= now && now < self.expires_at()
    }

    pub fn scopes_list(&self) -> Vec<String> {
        self.scope.split_whitespace().map(String::from).collect()
    }
}
