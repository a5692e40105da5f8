//! Player account entity.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::player_data::Entity")]
    Data,
    #[sea_orm(has_one = "super::player_avatar::Entity")]
    Avatar,
    #[sea_orm(has_one = "super::player_website_data::Entity")]
    WebsiteData,
    #[sea_orm(has_many = "super::player_sso_token::Entity")]
    SsoTokens,
    #[sea_orm(has_many = "super::password_reset_link::Entity")]
    PasswordResetLinks,
}

impl Related<super::player_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Data.def()
    }
}

impl Related<super::player_avatar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Avatar.def()
    }
}

impl Related<super::player_website_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebsiteData.def()
    }
}

impl Related<super::player_sso_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SsoTokens.def()
    }
}

impl Related<super::password_reset_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
