//! Password reset link entity and its lifecycle.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "player_password_reset_link")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub player_id: i64,
    #[sea_orm(unique)]
    pub token: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::PlayerId",
        to = "super::player::Column::Id"
    )]
    Player,
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle of a reset link. `Consumed` and `Expired` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Consumed,
    Expired,
}

impl Model {
    pub fn state_at(&self, now: OffsetDateTime) -> LinkState {
        if self.used_at.is_some() {
            LinkState::Consumed
        } else if now < self.expires_at {
            LinkState::Active
        } else {
            LinkState::Expired
        }
    }
}

/// Filter matching links that are active at `now`. Mirrors [`Model::state_at`] in SQL.
pub fn active_at(now: OffsetDateTime) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(Column::ExpiresAt.gt(now))
        .add(Column::UsedAt.is_null())
}
