use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_player_tables::Player;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerSsoToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerSsoToken::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerSsoToken::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerSsoToken::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerSsoToken::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerSsoToken::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_sso_token_player")
                            .from(PlayerSsoToken::Table, PlayerSsoToken::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerPasswordResetLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerPasswordResetLink::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_password_reset_link_player")
                            .from(
                                PlayerPasswordResetLink::Table,
                                PlayerPasswordResetLink::PlayerId,
                            )
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Rate limiting looks links up per player
        manager
            .create_index(
                Index::create()
                    .name("idx_player_password_reset_link_player_id")
                    .table(PlayerPasswordResetLink::Table)
                    .col(PlayerPasswordResetLink::PlayerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_player_password_reset_link_player_id")
                    .table(PlayerPasswordResetLink::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerPasswordResetLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerSsoToken::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PlayerSsoToken {
    Table,
    Id,
    PlayerId,
    Token,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum PlayerPasswordResetLink {
    Table,
    Id,
    PlayerId,
    Token,
    CreatedAt,
    ExpiresAt,
    UsedAt,
}
