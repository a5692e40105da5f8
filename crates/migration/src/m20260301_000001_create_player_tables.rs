//! Player accounts and the default-data rows created with each of them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Player::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Player::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Player::Username)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Player::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Player::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Player::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerData::PlayerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PlayerData::HomeRoomId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerData::CreditBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerData::PixelBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerData::SeasonalBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerData::GotwPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlayerData::LastOnline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_data_player")
                            .from(PlayerData::Table, PlayerData::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerAvatarData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerAvatarData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerAvatarData::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerAvatarData::FigureCode)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PlayerAvatarData::Motto)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PlayerAvatarData::Gender)
                            .string_len(1)
                            .not_null()
                            .default("M"),
                    )
                    .col(
                        ColumnDef::new(PlayerAvatarData::ChatBubbleId)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_avatar_data_player")
                            .from(PlayerAvatarData::Table, PlayerAvatarData::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Settings tables only get their owning row here; the game server owns the rest.
        manager
            .create_table(
                Table::create()
                    .table(PlayerGameSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerGameSettings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerGameSettings::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_game_settings_player")
                            .from(PlayerGameSettings::Table, PlayerGameSettings::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerNavigatorSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerNavigatorSettings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerNavigatorSettings::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_navigator_settings_player")
                            .from(
                                PlayerNavigatorSettings::Table,
                                PlayerNavigatorSettings::PlayerId,
                            )
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerWebsiteData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerWebsiteData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerWebsiteData::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerWebsiteData::InitialIp)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerWebsiteData::LastIp)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerWebsiteData::LastLogin)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_website_data_player")
                            .from(PlayerWebsiteData::Table, PlayerWebsiteData::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The per-IP registration ceiling counts by this column
        manager
            .create_index(
                Index::create()
                    .name("idx_player_website_data_initial_ip")
                    .table(PlayerWebsiteData::Table)
                    .col(PlayerWebsiteData::InitialIp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_player_website_data_initial_ip")
                    .table(PlayerWebsiteData::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerWebsiteData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerNavigatorSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerGameSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerAvatarData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Player::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Player {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum PlayerData {
    Table,
    Id,
    PlayerId,
    HomeRoomId,
    CreditBalance,
    PixelBalance,
    SeasonalBalance,
    GotwPoints,
    LastOnline,
}

#[derive(Iden)]
enum PlayerAvatarData {
    Table,
    Id,
    PlayerId,
    FigureCode,
    Motto,
    Gender,
    ChatBubbleId,
}

#[derive(Iden)]
enum PlayerGameSettings {
    Table,
    Id,
    PlayerId,
}

#[derive(Iden)]
enum PlayerNavigatorSettings {
    Table,
    Id,
    PlayerId,
}

#[derive(Iden)]
enum PlayerWebsiteData {
    Table,
    Id,
    PlayerId,
    InitialIp,
    LastIp,
    LastLogin,
}
