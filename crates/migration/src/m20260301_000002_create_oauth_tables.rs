//! OAuth clients and the access tokens issued under them.
//!
//! Clients are inserted by operators; the service refuses to start without one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OAuthClient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OAuthClient::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OAuthClient::Secret).string().not_null())
                    .col(ColumnDef::new(OAuthClient::Domain).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OAuthToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OAuthToken::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OAuthToken::AccessToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OAuthToken::TokenType)
                            .string()
                            .not_null()
                            .default("Bearer"),
                    )
                    .col(ColumnDef::new(OAuthToken::ClientId).string().not_null())
                    .col(ColumnDef::new(OAuthToken::UserId).string().not_null())
                    .col(ColumnDef::new(OAuthToken::Scope).text().not_null())
                    .col(
                        ColumnDef::new(OAuthToken::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthToken::AccessExpiresIn)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_oauth_token_user_id")
                    .table(OAuthToken::Table)
                    .col(OAuthToken::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_oauth_token_user_id")
                    .table(OAuthToken::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(OAuthToken::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OAuthClient::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OAuthClient {
    #[iden = "oauth_client"]
    Table,
    Id,
    Secret,
    Domain,
}

#[derive(Iden)]
enum OAuthToken {
    #[iden = "oauth_token"]
    Table,
    Id,
    AccessToken,
    TokenType,
    ClientId,
    UserId,
    Scope,
    IssuedAt,
    AccessExpiresIn,
}
