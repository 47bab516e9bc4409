use sea_orm_migration::prelude::*;

use super::m20260810_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Persons::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Persons::UserId).string().not_null())
                    .col(ColumnDef::new(Persons::Name).string().not_null())
                    .col(ColumnDef::new(Persons::Email).string())
                    .col(ColumnDef::new(Persons::Phone).string())
                    .col(ColumnDef::new(Persons::IsUser).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-persons-user_id")
                            .from(Persons::Table, Persons::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-persons-user_id")
                    .table(Persons::Table)
                    .col(Persons::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Persons {
    Table,
    Id,
    UserId,
    Name,
    Email,
    Phone,
    IsUser,
}
