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
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Goals::UserId).string().not_null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::Balance).big_integer().not_null())
                    .col(
                        ColumnDef::new(Goals::AllocationRateBp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Goals::TargetAmount).big_integer())
                    .col(ColumnDef::new(Goals::TargetDate).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-user_id")
                            .from(Goals::Table, Goals::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goals-user_id")
                    .table(Goals::Table)
                    .col(Goals::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Goals {
    Table,
    Id,
    UserId,
    Name,
    Balance,
    AllocationRateBp,
    TargetAmount,
    TargetDate,
}
