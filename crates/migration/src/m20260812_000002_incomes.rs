use sea_orm_migration::prelude::*;

use super::m20260810_000001_users::Users;
use super::m20260810_000002_accounts::Accounts;
use super::m20260810_000003_goals::Goals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incomes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incomes::UserId).string().not_null())
                    .col(ColumnDef::new(Incomes::Name).string().not_null())
                    .col(ColumnDef::new(Incomes::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Incomes::SourceId).string().not_null())
                    .col(ColumnDef::new(Incomes::Date).timestamp().not_null())
                    .col(ColumnDef::new(Incomes::Notes).string())
                    .col(ColumnDef::new(Incomes::DestAccountId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-user_id")
                            .from(Incomes::Table, Incomes::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-dest_account_id")
                            .from(Incomes::Table, Incomes::DestAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-user_id-date")
                    .table(Incomes::Table)
                    .col(Incomes::UserId)
                    .col(Incomes::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IncomeAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncomeAllocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IncomeAllocations::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeAllocations::IncomeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeAllocations::GoalId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeAllocations::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeAllocations::AllocatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_allocations-income_id")
                            .from(IncomeAllocations::Table, IncomeAllocations::IncomeId)
                            .to(Incomes::Table, Incomes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_allocations-goal_id")
                            .from(IncomeAllocations::Table, IncomeAllocations::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-income_allocations-income_id")
                    .table(IncomeAllocations::Table)
                    .col(IncomeAllocations::IncomeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IncomeAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    UserId,
    Name,
    Amount,
    SourceId,
    Date,
    Notes,
    DestAccountId,
}

#[derive(Iden)]
enum IncomeAllocations {
    Table,
    Id,
    UserId,
    IncomeId,
    GoalId,
    Amount,
    AllocatedAt,
}
