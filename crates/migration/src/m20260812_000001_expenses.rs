use sea_orm_migration::prelude::*;

use super::m20260810_000001_users::Users;
use super::m20260810_000002_accounts::Accounts;
use super::m20260810_000003_goals::Goals;
use super::m20260810_000004_persons::Persons;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::AccountId).string().not_null())
                    .col(ColumnDef::new(Expenses::GoalId).string().not_null())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::TotalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::UserPaid).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::SplitType).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::TypeId).string().not_null())
                    .col(ColumnDef::new(Expenses::Notes).string())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-account_id")
                            .from(Expenses::Table, Expenses::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-goal_id")
                            .from(Expenses::Table, Expenses::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseSplits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::ExpenseId).string().not_null())
                    .col(ColumnDef::new(ExpenseSplits::PersonId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseSplits::ShareAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplits::SharePercentBp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplits::ShareRatePpm)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplits::PaidAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::HasPaid).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-expense_id")
                            .from(ExpenseSplits::Table, ExpenseSplits::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-person_id")
                            .from(ExpenseSplits::Table, ExpenseSplits::PersonId)
                            .to(Persons::Table, Persons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_splits-expense_id")
                    .table(ExpenseSplits::Table)
                    .col(ExpenseSplits::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Debts::UserId).string().not_null())
                    .col(ColumnDef::new(Debts::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Debts::PayerKind).string().not_null())
                    .col(ColumnDef::new(Debts::PayerId).string().not_null())
                    .col(ColumnDef::new(Debts::PayeeKind).string().not_null())
                    .col(ColumnDef::new(Debts::PayeeId).string().not_null())
                    .col(
                        ColumnDef::new(Debts::OriginalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Debts::RemainingAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Debts::Currency).string().not_null())
                    .col(ColumnDef::new(Debts::Date).timestamp().not_null())
                    .col(ColumnDef::new(Debts::Status).string().not_null())
                    .col(ColumnDef::new(Debts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-expense_id")
                            .from(Debts::Table, Debts::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-expense_id")
                    .table(Debts::Table)
                    .col(Debts::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseAllocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::GoalId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::AllocatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_allocations-expense_id")
                            .from(ExpenseAllocations::Table, ExpenseAllocations::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_allocations-goal_id")
                            .from(ExpenseAllocations::Table, ExpenseAllocations::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_allocations-expense_id")
                    .table(ExpenseAllocations::Table)
                    .col(ExpenseAllocations::ExpenseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Expenses {
    Table,
    Id,
    UserId,
    AccountId,
    GoalId,
    Name,
    TotalAmount,
    UserPaid,
    SplitType,
    Date,
    CategoryId,
    TypeId,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseSplits {
    Table,
    Id,
    ExpenseId,
    PersonId,
    ShareAmount,
    SharePercentBp,
    ShareRatePpm,
    PaidAmount,
    HasPaid,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    UserId,
    ExpenseId,
    PayerKind,
    PayerId,
    PayeeKind,
    PayeeId,
    OriginalAmount,
    RemainingAmount,
    Currency,
    Date,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseAllocations {
    Table,
    Id,
    ExpenseId,
    GoalId,
    Amount,
    AllocatedAt,
}
