pub use sea_orm_migration::prelude::*;

mod m20260810_000001_users;
mod m20260810_000002_accounts;
mod m20260810_000003_goals;
mod m20260810_000004_persons;
mod m20260812_000001_expenses;
mod m20260812_000002_incomes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_users::Migration),
            Box::new(m20260810_000002_accounts::Migration),
            Box::new(m20260810_000003_goals::Migration),
            Box::new(m20260810_000004_persons::Migration),
            Box::new(m20260812_000001_expenses::Migration),
            Box::new(m20260812_000002_incomes::Migration),
        ]
    }
}
