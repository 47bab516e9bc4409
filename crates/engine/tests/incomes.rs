use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CreateIncomeCmd, Engine, EngineError, MoneyCents, UpdateIncomeCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

struct Fixture {
    engine: Engine,
    account_id: Uuid,
    /// 30% allocation rate.
    g1: Uuid,
    /// 10% allocation rate.
    g2: Uuid,
}

async fn fixture() -> Fixture {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "HDFC", MoneyCents::new(10_000))
        .await
        .unwrap();
    let g1 = engine.new_goal("alice", "Emergency", 3000).await.unwrap();
    let g2 = engine.new_goal("alice", "Vacation", 1000).await.unwrap();
    Fixture {
        engine,
        account_id,
        g1,
        g2,
    }
}

fn cmd(f: &Fixture, name: &str, amount: i64) -> CreateIncomeCmd {
    CreateIncomeCmd::new(
        "alice",
        name,
        MoneyCents::new(amount),
        "src-salary",
        Utc::now(),
        f.account_id,
    )
}

#[tokio::test]
async fn create_credits_account_and_floors_goal_allocations() {
    // ₹10.05 at 30% and 10%: 301.5 floors to 301, 100.5 floors to 100.
    let f = fixture().await;
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 1005).allocate_to(f.g1).allocate_to(f.g2))
        .await
        .unwrap();

    assert_eq!(detail.allocations.len(), 2);
    let to_g1 = detail
        .allocations
        .iter()
        .find(|a| a.goal_id == f.g1)
        .unwrap();
    let to_g2 = detail
        .allocations
        .iter()
        .find(|a| a.goal_id == f.g2)
        .unwrap();
    assert_eq!(to_g1.amount.cents(), 301);
    assert_eq!(to_g2.amount.cents(), 100);

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 11_005);
    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    let g2 = f.engine.goal(f.g2, "alice").await.unwrap();
    assert_eq!(g1.balance.cents(), 301);
    assert_eq!(g2.balance.cents(), 100);
}

#[tokio::test]
async fn create_validates_amount_and_allocations() {
    let f = fixture().await;

    let err = f
        .engine
        .create_income(cmd(&f, "Salary", 0).allocate_to(f.g1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = f
        .engine
        .create_income(cmd(&f, "Salary", 1000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn zero_rate_goal_receives_no_allocation() {
    let f = fixture().await;
    let parked = f.engine.new_goal("alice", "Parked", 0).await.unwrap();

    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 10_000).allocate_to(parked).allocate_to(f.g1))
        .await
        .unwrap();

    assert_eq!(detail.allocations.len(), 1);
    assert_eq!(detail.allocations[0].goal_id, f.g1);
    let parked = f.engine.goal(parked, "alice").await.unwrap();
    assert_eq!(parked.balance.cents(), 0);
}

#[tokio::test]
async fn update_reallocates_against_all_current_goals() {
    // Created against g1 only; after a goal is added, the update must fund
    // every owned goal with a positive rate, g2 included.
    let f = fixture().await;
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 10_000).allocate_to(f.g1))
        .await
        .unwrap();
    let g3 = f.engine.new_goal("alice", "House", 2000).await.unwrap();

    let updated = f
        .engine
        .update_income(UpdateIncomeCmd::new(
            detail.income.id,
            "alice",
            "Salary",
            MoneyCents::new(10_000),
            "src-salary",
            f.account_id,
        ))
        .await
        .unwrap();

    let funded: Vec<Uuid> = updated.allocations.iter().map(|a| a.goal_id).collect();
    assert!(funded.contains(&f.g1));
    assert!(funded.contains(&f.g2));
    assert!(funded.contains(&g3));

    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    let g2 = f.engine.goal(f.g2, "alice").await.unwrap();
    let g3 = f.engine.goal(g3, "alice").await.unwrap();
    assert_eq!(g1.balance.cents(), 3000);
    assert_eq!(g2.balance.cents(), 1000);
    assert_eq!(g3.balance.cents(), 2000);

    // Account saw +10_000 on create and a zero delta on update.
    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 20_000);
}

#[tokio::test]
async fn update_applies_amount_delta_to_same_account() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 1000).allocate_to(f.g1))
        .await
        .unwrap();

    f.engine
        .update_income(UpdateIncomeCmd::new(
            detail.income.id,
            "alice",
            "Salary",
            MoneyCents::new(2000),
            "src-salary",
            f.account_id,
        ))
        .await
        .unwrap();

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 12_000);
    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    assert_eq!(g1.balance.cents(), 600);
}

#[tokio::test]
async fn update_moves_amount_between_accounts() {
    let f = fixture().await;
    let other = f
        .engine
        .new_account("alice", "Savings", MoneyCents::new(0))
        .await
        .unwrap();
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 5000).allocate_to(f.g1))
        .await
        .unwrap();

    f.engine
        .update_income(UpdateIncomeCmd::new(
            detail.income.id,
            "alice",
            "Salary",
            MoneyCents::new(5000),
            "src-salary",
            other,
        ))
        .await
        .unwrap();

    let old_account = f.engine.account(f.account_id, "alice").await.unwrap();
    let new_account = f.engine.account(other, "alice").await.unwrap();
    assert_eq!(old_account.balance.cents(), 10_000);
    assert_eq!(new_account.balance.cents(), 5000);
}

#[tokio::test]
async fn update_keeps_date_and_notes_when_not_given() {
    let f = fixture().await;
    let date = Utc::now() - Duration::days(7);
    let mut create = cmd(&f, "Salary", 1000).allocate_to(f.g1).notes("july pay");
    create.date = date;
    let detail = f.engine.create_income(create).await.unwrap();

    let updated = f
        .engine
        .update_income(UpdateIncomeCmd::new(
            detail.income.id,
            "alice",
            "Salary (fixed)",
            MoneyCents::new(1200),
            "src-salary",
            f.account_id,
        ))
        .await
        .unwrap();

    assert_eq!(updated.income.date, date);
    assert_eq!(updated.income.notes.as_deref(), Some("july pay"));
}

#[tokio::test]
async fn goal_target_can_be_set_and_cleared() {
    let f = fixture().await;
    let target_date = Utc::now() + Duration::days(90);

    f.engine
        .set_goal_target(
            f.g1,
            "alice",
            Some(MoneyCents::new(100_000)),
            Some(target_date),
        )
        .await
        .unwrap();
    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    assert_eq!(g1.target_amount, Some(MoneyCents::new(100_000)));
    assert_eq!(g1.target_date, Some(target_date));

    f.engine
        .set_goal_target(f.g1, "alice", None, None)
        .await
        .unwrap();
    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    assert_eq!(g1.target_amount, None);
    assert_eq!(g1.target_date, None);

    let err = f
        .engine
        .set_goal_target(f.g1, "mallory", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_restores_account_and_goal_balances() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 10_000).allocate_to(f.g1).allocate_to(f.g2))
        .await
        .unwrap();

    f.engine
        .delete_income(detail.income.id, "alice")
        .await
        .unwrap();

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 10_000);
    let g1 = f.engine.goal(f.g1, "alice").await.unwrap();
    let g2 = f.engine.goal(f.g2, "alice").await.unwrap();
    assert_eq!(g1.balance.cents(), 0);
    assert_eq!(g2.balance.cents(), 0);

    let err = f
        .engine
        .income(detail.income.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_returns_newest_first_with_allocations() {
    let f = fixture().await;
    let now = Utc::now();
    for (i, name) in ["old pay", "new pay"].iter().enumerate() {
        let mut create = cmd(&f, name, 1000).allocate_to(f.g1);
        create.date = now - Duration::days(1 - i as i64);
        f.engine.create_income(create).await.unwrap();
    }

    let incomes = f.engine.list_incomes("alice").await.unwrap();
    assert_eq!(incomes.len(), 2);
    assert_eq!(incomes[0].income.name, "new pay");
    assert_eq!(incomes[1].income.name, "old pay");
    assert!(incomes.iter().all(|d| !d.allocations.is_empty()));
}

#[tokio::test]
async fn incomes_are_scoped_to_their_owner() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_income(cmd(&f, "Salary", 1000).allocate_to(f.g1))
        .await
        .unwrap();

    let err = f
        .engine
        .income(detail.income.id, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
