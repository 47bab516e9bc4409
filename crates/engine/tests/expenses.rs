use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreateExpenseCmd, DebtParty, Engine, EngineError, MoneyCents, SplitType, UpdateExpenseCmd,
};
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
    goal_id: Uuid,
    self_id: Uuid,
    p1: Uuid,
    p2: Uuid,
}

/// Account opens at ₹500.00; goal starts empty with a 0 income rate.
async fn fixture() -> Fixture {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "HDFC", MoneyCents::new(50_000))
        .await
        .unwrap();
    let goal_id = engine.new_goal("alice", "Trip", 0).await.unwrap();
    let self_id = engine.ensure_self_person("alice").await.unwrap().id;
    let p1 = engine
        .new_person("alice", "Bob", None, None)
        .await
        .unwrap();
    let p2 = engine
        .new_person("alice", "Carol", None, None)
        .await
        .unwrap();
    Fixture {
        engine,
        account_id,
        goal_id,
        self_id,
        p1,
        p2,
    }
}

fn cmd(f: &Fixture, name: &str, total_bill: i64, split_type: SplitType) -> CreateExpenseCmd {
    CreateExpenseCmd::new(
        "alice",
        name,
        MoneyCents::new(total_bill),
        split_type,
        Utc::now(),
        f.account_id,
        f.goal_id,
    )
    .category_id("cat-food")
    .type_id("type-regular")
}

#[tokio::test]
async fn percentage_split_user_overpays_one_debt() {
    // bill 100.00, P1 takes 40%, user pays everything.
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 10_000, SplitType::Percentage)
                .split(f.p1, 4000)
                .paid_by(f.self_id, MoneyCents::new(10_000)),
        )
        .await
        .unwrap();

    assert_eq!(detail.expense.total_amount.cents(), 6000);
    assert_eq!(detail.expense.user_paid.cents(), 10_000);
    assert_eq!(detail.splits.len(), 2);

    assert_eq!(detail.debts.len(), 1);
    let debt = &detail.debts[0];
    assert_eq!(debt.payer, DebtParty::Person { person_id: f.p1 });
    assert_eq!(
        debt.payee,
        DebtParty::User {
            user_id: "alice".to_string()
        }
    );
    assert_eq!(debt.original_amount.cents(), 4000);

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 40_000);
    assert_eq!(goal.balance.cents(), 6000);
}

#[tokio::test]
async fn empty_splits_absorb_whole_bill_into_user_share() {
    // bill 50.00, no splits, user pays: no debts, full share to the user.
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Groceries", 5000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(5000)),
        )
        .await
        .unwrap();

    assert!(detail.debts.is_empty());
    assert_eq!(detail.expense.total_amount.cents(), 5000);
    let user_split = detail
        .splits
        .iter()
        .find(|s| s.person_id == f.self_id)
        .unwrap();
    assert_eq!(user_split.share_amount.cents(), 5000);

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 45_000);
    assert_eq!(goal.balance.cents(), 5000);
}

#[tokio::test]
async fn single_payer_covers_two_underpayers() {
    // bill 90.00: P1 and P2 owe 30 each, user owes the 30 remainder; P1
    // fronts the whole bill, so P2 and the user each owe P1 30.
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Road trip fuel", 9000, SplitType::Amount)
                .split(f.p1, 3000)
                .split(f.p2, 3000)
                .paid_by(f.p1, MoneyCents::new(9000)),
        )
        .await
        .unwrap();

    assert_eq!(detail.expense.total_amount.cents(), 3000);
    assert_eq!(detail.expense.user_paid.cents(), 0);

    assert_eq!(detail.debts.len(), 2);
    for debt in &detail.debts {
        assert_eq!(debt.payee, DebtParty::Person { person_id: f.p1 });
        assert_eq!(debt.original_amount.cents(), 3000);
    }
    assert!(detail.debts.iter().any(|d| d.payer
        == DebtParty::User {
            user_id: "alice".to_string()
        }));
    assert!(
        detail
            .debts
            .iter()
            .any(|d| d.payer == DebtParty::Person { person_id: f.p2 })
    );

    // User paid nothing, so the account is untouched; the goal gets the
    // user's share.
    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 50_000);
    assert_eq!(goal.balance.cents(), 3000);
}

#[tokio::test]
async fn delete_restores_account_and_goal_balances() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 10_000, SplitType::Percentage)
                .split(f.p1, 4000)
                .paid_by(f.self_id, MoneyCents::new(10_000)),
        )
        .await
        .unwrap();

    f.engine
        .delete_expense(detail.expense.id, "alice")
        .await
        .unwrap();

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 50_000);
    assert_eq!(goal.balance.cents(), 0);

    let err = f
        .engine
        .expense(detail.expense.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_replaces_splits_debts_and_balances() {
    // Start as the percentage scenario, rewrite into the P1-fronts-it
    // scenario: final state must match a fresh create of the new payload.
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 10_000, SplitType::Percentage)
                .split(f.p1, 4000)
                .paid_by(f.self_id, MoneyCents::new(10_000)),
        )
        .await
        .unwrap();

    let updated = f
        .engine
        .update_expense(UpdateExpenseCmd::new(
            detail.expense.id,
            cmd(&f, "Road trip fuel", 9000, SplitType::Amount)
                .split(f.p1, 3000)
                .split(f.p2, 3000)
                .paid_by(f.p1, MoneyCents::new(9000)),
        ))
        .await
        .unwrap();

    assert_eq!(updated.expense.id, detail.expense.id);
    assert_eq!(updated.expense.total_amount.cents(), 3000);
    assert_eq!(updated.expense.user_paid.cents(), 0);
    assert_eq!(updated.debts.len(), 2);

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 50_000);
    assert_eq!(goal.balance.cents(), 3000);

    // The old splits and debts are gone, not merely superseded.
    let reread = f.engine.expense(detail.expense.id, "alice").await.unwrap();
    assert_eq!(reread.splits.len(), 3);
    assert_eq!(reread.debts.len(), 2);
    assert_eq!(reread.allocation.amount.cents(), 3000);
}

#[tokio::test]
async fn update_moves_expense_between_accounts_and_goals() {
    // Moving the expense must restore the old account/goal pair in full and
    // apply the debit/credit to the new pair.
    let f = fixture().await;
    let other_account = f
        .engine
        .new_account("alice", "ICICI", MoneyCents::new(10_000))
        .await
        .unwrap();
    let other_goal = f.engine.new_goal("alice", "House", 0).await.unwrap();

    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 3000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(3000)),
        )
        .await
        .unwrap();

    let mut moved = cmd(&f, "Dinner", 3000, SplitType::Amount)
        .paid_by(f.self_id, MoneyCents::new(3000));
    moved.account_id = other_account;
    moved.goal_id = other_goal;
    f.engine
        .update_expense(UpdateExpenseCmd::new(detail.expense.id, moved))
        .await
        .unwrap();

    let old_account = f.engine.account(f.account_id, "alice").await.unwrap();
    let old_goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(old_account.balance.cents(), 50_000);
    assert_eq!(old_goal.balance.cents(), 0);

    let new_account = f.engine.account(other_account, "alice").await.unwrap();
    let new_goal = f.engine.goal(other_goal, "alice").await.unwrap();
    assert_eq!(new_account.balance.cents(), 7000);
    assert_eq!(new_goal.balance.cents(), 3000);

    let reread = f.engine.expense(detail.expense.id, "alice").await.unwrap();
    assert_eq!(reread.expense.account_id, other_account);
    assert_eq!(reread.allocation.goal_id, other_goal);
}

#[tokio::test]
async fn create_rejects_insufficient_funds() {
    let f = fixture().await;
    // user pays 600.00 out of a 500.00 account
    let err = f
        .engine
        .create_expense(
            cmd(&f, "Laptop", 60_000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(60_000)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // Nothing was persisted.
    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 50_000);
    assert_eq!(goal.balance.cents(), 0);
    let (expenses, _) = f.engine.list_expenses("alice", 10, None).await.unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn failed_update_rolls_back_entirely() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 10_000, SplitType::Percentage)
                .split(f.p1, 4000)
                .paid_by(f.self_id, MoneyCents::new(10_000)),
        )
        .await
        .unwrap();

    // Post-reversal balance is 500.00; paying 600.00 must fail and leave the
    // original expense and balances untouched.
    let err = f
        .engine
        .update_expense(UpdateExpenseCmd::new(
            detail.expense.id,
            cmd(&f, "Laptop", 60_000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(60_000)),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let account = f.engine.account(f.account_id, "alice").await.unwrap();
    let goal = f.engine.goal(f.goal_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 40_000);
    assert_eq!(goal.balance.cents(), 6000);

    let reread = f.engine.expense(detail.expense.id, "alice").await.unwrap();
    assert_eq!(reread.expense.name, "Dinner");
    assert_eq!(reread.expense.user_paid.cents(), 10_000);
}

#[tokio::test]
async fn same_account_update_sees_post_reversal_balance() {
    // The account holds exactly the bill; an update of the same size can only
    // succeed if the reversal and re-apply collapse into one balance write.
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Wallet", MoneyCents::new(10_000))
        .await
        .unwrap();
    let goal_id = engine.new_goal("alice", "Trip", 0).await.unwrap();
    let self_id = engine.ensure_self_person("alice").await.unwrap().id;

    let base = CreateExpenseCmd::new(
        "alice",
        "Rent share",
        MoneyCents::new(10_000),
        SplitType::Amount,
        Utc::now(),
        account_id,
        goal_id,
    )
    .paid_by(self_id, MoneyCents::new(10_000));

    let detail = engine.create_expense(base.clone()).await.unwrap();
    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 0);

    engine
        .update_expense(UpdateExpenseCmd::new(detail.expense.id, base))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance.cents(), 0);
}

#[tokio::test]
async fn splits_past_the_bill_are_rejected() {
    let f = fixture().await;
    let err = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 1000, SplitType::Amount)
                .split(f.p1, 1500)
                .paid_by(f.self_id, MoneyCents::new(1000)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SplitExceedsTotal(_)));
}

#[tokio::test]
async fn payments_must_cover_the_bill() {
    let f = fixture().await;
    let err = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 10_000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(9000)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PaidSumMismatch(_)));
}

#[tokio::test]
async fn empty_payer_list_is_rejected() {
    let f = fixture().await;
    let err = f
        .engine
        .create_expense(cmd(&f, "Dinner", 10_000, SplitType::Amount))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn expenses_are_scoped_to_their_owner() {
    let f = fixture().await;
    let detail = f
        .engine
        .create_expense(
            cmd(&f, "Dinner", 5000, SplitType::Amount)
                .paid_by(f.self_id, MoneyCents::new(5000)),
        )
        .await
        .unwrap();

    let err = f
        .engine
        .expense(detail.expense.id, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let f = fixture().await;
    let now = Utc::now();
    for (i, name) in ["oldest", "middle", "newest"].iter().enumerate() {
        let mut create = cmd(&f, name, 1000, SplitType::Amount)
            .paid_by(f.self_id, MoneyCents::new(1000));
        create.date = now - Duration::days(2 - i as i64);
        f.engine.create_expense(create).await.unwrap();
    }

    let (page, cursor) = f.engine.list_expenses("alice", 2, None).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "newest");
    assert_eq!(page[1].name, "middle");
    let cursor = cursor.unwrap();

    let (rest, next) = f
        .engine
        .list_expenses("alice", 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "oldest");
    assert!(next.is_none());

    let err = f
        .engine
        .list_expenses("alice", 2, Some("not-a-cursor"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCursor(_)));
}
