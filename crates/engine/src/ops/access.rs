//! Ownership-scoped row lookups.
//!
//! Every read goes through one of these helpers so a row owned by another
//! user is indistinguishable from an absent row (`KeyNotFound` either way).

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, expenses, goals, incomes, persons, users};

use super::Engine;

/// Generates a `require_*_owned` method for a user-scoped entity.
macro_rules! impl_require_owned {
    ($require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::UserId.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    /// Checks the user row exists before creating anything keyed on it.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .map(|_| ())
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    impl_require_owned!(require_account_owned, accounts, "account not exists");
    impl_require_owned!(require_goal_owned, goals, "goal not exists");
    impl_require_owned!(require_person_owned, persons, "person not exists");
    impl_require_owned!(require_expense_owned, expenses, "expense not exists");
    impl_require_owned!(require_income_owned, incomes, "income not exists");
}
