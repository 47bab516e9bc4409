use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Account, Currency, MoneyCents, ResultEngine, accounts};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new spending account with an opening balance.
    pub async fn new_account(
        &self,
        user_id: &str,
        name: &str,
        opening_balance: MoneyCents,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let account = Account::new(
                user_id.to_string(),
                name,
                opening_balance,
                Currency::default(),
            );
            let account_id = account.id;
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account_id)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            Account::try_from(model)
        })
    }

    /// List the user's accounts, ordered by name.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }
}
