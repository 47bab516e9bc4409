use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{BasisPoints, Goal, MoneyCents, ResultEngine, goals};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new savings goal.
    ///
    /// `allocation_rate_bp` is the fraction of every income routed to this
    /// goal, in basis points (0..=10_000).
    pub async fn new_goal(
        &self,
        user_id: &str,
        name: &str,
        allocation_rate_bp: BasisPoints,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "goal")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let goal = Goal::new(user_id.to_string(), name, allocation_rate_bp)?;
            let goal_id = goal.id;
            goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok(goal_id)
        })
    }

    /// Return a goal snapshot from DB.
    pub async fn goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, goal_id, user_id).await?;
            Goal::try_from(model)
        })
    }

    /// List the user's goals, ordered by name.
    pub async fn list_goals(&self, user_id: &str) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let models = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(goals::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Goal::try_from).collect()
        })
    }

    /// Change a goal's income allocation rate.
    ///
    /// Only affects future incomes; existing allocations are never retrofitted.
    pub async fn set_allocation_rate(
        &self,
        goal_id: Uuid,
        user_id: &str,
        allocation_rate_bp: BasisPoints,
    ) -> ResultEngine<()> {
        crate::goals::validate_allocation_rate(allocation_rate_bp)?;
        with_tx!(self, |db_tx| {
            self.require_goal_owned(&db_tx, goal_id, user_id).await?;
            let active = goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                allocation_rate_bp: ActiveValue::Set(allocation_rate_bp),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Set or clear a goal's savings target.
    ///
    /// Targets are informational; nothing in the allocation paths reads them.
    pub async fn set_goal_target(
        &self,
        goal_id: Uuid,
        user_id: &str,
        target_amount: Option<MoneyCents>,
        target_date: Option<DateTime<Utc>>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_goal_owned(&db_tx, goal_id, user_id).await?;
            let active = goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                target_amount: ActiveValue::Set(target_amount.map(MoneyCents::cents)),
                target_date: ActiveValue::Set(target_date),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
