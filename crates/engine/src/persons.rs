//! The module contains the `Person` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Display name of the user's own shadow person record.
pub const SELF_PERSON_NAME: &str = "You";

/// A bill participant.
///
/// Either a third party the user splits bills with, or the user's own shadow
/// record (`is_user = true`, name "You"). There is exactly one shadow record
/// per user; `Engine::ensure_self_person` upserts it. Identity is immutable
/// once a split or debt references it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_user: bool,
}

impl Person {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            email: None,
            phone: None,
            is_user: false,
        }
    }

    /// The user's own shadow record.
    pub fn new_self(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: SELF_PERSON_NAME.to_string(),
            email: None,
            phone: None,
            is_user: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_user: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    ExpenseSplits,
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Person> for ActiveModel {
    fn from(value: &Person) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            email: ActiveValue::Set(value.email.clone()),
            phone: ActiveValue::Set(value.phone.clone()),
            is_user: ActiveValue::Set(value.is_user),
        }
    }
}

impl TryFrom<Model> for Person {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("person not exists".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            is_user: model.is_user,
        })
    }
}
