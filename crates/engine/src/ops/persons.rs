use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Person, ResultEngine, persons};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Find-or-create the user's own shadow participant record.
    ///
    /// Idempotent: at most one `is_user = true` row exists per user, and it
    /// is created inside the same transaction that first needs it, so there
    /// is no window where two ids could be handed out.
    pub async fn ensure_self_person(&self, user_id: &str) -> ResultEngine<Person> {
        with_tx!(self, |db_tx| self.self_person(&db_tx, user_id).await)
    }

    pub(super) async fn self_person(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Person> {
        let existing = persons::Entity::find()
            .filter(persons::Column::UserId.eq(user_id.to_string()))
            .filter(persons::Column::IsUser.eq(true))
            .one(db)
            .await?;
        if let Some(model) = existing {
            return Person::try_from(model);
        }

        let person = Person::new_self(user_id.to_string());
        persons::ActiveModel::from(&person).insert(db).await?;
        Ok(person)
    }

    /// Add a third-party bill participant.
    pub async fn new_person(
        &self,
        user_id: &str,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "person")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut person = Person::new(user_id.to_string(), name);
            person.email = normalize_optional_text(email);
            person.phone = normalize_optional_text(phone);
            let person_id = person.id;
            persons::ActiveModel::from(&person).insert(&db_tx).await?;
            Ok(person_id)
        })
    }

    /// Return a person snapshot from DB.
    pub async fn person(&self, person_id: Uuid, user_id: &str) -> ResultEngine<Person> {
        with_tx!(self, |db_tx| {
            let model = self.require_person_owned(&db_tx, person_id, user_id).await?;
            Person::try_from(model)
        })
    }

    /// List the user's participants, the shadow record first.
    pub async fn list_persons(&self, user_id: &str) -> ResultEngine<Vec<Person>> {
        with_tx!(self, |db_tx| {
            let models = persons::Entity::find()
                .filter(persons::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(persons::Column::IsUser)
                .order_by_asc(persons::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Person::try_from).collect()
        })
    }
}
