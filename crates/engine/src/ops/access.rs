use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_memberships, groups, users};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn is_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        Ok(
            group_memberships::Entity::find_by_id((group_id, user_id.to_string()))
                .one(db)
                .await?
                .is_some(),
        )
    }

    /// Loads the group if `user_id` belongs to it.
    ///
    /// Missing groups and groups the user is not part of look the same, so
    /// callers cannot discover group ids.
    pub(super) async fn require_group_member_tx(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let not_found = || EngineError::KeyNotFound("group not exists".to_string());
        let group = groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        if !self.is_group_member(db, group_id, user_id).await? {
            return Err(not_found());
        }
        Ok(group)
    }

    /// Fails with `KeyNotFound` unless `user_id` is a member of the group.
    pub async fn require_group_member(&self, group_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await
                .map(|_| ())
        })
    }

    /// Checks that every listed user belongs to the group.
    pub(super) async fn require_all_members(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_ids: impl IntoIterator<Item = &str>,
    ) -> ResultEngine<()> {
        for user_id in user_ids {
            if !self.is_group_member(db, group_id, user_id).await? {
                return Err(EngineError::KeyNotFound(format!(
                    "{user_id} is not a member of the group"
                )));
            }
        }
        Ok(())
    }
}
