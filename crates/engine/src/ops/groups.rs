use chrono::Utc;
use sea_orm::{ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Group, ResultEngine, group_memberships, groups};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates a group; the creator becomes its first member.
    pub async fn create_group(&self, name: &str, user_id: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "group")?;
        let group_id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            groups::ActiveModel {
                id: ActiveValue::Set(group_id),
                name: ActiveValue::Set(name.clone()),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            group_memberships::ActiveModel {
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(%group_id, owner = user_id, "created group");
            Ok(group_id)
        })
    }

    /// Adds a user to a group. Any member can invite; re-adding is a no-op.
    pub async fn add_group_member(
        &self,
        group_id: Uuid,
        member_username: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await?;
            self.require_user_exists(&db_tx, member_username).await?;

            if !self
                .is_group_member(&db_tx, group_id, member_username)
                .await?
            {
                group_memberships::ActiveModel {
                    group_id: ActiveValue::Set(group_id),
                    user_id: ActiveValue::Set(member_username.to_string()),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    /// Lists the usernames of a group's members (members only).
    pub async fn list_group_members(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<String>> {
        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await?;
            let rows = group_memberships::Entity::find()
                .filter(group_memberships::Column::GroupId.eq(group_id))
                .order_by_asc(group_memberships::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(|m| m.user_id).collect())
        })
    }

    /// Lists the groups a user belongs to, oldest first.
    pub async fn list_groups(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let rows = groups::Entity::find()
                .join(JoinType::InnerJoin, groups::Relation::Memberships.def())
                .filter(group_memberships::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(groups::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Group::from).collect())
        })
    }
}
