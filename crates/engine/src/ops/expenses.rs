use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, NewExpense, ResultEngine, SplitRow,
    expenses::{self, ExpenseHeader},
    splits,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Records a shared expense with its payer and debtor rows.
    ///
    /// Every participant must be a member of the group. Amounts are validated
    /// by [`NewExpense`]; incomplete expenses skip the total checks.
    pub async fn create_expense(
        &self,
        group_id: Uuid,
        expense: NewExpense,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let title = normalize_required_name(&expense.title, "expense")?;
        expense.validate()?;

        let expense_id = Uuid::new_v4();
        let rows = expense.split_rows(expense_id);
        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await?;
            self.require_all_members(&db_tx, group_id, rows.iter().map(split_user_id))
                .await?;

            expenses::ActiveModel::try_from(ExpenseHeader {
                id: expense_id,
                group_id,
                title: &title,
                total: expense.total,
                incomplete: expense.incomplete,
                is_settlement: false,
                created_by: user_id,
            })?
            .insert(&db_tx)
            .await?;
            for row in &rows {
                splits::ActiveModel::try_from(row)?.insert(&db_tx).await?;
            }

            tracing::debug!(%group_id, %expense_id, rows = rows.len(), "created expense");
            Ok(expense_id)
        })
    }

    /// Lists the expenses of a group (members only), oldest first, including
    /// recorded settlements.
    pub async fn list_expenses(&self, group_id: Uuid, user_id: &str) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await?;

            let models = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id))
                .order_by_asc(expenses::Column::CreatedAt)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;
            let mut rows_by_expense: HashMap<Uuid, Vec<SplitRow>> = HashMap::new();
            for row in self.split_rows_tx(&db_tx, group_id).await? {
                rows_by_expense.entry(row.expense_id).or_default().push(row);
            }

            Ok(models
                .into_iter()
                .map(|model| {
                    let rows = rows_by_expense.remove(&model.id).unwrap_or_default();
                    Expense::from_model(model, rows)
                })
                .collect())
        })
    }
}

// A fn item (unlike a closure) is higher-ranked over the borrow lifetime, which
// keeps the `create_expense` future provably `Send` for axum handlers.
fn split_user_id(row: &SplitRow) -> &str {
    row.user_id.as_str()
}
