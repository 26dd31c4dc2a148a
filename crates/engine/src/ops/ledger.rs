use sea_orm::{
    DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, SettlementRecorder, SplitRecordSupplier, SplitRow,
    expenses::{self, ExpenseHeader},
    splits,
};

use super::{Engine, with_tx};

impl Engine {
    /// Every split row of the group's expenses, in a stable order.
    pub(super) async fn split_rows_tx(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<SplitRow>> {
        splits::Entity::find()
            .join(JoinType::InnerJoin, splits::Relation::Expenses.def())
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(splits::Column::ExpenseId)
            .order_by_asc(splits::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(SplitRow::try_from)
            .collect()
    }
}

impl SplitRecordSupplier for Engine {
    async fn fetch_split_rows(&self, group_id: Uuid) -> ResultEngine<Vec<SplitRow>> {
        // One transaction so the balances reflect a single point in time.
        with_tx!(self, |db_tx| self.split_rows_tx(&db_tx, group_id).await)
    }
}

impl SettlementRecorder for Engine {
    async fn record_settlement(
        &self,
        group_id: Uuid,
        from: &str,
        to: &str,
        amount: Money,
        title: &str,
    ) -> ResultEngine<Uuid> {
        let amount = amount.abs();
        if amount.to_minor().is_none() {
            return Err(EngineError::InvalidAmount(
                "settlement: at most two decimals are allowed".to_string(),
            ));
        }

        let expense_id = Uuid::new_v4();
        let rows = [
            SplitRow::payer(expense_id, from, amount),
            SplitRow::debtor(expense_id, to, amount),
        ];
        with_tx!(self, |db_tx| {
            expenses::ActiveModel::try_from(ExpenseHeader {
                id: expense_id,
                group_id,
                title,
                total: amount,
                incomplete: false,
                is_settlement: true,
                created_by: from,
            })?
            .insert(&db_tx)
            .await?;
            for row in &rows {
                splits::ActiveModel::try_from(row)?.insert(&db_tx).await?;
            }

            tracing::info!(%group_id, %expense_id, from, to, %amount, "recorded settlement");
            Ok(expense_id)
        })
    }
}
