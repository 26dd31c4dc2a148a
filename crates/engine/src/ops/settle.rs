use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    Balances, EngineError, Money, ResultEngine, SettleSummary, SettleView, SettlementRecorder,
    ledger,
};

use super::{Engine, normalize_optional_text, with_tx};

const DEFAULT_SETTLEMENT_TITLE: &str = "Settlement";

impl Engine {
    /// Net balance of every user of the group, rounded to cents.
    pub async fn group_balances(&self, group_id: Uuid, user_id: &str) -> ResultEngine<Balances> {
        self.require_group_member(group_id, user_id).await?;
        let balances = ledger::compute_balances(self, group_id).await?;
        Ok(balances.rounded())
    }

    /// Suggested payments for the group, either all of them or only the ones
    /// involving `user_id`.
    pub async fn group_settle_summary(
        &self,
        group_id: Uuid,
        user_id: &str,
        view: SettleView,
    ) -> ResultEngine<SettleSummary> {
        self.require_group_member(group_id, user_id).await?;
        let settlements = ledger::compute_settlements(self, group_id, self.tolerance).await?;
        tracing::debug!(%group_id, user_id, ?view, count = settlements.len(), "settle summary");
        Ok(SettleSummary::project(settlements, view, user_id))
    }

    /// Records a payment between `user_id` and `counterparty`.
    ///
    /// A positive `amount` means `user_id` paid `counterparty`; a negative one
    /// means `counterparty` paid `user_id`.
    pub async fn settle(
        &self,
        group_id: Uuid,
        user_id: &str,
        counterparty: &str,
        amount: Money,
        title: Option<&str>,
    ) -> ResultEngine<Uuid> {
        if counterparty == user_id {
            return Err(EngineError::SelfSettlement(user_id.to_string()));
        }
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount(
                "settlement amount must not be zero".to_string(),
            ));
        }
        if amount.to_minor().is_none() {
            return Err(EngineError::InvalidAmount(
                "settlement: at most two decimals are allowed".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_group_member_tx(&db_tx, group_id, user_id)
                .await?;
            self.require_all_members(&db_tx, group_id, [counterparty])
                .await
        })?;

        let (from, to) = if amount.is_negative() {
            (counterparty, user_id)
        } else {
            (user_id, counterparty)
        };
        let title = normalize_optional_text(title)
            .unwrap_or_else(|| DEFAULT_SETTLEMENT_TITLE.to_string());
        self.record_settlement(group_id, from, to, amount.abs(), &title)
            .await
    }
}
