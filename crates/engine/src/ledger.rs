//! Ledger ports.
//!
//! The settlement core never touches storage directly: it reads split rows
//! through a [`SplitRecordSupplier`] and user-initiated settlements are
//! written through a [`SettlementRecorder`]. [`Engine`](crate::Engine)
//! implements both on top of the database; tests can plug in anything else.

use std::future::Future;

use uuid::Uuid;

use crate::{
    Balances, Money, PerspectiveEntry, ResultEngine, Settlement, SplitRow, Tolerance, balances,
    perspective, settlement,
};

/// Source of the split rows of a group.
pub trait SplitRecordSupplier {
    /// Every split row of every expense in the group, read as one consistent
    /// snapshot. Unknown groups yield no rows.
    fn fetch_split_rows(
        &self,
        group_id: Uuid,
    ) -> impl Future<Output = ResultEngine<Vec<SplitRow>>> + Send;
}

/// Sink for settlements explicitly chosen by a user.
pub trait SettlementRecorder {
    /// Stores a ledger entry where `from` paid `to` the absolute value of
    /// `amount`, and returns the new expense id.
    fn record_settlement(
        &self,
        group_id: Uuid,
        from: &str,
        to: &str,
        amount: Money,
        title: &str,
    ) -> impl Future<Output = ResultEngine<Uuid>> + Send;
}

/// Which projection of the group settlements a caller wants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettleView {
    /// Every payment of the group.
    #[default]
    All,
    /// Only the payments involving the requesting user, signed from their side.
    Mine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettleSummary {
    All(Vec<Settlement>),
    Mine(Vec<PerspectiveEntry>),
}

impl SettleSummary {
    /// Projects the group settlements for `user_id`.
    pub fn project(settlements: Vec<Settlement>, view: SettleView, user_id: &str) -> Self {
        match view {
            SettleView::All => Self::All(settlements),
            SettleView::Mine => Self::Mine(perspective::for_user(&settlements, user_id)),
        }
    }
}

/// Net balance per user of a group. Supplier errors are returned unchanged.
pub async fn compute_balances<S>(supplier: &S, group_id: Uuid) -> ResultEngine<Balances>
where
    S: SplitRecordSupplier,
{
    let rows = supplier.fetch_split_rows(group_id).await?;
    Ok(balances::aggregate(&rows))
}

/// Payments that settle a group.
pub async fn compute_settlements<S>(
    supplier: &S,
    group_id: Uuid,
    tolerance: Tolerance,
) -> ResultEngine<Vec<Settlement>>
where
    S: SplitRecordSupplier,
{
    let balances = compute_balances(supplier, group_id).await?;
    Ok(settlement::optimize(&balances, tolerance))
}
