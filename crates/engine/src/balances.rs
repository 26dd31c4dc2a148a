//! Balance aggregation.
//!
//! Turns a snapshot of split rows into one net balance per user. For every
//! expense, each debtor owes every payer a share of their debt proportional to
//! that payer's share of the total paid:
//!
//! ```text
//! owed(debtor j -> payer i) = amount(d_j) * (amount(p_i) / total_paid)
//! ```
//!
//! Expenses whose payer total is not positive cannot be allocated and are
//! skipped. A user is never charged against themself inside one expense.
//! Everything is accumulated as exact decimals; rounding to the minor unit is
//! left to the presentation layer and the optimizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, SplitRole, SplitRow};

/// One proportional obligation derived from a single expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub expense_id: Uuid,
    pub debtor: String,
    pub payer: String,
    pub amount: Money,
}

/// Net position of one user across a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: String,
    /// Positive: the user is owed money. Negative: the user owes money.
    pub net: Money,
}

/// Net balances keyed by user id, iterated in user id order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances(BTreeMap<String, Money>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the user's balance, creating the entry if needed.
    pub fn credit(&mut self, user_id: &str, amount: Money) {
        match self.0.get_mut(user_id) {
            Some(balance) => *balance += amount,
            None => {
                self.0.insert(user_id.to_string(), amount);
            }
        }
    }

    /// Subtracts `amount` from the user's balance, creating the entry if needed.
    pub fn debit(&mut self, user_id: &str, amount: Money) {
        self.credit(user_id, -amount);
    }

    /// Balance of a user; users without any allocation have zero.
    pub fn get(&self, user_id: &str) -> Money {
        self.0.get(user_id).copied().unwrap_or(Money::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> + '_ {
        self.0.iter().map(|(user, amount)| (user.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Money is only moved around, so for a closed ledger
    /// this stays within ε of zero.
    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    /// Copy with every balance rounded to the minor unit, for presentation.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(user, amount)| (user.clone(), amount.round_minor()))
                .collect(),
        )
    }

    pub fn into_vec(self) -> Vec<Balance> {
        self.0
            .into_iter()
            .map(|(user_id, net)| Balance { user_id, net })
            .collect()
    }
}

impl FromIterator<(String, Money)> for Balances {
    fn from_iter<T: IntoIterator<Item = (String, Money)>>(iter: T) -> Self {
        let mut balances = Self::new();
        for (user, amount) in iter {
            balances.credit(&user, amount);
        }
        balances
    }
}

#[derive(Default)]
struct ExpenseRows<'a> {
    payers: Vec<&'a SplitRow>,
    debtors: Vec<&'a SplitRow>,
}

/// Derives every payer/debtor obligation from the split rows.
///
/// Rows are grouped by expense id; the result is ordered by expense id, then
/// payer row order, then debtor row order.
pub fn allocate(rows: &[SplitRow]) -> Vec<Allocation> {
    let mut expenses: BTreeMap<Uuid, ExpenseRows<'_>> = BTreeMap::new();
    for row in rows {
        let entry = expenses.entry(row.expense_id).or_default();
        match row.role {
            SplitRole::Payer => entry.payers.push(row),
            SplitRole::Debtor => entry.debtors.push(row),
        }
    }

    let mut allocations = Vec::new();
    for (expense_id, ExpenseRows { payers, debtors }) in expenses {
        let total_paid: Money = payers.iter().map(|row| row.amount).sum();
        if !total_paid.is_positive() {
            tracing::debug!(%expense_id, %total_paid, "skipping expense without a payer total");
            continue;
        }

        for payer in &payers {
            for debtor in &debtors {
                if payer.user_id == debtor.user_id {
                    continue;
                }
                let Some(amount) = debtor.amount.checked_share(payer.amount, total_paid) else {
                    tracing::warn!(%expense_id, "proportional share overflowed, skipping pair");
                    continue;
                };
                allocations.push(Allocation {
                    expense_id,
                    debtor: debtor.user_id.clone(),
                    payer: payer.user_id.clone(),
                    amount,
                });
            }
        }
    }
    allocations
}

/// Net balance per user for the given split rows.
pub fn aggregate(rows: &[SplitRow]) -> Balances {
    let mut balances = Balances::new();
    for allocation in allocate(rows) {
        balances.credit(&allocation.payer, allocation.amount);
        balances.debit(&allocation.debtor, allocation.amount);
    }
    tracing::debug!(
        rows = rows.len(),
        users = balances.len(),
        total = %balances.total().as_decimal(),
        "aggregated balances"
    );
    balances
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn m(value: rust_decimal::Decimal) -> Money {
        Money::new(value)
    }

    fn expense_id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn proportional_allocation_across_two_payers() {
        let e = expense_id(1);
        let rows = vec![
            SplitRow::payer(e, "a", m(dec!(60))),
            SplitRow::payer(e, "b", m(dec!(40))),
            SplitRow::debtor(e, "c", m(dec!(50))),
            SplitRow::debtor(e, "d", m(dec!(50))),
        ];

        let owed: Vec<(String, String, Money)> = allocate(&rows)
            .into_iter()
            .map(|a| (a.debtor, a.payer, a.amount))
            .collect();
        let expected = [
            ("c", "a", dec!(30)),
            ("d", "a", dec!(30)),
            ("c", "b", dec!(20)),
            ("d", "b", dec!(20)),
        ]
        .map(|(d, p, amount)| (d.to_string(), p.to_string(), m(amount)));
        assert_eq!(owed, expected.to_vec());

        let balances = aggregate(&rows);
        assert_eq!(balances.get("a"), m(dec!(60)));
        assert_eq!(balances.get("b"), m(dec!(40)));
        assert_eq!(balances.get("c"), m(dec!(-50)));
        assert_eq!(balances.get("d"), m(dec!(-50)));
        assert_eq!(balances.total(), Money::ZERO);
    }

    #[test]
    fn payer_is_not_charged_against_themself() {
        let e = expense_id(1);
        let rows = vec![
            SplitRow::payer(e, "a", m(dec!(90))),
            SplitRow::debtor(e, "a", m(dec!(30))),
            SplitRow::debtor(e, "b", m(dec!(30))),
            SplitRow::debtor(e, "c", m(dec!(30))),
        ];

        let balances = aggregate(&rows);
        assert_eq!(balances.len(), 3);
        assert_eq!(balances.get("a"), m(dec!(60)));
        assert_eq!(balances.get("b"), m(dec!(-30)));
        assert_eq!(balances.get("c"), m(dec!(-30)));
    }

    #[test]
    fn expense_without_payer_total_is_skipped() {
        let incomplete = expense_id(1);
        let valid = expense_id(2);
        let rows = vec![
            SplitRow::payer(incomplete, "a", Money::ZERO),
            SplitRow::debtor(incomplete, "b", m(dec!(10))),
            SplitRow::debtor(incomplete, "c", m(dec!(10))),
            SplitRow::payer(valid, "b", m(dec!(20))),
            SplitRow::debtor(valid, "c", m(dec!(20))),
        ];

        let balances = aggregate(&rows);
        assert_eq!(balances.get("a"), Money::ZERO);
        assert_eq!(balances.get("b"), m(dec!(20)));
        assert_eq!(balances.get("c"), m(dec!(-20)));
        assert_eq!(balances.len(), 2);
    }

    #[test]
    fn debtors_without_payers_are_skipped() {
        let e = expense_id(1);
        let rows = vec![SplitRow::debtor(e, "b", m(dec!(10)))];
        assert!(aggregate(&rows).is_empty());
    }

    #[test]
    fn empty_ledger_has_no_balances() {
        let balances = aggregate(&[]);
        assert!(balances.is_empty());
        assert_eq!(balances.total(), Money::ZERO);
    }

    #[test]
    fn balances_net_across_expenses() {
        let first = expense_id(1);
        let second = expense_id(2);
        let rows = vec![
            SplitRow::payer(first, "a", m(dec!(30))),
            SplitRow::debtor(first, "b", m(dec!(30))),
            SplitRow::payer(second, "b", m(dec!(10))),
            SplitRow::debtor(second, "a", m(dec!(10))),
        ];

        let balances = aggregate(&rows);
        assert_eq!(balances.get("a"), m(dec!(20)));
        assert_eq!(balances.get("b"), m(dec!(-20)));
    }

    #[test]
    fn thirds_do_not_drift() {
        let mut rows = Vec::new();
        for n in 0..200u128 {
            let e = expense_id(n);
            rows.push(SplitRow::payer(e, "a", m(dec!(0.01))));
            rows.push(SplitRow::payer(e, "b", m(dec!(0.01))));
            rows.push(SplitRow::payer(e, "c", m(dec!(0.01))));
            rows.push(SplitRow::debtor(e, "d", m(dec!(0.02))));
            rows.push(SplitRow::debtor(e, "e", m(dec!(0.01))));
        }

        let balances = aggregate(&rows);
        assert!(balances.total().abs() < m(dec!(0.0000001)));
        assert_eq!(balances.rounded().get("a"), m(dec!(2.00)));
        assert_eq!(balances.rounded().get("d"), m(dec!(-4.00)));
    }

    #[test]
    fn rounded_balances_keep_user_order() {
        let balances: Balances = [
            ("b".to_string(), m(dec!(-1.005))),
            ("a".to_string(), m(dec!(1.005))),
        ]
        .into_iter()
        .collect();

        let rounded = balances.rounded().into_vec();
        assert_eq!(
            rounded,
            vec![
                Balance {
                    user_id: "a".to_string(),
                    net: m(dec!(1.01))
                },
                Balance {
                    user_id: "b".to_string(),
                    net: m(dec!(-1.01))
                },
            ]
        );
    }
}
