//! Greedy settlement optimizer.
//!
//! Given net balances, produces a list of payments that brings every balance
//! within ε of zero. The algorithm repeatedly matches the largest remaining
//! debtor with the largest remaining creditor; it is a heuristic and does not
//! guarantee the minimum number of payments, but it never emits more than
//! `n - 1` payments for `n` unsettled balances.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Balances, Money, Tolerance};

/// A directed payment instruction: `from` pays `to` the given amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

/// A user with an outstanding positive amount (owed or owing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Position<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) amount: Money,
}

/// Largest amount first; equal amounts fall back to user id so the output does
/// not depend on map iteration order.
fn largest_first(a: &Position<'_>, b: &Position<'_>) -> Ordering {
    b.amount
        .cmp(&a.amount)
        .then_with(|| a.user_id.cmp(b.user_id))
}

/// Splits balances (rounded to the minor unit) into creditors and debtors,
/// both holding positive amounts and sorted largest first. Settled balances
/// are left out.
pub(crate) fn partition(
    balances: &Balances,
    tolerance: Tolerance,
) -> (Vec<Position<'_>>, Vec<Position<'_>>) {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (user_id, balance) in balances.iter() {
        let balance = balance.round_minor();
        if tolerance.is_settled(balance) {
            continue;
        }
        if balance.is_positive() {
            creditors.push(Position {
                user_id,
                amount: balance,
            });
        } else {
            debtors.push(Position {
                user_id,
                amount: -balance,
            });
        }
    }
    creditors.sort_by(largest_first);
    debtors.sort_by(largest_first);
    (creditors, debtors)
}

/// Computes the payments that settle `balances`.
///
/// Leftover entries on one side (only possible when the balances do not sum
/// to zero) are left unsettled.
pub fn optimize(balances: &Balances, tolerance: Tolerance) -> Vec<Settlement> {
    let (mut creditors, mut debtors) = partition(balances, tolerance);

    let mut settlements = Vec::new();
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let creditor = &mut creditors[c];
        let debtor = &mut debtors[d];

        let transfer = debtor.amount.min(creditor.amount).round_minor();
        if !tolerance.is_settled(transfer) {
            settlements.push(Settlement {
                from: debtor.user_id.to_string(),
                to: creditor.user_id.to_string(),
                amount: transfer,
            });
        }
        debtor.amount -= transfer;
        creditor.amount -= transfer;

        if tolerance.is_settled(debtor.amount) {
            d += 1;
        }
        if tolerance.is_settled(creditor.amount) {
            c += 1;
        }
    }

    if c < creditors.len() || d < debtors.len() {
        tracing::warn!(
            creditors = creditors.len() - c,
            debtors = debtors.len() - d,
            total = %balances.total().as_decimal(),
            "balances do not sum to zero, leaving entries unsettled"
        );
    }
    tracing::debug!(
        balances = balances.len(),
        settlements = settlements.len(),
        "optimized settlements"
    );
    settlements
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn balances(entries: &[(&str, Decimal)]) -> Balances {
        entries
            .iter()
            .map(|(user, amount)| (user.to_string(), Money::new(*amount)))
            .collect()
    }

    fn settlement(from: &str, to: &str, amount: Decimal) -> Settlement {
        Settlement {
            from: from.to_string(),
            to: to.to_string(),
            amount: Money::new(amount),
        }
    }

    /// Applies the settlements and returns what is left of every balance.
    fn apply(balances: &Balances, settlements: &[Settlement]) -> Balances {
        let mut remaining = balances.clone();
        for s in settlements {
            remaining.credit(&s.from, s.amount);
            remaining.debit(&s.to, s.amount);
        }
        remaining
    }

    fn non_zero(balances: &Balances, tolerance: Tolerance) -> usize {
        balances
            .iter()
            .filter(|(_, amount)| !tolerance.is_settled(amount.round_minor()))
            .count()
    }

    #[test]
    fn even_split_yields_two_payments() {
        let input = balances(&[("a", dec!(60)), ("b", dec!(-30)), ("c", dec!(-30))]);
        let result = optimize(&input, Tolerance::default());
        assert_eq!(
            result,
            vec![settlement("b", "a", dec!(30)), settlement("c", "a", dec!(30))]
        );
    }

    #[test]
    fn two_payers_two_debtors() {
        let input = balances(&[
            ("a", dec!(60)),
            ("b", dec!(40)),
            ("c", dec!(-50)),
            ("d", dec!(-50)),
        ]);
        let result = optimize(&input, Tolerance::default());
        assert_eq!(
            result,
            vec![
                settlement("c", "a", dec!(50)),
                settlement("d", "a", dec!(10)),
                settlement("d", "b", dec!(40)),
            ]
        );
    }

    #[test]
    fn balance_equal_to_tolerance_is_settled() {
        let tolerance = Tolerance::default();
        let input = balances(&[("a", dec!(0.01)), ("b", dec!(-0.01))]);
        let (creditors, debtors) = partition(&input, tolerance);
        assert!(creditors.is_empty());
        assert!(debtors.is_empty());
        assert!(optimize(&input, tolerance).is_empty());
    }

    #[test]
    fn balance_above_tolerance_is_matched() {
        let tolerance = Tolerance::new(Money::new(dec!(0.01))).unwrap();
        let input = balances(&[("a", dec!(0.02)), ("b", dec!(-0.02))]);
        let (creditors, debtors) = partition(&input, tolerance);
        assert_eq!(creditors.len(), 1);
        assert_eq!(debtors.len(), 1);
        assert_eq!(
            optimize(&input, tolerance),
            vec![settlement("b", "a", dec!(0.02))]
        );
    }

    #[test]
    fn sub_cent_tolerance_keeps_one_cent_balances() {
        let tolerance: Tolerance = "0.009".parse().unwrap();
        let input = balances(&[("a", dec!(0.01)), ("b", dec!(-0.01))]);
        assert_eq!(
            optimize(&input, tolerance),
            vec![settlement("b", "a", dec!(0.01))]
        );
    }

    #[test]
    fn equal_amounts_are_ordered_by_user_id() {
        let input = balances(&[
            ("zoe", dec!(10)),
            ("amy", dec!(10)),
            ("max", dec!(-10)),
            ("bob", dec!(-10)),
        ]);
        let result = optimize(&input, Tolerance::default());
        assert_eq!(
            result,
            vec![
                settlement("bob", "amy", dec!(10)),
                settlement("max", "zoe", dec!(10)),
            ]
        );
    }

    #[test]
    fn unbalanced_input_leaves_remainder_unsettled() {
        let input = balances(&[("a", dec!(50)), ("b", dec!(-20))]);
        let result = optimize(&input, Tolerance::default());
        assert_eq!(result, vec![settlement("b", "a", dec!(20))]);
    }

    #[test]
    fn empty_balances_produce_no_settlements() {
        assert!(optimize(&Balances::new(), Tolerance::default()).is_empty());
    }

    #[test]
    fn fractional_balances_are_rounded_before_matching() {
        let input = balances(&[
            ("a", dec!(33.333333)),
            ("b", dec!(33.333333)),
            ("c", dec!(-66.666666)),
        ]);
        let result = optimize(&input, Tolerance::default());
        assert_eq!(
            result,
            vec![
                settlement("c", "a", dec!(33.33)),
                settlement("c", "b", dec!(33.33)),
            ]
        );
    }

    #[test]
    fn settlements_drive_balances_to_zero() {
        let tolerance = Tolerance::default();
        let input = balances(&[
            ("a", dec!(125.10)),
            ("b", dec!(-40.05)),
            ("c", dec!(-60)),
            ("d", dec!(14.95)),
            ("e", dec!(-40)),
            ("f", dec!(0)),
        ]);

        let result = optimize(&input, tolerance);

        assert!(result.iter().all(|s| s.from != s.to));
        assert!(result.iter().all(|s| !tolerance.is_settled(s.amount)));
        assert!(result.len() <= non_zero(&input, tolerance).saturating_sub(1));
        for (user, left) in apply(&input, &result).iter() {
            assert!(tolerance.is_settled(left), "{user} still has {left}");
        }
    }

    #[test]
    fn same_input_gives_identical_output() {
        let input = balances(&[
            ("a", dec!(10)),
            ("b", dec!(10)),
            ("c", dec!(-5)),
            ("d", dec!(-5)),
            ("e", dec!(-10)),
        ]);
        let first = optimize(&input, Tolerance::default());
        let second = optimize(&input.clone(), Tolerance::default());
        assert_eq!(first, second);
    }
}
