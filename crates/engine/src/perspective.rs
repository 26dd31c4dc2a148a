//! Per-user view over the group settlements.
//!
//! The same optimizer output serves the whole-group ledger and the "what do I
//! owe / get" view; this module only re-signs and filters it.

use serde::{Deserialize, Serialize};

use crate::{Money, Settlement};

/// A settlement seen from one user's side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveEntry {
    pub counterparty: String,
    /// Positive: the counterparty owes the user. Negative: the user owes the
    /// counterparty.
    pub signed_amount: Money,
}

/// Keeps the settlements involving `user_id`, signed from their side.
pub fn for_user(settlements: &[Settlement], user_id: &str) -> Vec<PerspectiveEntry> {
    settlements
        .iter()
        .filter_map(|settlement| {
            if settlement.from == user_id {
                Some(PerspectiveEntry {
                    counterparty: settlement.to.clone(),
                    signed_amount: -settlement.amount,
                })
            } else if settlement.to == user_id {
                Some(PerspectiveEntry {
                    counterparty: settlement.from.clone(),
                    signed_amount: settlement.amount,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn settlements() -> Vec<Settlement> {
        vec![
            Settlement {
                from: "b".to_string(),
                to: "a".to_string(),
                amount: Money::new(dec!(30)),
            },
            Settlement {
                from: "c".to_string(),
                to: "a".to_string(),
                amount: Money::new(dec!(30)),
            },
            Settlement {
                from: "c".to_string(),
                to: "d".to_string(),
                amount: Money::new(dec!(5.50)),
            },
        ]
    }

    #[test]
    fn creditor_sees_positive_amounts() {
        let view = for_user(&settlements(), "a");
        assert_eq!(
            view,
            vec![
                PerspectiveEntry {
                    counterparty: "b".to_string(),
                    signed_amount: Money::new(dec!(30)),
                },
                PerspectiveEntry {
                    counterparty: "c".to_string(),
                    signed_amount: Money::new(dec!(30)),
                },
            ]
        );
    }

    #[test]
    fn debtor_sees_negative_amounts() {
        let view = for_user(&settlements(), "c");
        assert_eq!(
            view,
            vec![
                PerspectiveEntry {
                    counterparty: "a".to_string(),
                    signed_amount: Money::new(dec!(-30)),
                },
                PerspectiveEntry {
                    counterparty: "d".to_string(),
                    signed_amount: Money::new(dec!(-5.50)),
                },
            ]
        );
    }

    #[test]
    fn uninvolved_user_sees_nothing() {
        assert!(for_user(&settlements(), "zed").is_empty());
        assert!(for_user(&[], "a").is_empty());
    }

    #[test]
    fn filtering_is_repeatable() {
        let all = settlements();
        assert_eq!(for_user(&all, "c"), for_user(&all, "c"));
    }

    #[test]
    fn amounts_serialize_as_decimal_strings() {
        let all = settlements();
        assert_eq!(
            serde_json::to_value(&all[2]).unwrap(),
            serde_json::json!({"from": "c", "to": "d", "amount": "5.50"})
        );

        let entry = PerspectiveEntry {
            counterparty: "a".to_string(),
            signed_amount: -Money::from_minor(3000),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"counterparty": "a", "signed_amount": "-30.00"})
        );
    }
}
