//! Shared expenses.
//!
//! An [`Expense`] is the header of a group ledger entry; its money movements
//! live in [`SplitRow`]s. Recorded settlements are stored as expenses too,
//! flagged with `is_settlement`, so future balance runs pick them up.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, SplitRow};

/// One user's part in a new expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user_id: String,
    pub amount: Money,
}

impl ExpenseShare {
    pub fn new(user_id: impl Into<String>, amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
        }
    }
}

/// Input for [`Engine::create_expense`](crate::Engine::create_expense).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub total: Money,
    pub payers: Vec<ExpenseShare>,
    pub debtors: Vec<ExpenseShare>,
    /// Amounts are not final yet; totals are not enforced and an expense
    /// without a payer total is ignored by balance computations.
    pub incomplete: bool,
}

impl NewExpense {
    /// Checks amounts before anything touches the ledger.
    ///
    /// - every amount is non-negative and has at most two decimals
    /// - complete expenses have a positive total matched by both the payer
    ///   and the debtor side
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        ensure_storable(self.total, "total")?;
        if self.total.is_negative() {
            return Err(EngineError::InvalidAmount(
                "total must be >= 0".to_string(),
            ));
        }
        for share in self.payers.iter().chain(&self.debtors) {
            ensure_storable(share.amount, &share.user_id)?;
            if share.amount.is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "share of {} must be >= 0",
                    share.user_id
                )));
            }
        }

        if self.incomplete {
            return Ok(());
        }
        if !self.total.is_positive() {
            return Err(EngineError::InvalidAmount(
                "total must be > 0".to_string(),
            ));
        }
        let paid: Money = self.payers.iter().map(|share| share.amount).sum();
        if paid != self.total {
            return Err(EngineError::InvalidAmount(format!(
                "payers cover {paid}, expected {}",
                self.total
            )));
        }
        let owed: Money = self.debtors.iter().map(|share| share.amount).sum();
        if owed != self.total {
            return Err(EngineError::InvalidAmount(format!(
                "debtors owe {owed}, expected {}",
                self.total
            )));
        }
        Ok(())
    }

    pub(crate) fn split_rows(&self, expense_id: Uuid) -> Vec<SplitRow> {
        let payers = self
            .payers
            .iter()
            .map(|share| SplitRow::payer(expense_id, share.user_id.clone(), share.amount));
        let debtors = self
            .debtors
            .iter()
            .map(|share| SplitRow::debtor(expense_id, share.user_id.clone(), share.amount));
        payers.chain(debtors).collect()
    }
}

fn ensure_storable(amount: Money, label: &str) -> ResultEngine<()> {
    if amount.to_minor().is_none() {
        return Err(EngineError::InvalidAmount(format!(
            "{label}: at most two decimals are allowed"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub total: Money,
    pub incomplete: bool,
    pub is_settlement: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub splits: Vec<SplitRow>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub total_minor: i64,
    pub incomplete: bool,
    pub is_settlement: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Header row for a new expense.
pub(crate) struct ExpenseHeader<'a> {
    pub(crate) id: Uuid,
    pub(crate) group_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) total: Money,
    pub(crate) incomplete: bool,
    pub(crate) is_settlement: bool,
    pub(crate) created_by: &'a str,
}

impl TryFrom<ExpenseHeader<'_>> for ActiveModel {
    type Error = EngineError;

    fn try_from(header: ExpenseHeader<'_>) -> Result<Self, Self::Error> {
        let total_minor = header.total.to_minor().ok_or_else(|| {
            EngineError::InvalidAmount("total: at most two decimals are allowed".to_string())
        })?;
        Ok(Self {
            id: ActiveValue::Set(header.id),
            group_id: ActiveValue::Set(header.group_id),
            title: ActiveValue::Set(header.title.to_string()),
            total_minor: ActiveValue::Set(total_minor),
            incomplete: ActiveValue::Set(header.incomplete),
            is_settlement: ActiveValue::Set(header.is_settlement),
            created_by: ActiveValue::Set(header.created_by.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        })
    }
}

impl Expense {
    pub(crate) fn from_model(model: Model, splits: Vec<SplitRow>) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            title: model.title,
            total: Money::from_minor(model.total_minor),
            incomplete: model.incomplete,
            is_settlement: model.is_settlement,
            created_by: model.created_by,
            created_at: model.created_at,
            splits,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn dinner() -> NewExpense {
        NewExpense {
            title: "Dinner".to_string(),
            total: Money::new(dec!(90)),
            payers: vec![ExpenseShare::new("alice", Money::new(dec!(90)))],
            debtors: vec![
                ExpenseShare::new("alice", Money::new(dec!(30))),
                ExpenseShare::new("bob", Money::new(dec!(30))),
                ExpenseShare::new("carol", Money::new(dec!(30))),
            ],
            incomplete: false,
        }
    }

    #[test]
    fn balanced_expense_is_valid() {
        assert!(dinner().validate().is_ok());
    }

    #[test]
    fn debtor_total_must_match() {
        let mut expense = dinner();
        expense.debtors.pop();
        assert!(matches!(
            expense.validate(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn payer_total_must_match() {
        let mut expense = dinner();
        expense.payers[0].amount = Money::new(dec!(80));
        assert!(matches!(
            expense.validate(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn negative_share_is_rejected() {
        let mut expense = dinner();
        expense.incomplete = true;
        expense.debtors[0].amount = Money::new(dec!(-1));
        assert!(expense.validate().is_err());
    }

    #[test]
    fn sub_cent_share_is_rejected() {
        let mut expense = dinner();
        expense.debtors[0].amount = Money::new(dec!(29.995));
        expense.debtors[1].amount = Money::new(dec!(30.005));
        assert!(expense.validate().is_err());
    }

    #[test]
    fn incomplete_expense_skips_total_checks() {
        let mut expense = dinner();
        expense.incomplete = true;
        expense.payers.clear();
        expense.total = Money::ZERO;
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn split_rows_keep_payers_first() {
        let id = Uuid::new_v4();
        let rows = dinner().split_rows(id);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], SplitRow::payer(id, "alice", Money::new(dec!(90))));
        assert!(rows[1..].iter().all(|row| row.role == crate::SplitRole::Debtor));
    }
}
