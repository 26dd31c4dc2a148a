//! Expense split rows.
//!
//! A [`SplitRow`] says that a user either contributed money toward an expense
//! ([`SplitRole::Payer`]) or owes a share of it ([`SplitRole::Debtor`]). An
//! expense may have several rows per role. The engine reads split rows as a
//! snapshot; only the settlement recorder ever writes new ones.
//!
//! Amounts are stored as integer **minor units** and surfaced as [`Money`].

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRole {
    Payer,
    Debtor,
}

impl SplitRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payer => "payer",
            Self::Debtor => "debtor",
        }
    }
}

impl TryFrom<&str> for SplitRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payer" => Ok(Self::Payer),
            "debtor" => Ok(Self::Debtor),
            other => Err(EngineError::Database(DbErr::Custom(format!(
                "invalid split role: {other}"
            )))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRow {
    pub expense_id: Uuid,
    pub user_id: String,
    pub amount: Money,
    pub role: SplitRole,
}

impl SplitRow {
    pub fn payer(expense_id: Uuid, user_id: impl Into<String>, amount: Money) -> Self {
        Self {
            expense_id,
            user_id: user_id.into(),
            amount,
            role: SplitRole::Payer,
        }
    }

    pub fn debtor(expense_id: Uuid, user_id: impl Into<String>, amount: Money) -> Self {
        Self {
            expense_id,
            user_id: user_id.into(),
            amount,
            role: SplitRole::Debtor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: String,
    pub amount_minor: i64,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&SplitRow> for ActiveModel {
    type Error = EngineError;

    fn try_from(row: &SplitRow) -> Result<Self, Self::Error> {
        let amount_minor = row.amount.to_minor().ok_or_else(|| {
            EngineError::InvalidAmount(format!("{} has sub-cent digits", row.amount.as_decimal()))
        })?;
        Ok(Self {
            id: ActiveValue::Set(Uuid::new_v4()),
            expense_id: ActiveValue::Set(row.expense_id),
            user_id: ActiveValue::Set(row.user_id.clone()),
            amount_minor: ActiveValue::Set(amount_minor),
            role: ActiveValue::Set(row.role.as_str().to_string()),
        })
    }
}

impl TryFrom<Model> for SplitRow {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            expense_id: model.expense_id,
            user_id: model.user_id,
            amount: Money::from_minor(model.amount_minor),
            role: SplitRole::try_from(model.role.as_str())?,
        })
    }
}
