//! Request and response bodies of the HTTP API.
//!
//! Money travels as a decimal string (`"12.50"`) so clients never go through
//! floating point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }

    /// Request body for adding a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Share {
        pub user_id: String,
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        pub total: Decimal,
        pub payers: Vec<Share>,
        pub debtors: Vec<Share>,
        /// Amounts are not final yet; totals are not checked.
        #[serde(default)]
        pub incomplete: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitRole {
        Payer,
        Debtor,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub user_id: String,
        pub amount: Decimal,
        pub role: SplitRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub title: String,
        pub total: Decimal,
        pub incomplete: bool,
        pub is_settlement: bool,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    /// Net position of a user: positive is owed money, negative owes money.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        pub net: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }
}

pub mod settle {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SettleViewParam {
        #[default]
        All,
        Mine,
    }

    /// Query string of `GET /groups/{group_id}/settle`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SettleQuery {
        #[serde(default)]
        pub view: SettleViewParam,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: String,
        pub to: String,
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PerspectiveView {
        pub counterparty: String,
        /// Positive when the counterparty owes the requester.
        pub signed_amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "view", rename_all = "snake_case")]
    pub enum SettleSummaryResponse {
        All { settlements: Vec<SettlementView> },
        Mine { entries: Vec<PerspectiveView> },
    }

    /// Records a payment. A positive amount means the requester paid
    /// `counterparty`; a negative one means the counterparty paid.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleNew {
        pub counterparty: String,
        pub amount: Decimal,
        pub title: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleCreated {
        pub id: Uuid,
    }
}
