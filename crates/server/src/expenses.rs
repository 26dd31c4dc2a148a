//! Expense endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseShare, Money, NewExpense, SplitRole};
use uuid::Uuid;

use api_types::expense::{
    ExpenseCreated, ExpenseNew, ExpenseView, ExpensesResponse, Share, SplitRole as ApiSplitRole,
    SplitView,
};

use crate::{ServerError, server::ServerState, user};

fn to_shares(shares: Vec<Share>) -> Vec<ExpenseShare> {
    shares
        .into_iter()
        .map(|share| ExpenseShare::new(share.user_id, Money::new(share.amount)))
        .collect()
}

/// Handle requests for recording a new shared expense
pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let expense = NewExpense {
        title: payload.title,
        total: Money::new(payload.total),
        payers: to_shares(payload.payers),
        debtors: to_shares(payload.debtors),
        incomplete: payload.incomplete,
    };
    let id = state
        .engine
        .create_expense(group_id, expense, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(ExpenseCreated { id })))
}

/// Handle requests for listing the group ledger
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(group_id, &user.username)
        .await?
        .into_iter()
        .map(|expense| ExpenseView {
            id: expense.id,
            title: expense.title,
            total: expense.total.as_decimal(),
            incomplete: expense.incomplete,
            is_settlement: expense.is_settlement,
            created_by: expense.created_by,
            created_at: expense.created_at,
            splits: expense
                .splits
                .into_iter()
                .map(|row| SplitView {
                    user_id: row.user_id,
                    amount: row.amount.as_decimal(),
                    role: match row.role {
                        SplitRole::Payer => ApiSplitRole::Payer,
                        SplitRole::Debtor => ApiSplitRole::Debtor,
                    },
                })
                .collect(),
        })
        .collect();

    Ok(Json(ExpensesResponse { expenses }))
}
