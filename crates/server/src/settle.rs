//! Balance and settlement endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Money, SettleSummary, SettleView};
use uuid::Uuid;

use api_types::{
    balance::{BalanceView, BalancesResponse},
    settle::{
        PerspectiveView, SettleCreated, SettleNew, SettleQuery, SettleSummaryResponse,
        SettleViewParam, SettlementView,
    },
};

use crate::{ServerError, server::ServerState, user};

pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .group_balances(group_id, &user.username)
        .await?
        .into_vec()
        .into_iter()
        .map(|balance| BalanceView {
            user_id: balance.user_id,
            net: balance.net.as_decimal(),
        })
        .collect();

    Ok(Json(BalancesResponse { balances }))
}

/// Suggested payments: the whole group (`view=all`) or the caller's side
/// (`view=mine`).
pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<SettleQuery>,
) -> Result<Json<SettleSummaryResponse>, ServerError> {
    let view = match query.view {
        SettleViewParam::All => SettleView::All,
        SettleViewParam::Mine => SettleView::Mine,
    };
    let summary = state
        .engine
        .group_settle_summary(group_id, &user.username, view)
        .await?;

    Ok(Json(match summary {
        SettleSummary::All(settlements) => SettleSummaryResponse::All {
            settlements: settlements
                .into_iter()
                .map(|s| SettlementView {
                    from: s.from,
                    to: s.to,
                    amount: s.amount.as_decimal(),
                })
                .collect(),
        },
        SettleSummary::Mine(entries) => SettleSummaryResponse::Mine {
            entries: entries
                .into_iter()
                .map(|e| PerspectiveView {
                    counterparty: e.counterparty,
                    signed_amount: e.signed_amount.as_decimal(),
                })
                .collect(),
        },
    }))
}

/// Handle requests for recording a payment between two members
pub async fn settle_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<SettleNew>,
) -> Result<(StatusCode, Json<SettleCreated>), ServerError> {
    let id = state
        .engine
        .settle(
            group_id,
            &user.username,
            &payload.counterparty,
            Money::new(payload.amount),
            payload.title.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(SettleCreated { id })))
}
