// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::ApiError,
    ledger::Amount,
    models::{TransferRequest, TransferResponse},
    state::AppState,
};

/// Move funds between two ledger accounts.
///
/// The debit and credit commit together or not at all. A rejected transfer
/// returns the unchanged balances alongside `insufficient_funds`.
#[utoipa::path(
    post,
    path = "/payments/transfer",
    request_body = TransferRequest,
    tag = "Payments",
    responses(
        (status = 200, description = "Transfer committed", body = TransferResponse),
        (status = 400, description = "Bad body, bad amount, bad account or insufficient funds"),
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = Amount::from_json(&request.amount)?;
    let outcome = state.ledger.transfer(&request.from, &request.to, amount)?;

    Ok(Json(TransferResponse {
        ok: true,
        balances: outcome.balances,
    }))
}
