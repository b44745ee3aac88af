//! Account management endpoints for admins.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::caller::RequireCaller;
use super::response::{ValidJson, ValidQuery, ok, ok_message};
use crate::errors::AppError;
use crate::marketplace::accounts::AccountListParams;
use crate::models::AccountInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBody {
    is_blocked: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list).post(create))
        .route("/api/admin/users/:id/block", patch(block))
}

async fn list(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidQuery(params): ValidQuery<AccountListParams>,
) -> Result<Json<Value>, AppError> {
    let page = state.market.list_accounts(&caller, &params)?;
    Ok(ok(json!({"users": page.items, "pagination": page.pagination})))
}

async fn create(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidJson(input): ValidJson<AccountInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = state.market.register_account(&caller, input)?;
    Ok((StatusCode::CREATED, ok_message("User created successfully", Some(json!({"user": user})))))
}

async fn block(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<BlockBody>,
) -> Result<Json<Value>, AppError> {
    let user = state.market.set_blocked(&caller, &id, body.is_blocked)?;
    let message = if body.is_blocked { "User blocked" } else { "User unblocked" };
    Ok(ok_message(message, Some(json!({"user": user}))))
}
