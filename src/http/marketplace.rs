//! Wishlist, inquiry and dashboard endpoints.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::caller::{MaybeCaller, RequireCaller};
use super::response::{ValidJson, ValidQuery, ok, ok_message};
use crate::errors::AppError;
use crate::marketplace::inquiries::InquiryListParams;
use crate::models::InquiryInput;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(wishlist))
        .route("/api/wishlist/:property_id", post(wishlist_add).delete(wishlist_remove))
        .route("/api/inquiries", post(inquiry_create))
        .route("/api/inquiries/received", get(inquiries_received))
        .route("/api/inquiries/sent", get(inquiries_sent))
        .route("/api/inquiries/:id/status", patch(inquiry_status))
        .route("/api/dashboard/admin", get(admin_dashboard))
        .route("/api/dashboard/agent", get(agent_dashboard))
}

async fn wishlist(State(state): State<AppState>, RequireCaller(caller): RequireCaller) -> Result<Json<Value>, AppError> {
    let properties = state.market.wishlist(&caller)?;
    Ok(ok(json!({"wishlist": properties})))
}

async fn wishlist_add(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(property_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ids = state.market.add_to_wishlist(&caller, &property_id)?;
    Ok(ok_message("Added to wishlist", Some(json!({"wishlist": ids}))))
}

async fn wishlist_remove(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(property_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ids = state.market.remove_from_wishlist(&caller, &property_id)?;
    Ok(ok_message("Removed from wishlist", Some(json!({"wishlist": ids}))))
}

async fn inquiry_create(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    ValidJson(input): ValidJson<InquiryInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let inquiry = state.market.create_inquiry(caller.as_ref(), input)?;
    Ok((StatusCode::CREATED, ok_message("Inquiry sent successfully", Some(json!({"inquiry": inquiry})))))
}

async fn inquiries_received(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidQuery(params): ValidQuery<InquiryListParams>,
) -> Result<Json<Value>, AppError> {
    let page = state.market.received_inquiries(&caller, &params)?;
    Ok(ok(json!({"inquiries": page.items, "pagination": page.pagination})))
}

async fn inquiries_sent(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidQuery(params): ValidQuery<InquiryListParams>,
) -> Result<Json<Value>, AppError> {
    let page = state.market.sent_inquiries(&caller, &params)?;
    Ok(ok(json!({"inquiries": page.items, "pagination": page.pagination})))
}

async fn inquiry_status(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<StatusBody>,
) -> Result<Json<Value>, AppError> {
    let inquiry = state.market.update_inquiry_status(&caller, &id, body.status.as_deref())?;
    Ok(ok_message("Inquiry status updated", Some(json!({"inquiry": inquiry}))))
}

async fn admin_dashboard(State(state): State<AppState>, RequireCaller(caller): RequireCaller) -> Result<Json<Value>, AppError> {
    let stats = state.market.admin_stats(&caller)?;
    Ok(ok(json!({"stats": stats})))
}

async fn agent_dashboard(State(state): State<AppState>, RequireCaller(caller): RequireCaller) -> Result<Json<Value>, AppError> {
    let stats = state.market.agent_stats(&caller)?;
    Ok(ok(json!({"stats": stats})))
}
