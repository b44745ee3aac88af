//! `/api/properties` endpoints.

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
use super::caller::{MaybeCaller, RequireCaller};
use super::response::{ValidJson, ValidQuery, ok, ok_message};
use crate::errors::AppError;
use crate::listing::{ListingParams, MyPropertiesParams};
use crate::models::PropertyInput;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    is_approved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBody {
    is_featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/properties", get(list).post(create))
        .route("/api/properties/featured", get(featured))
        .route("/api/properties/agent/my-properties", get(mine))
        .route("/api/properties/:id", get(show).put(update).delete(remove))
        .route("/api/properties/:id/approve", patch(approve))
        .route("/api/properties/:id/feature", patch(feature))
        .route("/api/properties/:id/status", patch(status))
}

async fn list(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    ValidQuery(params): ValidQuery<ListingParams>,
) -> Result<Json<Value>, AppError> {
    let page = state.market.list_properties(caller.as_ref(), &params)?;
    Ok(ok(json!({"properties": page.items, "pagination": page.pagination})))
}

async fn featured(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<LimitQuery>,
) -> Result<Json<Value>, AppError> {
    let properties = state.market.featured_properties(q.limit.as_deref())?;
    Ok(ok(json!({"properties": properties})))
}

async fn show(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let detail = state.market.get_property(caller.as_ref(), &id)?;
    Ok(ok(json!(detail)))
}

async fn mine(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidQuery(params): ValidQuery<MyPropertiesParams>,
) -> Result<Json<Value>, AppError> {
    let page = state.market.my_properties(&caller, &params)?;
    Ok(ok(json!({"properties": page.items, "pagination": page.pagination})))
}

async fn create(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ValidJson(input): ValidJson<PropertyInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let property = state.market.create_property(&caller, input)?;
    Ok((StatusCode::CREATED, ok_message("Property created successfully", Some(json!({"property": property})))))
}

async fn update(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<PropertyInput>,
) -> Result<Json<Value>, AppError> {
    let property = state.market.update_property(&caller, &id, input)?;
    Ok(ok_message("Property updated successfully", Some(json!({"property": property}))))
}

async fn remove(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.market.delete_property(&caller, &id)?;
    Ok(ok_message("Property deleted successfully", None))
}

async fn approve(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ApprovalBody>,
) -> Result<Json<Value>, AppError> {
    let property = state.market.set_approval(&caller, &id, body.is_approved)?;
    let message = if body.is_approved { "Property approved" } else { "Property approval revoked" };
    Ok(ok_message(message, Some(json!({"property": property}))))
}

async fn feature(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<FeatureBody>,
) -> Result<Json<Value>, AppError> {
    let property = state.market.set_featured(&caller, &id, body.is_featured)?;
    let message = if body.is_featured { "Property featured" } else { "Property unfeatured" };
    Ok(ok_message(message, Some(json!({"property": property}))))
}

async fn status(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<StatusBody>,
) -> Result<Json<Value>, AppError> {
    let property = state.market.set_status(&caller, &id, body.status.as_deref())?;
    Ok(ok_message("Property status updated", Some(json!({"property": property}))))
}
