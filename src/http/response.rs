//! JSON envelopes shared by every endpoint.
//!
//! Success bodies look like `{success: true, data}` (plus `message` for mutations); failures are
//! `{success: false, message}` with `errors` added for validation failures.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::errors::AppError;

pub fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

pub fn ok_message(message: &str, data: Option<Value>) -> Json<Value> {
    match data {
        Some(data) => Json(json!({"success": true, "message": message, "data": data})),
        None => Json(json!({"success": true, "message": message})),
    }
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({"success": false, "message": "Validation failed", "errors": errors}),
            Self::Store(e) => {
                log::error!("store failure: {e}");
                json!({"success": false, "message": "Server error"})
            }
            other => json!({"success": false, "message": other.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

/// `Json<T>` whose rejection renders as a validation envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_body(&rejection)),
        }
    }
}

fn invalid_body(rejection: &JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}

/// `Query<T>` with the same validation envelope on rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_query(&rejection)),
        }
    }
}

fn invalid_query(rejection: &QueryRejection) -> AppError {
    AppError::validation(rejection.body_text())
}
