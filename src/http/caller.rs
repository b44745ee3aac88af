use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::AppState;
use crate::errors::AppError;
use crate::listing::Caller;

/// Header carrying the account id forwarded by the upstream authentication layer.
pub const USER_HEADER: &str = "x-user-id";

/// The caller, if the request carries an account id. Unknown or blocked accounts are rejected.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Caller>);

/// A signed-in caller. Anonymous requests get 401.
#[derive(Debug, Clone)]
pub struct RequireCaller(pub Caller);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = match parts.headers.get(USER_HEADER) {
            Some(v) => Some(v.to_str().map_err(|_| AppError::Unauthorized("Not authorized".into()))?),
            None => None,
        };
        Ok(Self(state.market.resolve_caller(id)?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeCaller::from_request_parts(parts, state).await?.0 {
            Some(caller) => Ok(Self(caller)),
            None => Err(AppError::Unauthorized("Not authorized".into())),
        }
    }
}
