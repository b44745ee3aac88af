//! EstateLite: a real-estate marketplace service over an embedded document store.
//!
//! The store layer (`engine`, `collection`, `query`) keeps BSON documents in memory with
//! NDJSON snapshots. `models`, `listing` and `marketplace` hold the business rules, and `http`
//! exposes them as a JSON API.

pub mod cli;
pub mod collection;
pub mod config;
pub mod document;
pub mod engine;
pub mod errors;
pub mod http;
pub mod listing;
pub mod logger;
pub mod marketplace;
pub mod models;
pub mod query;
pub mod seed;
pub mod types;

pub use config::AppConfig;
pub use errors::{AppError, DbError};
pub use marketplace::Marketplace;
