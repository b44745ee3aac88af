//! The marketplace service: every operation the HTTP surface and the CLI expose, expressed
//! against the document store.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::collection::Collection;
use crate::config::ListingConfig;
use crate::engine::Engine;
use crate::errors::AppError;
use crate::listing::Caller;
use crate::listing::query_builder::TEXT_FIELDS;
use crate::models::{Account, Property, from_store};
use crate::types::DocumentId;

pub mod accounts;
pub mod dashboard;
pub mod inquiries;
pub mod wishlist;

pub const PROPERTIES: &str = "properties";
pub const ACCOUNTS: &str = "users";
pub const INQUIRIES: &str = "inquiries";

/// Shared handle over the store and the listing settings. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Marketplace {
    engine: Arc<Engine>,
    settings: ListingConfig,
}

impl Marketplace {
    #[must_use]
    pub fn new(engine: Arc<Engine>, settings: ListingConfig) -> Self {
        engine.collection(PROPERTIES).set_text_index(TEXT_FIELDS);
        engine.collection(ACCOUNTS);
        engine.collection(INQUIRIES);
        Self { engine, settings }
    }

    /// An in-memory marketplace with default settings.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Engine::in_memory()), ListingConfig::default())
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[must_use]
    pub fn settings(&self) -> &ListingConfig {
        &self.settings
    }

    pub(crate) fn properties(&self) -> Arc<Collection> {
        self.engine.collection(PROPERTIES)
    }

    pub(crate) fn accounts(&self) -> Arc<Collection> {
        self.engine.collection(ACCOUNTS)
    }

    pub(crate) fn inquiries(&self) -> Arc<Collection> {
        self.engine.collection(INQUIRIES)
    }

    /// Looks up the account behind an `X-User-Id` value.
    ///
    /// # Errors
    /// `Unauthorized` for an id that matches no account, `Forbidden` for a blocked account.
    pub fn resolve_caller(&self, user_id: Option<&str>) -> Result<Option<Caller>, AppError> {
        let Some(id) = user_id.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let account: Account = load(&self.accounts(), id)?
            .ok_or_else(|| AppError::Unauthorized("Not authorized".into()))?;
        if account.is_blocked {
            return Err(AppError::Forbidden("Account is blocked".into()));
        }
        Ok(Some(Caller::from(&account)))
    }

    /// # Errors
    /// Propagates store failures.
    pub fn find_property(&self, id: &str) -> Result<Option<Property>, AppError> {
        load(&self.properties(), id)
    }

    /// # Errors
    /// Propagates store failures.
    pub fn find_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        load(&self.accounts(), id)
    }
}

/// Loads and decodes the document with `id`. A malformed id simply finds nothing.
pub(crate) fn load<T: DeserializeOwned>(col: &Collection, id: &str) -> Result<Option<T>, AppError> {
    let Ok(doc_id) = id.parse::<DocumentId>() else {
        return Ok(None);
    };
    match col.find_document(&doc_id) {
        Some(doc) => Ok(Some(from_store(doc)?)),
        None => Ok(None),
    }
}
