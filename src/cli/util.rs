use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::marketplace::Marketplace;

/// Opens the configured store, or an in-memory one when no data directory is set.
pub fn open_marketplace(config: &AppConfig) -> Result<Marketplace, DbError> {
    let engine = match &config.storage.data_dir {
        Some(dir) => Engine::open(dir)?,
        None => {
            log::warn!("no data directory configured; changes will not be kept");
            Engine::in_memory()
        }
    };
    Ok(Marketplace::new(Arc::new(engine), config.listing.clone()))
}

/// Money without a fractional part when there is none, e.g. `250000` or `1800.5`.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 { format!("{price:.0}") } else { format!("{price:.2}") }
}
