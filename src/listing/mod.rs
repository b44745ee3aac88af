//! Listing search and the property service built on it.

pub mod pagination;
pub mod query_builder;
pub mod service;
pub mod visibility;

pub use pagination::{Page, PageRequest, Pagination, fetch_page};
pub use query_builder::{ListingParams, build_filter, build_sort};
pub use service::{MyPropertiesParams, PropertyDetail};
pub use visibility::{Caller, Visibility};
