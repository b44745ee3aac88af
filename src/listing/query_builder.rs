//! Translates listing query parameters into a store filter and sort.
//!
//! Building never fails: empty, unrecognized or non-numeric values are left out of the filter.
//! Strict checking of the public endpoint's parameters lives in [`ListingParams::validate`].

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Category, ListingType, PropertyStatus};
use crate::query::{CmpOp, Filter, SortSpec};

/// Fields searched by the free-text `search` parameter.
pub const TEXT_FIELDS: &[&str] = &["title", "description", "location.city"];

const LOCATION_FIELDS: &[&str] = &["location.address", "location.city", "location.state"];

/// Raw query parameters of the property listing. Every value is kept as text so that
/// malformed input can be ignored instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub location: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub area_min: Option<String>,
    pub area_max: Option<String>,
    /// Comma-separated amenity names; a listing must have all of them.
    pub amenities: Option<String>,
    pub featured: Option<String>,
    pub agent: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

fn text(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn number(value: Option<&String>) -> Option<f64> {
    text(value).and_then(|s| s.parse::<f64>().ok()).filter(|n| n.is_finite())
}

fn range(path: &str, min: Option<f64>, max: Option<f64>) -> Vec<Filter> {
    let mut out = Vec::new();
    if let Some(min) = min {
        out.push(Filter::cmp(path, CmpOp::Gte, min));
    }
    if let Some(max) = max {
        out.push(Filter::cmp(path, CmpOp::Lte, max));
    }
    out
}

fn enum_eq<T: std::str::FromStr + Into<Bson>>(path: &str, value: Option<&String>) -> Option<Filter> {
    let parsed: T = text(value)?.parse().ok()?;
    Some(Filter::eq(path, parsed))
}

/// Case-insensitive substring match across the address fields.
fn location_filter(term: &str) -> Option<Filter> {
    let pattern = regex::escape(term);
    let alternatives: Vec<Filter> =
        LOCATION_FIELDS.iter().filter_map(|path| Filter::regex(*path, &pattern, true).ok()).collect();
    (!alternatives.is_empty()).then_some(Filter::Or(alternatives))
}

/// Splits a comma-separated list, dropping blank entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Builds the filter for `params`. All clauses are combined with AND.
#[must_use]
pub fn build_filter(params: &ListingParams) -> Filter {
    let mut clauses = Vec::new();

    clauses.extend(enum_eq::<ListingType>("type", params.listing_type.as_ref()));
    clauses.extend(enum_eq::<Category>("category", params.category.as_ref()));
    clauses.extend(enum_eq::<PropertyStatus>("status", params.status.as_ref()));
    if let Some(agent) = text(params.agent.as_ref()) {
        clauses.push(Filter::eq("agent", agent));
    }

    clauses.extend(range("price", number(params.price_min.as_ref()), number(params.price_max.as_ref())));
    clauses.extend(range(
        "features.area",
        number(params.area_min.as_ref()),
        number(params.area_max.as_ref()),
    ));
    clauses.extend(range("features.bedrooms", number(params.bedrooms.as_ref()), None));
    clauses.extend(range("features.bathrooms", number(params.bathrooms.as_ref()), None));

    if let Some(term) = text(params.location.as_ref()) {
        clauses.extend(location_filter(term));
    }

    if let Some(raw) = text(params.amenities.as_ref()) {
        let wanted = split_list(raw);
        if !wanted.is_empty() {
            clauses.push(Filter::All {
                path: "amenities".into(),
                values: wanted.into_iter().map(Bson::String).collect(),
            });
        }
    }

    if params.featured.as_deref() == Some("true") {
        clauses.push(Filter::eq("isFeatured", true));
    }

    if let Some(query) = text(params.search.as_ref()) {
        clauses.push(Filter::Text { query: query.to_string() });
    }

    Filter::all_of(clauses)
}

/// Maps a sort key to a sort spec. Absent or unknown keys sort newest first.
#[must_use]
pub fn build_sort(sort: Option<&str>) -> Vec<SortSpec> {
    let spec = match sort.map(str::trim) {
        Some("price" | "price_asc") => SortSpec::asc("price"),
        Some("-price" | "price_desc") => SortSpec::desc("price"),
        Some("createdAt" | "oldest") => SortSpec::asc("createdAt"),
        Some("-views" | "popular") => SortSpec::desc("views"),
        Some("title") => SortSpec::asc("title"),
        Some("-title") => SortSpec::desc("title"),
        _ => SortSpec::desc("createdAt"),
    };
    vec![spec]
}

impl ListingParams {
    /// Strict checks for the public listing endpoint: an explicit numeric `page` below 1, a
    /// numeric `limit` outside `1..=max_limit`, or an enum value outside its set is rejected.
    /// Non-numeric paging values are left to fall back to their defaults.
    ///
    /// # Errors
    /// Returns `AppError::Validation` with one message per offending parameter.
    pub fn validate(&self, max_limit: usize) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if let Some(page) = text(self.page.as_ref()).and_then(|s| s.parse::<i64>().ok())
            && page < 1
        {
            errors.push("Page must be a positive integer".to_string());
        }
        if let Some(limit) = text(self.limit.as_ref()).and_then(|s| s.parse::<i64>().ok())
            && !usize::try_from(limit).is_ok_and(|l| (1..=max_limit).contains(&l))
        {
            errors.push(format!("Limit must be between 1 and {max_limit}"));
        }
        if let Some(v) = text(self.listing_type.as_ref())
            && let Err(e) = v.parse::<ListingType>()
        {
            errors.push(e);
        }
        if let Some(v) = text(self.category.as_ref())
            && let Err(e) = v.parse::<Category>()
        {
            errors.push(e);
        }
        if let Some(v) = text(self.status.as_ref())
            && let Err(e) = v.parse::<PropertyStatus>()
        {
            errors.push(e);
        }
        if errors.is_empty() { Ok(()) } else { Err(AppError::Validation(errors)) }
    }
}
