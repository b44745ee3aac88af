//! Property operations: listing, single reads with the view counter, similar listings and
//! every mutation of a listing.

use bson::Bson;
use serde::{Deserialize, Serialize};

use super::pagination::{Page, PageRequest, fetch_page};
use super::query_builder::{ListingParams, build_filter, build_sort};
use super::visibility::{Caller, Visibility};
use crate::document::ID_FIELD;
use crate::errors::AppError;
use crate::logger::log_audit;
use crate::marketplace::{ACCOUNTS, INQUIRIES, Marketplace, PROPERTIES};
use crate::models::{Property, PropertyInput, PropertyStatus, Role, from_store, to_store};
use crate::query::{
    Filter, FindOptions, SortSpec, UpdateDoc, apply_update, delete_many, delete_one, find_docs, update_many, update_one,
};
use crate::types::{DocumentId, Timestamp};

pub const SIMILAR_LIMIT: usize = 4;
pub const FEATURED_DEFAULT_LIMIT: usize = 6;

const MANAGERS: &[Role] = &[Role::Agent, Role::Admin];

/// A listing together with its similar listings, as returned by a single read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    pub property: Property,
    pub similar_properties: Vec<Property>,
}

/// Query parameters of the caller's own listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPropertiesParams {
    pub is_approved: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn by_id(id: &str) -> Filter {
    Filter::eq(ID_FIELD, id)
}

fn touched(upd: UpdateDoc) -> UpdateDoc {
    upd.set("updatedAt", Timestamp::now().to_rfc3339())
}

impl Marketplace {
    /// The public listing: filters from `params`, restricted by the caller's visibility, sorted
    /// and paginated.
    ///
    /// # Errors
    /// `Validation` for out-of-range paging or enum values; store failures otherwise.
    pub fn list_properties(&self, caller: Option<&Caller>, params: &ListingParams) -> Result<Page<Property>, AppError> {
        params.validate(self.settings().max_public_limit)?;
        let req = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), self.settings().default_limit);
        let filter = Filter::all_of(vec![build_filter(params), Visibility::new(caller).listing_filter()]);
        Ok(fetch_page(&self.properties(), &filter, build_sort(params.sort.as_deref()), req)?)
    }

    /// Reads one listing. A visible, approved listing read by anyone but its owner has its
    /// `views` incremented first; the returned record carries the new count.
    ///
    /// # Errors
    /// `NotFound` when the listing does not exist or the caller may not see it.
    pub fn get_property(&self, caller: Option<&Caller>, id: &str) -> Result<PropertyDetail, AppError> {
        let vis = Visibility::new(caller);
        let mut property = self
            .find_property(id)?
            .filter(|p| vis.can_view(p))
            .ok_or_else(|| AppError::not_found("Property"))?;

        if vis.counts_view(&property) {
            let doc_id = property.id.parse::<DocumentId>().map_err(|_| AppError::not_found("Property"))?;
            let bump = UpdateDoc::default().inc("views", 1i64);
            property = self
                .properties()
                .modify_document(&doc_id, |doc| {
                    apply_update(doc, &bump);
                    from_store::<Property>(doc.clone())
                })
                .ok_or_else(|| AppError::not_found("Property"))??;
        }

        let similar_properties = self.similar_properties(&property)?;
        Ok(PropertyDetail { property, similar_properties })
    }

    /// Up to four other approved listings with the same type, category and city, newest first.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn similar_properties(&self, property: &Property) -> Result<Vec<Property>, AppError> {
        let filter = Filter::all_of(vec![
            Filter::eq("type", property.listing_type),
            Filter::eq("category", property.category),
            Filter::eq("location.city", property.location.city.as_str()),
            Filter::eq("isApproved", true),
            Filter::Not(Box::new(by_id(&property.id))),
        ]);
        let opts = FindOptions { sort: Some(vec![SortSpec::desc("createdAt")]), limit: Some(SIMILAR_LIMIT), skip: None };
        let docs = find_docs(&self.properties(), &filter, &opts)?;
        Ok(docs.into_iter().map(from_store::<Property>).collect::<Result<Vec<_>, _>>()?)
    }

    /// Approved featured listings, newest first. A missing or invalid `limit` means six.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn featured_properties(&self, limit: Option<&str>) -> Result<Vec<Property>, AppError> {
        let limit = PageRequest::parse(None, limit, FEATURED_DEFAULT_LIMIT).limit;
        let filter = Filter::all_of(vec![Filter::eq("isApproved", true), Filter::eq("isFeatured", true)]);
        let opts = FindOptions { sort: Some(vec![SortSpec::desc("createdAt")]), limit: Some(limit), skip: None };
        let docs = find_docs(&self.properties(), &filter, &opts)?;
        Ok(docs.into_iter().map(from_store::<Property>).collect::<Result<Vec<_>, _>>()?)
    }

    /// The caller's own listings, approved or not, newest first.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an agent or admin.
    pub fn my_properties(&self, caller: &Caller, params: &MyPropertiesParams) -> Result<Page<Property>, AppError> {
        caller.require(MANAGERS)?;
        let mut clauses = vec![Filter::eq("agent", caller.id.as_str())];
        match params.is_approved.as_deref().map(str::trim) {
            Some("true") => clauses.push(Filter::eq("isApproved", true)),
            Some("false") => clauses.push(Filter::eq("isApproved", false)),
            _ => {}
        }
        if let Some(status) = params.status.as_deref().and_then(|s| s.parse::<PropertyStatus>().ok()) {
            clauses.push(Filter::eq("status", status));
        }
        let req = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), self.settings().default_list_limit);
        Ok(fetch_page(&self.properties(), &Filter::all_of(clauses), vec![SortSpec::desc("createdAt")], req)?)
    }

    /// Creates a listing owned by the caller. Listings created by an admin start approved.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an agent or admin; `Validation` for bad input.
    pub fn create_property(&self, caller: &Caller, input: PropertyInput) -> Result<Property, AppError> {
        caller.require(MANAGERS)?;
        let property = input.into_property(&caller.id, caller.is_admin(), &self.settings().placeholder_image_url)?;
        self.properties().insert_document(to_store(&property)?);
        log_audit("create", PROPERTIES, &property.id, Some(&caller.id));
        Ok(property)
    }

    fn modifiable(&self, caller: &Caller, id: &str, action: &str) -> Result<Property, AppError> {
        let property = self.find_property(id)?.ok_or_else(|| AppError::not_found("Property"))?;
        if !Visibility::new(Some(caller)).can_modify(&property) {
            return Err(AppError::Forbidden(format!("Not authorized to {action} this property")));
        }
        Ok(property)
    }

    fn apply(&self, id: &str, upd: &UpdateDoc) -> Result<Property, AppError> {
        update_one(&self.properties(), &by_id(id), upd)?;
        self.find_property(id)?.ok_or_else(|| AppError::not_found("Property"))
    }

    /// Partially updates a listing. Moderation flags are only honoured for admins.
    ///
    /// # Errors
    /// `NotFound`, `Forbidden` for non-owners, `Validation` for bad input.
    pub fn update_property(&self, caller: &Caller, id: &str, input: PropertyInput) -> Result<Property, AppError> {
        let property = self.modifiable(caller, id, "update")?;
        let upd = input.into_update(caller.is_admin(), &self.settings().placeholder_image_url)?;
        let updated = self.apply(&property.id, &upd)?;
        log_audit("update", PROPERTIES, &property.id, Some(&caller.id));
        Ok(updated)
    }

    /// Deletes a listing after removing it from every wishlist and deleting its inquiries.
    ///
    /// The three writes run one after another with no transaction. If a step fails, the
    /// earlier steps stay applied; the failure is logged and returned.
    ///
    /// # Errors
    /// `NotFound`, `Forbidden` for non-owners, or the failing step's store error.
    pub fn delete_property(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let property = self.modifiable(caller, id, "delete")?;
        let pid = property.id.as_str();

        let unlinked = update_many(&self.accounts(), &Filter::eq("wishlist", pid), &UpdateDoc::default().pull("wishlist", pid))
            .inspect_err(|e| log::error!("delete {pid}: removing wishlist references failed: {e}"))?;
        let inquiries = delete_many(&self.inquiries(), &Filter::eq("property", pid))
            .inspect_err(|e| log::error!("delete {pid}: deleting inquiries failed after unlinking {} wishlists: {e}", unlinked.modified))?;
        delete_one(&self.properties(), &by_id(pid))
            .inspect_err(|e| log::error!("delete {pid}: deleting the property failed after cascade: {e}"))?;

        log::debug!(
            "deleted property {pid}: {} wishlists unlinked, {} inquiries removed",
            unlinked.modified,
            inquiries.deleted
        );
        log_audit("delete", PROPERTIES, pid, Some(&caller.id));
        if unlinked.modified > 0 {
            log_audit("pull_wishlist", ACCOUNTS, pid, Some(&caller.id));
        }
        if inquiries.deleted > 0 {
            log_audit("delete_many", INQUIRIES, pid, Some(&caller.id));
        }
        Ok(())
    }

    fn moderate(&self, caller: &Caller, id: &str, field: &str, value: bool) -> Result<Property, AppError> {
        caller.require(&[Role::Admin])?;
        let property = self.find_property(id)?.ok_or_else(|| AppError::not_found("Property"))?;
        let updated = self.apply(&property.id, &touched(UpdateDoc::default().set(field, value)))?;
        log_audit(field, PROPERTIES, &property.id, Some(&caller.id));
        Ok(updated)
    }

    /// # Errors
    /// `Forbidden` unless the caller is an admin; `NotFound` for unknown ids.
    pub fn set_approval(&self, caller: &Caller, id: &str, approved: bool) -> Result<Property, AppError> {
        self.moderate(caller, id, "isApproved", approved)
    }

    /// # Errors
    /// `Forbidden` unless the caller is an admin; `NotFound` for unknown ids.
    pub fn set_featured(&self, caller: &Caller, id: &str, featured: bool) -> Result<Property, AppError> {
        self.moderate(caller, id, "isFeatured", featured)
    }

    /// # Errors
    /// `Validation` for an unknown status, `NotFound`, or `Forbidden` for non-owners.
    pub fn set_status(&self, caller: &Caller, id: &str, status: Option<&str>) -> Result<Property, AppError> {
        let status: PropertyStatus = status
            .ok_or_else(|| AppError::validation("Status is required"))?
            .parse()
            .map_err(AppError::validation)?;
        let property = self.modifiable(caller, id, "update")?;
        let updated = self.apply(&property.id, &touched(UpdateDoc::default().set("status", Bson::from(status))))?;
        log_audit("status", PROPERTIES, &property.id, Some(&caller.id));
        Ok(updated)
    }
}
