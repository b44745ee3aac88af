use serde::Deserialize;

use super::{INQUIRIES, Marketplace, PROPERTIES, load};
use crate::document::ID_FIELD;
use crate::errors::AppError;
use crate::listing::{Caller, Page, PageRequest, Visibility, fetch_page};
use crate::logger::log_audit;
use crate::models::{Inquiry, InquiryInput, InquiryStatus, Role, to_store};
use crate::query::{Filter, SortSpec, UpdateDoc, update_one};

/// Query parameters of the inquiry lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryListParams {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl Marketplace {
    /// Records an inquiry about a visible listing and bumps the listing's `inquiryCount`.
    /// Anonymous callers must give a name and email; signed-in callers default to theirs.
    ///
    /// # Errors
    /// `Validation` for bad input, `NotFound` when the listing is missing or not visible.
    pub fn create_inquiry(&self, caller: Option<&Caller>, input: InquiryInput) -> Result<Inquiry, AppError> {
        let property_id = input
            .property
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("Property is required"))?;
        let property = self
            .find_property(property_id)?
            .filter(|p| Visibility::new(caller).can_view(p))
            .ok_or_else(|| AppError::not_found("Property"))?;

        let sender = caller.map(|c| (c.id.as_str(), c.name.as_str(), c.email.as_str()));
        let inquiry = input.into_inquiry(sender, &property.agent)?;
        self.inquiries().insert_document(to_store(&inquiry)?);
        update_one(
            &self.properties(),
            &Filter::eq(ID_FIELD, property.id.as_str()),
            &UpdateDoc::default().inc("inquiryCount", 1i64),
        )?;
        log_audit("create", INQUIRIES, &inquiry.id, caller.map(|c| c.id.as_str()));
        log_audit("inquiry_count", PROPERTIES, &property.id, caller.map(|c| c.id.as_str()));
        Ok(inquiry)
    }

    fn inquiry_page(&self, mut clauses: Vec<Filter>, params: &InquiryListParams) -> Result<Page<Inquiry>, AppError> {
        if let Some(status) = params.status.as_deref().and_then(|s| s.parse::<InquiryStatus>().ok()) {
            clauses.push(Filter::eq("status", status));
        }
        let req = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), self.settings().default_list_limit);
        Ok(fetch_page(&self.inquiries(), &Filter::all_of(clauses), vec![SortSpec::desc("createdAt")], req)?)
    }

    /// Inquiries addressed to the caller, newest first. Admins see every inquiry.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an agent or admin.
    pub fn received_inquiries(&self, caller: &Caller, params: &InquiryListParams) -> Result<Page<Inquiry>, AppError> {
        caller.require(&[Role::Agent, Role::Admin])?;
        let clauses = if caller.is_admin() { Vec::new() } else { vec![Filter::eq("agent", caller.id.as_str())] };
        self.inquiry_page(clauses, params)
    }

    /// Inquiries the caller sent, newest first.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn sent_inquiries(&self, caller: &Caller, params: &InquiryListParams) -> Result<Page<Inquiry>, AppError> {
        self.inquiry_page(vec![Filter::eq("sender", caller.id.as_str())], params)
    }

    /// # Errors
    /// `Validation` for an unknown status, `NotFound`, or `Forbidden` unless the caller is the
    /// receiving agent or an admin.
    pub fn update_inquiry_status(&self, caller: &Caller, id: &str, status: Option<&str>) -> Result<Inquiry, AppError> {
        let status: InquiryStatus = status
            .ok_or_else(|| AppError::validation("Status is required"))?
            .parse()
            .map_err(AppError::validation)?;
        let inquiry: Inquiry = load(&self.inquiries(), id)?.ok_or_else(|| AppError::not_found("Inquiry"))?;
        if inquiry.agent != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden("Not authorized to update this inquiry".into()));
        }
        update_one(
            &self.inquiries(),
            &Filter::eq(ID_FIELD, inquiry.id.as_str()),
            &UpdateDoc::default().set("status", status),
        )?;
        log_audit("status", INQUIRIES, &inquiry.id, Some(&caller.id));
        load(&self.inquiries(), &inquiry.id)?.ok_or_else(|| AppError::not_found("Inquiry"))
    }
}
