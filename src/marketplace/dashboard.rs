use serde::Serialize;

use super::Marketplace;
use crate::errors::AppError;
use crate::listing::Caller;
use crate::models::{InquiryStatus, Role};
use crate::query::{Filter, count_docs, sum_field};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub user: usize,
    pub agent: usize,
    pub admin: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_properties: usize,
    pub approved_properties: usize,
    pub pending_properties: usize,
    pub featured_properties: usize,
    pub total_users: usize,
    pub users_by_role: RoleCounts,
    pub blocked_users: usize,
    pub total_inquiries: usize,
    pub total_views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total_properties: usize,
    pub approved_properties: usize,
    pub pending_properties: usize,
    pub total_views: i64,
    pub total_inquiries: usize,
    pub new_inquiries: usize,
}

#[allow(clippy::cast_possible_truncation)]
fn whole(sum: f64) -> i64 {
    sum.round() as i64
}

impl Marketplace {
    /// # Errors
    /// `Forbidden` unless the caller is an admin.
    pub fn admin_stats(&self, caller: &Caller) -> Result<AdminStats, AppError> {
        caller.require(&[Role::Admin])?;
        let props = self.properties();
        let accounts = self.accounts();
        let approved = count_docs(&props, &Filter::eq("isApproved", true))?;
        let total_properties = props.len();
        let role_count = |role: Role| count_docs(&accounts, &Filter::eq("role", role));
        Ok(AdminStats {
            total_properties,
            approved_properties: approved,
            pending_properties: total_properties.saturating_sub(approved),
            featured_properties: count_docs(&props, &Filter::eq("isFeatured", true))?,
            total_users: accounts.len(),
            users_by_role: RoleCounts {
                user: role_count(Role::User)?,
                agent: role_count(Role::Agent)?,
                admin: role_count(Role::Admin)?,
            },
            blocked_users: count_docs(&accounts, &Filter::eq("isBlocked", true))?,
            total_inquiries: self.inquiries().len(),
            total_views: whole(sum_field(&props, &Filter::True, "views")?),
        })
    }

    /// Statistics over the caller's own listings and the inquiries addressed to them.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an agent or admin.
    pub fn agent_stats(&self, caller: &Caller) -> Result<AgentStats, AppError> {
        caller.require(&[Role::Agent, Role::Admin])?;
        let props = self.properties();
        let inquiries = self.inquiries();
        let mine = Filter::eq("agent", caller.id.as_str());
        let total_properties = count_docs(&props, &mine)?;
        let approved =
            count_docs(&props, &Filter::all_of(vec![mine.clone(), Filter::eq("isApproved", true)]))?;
        Ok(AgentStats {
            total_properties,
            approved_properties: approved,
            pending_properties: total_properties.saturating_sub(approved),
            total_views: whole(sum_field(&props, &mine, "views")?),
            total_inquiries: count_docs(&inquiries, &mine)?,
            new_inquiries: count_docs(
                &inquiries,
                &Filter::all_of(vec![mine.clone(), Filter::eq("status", InquiryStatus::New)]),
            )?,
        })
    }
}
