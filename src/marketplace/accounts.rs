use serde::Deserialize;

use super::{ACCOUNTS, Marketplace};
use crate::document::ID_FIELD;
use crate::errors::AppError;
use crate::listing::{Caller, Page, PageRequest, fetch_page};
use crate::logger::log_audit;
use crate::models::{Account, AccountInput, Role, from_store, to_store};
use crate::query::{Filter, SortSpec, UpdateDoc, find_one, insert_unless, update_one};

/// Query parameters of the admin account list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountListParams {
    pub role: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl Marketplace {
    /// # Errors
    /// Propagates store failures.
    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let filter = Filter::eq("email", email.trim().to_lowercase());
        Ok(find_one(&self.accounts(), &filter)?.map(from_store::<Account>).transpose()?)
    }

    /// Stores a new account. Emails are unique, compared case-insensitively.
    ///
    /// # Errors
    /// `Validation` for bad input, `Conflict` when the email is already registered.
    pub fn create_account(&self, input: AccountInput) -> Result<Account, AppError> {
        let account = input.into_account()?;
        let taken = Filter::eq("email", account.email.as_str());
        match insert_unless(&self.accounts(), &taken, to_store(&account)?)? {
            Some(_) => Ok(account),
            None => Err(AppError::Conflict("Email already registered".into())),
        }
    }

    /// Admin entry point for [`Marketplace::create_account`].
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an admin, plus the errors of `create_account`.
    pub fn register_account(&self, caller: &Caller, input: AccountInput) -> Result<Account, AppError> {
        caller.require(&[Role::Admin])?;
        let account = self.create_account(input)?;
        log_audit("create", ACCOUNTS, &account.id, Some(&caller.id));
        Ok(account)
    }

    /// Accounts sorted by name, optionally restricted to one role.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an admin.
    pub fn list_accounts(&self, caller: &Caller, params: &AccountListParams) -> Result<Page<Account>, AppError> {
        caller.require(&[Role::Admin])?;
        let filter = match params.role.as_deref().and_then(|r| r.parse::<Role>().ok()) {
            Some(role) => Filter::eq("role", role),
            None => Filter::True,
        };
        let req = PageRequest::parse(params.page.as_deref(), params.limit.as_deref(), self.settings().default_list_limit);
        Ok(fetch_page(&self.accounts(), &filter, vec![SortSpec::asc("name"), SortSpec::asc("email")], req)?)
    }

    /// Blocks or unblocks an account. Admins cannot block themselves.
    ///
    /// # Errors
    /// `Forbidden` unless the caller is an admin, `Validation` for a self-block, `NotFound`.
    pub fn set_blocked(&self, caller: &Caller, id: &str, blocked: bool) -> Result<Account, AppError> {
        caller.require(&[Role::Admin])?;
        let account = self.find_account(id)?.ok_or_else(|| AppError::not_found("User"))?;
        if account.id == caller.id && blocked {
            return Err(AppError::validation("You cannot block your own account"));
        }
        update_one(&self.accounts(), &Filter::eq(ID_FIELD, account.id.as_str()), &UpdateDoc::default().set("isBlocked", blocked))?;
        log_audit(if blocked { "block" } else { "unblock" }, ACCOUNTS, &account.id, Some(&caller.id));
        self.find_account(&account.id)?.ok_or_else(|| AppError::not_found("User"))
    }
}
