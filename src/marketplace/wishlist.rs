use super::{ACCOUNTS, Marketplace};
use crate::document::ID_FIELD;
use crate::errors::AppError;
use crate::listing::{Caller, Visibility};
use crate::logger::log_audit;
use crate::models::{Account, Property};
use crate::query::{Filter, UpdateDoc, update_one};

impl Marketplace {
    fn own_account(&self, caller: &Caller) -> Result<Account, AppError> {
        self.find_account(&caller.id)?.ok_or_else(|| AppError::not_found("User"))
    }

    /// The caller's wishlisted listings that still exist and are visible to them, in the order
    /// they were added.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn wishlist(&self, caller: &Caller) -> Result<Vec<Property>, AppError> {
        let vis = Visibility::new(Some(caller));
        let mut out = Vec::new();
        for id in self.own_account(caller)?.wishlist {
            match self.find_property(&id)? {
                Some(p) if vis.can_view(&p) => out.push(p),
                _ => log::debug!("wishlist of {}: skipping unresolved property {id}", caller.id),
            }
        }
        Ok(out)
    }

    /// Adds a listing to the caller's wishlist. Adding it twice is a no-op.
    ///
    /// # Errors
    /// `NotFound` when the listing does not exist or is not visible to the caller.
    pub fn add_to_wishlist(&self, caller: &Caller, property_id: &str) -> Result<Vec<String>, AppError> {
        let property = self
            .find_property(property_id)?
            .filter(|p| Visibility::new(Some(caller)).can_view(p))
            .ok_or_else(|| AppError::not_found("Property"))?;
        let report = update_one(
            &self.accounts(),
            &Filter::eq(ID_FIELD, caller.id.as_str()),
            &UpdateDoc::default().add_to_set("wishlist", property.id.as_str()),
        )?;
        if report.modified > 0 {
            log_audit("wishlist_add", ACCOUNTS, &caller.id, Some(&caller.id));
        }
        Ok(self.own_account(caller)?.wishlist)
    }

    /// Removes a listing id from the caller's wishlist. Unknown ids are ignored.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn remove_from_wishlist(&self, caller: &Caller, property_id: &str) -> Result<Vec<String>, AppError> {
        let report = update_one(
            &self.accounts(),
            &Filter::eq(ID_FIELD, caller.id.as_str()),
            &UpdateDoc::default().pull("wishlist", property_id.trim()),
        )?;
        if report.modified > 0 {
            log_audit("wishlist_remove", ACCOUNTS, &caller.id, Some(&caller.id));
        }
        Ok(self.own_account(caller)?.wishlist)
    }
}
