//! Who may see and change which listings.

use crate::errors::AppError;
use crate::models::{Account, Property, Role};
use crate::query::Filter;

/// The resolved account behind a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl From<&Account> for Caller {
    fn from(acc: &Account) -> Self {
        Self { id: acc.id.clone(), role: acc.role, name: acc.name.clone(), email: acc.email.clone() }
    }
}

impl Caller {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// # Errors
    /// Returns `AppError::Forbidden` when the caller's role is not in `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Role '{}' is not authorized to access this route", self.role)))
        }
    }
}

/// Which listings a caller may see and touch.
///
/// Anonymous callers and plain users only ever see approved listings. Agents and admins see
/// everything in the public listing; a single unapproved listing is visible to its owner and
/// to admins only.
#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    caller: Option<&'a Caller>,
}

impl<'a> Visibility<'a> {
    #[must_use]
    pub fn new(caller: Option<&'a Caller>) -> Self {
        Self { caller }
    }

    fn role(&self) -> Option<Role> {
        self.caller.map(|c| c.role)
    }

    /// The restriction ANDed onto the public listing filter.
    #[must_use]
    pub fn listing_filter(&self) -> Filter {
        match self.role() {
            Some(Role::Agent | Role::Admin) => Filter::True,
            _ => Filter::eq("isApproved", true),
        }
    }

    #[must_use]
    pub fn is_owner(&self, property: &Property) -> bool {
        self.caller.is_some_and(|c| c.id == property.agent)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    #[must_use]
    pub fn can_view(&self, property: &Property) -> bool {
        property.is_approved || self.is_owner(property) || self.is_admin()
    }

    #[must_use]
    pub fn can_modify(&self, property: &Property) -> bool {
        self.is_owner(property) || self.is_admin()
    }

    /// Whether reading `property` counts as a view: approved, and not read by its owner.
    #[must_use]
    pub fn counts_view(&self, property: &Property) -> bool {
        property.is_approved && !self.is_owner(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyInput;

    fn caller(id: &str, role: Role) -> Caller {
        Caller { id: id.into(), role, name: id.into(), email: format!("{id}@x.io") }
    }

    fn listing(owner: &str, approved: bool) -> Property {
        let input: PropertyInput = serde_json::from_value(serde_json::json!({
            "title": "t", "description": "d", "price": 1, "type": "buy", "category": "land",
            "location": {"address": "a", "city": "c", "state": "s", "zipCode": "z"},
            "features": {"area": 10}
        }))
        .unwrap();
        let mut p = input.into_property(owner, false, "u").unwrap();
        p.is_approved = approved;
        p
    }

    #[test]
    fn unapproved_listing_visible_to_owner_and_admin_only() {
        let p = listing("a1", false);
        let owner = caller("a1", Role::Agent);
        let other = caller("a2", Role::Agent);
        let user = caller("u1", Role::User);
        let admin = caller("ad", Role::Admin);
        assert!(Visibility::new(Some(&owner)).can_view(&p));
        assert!(Visibility::new(Some(&admin)).can_view(&p));
        assert!(!Visibility::new(Some(&other)).can_view(&p));
        assert!(!Visibility::new(Some(&user)).can_view(&p));
        assert!(!Visibility::new(None).can_view(&p));
    }

    #[test]
    fn owner_reads_do_not_count() {
        let p = listing("a1", true);
        assert!(!Visibility::new(Some(&caller("a1", Role::Agent))).counts_view(&p));
        assert!(Visibility::new(Some(&caller("ad", Role::Admin))).counts_view(&p));
        assert!(Visibility::new(None).counts_view(&p));
    }

    #[test]
    fn listing_filter_depends_on_role() {
        assert!(matches!(Visibility::new(None).listing_filter(), Filter::Cmp { .. }));
        assert!(matches!(Visibility::new(Some(&caller("u", Role::User))).listing_filter(), Filter::Cmp { .. }));
        assert!(matches!(Visibility::new(Some(&caller("a", Role::Agent))).listing_filter(), Filter::True));
    }

    #[test]
    fn require_checks_role() {
        let user = caller("u", Role::User);
        assert!(matches!(user.require(&[Role::Agent, Role::Admin]), Err(AppError::Forbidden(_))));
        assert!(user.require(&[Role::User]).is_ok());
    }
}
