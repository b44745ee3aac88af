use serde::{Deserialize, Serialize};

use super::{Role, check_text, parse_enum};
use crate::errors::AppError;
use crate::types::{DocumentId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_blocked: bool,
    /// Ids of wishlisted properties.
    #[serde(default)]
    pub wishlist: Vec<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

fn plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

impl AccountInput {
    /// Validates the input and builds a new account. Emails are stored lowercased.
    ///
    /// # Errors
    /// Returns `AppError::Validation` listing every invalid or missing field.
    pub fn into_account(self) -> Result<Account, AppError> {
        let mut errors = Vec::new();
        let name = check_text("Name", self.name.as_deref(), 50, true, &mut errors);
        let email = check_text("Email", self.email.as_deref(), 254, true, &mut errors)
            .map(|e| e.to_lowercase())
            .filter(|e| {
                let ok = plausible_email(e);
                if !ok {
                    errors.push("Please provide a valid email".to_string());
                }
                ok
            });
        let role: Option<Role> = parse_enum(self.role.as_deref(), &mut errors);
        let phone = check_text("Phone", self.phone.as_deref(), 30, false, &mut errors);

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(Account {
                id: DocumentId::new().to_string(),
                name,
                email,
                role: role.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
                is_blocked: false,
                wishlist: Vec::new(),
                created_at: Timestamp::now(),
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let input = AccountInput {
            name: Some("Dana Reyes".into()),
            email: Some(" Dana@Example.COM ".into()),
            role: Some("agent".into()),
            phone: None,
        };
        let acc = input.into_account().unwrap();
        assert_eq!(acc.email, "dana@example.com");
        assert_eq!(acc.role, Role::Agent);
        assert!(acc.wishlist.is_empty());
    }

    #[test]
    fn bad_email_and_role_are_reported() {
        let input = AccountInput {
            name: Some("X".into()),
            email: Some("nobody".into()),
            role: Some("owner".into()),
            phone: None,
        };
        let Err(AppError::Validation(errors)) = input.into_account() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors, vec!["Please provide a valid email", "Invalid role: owner"]);
    }
}
