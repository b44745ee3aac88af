use serde::{Deserialize, Serialize};

use super::{InquiryStatus, check_text};
use crate::errors::AppError;
use crate::types::{DocumentId, Timestamp};

pub const MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: String,
    pub property: String,
    /// Absent for inquiries sent without an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Receiving agent, copied from the property when the inquiry is created.
    pub agent: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub status: InquiryStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryInput {
    pub property: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl InquiryInput {
    /// Validates the input. `name` and `email` fall back to the sender's account details.
    ///
    /// # Errors
    /// Returns `AppError::Validation` listing every invalid or missing field.
    pub fn into_inquiry(
        self,
        sender: Option<(&str, &str, &str)>,
        agent: &str,
    ) -> Result<Inquiry, AppError> {
        let mut errors = Vec::new();
        let (sender_id, fallback_name, fallback_email) = match sender {
            Some((id, name, email)) => (Some(id.to_string()), Some(name), Some(email)),
            None => (None, None, None),
        };
        let name = check_text("Name", self.name.as_deref().or(fallback_name), 100, true, &mut errors);
        let email = check_text("Email", self.email.as_deref().or(fallback_email), 254, true, &mut errors);
        let phone = check_text("Phone", self.phone.as_deref(), 30, false, &mut errors);
        let message = check_text("Message", self.message.as_deref(), MESSAGE_MAX, true, &mut errors);
        let property = check_text("Property", self.property.as_deref(), 64, true, &mut errors);

        match (property, name, email, message) {
            (Some(property), Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(Inquiry {
                id: DocumentId::new().to_string(),
                property,
                sender: sender_id,
                agent: agent.to_string(),
                name,
                email: email.to_lowercase(),
                phone: phone.unwrap_or_default(),
                message,
                status: InquiryStatus::New,
                created_at: Timestamp::now(),
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
