//! Typed records stored in the marketplace collections.
//!
//! Records are kept in the store as camelCase BSON documents and converted with
//! `bson::to_document` / `bson::from_document` at the service boundary.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::document::Document;
use crate::errors::DbError;

mod account;
mod inquiry;
mod property;

pub use account::{Account, AccountInput};
pub use inquiry::{Inquiry, InquiryInput};
pub use property::{
    Coordinates, DESCRIPTION_MAX, Features, FeaturesInput, Image, Location, LocationInput, Property,
    PropertyInput, TITLE_MAX,
};

/// Declares a closed set of string values with serde, `FromStr`, `Display` and BSON support.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident ($label:literal) { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {s}", $label)),
                }
            }
        }

        impl From<$name> for bson::Bson {
            fn from(v: $name) -> Self {
                bson::Bson::String(v.as_str().to_string())
            }
        }
    };
}

string_enum!(ListingType("property type") { Buy => "buy", Rent => "rent" });

string_enum!(Category("category") {
    Apartment => "apartment",
    House => "house",
    Villa => "villa",
    Condo => "condo",
    Townhouse => "townhouse",
    Land => "land",
    Commercial => "commercial",
    Office => "office",
});

string_enum!(PropertyStatus("status") {
    Available => "available",
    Sold => "sold",
    Rented => "rented",
    Pending => "pending",
});

string_enum!(Amenity("amenity") {
    Pool => "pool",
    Gym => "gym",
    Parking => "parking",
    Garden => "garden",
    Security => "security",
    Elevator => "elevator",
    Balcony => "balcony",
    AirConditioning => "air-conditioning",
    Heating => "heating",
    Laundry => "laundry",
    Wifi => "wifi",
    PetFriendly => "pet-friendly",
    Furnished => "furnished",
    Fireplace => "fireplace",
    Storage => "storage",
});

string_enum!(AreaUnit("area unit") { Sqft => "sqft", Sqm => "sqm" });

string_enum!(Furnishing("furnished value") {
    Furnished => "furnished",
    SemiFurnished => "semi-furnished",
    Unfurnished => "unfurnished",
});

string_enum!(Role("role") { User => "user", Agent => "agent", Admin => "admin" });

string_enum!(InquiryStatus("inquiry status") {
    New => "new",
    Read => "read",
    Replied => "replied",
    Closed => "closed",
});

impl Default for PropertyStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl Default for AreaUnit {
    fn default() -> Self {
        Self::Sqft
    }
}

impl Default for Furnishing {
    fn default() -> Self {
        Self::Unfurnished
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Default for InquiryStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Serializes a record into a store document. The record's `_id` must already be set.
///
/// # Errors
/// Returns an error if the record cannot be encoded or lacks a valid `_id`.
pub fn to_store<T: Serialize>(record: &T) -> Result<Document, DbError> {
    Document::from_data(bson::to_document(record)?)
}

/// Decodes a stored document into a record.
///
/// # Errors
/// Returns an error if the document does not have the record's shape.
pub fn from_store<T: DeserializeOwned>(doc: Document) -> Result<T, DbError> {
    Ok(bson::from_document(doc.data)?)
}

/// Parses an optional enum value, recording a message when it is present but invalid.
pub(crate) fn parse_enum<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
    errors: &mut Vec<String>,
) -> Option<T> {
    let raw = value?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(msg) => {
            errors.push(msg);
            None
        }
    }
}

/// Checks a trimmed text field against a character range, recording a message on failure.
pub(crate) fn check_text(
    label: &str,
    value: Option<&str>,
    max: usize,
    required: bool,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => {
            if required {
                errors.push(format!("{label} is required"));
            }
            None
        }
        Some(v) if v.chars().count() > max => {
            errors.push(format!("{label} cannot exceed {max} characters"));
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_wire_names() {
        assert_eq!("air-conditioning".parse::<Amenity>().unwrap(), Amenity::AirConditioning);
        assert_eq!(Category::Townhouse.as_str(), "townhouse");
        assert_eq!(Category::ALL.len(), 8);
        assert_eq!(Amenity::ALL.len(), 15);
        assert_eq!("castle".parse::<Category>().unwrap_err(), "Invalid category: castle");
    }

    #[test]
    fn enums_serialize_as_strings() {
        let v = serde_json::to_value(Furnishing::SemiFurnished).unwrap();
        assert_eq!(v, serde_json::json!("semi-furnished"));
        assert_eq!(bson::Bson::from(Role::Agent), bson::Bson::String("agent".into()));
    }

    #[test]
    fn text_checks_collect_messages() {
        let mut errors = Vec::new();
        assert_eq!(check_text("Title", Some("  Loft "), 10, true, &mut errors).as_deref(), Some("Loft"));
        assert!(check_text("Title", Some("   "), 10, true, &mut errors).is_none());
        assert!(check_text("Title", Some("abcdefghijk"), 10, true, &mut errors).is_none());
        assert!(check_text("Phone", None, 10, false, &mut errors).is_none());
        assert_eq!(errors, vec!["Title is required", "Title cannot exceed 10 characters"]);
    }
}
