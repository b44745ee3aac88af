use bson::Bson;
use serde::{Deserialize, Serialize};

use super::{
    Amenity, AreaUnit, Category, Furnishing, ListingType, PropertyStatus, check_text, parse_enum,
};
use crate::errors::{AppError, DbError};
use crate::query::UpdateDoc;
use crate::types::{DocumentId, Timestamp};

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2000;
pub const PLACEHOLDER_PUBLIC_ID: &str = "placeholder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

fn default_country() -> String {
    "USA".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    pub area: f64,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default)]
    pub parking: i32,
    #[serde(default)]
    pub furnished: Furnishing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub caption: String,
}

impl Image {
    #[must_use]
    pub fn placeholder(url: &str) -> Self {
        Self { url: url.to_string(), public_id: PLACEHOLDER_PUBLIC_ID.to_string(), caption: String::new() }
    }
}

/// A listing. `agent` holds the owning account's id and is the only authority for write access
/// besides an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub category: Category,
    #[serde(default)]
    pub status: PropertyStatus,
    pub location: Location,
    pub features: Features,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub agent: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub inquiry_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesInput {
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub area_unit: Option<String>,
    pub parking: Option<i32>,
    pub furnished: Option<String>,
    pub year_built: Option<i32>,
}

/// Request body for creating or updating a listing. Enum values arrive as plain strings so that
/// every problem can be reported at once instead of failing on the first bad field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<LocationInput>,
    pub features: Option<FeaturesInput>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<Image>>,
    pub is_approved: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Field values of an input that passed validation. `None` means "not supplied".
#[derive(Debug, Default)]
struct Checked {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    listing_type: Option<ListingType>,
    category: Option<Category>,
    status: Option<PropertyStatus>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    coordinates: Option<Coordinates>,
    bedrooms: Option<i32>,
    bathrooms: Option<i32>,
    area: Option<f64>,
    area_unit: Option<AreaUnit>,
    parking: Option<i32>,
    furnished: Option<Furnishing>,
    year_built: Option<i32>,
    amenities: Option<Vec<Amenity>>,
    images: Option<Vec<Image>>,
}

fn non_negative(label: &str, value: Option<i32>, errors: &mut Vec<String>) -> Option<i32> {
    match value {
        Some(v) if v < 0 => {
            errors.push(format!("{label} cannot be negative"));
            None
        }
        other => other,
    }
}

impl PropertyInput {
    /// Validates every supplied field. With `required`, the fields a new listing needs must be
    /// present too.
    fn check(&self, required: bool) -> Result<Checked, AppError> {
        let mut errors = Vec::new();
        let loc = self.location.clone().unwrap_or_default();
        let feat = self.features.clone().unwrap_or_default();

        let price = match self.price {
            Some(p) if !p.is_finite() || p < 0.0 => {
                errors.push("Price cannot be negative".to_string());
                None
            }
            None if required => {
                errors.push("Price is required".to_string());
                None
            }
            other => other,
        };
        let area = match feat.area {
            Some(a) if !a.is_finite() || a < 1.0 => {
                errors.push("Area must be at least 1".to_string());
                None
            }
            None if required => {
                errors.push("Area is required".to_string());
                None
            }
            other => other,
        };

        let listing_type = parse_enum(self.listing_type.as_deref(), &mut errors);
        if required && self.listing_type.is_none() {
            errors.push("Property type is required".to_string());
        }
        let category = parse_enum(self.category.as_deref(), &mut errors);
        if required && self.category.is_none() {
            errors.push("Category is required".to_string());
        }

        let amenities = self.amenities.as_ref().map(|list| {
            let mut out: Vec<Amenity> = Vec::new();
            for raw in list {
                if let Some(a) = parse_enum::<Amenity>(Some(raw.as_str()), &mut errors)
                    && !out.contains(&a)
                {
                    out.push(a);
                }
            }
            out
        });

        let images = self.images.as_ref().map(|list| {
            list.iter()
                .filter(|img| {
                    let ok = !img.url.trim().is_empty();
                    if !ok {
                        errors.push("Image url is required".to_string());
                    }
                    ok
                })
                .cloned()
                .collect::<Vec<_>>()
        });

        let checked = Checked {
            title: check_text("Title", self.title.as_deref(), TITLE_MAX, required, &mut errors),
            description: check_text(
                "Description",
                self.description.as_deref(),
                DESCRIPTION_MAX,
                required,
                &mut errors,
            ),
            price,
            listing_type,
            category,
            status: parse_enum(self.status.as_deref(), &mut errors),
            address: check_text("Address", loc.address.as_deref(), 200, required, &mut errors),
            city: check_text("City", loc.city.as_deref(), 100, required, &mut errors),
            state: check_text("State", loc.state.as_deref(), 100, required, &mut errors),
            zip_code: check_text("Zip code", loc.zip_code.as_deref(), 20, required, &mut errors),
            country: check_text("Country", loc.country.as_deref(), 100, false, &mut errors),
            coordinates: loc.coordinates,
            bedrooms: non_negative("Bedrooms", feat.bedrooms, &mut errors),
            bathrooms: non_negative("Bathrooms", feat.bathrooms, &mut errors),
            area,
            area_unit: parse_enum(feat.area_unit.as_deref(), &mut errors),
            parking: non_negative("Parking", feat.parking, &mut errors),
            furnished: parse_enum(feat.furnished.as_deref(), &mut errors),
            year_built: feat.year_built,
            amenities,
            images,
        };

        if errors.is_empty() { Ok(checked) } else { Err(AppError::Validation(errors)) }
    }

    /// Builds a new listing owned by `agent`. Admin-created listings start approved.
    ///
    /// # Errors
    /// Returns `AppError::Validation` listing every invalid or missing field.
    pub fn into_property(self, agent: &str, by_admin: bool, placeholder_url: &str) -> Result<Property, AppError> {
        let c = self.check(true)?;
        let missing = || AppError::validation("Incomplete listing");
        let mut images = c.images.unwrap_or_default();
        if images.is_empty() {
            images.push(Image::placeholder(placeholder_url));
        }
        let now = Timestamp::now();
        Ok(Property {
            id: DocumentId::new().to_string(),
            title: c.title.ok_or_else(missing)?,
            description: c.description.ok_or_else(missing)?,
            price: c.price.ok_or_else(missing)?,
            listing_type: c.listing_type.ok_or_else(missing)?,
            category: c.category.ok_or_else(missing)?,
            status: c.status.unwrap_or_default(),
            location: Location {
                address: c.address.ok_or_else(missing)?,
                city: c.city.ok_or_else(missing)?,
                state: c.state.ok_or_else(missing)?,
                zip_code: c.zip_code.ok_or_else(missing)?,
                country: c.country.unwrap_or_else(default_country),
                coordinates: c.coordinates,
            },
            features: Features {
                bedrooms: c.bedrooms.unwrap_or(0),
                bathrooms: c.bathrooms.unwrap_or(0),
                area: c.area.ok_or_else(missing)?,
                area_unit: c.area_unit.unwrap_or_default(),
                parking: c.parking.unwrap_or(0),
                furnished: c.furnished.unwrap_or_default(),
                year_built: c.year_built,
            },
            amenities: c.amenities.unwrap_or_default(),
            images,
            agent: agent.to_string(),
            is_approved: by_admin,
            is_featured: by_admin && self.is_featured.unwrap_or(false),
            views: 0,
            inquiry_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds the partial update for an existing listing. Only supplied fields are written;
    /// `isApproved` and `isFeatured` are honoured for admins only.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for invalid fields, or a store error if a value cannot be
    /// encoded.
    pub fn into_update(self, by_admin: bool, placeholder_url: &str) -> Result<UpdateDoc, AppError> {
        let c = self.check(false)?;
        let mut upd = UpdateDoc::default();
        let mut put = |path: &str, value: Option<Bson>| {
            if let Some(v) = value {
                upd.set.push((path.to_string(), v));
            }
        };
        put("title", c.title.map(Bson::from));
        put("description", c.description.map(Bson::from));
        put("price", c.price.map(Bson::from));
        put("type", c.listing_type.map(Bson::from));
        put("category", c.category.map(Bson::from));
        put("status", c.status.map(Bson::from));
        put("location.address", c.address.map(Bson::from));
        put("location.city", c.city.map(Bson::from));
        put("location.state", c.state.map(Bson::from));
        put("location.zipCode", c.zip_code.map(Bson::from));
        put("location.country", c.country.map(Bson::from));
        put("features.bedrooms", c.bedrooms.map(Bson::from));
        put("features.bathrooms", c.bathrooms.map(Bson::from));
        put("features.area", c.area.map(Bson::from));
        put("features.areaUnit", c.area_unit.map(Bson::from));
        put("features.parking", c.parking.map(Bson::from));
        put("features.furnished", c.furnished.map(Bson::from));
        put("features.yearBuilt", c.year_built.map(Bson::from));
        put(
            "amenities",
            c.amenities.map(|list| Bson::Array(list.into_iter().map(Bson::from).collect())),
        );
        if by_admin {
            put("isApproved", self.is_approved.map(Bson::from));
            put("isFeatured", self.is_featured.map(Bson::from));
        }
        if let Some(coords) = c.coordinates {
            upd.set.push(("location.coordinates".into(), bson::to_bson(&coords).map_err(DbError::from)?));
        }
        if let Some(mut images) = c.images {
            if images.is_empty() {
                images.push(Image::placeholder(placeholder_url));
            }
            upd.set.push(("images".into(), bson::to_bson(&images).map_err(DbError::from)?));
        }
        upd.set.push(("updatedAt".into(), Bson::String(Timestamp::now().to_rfc3339())));
        Ok(upd)
    }
}
