//! Demo data generation for the `seed` command.

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, StateAbbr, StreetName, ZipCode};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::errors::AppError;
use crate::listing::Caller;
use crate::marketplace::Marketplace;
use crate::models::{
    Account, AccountInput, Amenity, Category, DESCRIPTION_MAX, FeaturesInput, Furnishing, ListingType,
    LocationInput, PropertyInput, PropertyStatus, Role, TITLE_MAX,
};

pub const ADMIN_EMAIL: &str = "admin@estatelite.local";

/// A small fixed set so that similar-listing lookups find neighbours.
const CITIES: &[&str] = &["Austin", "Denver", "Seattle", "Miami", "Chicago", "Portland"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub accounts: usize,
    pub properties: usize,
    pub approved: usize,
    pub featured: usize,
}

fn account(name: String, email: String, role: Role) -> AccountInput {
    AccountInput {
        name: Some(name),
        email: Some(email),
        role: Some(role.as_str().to_string()),
        phone: Some(PhoneNumber().fake()),
    }
}

fn admin(market: &Marketplace, report: &mut SeedReport) -> Result<Account, AppError> {
    if let Some(existing) = market.find_account_by_email(ADMIN_EMAIL)? {
        return Ok(existing);
    }
    let acc = market.create_account(account("Site Admin".into(), ADMIN_EMAIL.into(), Role::Admin))?;
    report.accounts += 1;
    Ok(acc)
}

fn listing(rng: &mut impl Rng) -> PropertyInput {
    let listing_type = *ListingType::ALL.choose(rng).unwrap_or(&ListingType::Buy);
    let category = *Category::ALL.choose(rng).unwrap_or(&Category::House);
    let furnished = *Furnishing::ALL.choose(rng).unwrap_or(&Furnishing::Unfurnished);
    let city = *CITIES.choose(rng).unwrap_or(&"Austin");
    let status = if rng.random_bool(0.85) { PropertyStatus::Available } else { PropertyStatus::Pending };
    let bedrooms: i32 = if category == Category::Land { 0 } else { rng.random_range(1..=6) };
    let area = f64::from(rng.random_range(40..=600_i32));
    let price = match listing_type {
        ListingType::Buy => f64::from(rng.random_range(80..=1500_i32)) * 1000.0,
        ListingType::Rent => f64::from(rng.random_range(6..=60_i32)) * 100.0,
    };
    let parking: i32 = rng.random_range(0..=3);
    let year_built: i32 = rng.random_range(1950..=2024);
    let picks = rng.random_range(0..=5_usize);
    let amenities: Vec<String> =
        Amenity::ALL.choose_multiple(rng, picks).map(|a| a.as_str().to_string()).collect();
    let sentence: String = Sentence(3..6).fake();
    let title = format!("{} {} in {city}", sentence.trim_end_matches('.'), category.as_str());
    let description: String = Paragraph(2..5).fake();
    let address = format!("{} {}", BuildingNumber().fake::<String>(), StreetName().fake::<String>());

    PropertyInput {
        title: Some(title.chars().take(TITLE_MAX).collect()),
        description: Some(description.chars().take(DESCRIPTION_MAX).collect()),
        price: Some(price),
        listing_type: Some(listing_type.as_str().into()),
        category: Some(category.as_str().into()),
        status: Some(status.as_str().into()),
        location: Some(LocationInput {
            address: Some(address),
            city: Some(city.into()),
            state: Some(StateAbbr().fake()),
            zip_code: Some(ZipCode().fake()),
            country: None,
            coordinates: None,
        }),
        features: Some(FeaturesInput {
            bedrooms: Some(bedrooms),
            bathrooms: Some((bedrooms / 2).max(1)),
            area: Some(area),
            area_unit: Some("sqft".into()),
            parking: Some(parking),
            furnished: Some(furnished.as_str().into()),
            year_built: Some(year_built),
        }),
        amenities: Some(amenities),
        images: None,
        is_approved: None,
        is_featured: None,
    }
}

/// Creates an admin (once), `agents` agents, a few plain users and `properties` listings spread
/// over the agents. Roughly four in five listings are approved and one in five featured.
///
/// # Errors
/// Propagates validation and store failures.
pub fn seed(market: &Marketplace, agents: usize, properties: usize) -> Result<SeedReport, AppError> {
    let mut rng = rand::rng();
    let mut report = SeedReport::default();
    let admin = Caller::from(&admin(market, &mut report)?);
    // Keeps generated emails unique across repeated runs.
    let batch = uuid::Uuid::new_v4().simple().to_string();
    let batch = &batch[..8];

    let mut owners = Vec::with_capacity(agents.max(1));
    for i in 0..agents.max(1) {
        let name: String = Name().fake();
        let acc = market.create_account(account(name, format!("agent{i}.{batch}@estatelite.local"), Role::Agent))?;
        owners.push(Caller::from(&acc));
        report.accounts += 1;
    }
    for i in 0..3 {
        let name: String = Name().fake();
        market.create_account(account(name, format!("user{i}.{batch}@estatelite.local"), Role::User))?;
        report.accounts += 1;
    }

    for _ in 0..properties {
        let Some(owner) = owners.choose(&mut rng) else { break };
        let property = market.create_property(owner, listing(&mut rng))?;
        report.properties += 1;
        if rng.random_bool(0.8) {
            market.set_approval(&admin, &property.id, true)?;
            report.approved += 1;
            if rng.random_bool(0.25) {
                market.set_featured(&admin, &property.id, true)?;
                report.featured += 1;
            }
        }
    }
    log::info!(
        "seeded {} accounts and {} properties ({} approved, {} featured)",
        report.accounts,
        report.properties,
        report.approved,
        report.featured
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_listings_validate() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let input = listing(&mut rng);
            assert!(input.into_property("agent", false, "u").is_ok());
        }
    }

    #[test]
    fn seeding_twice_reuses_the_admin() {
        let market = Marketplace::in_memory();
        let first = seed(&market, 2, 10).unwrap();
        assert_eq!(first.properties, 10);
        assert_eq!(first.accounts, 1 + 2 + 3);
        let second = seed(&market, 1, 0).unwrap();
        assert_eq!(second.accounts, 1 + 3);
        assert_eq!(market.accounts().len(), 10);
    }
}
