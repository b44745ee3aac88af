#![allow(dead_code)]

use estatelite::listing::Caller;
use estatelite::models::{AccountInput, FeaturesInput, LocationInput, PropertyInput, Role};
use estatelite::Marketplace;

pub fn account(market: &Marketplace, name: &str, role: Role) -> Caller {
    let acc = market
        .create_account(AccountInput {
            name: Some(name.into()),
            email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
            role: Some(role.as_str().into()),
            phone: None,
        })
        .unwrap();
    Caller::from(&acc)
}

pub fn listing(title: &str, price: f64, city: &str) -> PropertyInput {
    PropertyInput {
        title: Some(title.into()),
        description: Some(format!("{title} with plenty of light")),
        price: Some(price),
        listing_type: Some("buy".into()),
        category: Some("house".into()),
        status: None,
        location: Some(LocationInput {
            address: Some("12 Elm Street".into()),
            city: Some(city.into()),
            state: Some("TX".into()),
            zip_code: Some("73301".into()),
            country: None,
            coordinates: None,
        }),
        features: Some(FeaturesInput {
            bedrooms: Some(3),
            bathrooms: Some(2),
            area: Some(1500.0),
            area_unit: None,
            parking: Some(1),
            furnished: None,
            year_built: Some(2001),
        }),
        amenities: Some(vec!["pool".into(), "garden".into()]),
        images: None,
        is_approved: None,
        is_featured: None,
    }
}

/// A market with one admin, one agent and one plain user.
pub struct Fixture {
    pub market: Marketplace,
    pub admin: Caller,
    pub agent: Caller,
    pub user: Caller,
}

impl Fixture {
    pub fn new() -> Self {
        let market = Marketplace::in_memory();
        let admin = account(&market, "Ada Admin", Role::Admin);
        let agent = account(&market, "Sam Agent", Role::Agent);
        let user = account(&market, "Uma User", Role::User);
        Self { market, admin, agent, user }
    }

    /// Creates a listing as the agent, approved by the admin when `approved`.
    pub fn property(&self, input: PropertyInput, approved: bool) -> String {
        let p = self.market.create_property(&self.agent, input).unwrap();
        if approved {
            self.market.set_approval(&self.admin, &p.id, true).unwrap();
        }
        p.id
    }
}
