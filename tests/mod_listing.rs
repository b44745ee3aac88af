mod common;

use common::{Fixture, account, listing};
use estatelite::AppError;
use estatelite::listing::{ListingParams, MyPropertiesParams};
use estatelite::models::{PropertyInput, Role};

fn params() -> ListingParams {
    ListingParams::default()
}

#[test]
fn price_bounds_and_amenities_are_applied() {
    let fx = Fixture::new();
    fx.property(listing("Cheap cottage", 90_000.0, "Austin"), true);
    fx.property(listing("Mid house", 250_000.0, "Austin"), true);
    let mut no_garden = listing("Pricey villa", 900_000.0, "Austin");
    no_garden.amenities = Some(vec!["pool".into()]);
    fx.property(no_garden, true);

    let q = ListingParams { price_min: Some("100000".into()), price_max: Some("1000000".into()), ..params() };
    let page = fx.market.list_properties(None, &q).unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|p| (100_000.0..=1_000_000.0).contains(&p.price)));

    let q = ListingParams { amenities: Some("pool, garden".into()), ..params() };
    let page = fx.market.list_properties(None, &q).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(page.pagination.total, 2);
    assert!(!titles.contains(&"Pricey villa"));
}

#[test]
fn unapproved_listings_are_hidden_from_the_public() {
    let fx = Fixture::new();
    fx.property(listing("Approved", 100_000.0, "Denver"), true);
    fx.property(listing("Pending", 100_000.0, "Denver"), false);

    for caller in [None, Some(&fx.user)] {
        let page = fx.market.list_properties(caller, &params()).unwrap();
        assert_eq!(page.pagination.total, 1);
        assert!(page.items.iter().all(|p| p.is_approved));
    }
    let own = fx.market.list_properties(Some(&fx.agent), &params()).unwrap();
    assert_eq!(own.pagination.total, 2);
    let admin = fx.market.list_properties(Some(&fx.admin), &params()).unwrap();
    assert_eq!(admin.pagination.total, 2);
}

#[test]
fn foreign_pending_listings_are_listed_for_agents_but_not_readable() {
    let fx = Fixture::new();
    let id = fx.property(listing("Pending", 100_000.0, "Denver"), false);
    let other = account(&fx.market, "Otto Agent", Role::Agent);
    let page = fx.market.list_properties(Some(&other), &params()).unwrap();
    assert_eq!(page.pagination.total, 1);
    assert!(matches!(fx.market.get_property(Some(&other), &id), Err(AppError::NotFound(_))));
}

#[test]
fn concurrent_reads_count_every_view() {
    let fx = Fixture::new();
    let id = fx.property(listing("Busy", 250_000.0, "Austin"), true);
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..25 {
                    fx.market.get_property(None, &id).unwrap();
                }
            });
        }
    });
    assert_eq!(fx.market.find_property(&id).unwrap().unwrap().views, 200);
}

#[test]
fn viewing_counts_for_everyone_but_the_owner() {
    let fx = Fixture::new();
    let id = fx.property(listing("Loft", 300_000.0, "Seattle"), true);

    let seen = fx.market.get_property(None, &id).unwrap();
    assert_eq!(seen.property.views, 1);
    let seen = fx.market.get_property(Some(&fx.user), &id).unwrap();
    assert_eq!(seen.property.views, 2);
    let own = fx.market.get_property(Some(&fx.agent), &id).unwrap();
    assert_eq!(own.property.views, 2);
}

#[test]
fn pending_listing_is_not_found_for_strangers() {
    let fx = Fixture::new();
    let id = fx.property(listing("Hidden", 300_000.0, "Seattle"), false);

    assert!(matches!(fx.market.get_property(None, &id), Err(AppError::NotFound(_))));
    assert!(matches!(fx.market.get_property(Some(&fx.user), &id), Err(AppError::NotFound(_))));
    let own = fx.market.get_property(Some(&fx.agent), &id).unwrap();
    assert_eq!(own.property.views, 0);
    let admin = fx.market.get_property(Some(&fx.admin), &id).unwrap();
    assert_eq!(admin.property.views, 0);
    assert!(matches!(fx.market.get_property(None, "not-an-id"), Err(AppError::NotFound(_))));
}

#[test]
fn second_page_of_twelve() {
    let fx = Fixture::new();
    for i in 0..12 {
        fx.property(listing(&format!("Home {i}"), 100_000.0 + f64::from(i), "Austin"), true);
    }
    let q = ListingParams { page: Some("2".into()), limit: Some("5".into()), ..params() };
    let page = fx.market.list_properties(None, &q).unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.pagination.total, 12);

    let q = ListingParams { page: Some("3".into()), limit: Some("5".into()), ..params() };
    assert_eq!(fx.market.list_properties(None, &q).unwrap().items.len(), 2);
}

#[test]
fn price_descending_sort() {
    let fx = Fixture::new();
    for price in [200_000.0, 500_000.0, 100_000.0] {
        fx.property(listing("Home", price, "Austin"), true);
    }
    let q = ListingParams { sort: Some("-price".into()), ..params() };
    let prices: Vec<f64> = fx.market.list_properties(None, &q).unwrap().items.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![500_000.0, 200_000.0, 100_000.0]);

    let q = ListingParams { sort: Some("price".into()), ..params() };
    let prices: Vec<f64> = fx.market.list_properties(None, &q).unwrap().items.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![100_000.0, 200_000.0, 500_000.0]);
}

#[test]
fn unknown_sort_falls_back_to_newest_first() {
    let fx = Fixture::new();
    for i in 0..3 {
        fx.property(listing(&format!("Home {i}"), 100_000.0, "Austin"), true);
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    let q = ListingParams { sort: Some("bogus".into()), ..params() };
    let titles: Vec<String> = fx.market.list_properties(None, &q).unwrap().items.into_iter().map(|p| p.title).collect();
    assert_eq!(titles, vec!["Home 2", "Home 1", "Home 0"]);
}

#[test]
fn out_of_range_paging_is_rejected() {
    let fx = Fixture::new();
    let q = ListingParams { limit: Some("500".into()), ..params() };
    assert!(matches!(fx.market.list_properties(None, &q), Err(AppError::Validation(_))));
    let q = ListingParams { page: Some("0".into()), ..params() };
    assert!(matches!(fx.market.list_properties(None, &q), Err(AppError::Validation(_))));
    let q = ListingParams { page: Some("abc".into()), ..params() };
    assert_eq!(fx.market.list_properties(None, &q).unwrap().pagination.page, 1);
}

#[test]
fn location_and_search_filters() {
    let fx = Fixture::new();
    fx.property(listing("Sunny loft", 100_000.0, "Austin"), true);
    fx.property(listing("Quiet cabin", 100_000.0, "Denver"), true);

    let q = ListingParams { location: Some("aUsT".into()), ..params() };
    assert_eq!(fx.market.list_properties(None, &q).unwrap().pagination.total, 1);
    let q = ListingParams { search: Some("cabin".into()), ..params() };
    let page = fx.market.list_properties(None, &q).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Quiet cabin");
    let q = ListingParams { location: Some("a.b(".into()), ..params() };
    assert_eq!(fx.market.list_properties(None, &q).unwrap().pagination.total, 0);
}

#[test]
fn similar_listings_share_type_category_and_city() {
    let fx = Fixture::new();
    let id = fx.property(listing("Main", 100_000.0, "Austin"), true);
    for i in 0..5 {
        fx.property(listing(&format!("Twin {i}"), 100_000.0, "Austin"), true);
    }
    fx.property(listing("Elsewhere", 100_000.0, "Denver"), true);
    fx.property(listing("Unapproved twin", 100_000.0, "Austin"), false);

    let detail = fx.market.get_property(None, &id).unwrap();
    assert_eq!(detail.similar_properties.len(), 4);
    assert!(detail.similar_properties.iter().all(|p| p.id != id && p.is_approved && p.location.city == "Austin"));
}

#[test]
fn placeholder_image_when_none_given() {
    let fx = Fixture::new();
    let id = fx.property(listing("Bare", 100_000.0, "Austin"), true);
    let p = fx.market.find_property(&id).unwrap().unwrap();
    assert_eq!(p.images.len(), 1);
    assert_eq!(p.images[0].url, fx.market.settings().placeholder_image_url);
}

#[test]
fn only_managers_create_and_only_owners_modify() {
    let fx = Fixture::new();
    let err = fx.market.create_property(&fx.user, listing("Nope", 1.0, "Austin")).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let id = fx.property(listing("Mine", 100_000.0, "Austin"), true);
    let other = account(&fx.market, "Otto Agent", Role::Agent);
    let patch = PropertyInput { price: Some(1.0), ..PropertyInput::default() };
    assert!(matches!(fx.market.update_property(&other, &id, patch.clone()), Err(AppError::Forbidden(_))));
    assert!(matches!(fx.market.delete_property(&other, &id), Err(AppError::Forbidden(_))));

    let updated = fx.market.update_property(&fx.admin, &id, patch).unwrap();
    assert!((updated.price - 1.0).abs() < f64::EPSILON);
}

#[test]
fn owner_cannot_self_approve() {
    let fx = Fixture::new();
    let id = fx.property(listing("Sneaky", 100_000.0, "Austin"), false);
    let patch = PropertyInput { is_approved: Some(true), is_featured: Some(true), ..PropertyInput::default() };
    let p = fx.market.update_property(&fx.agent, &id, patch).unwrap();
    assert!(!p.is_approved);
    assert!(!p.is_featured);
    assert!(matches!(fx.market.set_approval(&fx.agent, &id, true), Err(AppError::Forbidden(_))));
}

#[test]
fn admin_created_listing_starts_approved() {
    let fx = Fixture::new();
    let p = fx.market.create_property(&fx.admin, listing("Admin's", 100_000.0, "Austin")).unwrap();
    assert!(p.is_approved);
}

#[test]
fn featured_requires_approval_and_flag() {
    let fx = Fixture::new();
    let a = fx.property(listing("Approved", 1.0, "Austin"), true);
    let b = fx.property(listing("Pending", 1.0, "Austin"), false);
    fx.market.set_featured(&fx.admin, &a, true).unwrap();
    fx.market.set_featured(&fx.admin, &b, true).unwrap();
    let featured = fx.market.featured_properties(None).unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id, a);
}

#[test]
fn status_changes_are_validated() {
    let fx = Fixture::new();
    let id = fx.property(listing("Home", 1.0, "Austin"), true);
    assert!(matches!(fx.market.set_status(&fx.agent, &id, Some("haunted")), Err(AppError::Validation(_))));
    assert!(matches!(fx.market.set_status(&fx.agent, &id, None), Err(AppError::Validation(_))));
    let p = fx.market.set_status(&fx.agent, &id, Some("sold")).unwrap();
    assert_eq!(p.status.as_str(), "sold");
}

#[test]
fn my_properties_include_pending() {
    let fx = Fixture::new();
    fx.property(listing("A", 1.0, "Austin"), true);
    fx.property(listing("B", 1.0, "Austin"), false);
    let all = fx.market.my_properties(&fx.agent, &MyPropertiesParams::default()).unwrap();
    assert_eq!(all.pagination.total, 2);
    let pending = MyPropertiesParams { is_approved: Some("false".into()), ..MyPropertiesParams::default() };
    assert_eq!(fx.market.my_properties(&fx.agent, &pending).unwrap().pagination.total, 1);
    assert!(matches!(
        fx.market.my_properties(&fx.user, &MyPropertiesParams::default()),
        Err(AppError::Forbidden(_))
    ));
}
