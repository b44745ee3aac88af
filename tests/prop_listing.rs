mod common;

use common::{Fixture, listing};
use estatelite::listing::{ListingParams, PageRequest, Pagination};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_pages_cover_the_total(total in 0usize..500, limit in 1usize..60, page in 1usize..20) {
        let p = Pagination::new(PageRequest { page, limit }, total);
        prop_assert!(p.pages * limit >= total);
        prop_assert!(p.pages == 0 || (p.pages - 1) * limit < total);
        prop_assert_eq!(PageRequest { page, limit }.skip(), (page - 1) * limit);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_price_window_and_visibility(
        prices in proptest::collection::vec((1u32..2_000, any::<bool>()), 1..15),
        lo in 0u32..1_000,
        span in 0u32..1_500,
    ) {
        let fx = Fixture::new();
        for (i, (price, approved)) in prices.iter().enumerate() {
            fx.property(listing(&format!("Home {i}"), f64::from(*price), "Austin"), *approved);
        }
        let hi = lo + span;
        let q = ListingParams {
            price_min: Some(lo.to_string()),
            price_max: Some(hi.to_string()),
            limit: Some("50".into()),
            sort: Some("price".into()),
            ..ListingParams::default()
        };
        let page = fx.market.list_properties(None, &q).unwrap();
        let expected = prices.iter().filter(|(p, a)| *a && (lo..=hi).contains(p)).count();
        prop_assert_eq!(page.pagination.total, expected);
        prop_assert!(page.items.iter().all(|p| p.is_approved));
        prop_assert!(page.items.windows(2).all(|w| w[0].price <= w[1].price));
        prop_assert!(page.items.iter().all(|p| p.price >= f64::from(lo) && p.price <= f64::from(hi)));
    }
}
