mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{Fixture, listing};
use estatelite::http::{AppState, USER_HEADER, create_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(fx: &Fixture) -> Router {
    create_router(AppState::new(fx.market.clone()), &[])
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(u) = user {
        b = b.header(USER_HEADER, u);
    }
    b.body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(u) = user {
        b = b.header(USER_HEADER, u);
    }
    b.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_reports_running() {
    let fx = Fixture::new();
    let (status, body) = send(&router(&fx), get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn listing_envelope_and_pagination() {
    let fx = Fixture::new();
    for i in 0..3 {
        fx.property(listing(&format!("Home {i}"), 100_000.0, "Austin"), true);
    }
    let app = router(&fx);
    let (status, body) = send(&app, get("/api/properties?limit=2&sort=-price", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["properties"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pagination"]["total"], json!(3));
    assert_eq!(body["data"]["pagination"]["pages"], json!(2));

    let (status, body) = send(&app, get("/api/properties?limit=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn detail_counts_views_and_hides_pending() {
    let fx = Fixture::new();
    let id = fx.property(listing("Home", 100_000.0, "Austin"), true);
    let pending = fx.property(listing("Pending", 100_000.0, "Austin"), false);
    let app = router(&fx);

    let (status, body) = send(&app, get(&format!("/api/properties/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["property"]["views"], json!(1));
    assert!(body["data"]["similarProperties"].is_array());

    let (status, _) = send(&app, get(&format!("/api/properties/{pending}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get(&format!("/api/properties/{pending}"), Some(&fx.agent.id))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn auth_failures_map_to_401_and_403() {
    let fx = Fixture::new();
    let app = router(&fx);

    let (status, _) = send(&app, get("/api/wishlist", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, get("/api/wishlist", Some("ghost"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, get("/api/dashboard/admin", Some(&fx.user.id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    fx.market.set_blocked(&fx.admin, &fx.user.id, true).unwrap();
    let (status, _) = send(&app, get("/api/properties", Some(&fx.user.id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_update_and_delete_property() {
    let fx = Fixture::new();
    let app = router(&fx);
    let body = json!({
        "title": "Garden flat",
        "description": "Ground floor with a garden",
        "price": 240000,
        "type": "buy",
        "category": "apartment",
        "location": {"address": "1 Main St", "city": "Austin", "state": "TX", "zipCode": "73301"},
        "features": {"bedrooms": 2, "bathrooms": 1, "area": 800},
        "amenities": ["garden"]
    });
    let (status, created) = send(&app, with_json("POST", "/api/properties", Some(&fx.agent.id), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["property"]["_id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["property"]["isApproved"], json!(false));

    let (status, _) = send(&app, with_json("POST", "/api/properties", Some(&fx.user.id), &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let patch = json!({"price": 230000});
    let (status, updated) =
        send(&app, with_json("PUT", &format!("/api/properties/{id}"), Some(&fx.agent.id), &patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["property"]["price"], json!(230000.0));

    let approve = json!({"isApproved": true});
    let uri = format!("/api/properties/{id}/approve");
    let (status, _) = send(&app, with_json("PATCH", &uri, Some(&fx.agent.id), &approve)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, approved) = send(&app, with_json("PATCH", &uri, Some(&fx.admin.id), &approve)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["data"]["property"]["isApproved"], json!(true));

    let del = Request::builder()
        .method("DELETE")
        .uri(format!("/api/properties/{id}"))
        .header(USER_HEADER, fx.agent.id.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, del).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fx.market.find_property(&id).unwrap().is_none());
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let fx = Fixture::new();
    let app = router(&fx);
    let req = Request::builder()
        .method("POST")
        .uri("/api/properties")
        .header(USER_HEADER, fx.agent.id.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(&app, with_json("POST", "/api/properties", Some(&fx.agent.id), &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].as_array().is_some_and(|e| e.len() > 1));
}

#[tokio::test]
async fn unreadable_query_strings_use_the_error_envelope() {
    let fx = Fixture::new();
    let app = router(&fx);
    for (uri, user) in [
        ("/api/properties?page=1&page=2", None),
        ("/api/properties/featured?limit=1&limit=2", None),
        ("/api/inquiries/received?page=1&page=2", Some(fx.agent.id.as_str())),
        ("/api/admin/users?role=agent&role=user", Some(fx.admin.id.as_str())),
    ] {
        let (status, body) = send(&app, get(uri, user)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], json!(false), "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn wishlist_and_inquiry_endpoints() {
    let fx = Fixture::new();
    let id = fx.property(listing("Home", 100_000.0, "Austin"), true);
    let app = router(&fx);

    let add = Request::builder()
        .method("POST")
        .uri(format!("/api/wishlist/{id}"))
        .header(USER_HEADER, fx.user.id.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, add).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["wishlist"], json!([id.clone()]));

    let (status, body) = send(&app, get("/api/wishlist", Some(&fx.user.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["wishlist"][0]["title"], json!("Home"));

    let inquiry = json!({"property": id, "message": "Can I visit on Saturday?"});
    let (status, _) = send(&app, with_json("POST", "/api/inquiries", Some(&fx.user.id), &inquiry)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, get("/api/inquiries/received", Some(&fx.agent.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], json!(1));
}
