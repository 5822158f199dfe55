use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::tenancy::{tenancy_router, LeaseStatus};

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn lease_payload(portfolio: &Portfolio, start: &str, end: &str) -> Value {
    json!({
        "property_id": portfolio.property.id,
        "tenant_id": portfolio.tenant.id,
        "start_date": start,
        "end_date": end,
        "rent": 1200,
        "deposit": 1800
    })
}

#[tokio::test]
async fn create_landlord_route_returns_created() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(post_json("/api/v1/landlords", json!({ "name": "Acme Holdings" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["name"], "Acme Holdings");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn blank_landlord_name_is_unprocessable() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(post_json("/api/v1/landlords", json!({ "name": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn overlapping_lease_route_returns_conflict() {
    let service = build_service();
    let portfolio = seed(&service);
    let router = router_with_service(service);

    let first = router
        .clone()
        .oneshot(post_json(
            "/api/v1/leases",
            lease_payload(&portfolio, "2024-01-01", "2024-12-31"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = read_json_body(first).await;
    assert_eq!(first["status"], "PENDING");

    let second = router
        .oneshot(post_json(
            "/api/v1/leases",
            lease_payload(&portfolio, "2024-12-31", "2025-06-30"),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = read_json_body(second).await;
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn lease_lifecycle_routes_follow_the_state_machine() {
    let service = build_service();
    let portfolio = seed(&service);
    let lease = service
        .create_lease(lease_terms(&portfolio, day(2024, 1, 1), day(2024, 12, 31)))
        .expect("drafted");
    let router = router_with_service(service);

    let activated = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/leases/{}/activate", lease.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(activated.status(), StatusCode::OK);
    assert_eq!(read_json_body(activated).await["status"], "ACTIVE");

    let again = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/leases/{}/activate", lease.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(read_json_body(again).await["kind"], "invalid_transition");

    let expiry = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/leases/{}/expiry?as_of=2025-01-01", lease.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(expiry.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(expiry).await["status"],
        json!(LeaseStatus::Expired)
    );

    let terminate = router
        .oneshot(post_json(
            &format!("/api/v1/leases/{}/terminate", lease.id),
            json!({ "reason": "too late" }),
        ))
        .await
        .unwrap();
    assert_eq!(terminate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_lease_route_returns_not_found() {
    let router = router_with_service(build_service());

    let response = router.oneshot(get("/api/v1/leases/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn availability_route_reports_occupied_window() {
    let service = build_service();
    let portfolio = seed(&service);
    active_lease(&service, &portfolio);
    let router = router_with_service(service);

    let uri = format!(
        "/api/v1/properties/{}/availability?start_date=2024-03-01&end_date=2024-03-31",
        portfolio.property.id
    );
    let response = router.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["available"], false);
    assert_eq!(body["start_date"], "2024-03-01");
}

#[tokio::test]
async fn co_tenant_routes_add_list_and_remove() {
    let service = build_service();
    let portfolio = seed(&service);
    let lease = active_lease(&service, &portfolio);
    let partner = tenant(&service, "Alex Lee");
    let router = router_with_service(service);
    let collection = format!("/api/v1/leases/{}/co-tenants", lease.id);

    let added = router
        .clone()
        .oneshot(post_json(&collection, json!({ "tenant_id": partner.id })))
        .await
        .unwrap();
    assert_eq!(added.status(), StatusCode::CREATED);

    let duplicate = router
        .clone()
        .oneshot(post_json(&collection, json!({ "tenant_id": partner.id })))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed = router.clone().oneshot(get(&collection)).await.unwrap();
    let rows = read_json_body(listed).await;
    assert_eq!(rows.as_array().map(Vec::len), Some(1));

    let removed = router
        .oneshot(
            Request::delete(format!("{collection}/{}", partner.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn expiring_report_uses_the_default_window() {
    let service = build_service();
    let portfolio = seed(&service);
    let lease = service
        .create_lease(lease_terms(&portfolio, day(2024, 1, 1), day(2024, 2, 1)))
        .expect("drafted");
    service.activate_lease(&lease.id).expect("activated");
    let router = router_with_service(service);

    let default_window = router
        .clone()
        .oneshot(get("/api/v1/reports/expiring-leases"))
        .await
        .unwrap();
    let rows = read_json_body(default_window).await;
    assert_eq!(rows.as_array().map(Vec::len), Some(1));

    let narrow = router
        .oneshot(get("/api/v1/reports/expiring-leases?within_days=7"))
        .await
        .unwrap();
    let rows = read_json_body(narrow).await;
    assert_eq!(rows.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let router = tenancy_router(Arc::new(unavailable_service()), 30);

    let response = router
        .oneshot(post_json("/api/v1/tenants", json!({ "name": "Sarah Lee" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "store_unavailable");
}
