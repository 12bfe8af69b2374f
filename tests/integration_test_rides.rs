mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use carpool_backend::domain::models::ride::{NewRideParams, Ride};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::{parse_body, post_ride, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_ride_and_list() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");

    let ride_id = post_ride(&app, &host, 3).await;

    let res = app.get("/api/v1/rides", &host).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], ride_id);
    assert_eq!(body[0]["seats_total"], 3);
    assert_eq!(body[0]["seats_available"], 3);
    assert_eq!(body[0]["status"], "active");
    assert_eq!(body[0]["passengers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_ride_rejects_bad_input() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");
    let date = (Utc::now() + Duration::days(7)).format("%Y-%m-%d").to_string();

    // Zero seats
    let res = app
        .post(
            "/api/v1/rides",
            &host,
            json!({
                "origin": "A", "destination": "B", "date": date, "time": "10:00",
                "seats_total": 0, "contact_number": "123"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Garbage date
    let res = app
        .post(
            "/api/v1/rides",
            &host,
            json!({
                "origin": "A", "destination": "B", "date": "soon", "time": "10:00",
                "seats_total": 2, "contact_number": "123"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Departure in the past
    let past = (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string();
    let res = app
        .post(
            "/api/v1/rides",
            &host,
            json!({
                "origin": "A", "destination": "B", "date": past, "time": "10:00",
                "seats_total": 2, "contact_number": "123"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Contact number with no digits would yield a broken wa.me link
    let res = app
        .post(
            "/api/v1/rides",
            &host,
            json!({
                "origin": "A", "destination": "B", "date": date, "time": "10:00",
                "seats_total": 2, "contact_number": "call me"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cross_origin_preflight_is_answered() {
    let app = TestApp::new().await;

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/rides")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_listing_hides_departed_and_cancelled_rides() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");

    let visible_id = post_ride(&app, &host, 2).await;

    // A ride whose departure already passed, inserted through the repo since
    // the API refuses to create one.
    let departed = Ride::new(NewRideParams {
        host_email: "host@example.edu".into(),
        host_name: "Host".into(),
        origin: "Campus".into(),
        destination: "Station".into(),
        date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        depart_at: Utc::now() - Duration::days(1),
        contact_number: "123".into(),
        seats_total: 2,
    });
    app.state.ride_repo.create(&departed).await.unwrap();

    let cancelled_id = post_ride(&app, &host, 2).await;
    let res = app
        .post(&format!("/api/v1/rides/{}/cancel", cancelled_id), &host, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.get("/api/v1/rides", &host).await;
    let body = parse_body(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], visible_id);
}

#[tokio::test]
async fn test_listing_is_newest_first() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");

    let first = post_ride(&app, &host, 1).await;
    let second = post_ride(&app, &host, 1).await;

    let res = app.get("/api/v1/rides", &host).await;
    let body = parse_body(res).await;
    assert_eq!(body[0]["id"], second);
    assert_eq!(body[1]["id"], first);
}

#[tokio::test]
async fn test_my_rides_includes_requests() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");
    let passenger = app.identity_token("p1@example.edu", "P One");

    let ride_id = post_ride(&app, &host, 2).await;
    common::join_ride(&app, &passenger, &ride_id).await;

    let res = app.get("/api/v1/my-rides", &host).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["requests"].as_array().unwrap().len(), 1);
    assert_eq!(body[0]["requests"][0]["passenger_email"], "p1@example.edu");
}

#[tokio::test]
async fn test_identity_required_and_domain_restricted() {
    let app = TestApp::new().await;

    // No token
    let res = app.get("/api/v1/rides", "").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Valid token, wrong domain
    let outsider = app.identity_token("stranger@elsewhere.com", "Stranger");
    let res = app.get("/api/v1/rides", &outsider).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Garbage token
    let res = app.get("/api/v1/rides", "not-a-jwt").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
