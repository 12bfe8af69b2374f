mod common;

use axum::http::StatusCode;
use common::{join_ride, parse_body, post_ride, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_only_the_host_may_cancel() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");
    let meddler = app.identity_token("other@example.edu", "Other");

    let ride_id = post_ride(&app, &host, 2).await;
    let res = app
        .post(&format!("/api/v1/rides/{}/cancel", ride_id), &meddler, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get(&format!("/api/v1/rides/{}", ride_id), &host).await;
    assert_eq!(parse_body(res).await["status"], "active");
}

#[tokio::test]
async fn test_cancellation_withdraws_requests_and_notifies_passengers() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");
    let p1 = app.identity_token("p1@example.edu", "P One");
    let p2 = app.identity_token("p2@example.edu", "P Two");

    let ride_id = post_ride(&app, &host, 2).await;

    let b1 = join_ride(&app, &p1, &ride_id).await;
    let r1 = b1["request"]["id"].as_str().unwrap().to_string();
    app.post(&format!("/api/v1/requests/{}/respond", r1), &host, json!({ "action": "approve" }))
        .await;

    join_ride(&app, &p2, &ride_id).await;

    let res = app
        .post(&format!("/api/v1/rides/{}/cancel", ride_id), &host, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cancelled = parse_body(res).await;
    assert_eq!(cancelled["status"], "cancelled");
    // The approved seat came back with the cancellation.
    assert_eq!(cancelled["seats_available"], 2);

    // Both the approved and the pending request end up withdrawn.
    let res = app.get(&format!("/api/v1/rides/{}/requests", ride_id), &host).await;
    let requests = parse_body(res).await;
    assert_eq!(requests.as_array().unwrap().len(), 2);
    for request in requests.as_array().unwrap() {
        assert_eq!(request["state"], "withdrawn");
    }

    // Each passenger hears about it; the host gets no self-notification.
    for passenger in [&p1, &p2] {
        let res = app.get("/api/v1/notifications", passenger).await;
        let inbox = parse_body(res).await;
        let kinds: Vec<&str> = inbox
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["kind"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"ride_cancelled"));
    }
    let res = app.get("/api/v1/notifications", &host).await;
    let host_kinds: Vec<String> = parse_body(res)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap().to_string())
        .collect();
    assert!(!host_kinds.contains(&"ride_cancelled".to_string()));
}

#[tokio::test]
async fn test_cancel_twice_is_refused() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");

    let ride_id = post_ride(&app, &host, 2).await;
    let res = app
        .post(&format!("/api/v1/rides/{}/cancel", ride_id), &host, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .post(&format!("/api/v1/rides/{}/cancel", ride_id), &host, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["code"], "ride_not_active");
}

#[tokio::test]
async fn test_cancelled_ride_refuses_new_requests_and_decisions() {
    let app = TestApp::new().await;
    let host = app.identity_token("host@example.edu", "Host");
    let p1 = app.identity_token("p1@example.edu", "P One");
    let p2 = app.identity_token("p2@example.edu", "P Two");

    let ride_id = post_ride(&app, &host, 2).await;
    let body = join_ride(&app, &p1, &ride_id).await;
    let request_id = body["request"]["id"].as_str().unwrap().to_string();

    app.post(&format!("/api/v1/rides/{}/cancel", ride_id), &host, json!({}))
        .await;

    // No new requests.
    let res = app
        .post(
            &format!("/api/v1/rides/{}/requests", ride_id),
            &p2,
            json!({ "passenger_phone": "+912222222222" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["code"], "ride_not_active");

    // No late decisions on the withdrawn request either.
    let res = app
        .post(&format!("/api/v1/requests/{}/respond", request_id), &host, json!({ "action": "approve" }))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["code"], "ride_not_active");
}
