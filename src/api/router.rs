use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{health, notification, ride, ride_request};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Ride catalog
        .route("/api/v1/rides", get(ride::list_rides).post(ride::create_ride))
        .route("/api/v1/rides/{ride_id}", get(ride::get_ride))
        .route("/api/v1/rides/{ride_id}/cancel", post(ride::cancel_ride))
        .route("/api/v1/my-rides", get(ride::list_my_rides))

        // Request lifecycle
        .route(
            "/api/v1/rides/{ride_id}/requests",
            get(ride::list_ride_requests).post(ride_request::create_request),
        )
        .route("/api/v1/requests/{request_id}/respond", post(ride_request::respond))
        .route("/api/v1/requests/redeem", post(ride_request::redeem))

        // Notifications
        .route("/api/v1/notifications", get(notification::list_notifications))
        .route("/api/v1/notifications/{notification_id}/read", post(notification::mark_read))
        .route(
            "/api/v1/notifications/{notification_id}",
            delete(notification::delete_notification),
        )

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_email = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                }),
        )
        // The frontend is served from a different origin than the API.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
