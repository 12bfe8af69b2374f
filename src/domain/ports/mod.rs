use crate::domain::models::{notification::Notification, request::RideRequest, ride::Ride};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RideRepository: Send + Sync {
    async fn create(&self, ride: &Ride) -> Result<Ride, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Ride>, AppError>;
    /// Active rides with seats left and a departure after `now`, newest
    /// posting first.
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Ride>, AppError>;
    async fn list_by_host(&self, host_email: &str) -> Result<Vec<Ride>, AppError>;
    /// Flip the ride to cancelled and withdraw every live request, releasing
    /// a seat per formerly approved one, all in one transaction. Returns the
    /// cancelled ride and the affected requests in their pre-cascade states.
    async fn cancel_cascade(&self, ride_id: &str) -> Result<(Ride, Vec<RideRequest>), AppError>;
}

#[async_trait]
pub trait RideRequestRepository: Send + Sync {
    /// Insert a pending request, re-validating inside the transaction that
    /// the ride is still active with seats left and that the passenger has
    /// no live request on it.
    async fn create(&self, request: &RideRequest) -> Result<RideRequest, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<RideRequest>, AppError>;
    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<RideRequest>, AppError>;
    /// Atomically reserve a seat and flip the request pending -> approved.
    /// On `NoSeatsAvailable` the request is left pending.
    async fn approve_pending(&self, request_id: &str) -> Result<RideRequest, AppError>;
    /// Flip the request pending -> rejected. No seat accounting.
    async fn reject_pending(&self, request_id: &str) -> Result<RideRequest, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, owner_email: &str, id: &str) -> Result<Notification, AppError>;
    async fn delete(&self, owner_email: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str)
    -> Result<(), AppError>;
}
