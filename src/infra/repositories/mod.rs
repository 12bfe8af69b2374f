pub mod sqlite_notification_repo;
pub mod sqlite_request_repo;
pub mod sqlite_ride_repo;

pub mod postgres_notification_repo;
pub mod postgres_request_repo;
pub mod postgres_ride_repo;
