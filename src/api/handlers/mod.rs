pub mod health;
pub mod notification;
pub mod ride;
pub mod ride_request;
