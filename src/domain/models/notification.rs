use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const KIND_NEW_REQUEST: &str = "new_request";
pub const KIND_REQUEST_APPROVED: &str = "request_approved";
pub const KIND_REQUEST_REJECTED: &str = "request_rejected";
pub const KIND_RIDE_CANCELLED: &str = "ride_cancelled";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub owner_email: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(owner_email: String, kind: &str, title: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_email,
            kind: kind.to_string(),
            title,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
