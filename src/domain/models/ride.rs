use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ride {
    pub id: String,
    pub host_email: String,
    pub host_name: String,
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// UTC instant derived from `date` + `time` in the community timezone.
    /// Listing eligibility is decided against this, never against the naive
    /// fields.
    pub depart_at: DateTime<Utc>,
    pub contact_number: String,
    pub seats_total: i64,
    pub seats_available: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewRideParams {
    pub host_email: String,
    pub host_name: String,
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub depart_at: DateTime<Utc>,
    pub contact_number: String,
    pub seats_total: i64,
}

impl Ride {
    pub fn new(params: NewRideParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            host_email: params.host_email,
            host_name: params.host_name,
            origin: params.origin,
            destination: params.destination,
            date: params.date,
            time: params.time,
            depart_at: params.depart_at,
            contact_number: params.contact_number,
            seats_total: params.seats_total,
            seats_available: params.seats_total,
            status: STATUS_ACTIVE.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}
