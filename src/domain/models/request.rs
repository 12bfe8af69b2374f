use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const STATE_PENDING: &str = "pending";
pub const STATE_APPROVED: &str = "approved";
pub const STATE_REJECTED: &str = "rejected";
pub const STATE_WITHDRAWN: &str = "withdrawn";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RideRequest {
    pub id: String,
    pub ride_id: String,
    pub passenger_email: String,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl RideRequest {
    pub fn new(
        ride_id: String,
        passenger_email: String,
        passenger_name: String,
        passenger_phone: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ride_id,
            passenger_email,
            passenger_name,
            passenger_phone,
            state: STATE_PENDING.to_string(),
            created_at: Utc::now(),
        }
    }

    /// A live request blocks further requests by the same passenger and is
    /// swept up by a ride-cancellation cascade.
    pub fn is_live(&self) -> bool {
        self.state == STATE_PENDING || self.state == STATE_APPROVED
    }
}

/// The two outcomes a host can pick for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl FromStr for DecisionAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionAction::Approve),
            "reject" => Ok(DecisionAction::Reject),
            _ => Err(AppError::Validation(
                "action must be 'approve' or 'reject'".into(),
            )),
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionAction::Approve => write!(f, "approve"),
            DecisionAction::Reject => write!(f, "reject"),
        }
    }
}
