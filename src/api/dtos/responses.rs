use crate::domain::models::{
    request::{RideRequest, STATE_APPROVED},
    ride::Ride,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct PassengerSummary {
    pub name: String,
    pub email: String,
}

/// A ride plus the passenger list derived from its approved requests.
#[derive(Serialize)]
pub struct RideResponse {
    #[serde(flatten)]
    pub ride: Ride,
    pub passengers: Vec<PassengerSummary>,
}

impl RideResponse {
    pub fn new(ride: Ride, requests: &[RideRequest]) -> Self {
        let passengers = requests
            .iter()
            .filter(|r| r.state == STATE_APPROVED)
            .map(|r| PassengerSummary {
                name: r.passenger_name.clone(),
                email: r.passenger_email.clone(),
            })
            .collect();
        Self { ride, passengers }
    }
}

/// A hosted ride with its full request list, for the host dashboard.
#[derive(Serialize)]
pub struct HostedRideResponse {
    #[serde(flatten)]
    pub ride: Ride,
    pub requests: Vec<RideRequest>,
}

#[derive(Serialize)]
pub struct CreatedRequestResponse {
    pub request: RideRequest,
    pub approve_link: String,
    pub reject_link: String,
    pub whatsapp_link: String,
}

#[derive(Serialize)]
pub struct RedeemResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passenger_phone: Option<String>,
}
