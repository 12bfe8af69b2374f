use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateRideRequest {
    /// Display name shown on the posting; falls back to the identity name.
    pub host_name: Option<String>,
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub seats_total: i64,
    pub contact_number: String,
}

#[derive(Deserialize)]
pub struct JoinRideRequest {
    pub passenger_phone: String,
    pub passenger_name: Option<String>,
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub action: String,
}

#[derive(Deserialize)]
pub struct RedeemRequest {
    pub request_id: String,
    pub action: String,
    pub token: String,
}
