//! Seat inventory arithmetic. The only code allowed to move
//! `seats_available`; repositories persist the result under a
//! compare-and-swap guard on the observed value.

use crate::domain::models::ride::Ride;
use crate::error::AppError;

/// Take one seat. Fails if the ride is not active or the inventory is
/// exhausted at this moment — a pending request never holds a seat, so a
/// request that was valid when created can still lose the race here.
pub fn try_reserve(ride: &mut Ride) -> Result<(), AppError> {
    if !ride.is_active() {
        return Err(AppError::RideNotActive);
    }
    if ride.seats_available <= 0 {
        return Err(AppError::NoSeatsAvailable);
    }
    ride.seats_available -= 1;
    Ok(())
}

/// Give one seat back. Only the ride-cancellation cascade calls this, once
/// per request that was approved at cancellation time.
pub fn release(ride: &mut Ride) -> Result<(), AppError> {
    if ride.seats_available >= ride.seats_total {
        return Err(AppError::InternalWithMsg(format!(
            "seat release would exceed capacity on ride {}",
            ride.id
        )));
    }
    ride.seats_available += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ride::{NewRideParams, Ride, STATUS_CANCELLED};
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn ride(seats: i64) -> Ride {
        Ride::new(NewRideParams {
            host_email: "host@example.edu".into(),
            host_name: "Host".into(),
            origin: "Campus".into(),
            destination: "Airport".into(),
            date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            depart_at: Utc::now(),
            contact_number: "+911234567890".into(),
            seats_total: seats,
        })
    }

    #[test]
    fn reserve_decrements_until_empty() {
        let mut r = ride(2);
        try_reserve(&mut r).unwrap();
        try_reserve(&mut r).unwrap();
        assert_eq!(r.seats_available, 0);
        assert!(matches!(
            try_reserve(&mut r),
            Err(AppError::NoSeatsAvailable)
        ));
        assert_eq!(r.seats_available, 0);
    }

    #[test]
    fn reserve_rejects_inactive_ride() {
        let mut r = ride(3);
        r.status = STATUS_CANCELLED.to_string();
        assert!(matches!(try_reserve(&mut r), Err(AppError::RideNotActive)));
        assert_eq!(r.seats_available, 3);
    }

    #[test]
    fn release_never_exceeds_capacity() {
        let mut r = ride(1);
        try_reserve(&mut r).unwrap();
        release(&mut r).unwrap();
        assert_eq!(r.seats_available, 1);
        assert!(release(&mut r).is_err());
        assert_eq!(r.seats_available, 1);
    }
}
