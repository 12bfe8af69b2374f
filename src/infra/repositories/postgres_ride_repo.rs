use crate::domain::models::{request::{RideRequest, STATE_APPROVED}, ride::{Ride, STATUS_CANCELLED}};
use crate::domain::ports::RideRepository;
use crate::domain::services::seats;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresRideRepo {
    pool: PgPool,
}

impl PostgresRideRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RideRepository for PostgresRideRepo {
    async fn create(&self, ride: &Ride) -> Result<Ride, AppError> {
        sqlx::query_as::<_, Ride>("INSERT INTO rides (id, host_email, host_name, origin, destination, date, time, depart_at, contact_number, seats_total, seats_available, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *")
            .bind(&ride.id).bind(&ride.host_email).bind(&ride.host_name).bind(&ride.origin).bind(&ride.destination)
            .bind(ride.date).bind(ride.time).bind(ride.depart_at).bind(&ride.contact_number)
            .bind(ride.seats_total).bind(ride.seats_available).bind(&ride.status).bind(ride.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ride>, AppError> {
        sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Ride>, AppError> {
        sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE status = 'active' AND seats_available > 0 AND depart_at > $1 ORDER BY created_at DESC")
            .bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_host(&self, host_email: &str) -> Result<Vec<Ride>, AppError> {
        sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE host_email = $1 ORDER BY created_at DESC")
            .bind(host_email).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel_cascade(&self, ride_id: &str) -> Result<(Ride, Vec<RideRequest>), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
            .bind(ride_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;

        let flipped = sqlx::query("UPDATE rides SET status = 'cancelled' WHERE id = $1 AND status = 'active'")
            .bind(ride_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if flipped.rows_affected() == 0 {
            return Err(AppError::RideNotActive);
        }

        let affected = sqlx::query_as::<_, RideRequest>("SELECT * FROM ride_requests WHERE ride_id = $1 AND state IN ('pending', 'approved') ORDER BY created_at ASC")
            .bind(ride_id).fetch_all(&mut *tx).await.map_err(AppError::Database)?;

        let mut updated = ride.clone();
        updated.status = STATUS_CANCELLED.to_string();
        for _ in affected.iter().filter(|r| r.state == STATE_APPROVED) {
            seats::release(&mut updated)?;
        }

        if updated.seats_available != ride.seats_available {
            sqlx::query("UPDATE rides SET seats_available = $1 WHERE id = $2")
                .bind(updated.seats_available).bind(ride_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        sqlx::query("UPDATE ride_requests SET state = 'withdrawn' WHERE ride_id = $1 AND state IN ('pending', 'approved')")
            .bind(ride_id).execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((updated, affected))
    }
}
