use crate::domain::models::{request::{RideRequest, STATE_PENDING}, ride::Ride};
use crate::domain::ports::RideRequestRepository;
use crate::domain::services::seats;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresRequestRepo {
    pool: PgPool,
}

impl PostgresRequestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RideRequestRepository for PostgresRequestRepo {
    async fn create(&self, request: &RideRequest) -> Result<RideRequest, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1")
            .bind(&request.ride_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;

        if !ride.is_active() {
            return Err(AppError::RideNotActive);
        }
        if ride.seats_available <= 0 {
            return Err(AppError::NoSeatsAvailable);
        }

        let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ride_requests WHERE ride_id = $1 AND passenger_email = $2 AND state IN ('pending', 'approved')")
            .bind(&request.ride_id).bind(&request.passenger_email).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if live > 0 {
            return Err(AppError::DuplicateRequest);
        }

        let created = sqlx::query_as::<_, RideRequest>("INSERT INTO ride_requests (id, ride_id, passenger_email, passenger_name, passenger_phone, state, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *")
            .bind(&request.id).bind(&request.ride_id).bind(&request.passenger_email)
            .bind(&request.passenger_name).bind(&request.passenger_phone)
            .bind(&request.state).bind(request.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RideRequest>, AppError> {
        sqlx::query_as::<_, RideRequest>("SELECT * FROM ride_requests WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<RideRequest>, AppError> {
        sqlx::query_as::<_, RideRequest>("SELECT * FROM ride_requests WHERE ride_id = $1 ORDER BY created_at ASC")
            .bind(ride_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn approve_pending(&self, request_id: &str) -> Result<RideRequest, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let request = sqlx::query_as::<_, RideRequest>("SELECT * FROM ride_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Request not found".into()))?;
        if request.state != STATE_PENDING {
            return Err(AppError::AlreadyDecided);
        }

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
            .bind(&request.ride_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Internal)?;

        let mut reserved = ride.clone();
        seats::try_reserve(&mut reserved)?;

        let swapped = sqlx::query("UPDATE rides SET seats_available = $1 WHERE id = $2 AND seats_available = $3 AND status = 'active'")
            .bind(reserved.seats_available).bind(&ride.id).bind(ride.seats_available)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if swapped.rows_affected() == 0 {
            return Err(AppError::NoSeatsAvailable);
        }

        let approved = sqlx::query_as::<_, RideRequest>("UPDATE ride_requests SET state = 'approved' WHERE id = $1 AND state = 'pending' RETURNING *")
            .bind(request_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::AlreadyDecided)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(approved)
    }

    async fn reject_pending(&self, request_id: &str) -> Result<RideRequest, AppError> {
        let rejected = sqlx::query_as::<_, RideRequest>("UPDATE ride_requests SET state = 'rejected' WHERE id = $1 AND state = 'pending' RETURNING *")
            .bind(request_id).fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        match rejected {
            Some(request) => Ok(request),
            None => {
                let exists = sqlx::query_as::<_, RideRequest>("SELECT * FROM ride_requests WHERE id = $1")
                    .bind(request_id).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
                match exists {
                    Some(_) => Err(AppError::AlreadyDecided),
                    None => Err(AppError::NotFound("Request not found".into())),
                }
            }
        }
    }
}
