use crate::domain::models::notification::Notification;
use crate::domain::ports::NotificationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>("INSERT INTO notifications (id, owner_email, kind, title, message, is_read, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *")
            .bind(&notification.id).bind(&notification.owner_email).bind(&notification.kind)
            .bind(&notification.title).bind(&notification.message)
            .bind(notification.is_read).bind(notification.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE owner_email = $1 ORDER BY created_at DESC")
            .bind(owner_email).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_read(&self, owner_email: &str, id: &str) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND owner_email = $2 RETURNING *")
            .bind(id).bind(owner_email).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Notification not found".into()))
    }

    async fn delete(&self, owner_email: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND owner_email = $2")
            .bind(id).bind(owner_email).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".into()));
        }
        Ok(())
    }
}
