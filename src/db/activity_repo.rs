// src/db/activity_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::activity::{ActivityEntity, ActivityLogEntry, NewActivity},
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &NewActivity) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO activity_log (
                user_id, user_name, action, entity_type, entity_id,
                entity_name, changes, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.entity_name)
        .bind(&entry.changes)
        .bind(&entry.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<ActivityLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT * FROM activity_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<ActivityLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT * FROM activity_log
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_entity(
        &self,
        entity_type: ActivityEntity,
        entity_id: i64,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, ActivityLogEntry>(
            r#"
            SELECT * FROM activity_log
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
