//! Activity log methods on Repository

use sqlx::PgExecutor;
use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppResult,
    models::activity::{ActivityEntry, NewActivity},
};

impl Repository {
    /// Append one log line
    pub async fn activities_insert<'e>(&self, executor: impl PgExecutor<'e>, entry: &NewActivity) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, user_id, action, entity, entity_id, details, department_id, lab_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(entry.entity.as_str())
        .bind(entry.entity_id)
        .bind(&entry.details)
        .bind(entry.department_id)
        .bind(entry.lab_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Latest log lines with the actor's name and role
    pub async fn activities_recent(&self, limit: i64) -> AppResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT al.*, u.name AS user_name, u.role AS user_role
            FROM activity_logs al
            LEFT JOIN users u ON u.id = al.user_id
            ORDER BY al.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
