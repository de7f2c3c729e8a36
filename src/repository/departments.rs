//! Department domain methods on Repository

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::department::{CreateDepartment, Department, DepartmentSummary, UpdateDepartment},
};

const SUMMARY_SELECT: &str = r#"
    SELECT d.*,
           h.name AS hod_name,
           (SELECT COUNT(*) FROM labs l WHERE l.department_id = d.id) AS lab_count,
           (SELECT COUNT(*) FROM assets a WHERE a.department_id = d.id) AS asset_count
    FROM departments d
    LEFT JOIN users h ON h.id = d.hod_id
"#;

impl Repository {
    /// List departments with counts, by name
    pub async fn departments_list(&self) -> AppResult<Vec<DepartmentSummary>> {
        let query = format!("{} ORDER BY d.name", SUMMARY_SELECT);
        let rows = sqlx::query_as::<_, DepartmentSummary>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn departments_get_summary(&self, id: Uuid) -> AppResult<DepartmentSummary> {
        let query = format!("{} WHERE d.id = $1", SUMMARY_SELECT);
        sqlx::query_as::<_, DepartmentSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    pub async fn departments_get_by_id(&self, id: Uuid) -> AppResult<Department> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    /// Exact (case-insensitive) name lookup
    pub async fn departments_find_by_name<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        name: &str,
    ) -> AppResult<Option<Department>> {
        let row = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE LOWER(name) = LOWER($1) ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn departments_insert<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        data: &CreateDepartment,
    ) -> AppResult<Department> {
        let row = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (id, name, code, description, hod_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .bind(data.hod_id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn departments_update(&self, id: Uuid, data: &UpdateDepartment) -> AppResult<Department> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE departments SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = ")).push_bind(value);
                }
            };
        }

        set_field!(data.name.clone(), "name");
        set_field!(data.code.clone(), "code");
        set_field!(data.description.clone(), "description");
        set_field!(data.hod_id, "hod_id");

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Department>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    pub async fn departments_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Department {} not found", id)));
        }
        Ok(())
    }
}
