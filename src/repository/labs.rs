//! Lab domain methods on Repository

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::lab::{CreateLab, Lab, LabDetails, LabFinalization, LabProvision, UpdateLab},
};

const DETAILS_SELECT: &str = r#"
    SELECT l.*,
           d.name AS department_name,
           d.code AS department_code,
           i.name AS incharge_name,
           (SELECT COUNT(*) FROM assets a WHERE a.lab_id = l.id) AS asset_count
    FROM labs l
    JOIN departments d ON d.id = l.department_id
    LEFT JOIN users i ON i.id = l.incharge_id
"#;

impl Repository {
    /// List labs, optionally for one department
    pub async fn labs_list(&self, department_id: Option<Uuid>) -> AppResult<Vec<LabDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        if let Some(department_id) = department_id {
            qb.push(" WHERE l.department_id = ").push_bind(department_id);
        }
        qb.push(" ORDER BY d.name, l.name");

        let labs = qb.build_query_as::<LabDetails>().fetch_all(&self.pool).await?;
        Ok(labs)
    }

    pub async fn labs_get_details(&self, id: Uuid) -> AppResult<LabDetails> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, LabDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lab {} not found", id)))
    }

    pub async fn labs_get_by_id(&self, id: Uuid) -> AppResult<Lab> {
        sqlx::query_as::<_, Lab>("SELECT * FROM labs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lab {} not found", id)))
    }

    pub async fn labs_create(&self, data: &CreateLab) -> AppResult<Lab> {
        let lab = sqlx::query_as::<_, Lab>(
            r#"
            INSERT INTO labs (id, name, code, department_id, incharge_id, capacity, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.code)
        .bind(data.department_id)
        .bind(data.incharge_id)
        .bind(data.capacity.unwrap_or(0))
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(lab)
    }

    pub async fn labs_update(&self, id: Uuid, data: &UpdateLab) -> AppResult<Lab> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE labs SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = ")).push_bind(value);
                }
            };
        }

        set_field!(data.name.clone(), "name");
        set_field!(data.code.clone(), "code");
        set_field!(data.department_id, "department_id");
        set_field!(data.incharge_id, "incharge_id");
        set_field!(data.capacity, "capacity");
        set_field!(data.location.clone(), "location");

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Lab>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lab {} not found", id)))
    }

    /// Delete a lab; assets, tickets, users and log lines lose their lab link
    pub async fn labs_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM labs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lab {} not found", id)));
        }
        Ok(())
    }

    /// Create the lab for an approved setup request.
    ///
    /// Returns `None` when a lab with the same name already exists in the
    /// department, so approving twice never yields two labs.
    pub async fn labs_provision<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        lab: &LabProvision,
    ) -> AppResult<Option<Lab>> {
        let created = sqlx::query_as::<_, Lab>(
            r#"
            INSERT INTO labs (id, name, code, department_id, capacity, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name, department_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&lab.name)
        .bind(&lab.code)
        .bind(lab.department_id)
        .bind(lab.capacity)
        .bind(&lab.location)
        .fetch_optional(executor)
        .await?;
        Ok(created)
    }

    /// Apply the details supplied on completion to the lab named `name`
    pub async fn labs_finalize<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        name: &str,
        department_id: Uuid,
        fields: &LabFinalization,
    ) -> AppResult<Option<Lab>> {
        let lab = sqlx::query_as::<_, Lab>(
            r#"
            UPDATE labs
            SET code = COALESCE($3, code),
                capacity = COALESCE($4, capacity),
                location = COALESCE($5, location),
                updated_at = NOW()
            WHERE name = $1 AND department_id = $2
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(department_id)
        .bind(&fields.code)
        .bind(fields.capacity)
        .bind(&fields.location)
        .fetch_optional(executor)
        .await?;
        Ok(lab)
    }

    pub async fn labs_count(&self, department_id: Option<Uuid>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM labs WHERE ($1::uuid IS NULL OR department_id = $1)",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
