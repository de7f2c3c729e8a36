//! Asset domain methods on Repository

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetListing, AssetQuery, AssetTicket, CreateAsset, UpdateAsset},
        enums::AssetStatus,
    },
};

const LISTING_SELECT: &str = r#"
    SELECT a.*,
           d.name AS department_name,
           d.code AS department_code,
           l.name AS lab_name,
           l.code AS lab_code
    FROM assets a
    JOIN departments d ON d.id = a.department_id
    LEFT JOIN labs l ON l.id = a.lab_id
"#;

/// Append the WHERE clause shared by the asset page and its count
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AssetQuery) {
    qb.push(" WHERE TRUE");
    if let Some(asset_type) = query.asset_type {
        qb.push(" AND a.asset_type = ").push_bind(asset_type);
    }
    if let Some(status) = query.status {
        qb.push(" AND a.status = ").push_bind(status);
    }
    if let Some(lab_id) = query.lab_id {
        qb.push(" AND a.lab_id = ").push_bind(lab_id);
    }
    if let Some(department_id) = query.department_id {
        qb.push(" AND a.department_id = ").push_bind(department_id);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (a.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.asset_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.mac_address ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl Repository {
    /// Filtered, paginated asset listing with the total match count
    pub async fn assets_search(&self, query: &AssetQuery) -> AppResult<(Vec<AssetListing>, i64)> {
        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM assets a");
        push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_SELECT);
        push_filters(&mut qb, query);
        qb.push(" ORDER BY a.updated_at DESC LIMIT ")
            .push_bind(query.per_page())
            .push(" OFFSET ")
            .push_bind(query.offset());

        let items = qb.build_query_as::<AssetListing>().fetch_all(&self.pool).await?;
        Ok((items, total))
    }

    pub async fn assets_get_listing(&self, id: Uuid) -> AppResult<AssetListing> {
        let query = format!("{} WHERE a.id = $1", LISTING_SELECT);
        sqlx::query_as::<_, AssetListing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    pub async fn assets_get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Latest tickets raised against an asset
    pub async fn assets_recent_tickets(&self, id: Uuid, limit: i64) -> AppResult<Vec<AssetTicket>> {
        let tickets = sqlx::query_as::<_, AssetTicket>(
            r#"
            SELECT t.id, t.ticket_number, t.title, t.status, t.priority,
                   u.name AS created_by_name, t.created_at
            FROM tickets t
            JOIN users u ON u.id = t.created_by_id
            WHERE t.asset_id = $1
            ORDER BY t.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    pub async fn assets_number_exists(&self, asset_number: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE asset_number = $1 AND ($2::uuid IS NULL OR id != $2))",
        )
        .bind(asset_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn assets_create(&self, data: &CreateAsset) -> AppResult<Asset> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (id, name, asset_number, asset_type, brand, model, serial_number,
                                mac_address, status, department_id, lab_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.asset_number)
        .bind(data.asset_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(&data.mac_address)
        .bind(data.status.unwrap_or(AssetStatus::Active))
        .bind(data.department_id)
        .bind(data.lab_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(asset)
    }

    pub async fn assets_update(&self, id: Uuid, data: &UpdateAsset) -> AppResult<Asset> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE assets SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = ")).push_bind(value);
                }
            };
        }

        set_field!(data.name.clone(), "name");
        set_field!(data.asset_number.clone(), "asset_number");
        set_field!(data.asset_type, "asset_type");
        set_field!(data.brand.clone(), "brand");
        set_field!(data.model.clone(), "model");
        set_field!(data.serial_number.clone(), "serial_number");
        set_field!(data.mac_address.clone(), "mac_address");
        set_field!(data.status, "status");
        set_field!(data.department_id, "department_id");
        set_field!(data.lab_id, "lab_id");

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Asset>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    pub async fn assets_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    pub async fn assets_count(&self, department_id: Option<Uuid>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE ($1::uuid IS NULL OR department_id = $1)",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
