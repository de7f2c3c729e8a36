//! User domain methods on Repository

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{RequestType, Role, UserStatus},
        user::{UpdateUser, User, UserDetails},
    },
};

const USER_DETAILS_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.role, u.status,
           u.department_id, d.name AS department_name,
           u.lab_id, l.name AS lab_name,
           u.created_at
    FROM users u
    LEFT JOIN departments d ON d.id = u.department_id
    LEFT JOIN labs l ON l.id = u.lab_id
"#;

/// Fields of a user row about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
}

impl Repository {
    /// Get user by ID
    pub async fn users_get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by ID, `None` when the account is gone
    pub async fn users_find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by email (login identifier, case-insensitive)
    pub async fn users_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn users_email_exists(&self, email: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn users_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Get user with department and lab names
    pub async fn users_get_details(&self, id: Uuid) -> AppResult<UserDetails> {
        let query = format!("{} WHERE u.id = $1", USER_DETAILS_SELECT);
        sqlx::query_as::<_, UserDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// List users, newest first
    pub async fn users_list(
        &self,
        role: Option<Role>,
        department_id: Option<Uuid>,
    ) -> AppResult<Vec<UserDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(USER_DETAILS_SELECT);
        qb.push(" WHERE TRUE");
        if let Some(role) = role {
            qb.push(" AND u.role = ").push_bind(role);
        }
        if let Some(department_id) = department_id {
            qb.push(" AND u.department_id = ").push_bind(department_id);
        }
        qb.push(" ORDER BY u.created_at DESC");

        let users = qb.build_query_as::<UserDetails>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    /// Insert a user
    pub async fn users_insert<'e>(&self, executor: impl PgExecutor<'e>, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password, role, status, department_id, lab_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(user.department_id)
        .bind(user.lab_id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Partial update; `password_hash` replaces the stored hash when given
    pub async fn users_update(
        &self,
        id: Uuid,
        data: &UpdateUser,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $column, " = ")).push_bind(value);
                }
            };
        }

        set_field!(data.name.clone(), "name");
        set_field!(data.email.clone(), "email");
        set_field!(password_hash, "password");
        set_field!(data.role, "role");
        set_field!(data.status, "status");
        set_field!(data.department_id, "department_id");
        set_field!(data.lab_id, "lab_id");

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Flip the status of the account gated by an approval request
    pub async fn users_set_status<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        id: Uuid,
        status: UserStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 AND status != $2")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Delete a user together with their own account approval requests
    pub async fn users_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM requests WHERE created_by_id = $1 AND request_type = $2")
            .bind(id)
            .bind(RequestType::AccountApproval)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
