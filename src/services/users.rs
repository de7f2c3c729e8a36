//! User management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        enums::{Role, UserStatus},
        user::{CreateUser, UpdateUser, User, UserClaims, UserDetails, UserQuery},
    },
    repository::{users::NewUser, Repository},
    services::{activity::ActivityService, auth::hash_password},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    activity: ActivityService,
}

impl UsersService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    /// List users; HODs only see their own department
    pub async fn list(&self, claims: &UserClaims, query: &UserQuery) -> AppResult<Vec<UserDetails>> {
        let department_id = match claims.role {
            Role::Hod => Some(claims.require_department()?),
            _ => query.department_id,
        };
        self.repository.users_list(query.role, department_id).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<UserDetails> {
        self.repository.users_get_details(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateUser) -> AppResult<User> {
        let email = data.email.trim().to_lowercase();
        if self.repository.users_email_exists(&email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let new_user = NewUser {
            name: data.name.trim().to_string(),
            email,
            password_hash: hash_password(&data.password)?,
            role: data.role,
            status: UserStatus::Active,
            department_id: data.department_id,
            lab_id: data.lab_id,
        };
        let user = self.repository.users_insert(&self.repository.pool, &new_user).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::User, user.id)
                    .details(format!("Created {} account {}", user.role, user.email))
                    .department(user.department_id)
                    .lab(user.lab_id),
            )
            .await;
        Ok(user)
    }

    pub async fn update(&self, claims: &UserClaims, id: Uuid, mut data: UpdateUser) -> AppResult<User> {
        if let Some(email) = data.email.as_mut() {
            *email = email.trim().to_lowercase();
            if self.repository.users_email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let password_hash = match data.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self.repository.users_update(id, &data, password_hash).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "UPDATE", Entity::User, user.id)
                    .department(user.department_id),
            )
            .await;
        Ok(user)
    }

    /// Remove an HOD account (Dean only, never oneself)
    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        if claims.user_id == id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }

        let target = self.repository.users_get_by_id(id).await?;
        if target.role != Role::Hod {
            return Err(AppError::Authorization(
                "Only HOD accounts can be deleted".to_string(),
            ));
        }

        self.repository.users_delete(id).await?;
        tracing::info!("User {} deleted by {}", id, claims.user_id);

        self.activity
            .record(
                NewActivity::new(claims.user_id, "DELETE", Entity::User, id)
                    .details(format!("Deleted {}", target.email))
                    .department(target.department_id),
            )
            .await;
        Ok(())
    }
}
