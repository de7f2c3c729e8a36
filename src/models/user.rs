//! User model, JWT claims and role checks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Role, UserStatus};
use crate::error::AppError;

/// Full user row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User with department and lab names resolved
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserDetails {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub department_id: Option<Uuid>,
    pub department_name: Option<String>,
    pub lab_id: Option<Uuid>,
    pub lab_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
}

/// Create user request (admin side, account is active immediately)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
}

/// Update user request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// `null` detaches the user from their department
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub department_id: Option<Option<Uuid>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub lab_id: Option<Option<Uuid>>,
}

/// Self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// HOD (default, needs Dean approval) or LAB_INCHARGE (Dean only)
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    /// Department to join or create when no id is given
    pub department_name: Option<String>,
}

/// JWT claims for the authenticated principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub lab_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, now: i64, ttl_seconds: i64) -> Self {
        Self {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            department_id: user.department_id,
            lab_id: user.lab_id,
            exp: now + ttl_seconds,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Per-route allow-list check
    pub fn require_role(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.has_role(roles) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role {} is not allowed to perform this action",
                self.role
            )))
        }
    }

    pub fn is_dean(&self) -> bool {
        self.role == Role::Dean
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Department of an HOD; HODs without one cannot use department-scoped views
    pub fn require_department(&self) -> Result<Uuid, AppError> {
        self.department_id
            .ok_or_else(|| AppError::BadRequest("No department assigned".to_string()))
    }

    pub fn require_lab(&self) -> Result<Uuid, AppError> {
        self.lab_id
            .ok_or_else(|| AppError::BadRequest("No lab assigned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "someone@example.edu".to_string(),
            user_id: Uuid::new_v4(),
            role,
            department_id: None,
            lab_id: None,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn allow_list_rejects_other_roles() {
        let staff = [Role::Admin, Role::Dean];
        assert!(claims(Role::Dean).require_role(&staff).is_ok());
        assert!(claims(Role::Admin).require_role(&staff).is_ok());
        for role in [Role::Hod, Role::LabIncharge] {
            let err = claims(role).require_role(&staff).unwrap_err();
            assert!(matches!(err, AppError::Authorization(_)));
        }
    }

    #[test]
    fn token_round_trip_keeps_principal() {
        let mut original = claims(Role::Hod);
        original.department_id = Some(Uuid::new_v4());
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, original.user_id);
        assert_eq!(parsed.role, Role::Hod);
        assert_eq!(parsed.department_id, original.department_id);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn missing_department_is_a_bad_request() {
        let err = claims(Role::Hod).require_department().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
