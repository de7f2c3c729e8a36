//! Authentication, self-registration and password hashing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        department::CreateDepartment,
        enums::{Priority, RequestType, Role, UserStatus},
        request::NewRequest,
        user::{RegisterUser, User, UserClaims},
    },
    repository::{users::NewUser, Repository},
    services::activity::ActivityService,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    activity: ActivityService,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, activity: ActivityService) -> Self {
        Self {
            repository,
            config,
            activity,
        }
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users_get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        match user.status {
            UserStatus::Active => {}
            UserStatus::Pending => {
                return Err(AppError::Authentication("Account is pending approval".to_string()))
            }
            UserStatus::Rejected => {
                return Err(AppError::Authentication("Account has been rejected".to_string()))
            }
        }

        let token = self.issue_token(&user)?;
        tracing::info!("User {} logged in as {}", user.id, user.role);
        Ok((token, user))
    }

    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let ttl = self.config.jwt_expiration_hours as i64 * 3600;
        UserClaims::for_user(user, Utc::now().timestamp(), ttl)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Public registration.
    ///
    /// HODs register themselves and wait for the Dean: the account is created
    /// PENDING together with an ACCOUNT_APPROVAL request in their department.
    /// Lab incharge accounts are created ACTIVE, by the Dean only.
    pub async fn register(&self, data: RegisterUser, actor: Option<&UserClaims>) -> AppResult<User> {
        let role = data.role.unwrap_or(Role::Hod);
        match role {
            Role::Hod => {}
            Role::LabIncharge => match actor {
                Some(claims) if claims.is_dean() => {}
                Some(_) => {
                    return Err(AppError::Authorization(
                        "Only the Dean can create lab incharge accounts".to_string(),
                    ))
                }
                None => {
                    return Err(AppError::Authentication(
                        "Lab incharge accounts are created by the Dean".to_string(),
                    ))
                }
            },
            _ => {
                return Err(AppError::BadRequest(format!("Cannot register as {}", role)));
            }
        }

        let email = data.email.trim().to_lowercase();
        if self.repository.users_email_exists(&email, None).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let password_hash = hash_password(&data.password)?;

        let user = if role == Role::LabIncharge {
            let new_user = NewUser {
                name: data.name.trim().to_string(),
                email,
                password_hash,
                role,
                status: UserStatus::Active,
                department_id: data.department_id,
                lab_id: None,
            };
            self.repository.users_insert(&self.repository.pool, &new_user).await?
        } else {
            self.register_hod(&data, email, password_hash).await?
        };

        let actor_id = actor.map(|c| c.user_id).unwrap_or(user.id);
        self.activity
            .record(
                NewActivity::new(actor_id, "CREATE", Entity::User, user.id)
                    .details(format!("Registered {} ({})", user.email, user.role))
                    .department(user.department_id),
            )
            .await;

        Ok(user)
    }

    async fn register_hod(&self, data: &RegisterUser, email: String, password_hash: String) -> AppResult<User> {
        let department_name = data
            .department_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut tx = self.repository.begin().await?;

        let department = match (data.department_id, department_name) {
            (Some(id), _) => self.repository.departments_get_by_id(id).await?,
            (None, Some(name)) => match self.repository.departments_find_by_name(&mut *tx, name).await? {
                Some(department) => department,
                None => {
                    let new_department = CreateDepartment {
                        name: name.to_string(),
                        code: department_code(name),
                        description: None,
                        hod_id: None,
                    };
                    self.repository.departments_insert(&mut *tx, &new_department).await?
                }
            },
            (None, None) => {
                return Err(AppError::BadRequest("Department is required".to_string()));
            }
        };

        let new_user = NewUser {
            name: data.name.trim().to_string(),
            email,
            password_hash,
            role: Role::Hod,
            status: UserStatus::Pending,
            department_id: Some(department.id),
            lab_id: None,
        };
        let user = self.repository.users_insert(&mut *tx, &new_user).await?;

        let approval = NewRequest {
            title: format!("Account approval: {}", user.name),
            description: format!(
                "{} <{}> registered as Head of Department of {}",
                user.name, user.email, department.name
            ),
            request_type: RequestType::AccountApproval,
            priority: Priority::High,
            department_id: department.id,
            created_by_id: user.id,
        };
        let request = self.repository.requests_insert(&mut tx, &approval).await?;

        tx.commit().await?;

        tracing::info!(
            "HOD {} registered for department {}, approval {} filed",
            user.id,
            department.id,
            request.request_number
        );
        Ok(user)
    }

    /// Create the configured Dean when the database has no users yet
    pub async fn bootstrap(&self, config: &BootstrapConfig) -> AppResult<Option<User>> {
        if self.repository.users_count().await? > 0 {
            return Ok(None);
        }

        let dean = NewUser {
            name: config.dean_name.clone(),
            email: config.dean_email.trim().to_lowercase(),
            password_hash: hash_password(&config.dean_password)?,
            role: Role::Dean,
            status: UserStatus::Active,
            department_id: None,
            lab_id: None,
        };
        let user = self.repository.users_insert(&self.repository.pool, &dean).await?;
        tracing::info!("Created initial Dean account {}", user.email);
        Ok(Some(user))
    }
}

/// Turns verified token claims into the caller's current principal
#[async_trait]
pub trait PrincipalSource: Send + Sync {
    async fn resolve(&self, claims: UserClaims) -> AppResult<UserClaims>;
}

/// Checks every token against the users table, so rejected, deleted or
/// re-scoped accounts lose their old access before the token expires
pub struct AccountPrincipals {
    repository: Repository,
}

impl AccountPrincipals {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PrincipalSource for AccountPrincipals {
    async fn resolve(&self, claims: UserClaims) -> AppResult<UserClaims> {
        let user = self.repository.users_find_by_id(claims.user_id).await?;
        current_claims(claims, user.as_ref())
    }
}

/// Claims refreshed from the stored account
fn current_claims(claims: UserClaims, user: Option<&User>) -> AppResult<UserClaims> {
    let user = user.ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;
    if user.status != UserStatus::Active {
        return Err(AppError::Authentication(format!("Account is {}", user.status)));
    }

    Ok(UserClaims {
        sub: user.email.clone(),
        role: user.role,
        department_id: user.department_id,
        lab_id: user.lab_id,
        ..claims
    })
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Code for a department created on registration: name initials plus a short random suffix
fn department_code(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_uppercase();
    let suffix = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
    if initials.is_empty() {
        format!("DEPT-{}", suffix)
    } else {
        format!("{}-{}", initials, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(status: UserStatus) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.edu".to_string(),
            password: String::new(),
            role: Role::Hod,
            status,
            department_id: Some(Uuid::new_v4()),
            lab_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn token_claims(user: &User) -> UserClaims {
        UserClaims::for_user(user, Utc::now().timestamp(), 3600)
    }

    #[test]
    fn stored_account_overrides_token_scope() {
        let mut user = account(UserStatus::Active);
        let claims = token_claims(&user);
        user.role = Role::LabIncharge;
        user.department_id = Some(Uuid::new_v4());
        user.lab_id = Some(Uuid::new_v4());

        let current = current_claims(claims.clone(), Some(&user)).unwrap();
        assert_eq!(current.role, Role::LabIncharge);
        assert_eq!(current.department_id, user.department_id);
        assert_eq!(current.lab_id, user.lab_id);
        assert_eq!(current.user_id, claims.user_id);
        assert_eq!(current.exp, claims.exp);
    }

    #[test]
    fn inactive_or_missing_accounts_lose_access() {
        for status in [UserStatus::Rejected, UserStatus::Pending] {
            let user = account(status);
            let err = current_claims(token_claims(&user), Some(&user)).unwrap_err();
            assert!(matches!(err, AppError::Authentication(_)), "{}", status);
        }

        let user = account(UserStatus::Active);
        let err = current_claims(token_claims(&user), None).unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn generated_department_codes() {
        let code = department_code("Computer Science and Engineering");
        assert!(code.starts_with("CSAE-"), "{}", code);
        assert!(code.len() <= 20);

        assert!(department_code("   ").starts_with("DEPT-"));
    }
}
