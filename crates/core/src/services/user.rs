//! User accounts: signup, signin, token auth.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hestia_common::{AppError, AppResult, IdGenerator};
use hestia_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;

/// Input for creating a user account.
#[derive(Debug)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    /// Registering as a developer (lists properties, gets mission control).
    pub is_developer: bool,
    pub agency_name: Option<String>,
}

/// User service.
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(users: UserRepository) -> Self {
        Self {
            users,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new account.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        let username = input.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(AppError::Validation(
                "Username must be 1-64 characters".to_string(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
        if input.password.len() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username is taken".to_string()));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with that email exists".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            username_lower: Set(username.to_lowercase()),
            email: Set(input.email),
            password_hash: Set(hash_password(&input.password)?),
            token: Set(Some(self.id_gen.generate_token())),
            name: Set(input.name),
            phone: Set(None),
            agency_name: Set(input.agency_name),
            agency_activated_at: Set(None),
            stripe_customer_id: Set(None),
            is_developer: Set(input.is_developer),
            is_moderator: Set(false),
            is_admin: Set(false),
            is_suspended: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.users.create(model).await
    }

    /// Authenticate by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Authenticate by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .users
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        Ok(user)
    }

    /// Rotate the access token, invalidating the current one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.users.get_by_id(user_id).await?;
        let token = self.id_gen.generate_token();

        let mut model: user::ActiveModel = user.into();
        model.token = Set(Some(token.clone()));
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.users.update(model).await?;

        Ok(token)
    }

    /// Fetch a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.users.get_by_id(user_id).await
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_usernames() {
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::Arc;

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let result = service
            .create(CreateUserInput {
                username: "no spaces!".to_string(),
                email: "dev@example.com".to_string(),
                password: "longenough".to_string(),
                name: None,
                is_developer: false,
                agency_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
