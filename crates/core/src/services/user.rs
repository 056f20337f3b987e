//! User service: accounts and session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::user, repositories::UserRepository};

use crate::form::{FormErrors, Submission};

/// Input for creating an account.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupInput {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Enter a username of at most 150 characters."
    ))]
    pub username: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password: String,

    #[validate(length(max = 150))]
    pub first_name: String,

    #[validate(length(max = 150))]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account with a fresh session token.
    pub async fn signup(&self, mut input: SignupInput) -> AppResult<Submission<user::Model>> {
        input.username = input.username.trim().to_string();
        input.email = input.email.filter(|e| !e.trim().is_empty());

        let mut errors = match input.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        if !input
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        if errors.get("username").is_empty()
            && self.user_repo.find_by_username(&input.username).await?.is_some()
        {
            errors.add("username", "A user with that username already exists.");
        }
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let model = user::ActiveModel {
            username: Set(input.username),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            email: Set(input.email.unwrap_or_default()),
            password_hash: Set(hash_password(&input.password)?),
            token: Set(Some(self.id_gen.generate_token())),
            is_staff: Set(false),
            date_joined: Set(Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = user.id, username = %user.username, "Created account");

        Ok(Submission::Accepted(user))
    }

    /// Check credentials, returning the user and their session token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<(user::Model, String)>> {
        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash)? {
            return Ok(None);
        }

        if let Some(token) = user.token.clone() {
            return Ok(Some((user, token)));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        let user = self.user_repo.update(active).await?;

        Ok(Some((user, token)))
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.user_repo.find_by_token(token).await
    }

    /// Rotate a user's session token, ending every session.
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await?;

        info!(user_id, "Rotated session token");
        Ok(())
    }

    /// Grant or revoke access to the administrative endpoints.
    pub async fn set_staff(&self, username: &str, is_staff: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_username(username).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_staff = Set(is_staff);
        let user = self.user_repo.update(active).await?;

        info!(user_id = user.id, is_staff, "Changed staff status");
        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
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
