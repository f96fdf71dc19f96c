use anyhow::Context;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::Utc;
use uuid::Uuid;

use rately_core::token::issue_token;
use rately_domain::Role;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::domain::validate::{
    validate_email, validate_password, validate_user_address, validate_user_name,
};
use crate::error::ApiError;

// ── Password hashing ─────────────────────────────────────────────────────────

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash. An unparseable hash counts
/// as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Outcome of a successful register or login.
#[derive(Debug)]
pub struct AuthOutput {
    pub user: User,
    pub token: String,
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<AuthOutput, ApiError> {
        validate_user_name(&input.name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;
        validate_user_address(input.address.as_deref())?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }

        let user = User {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            address: input.address,
            role: Role::User,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;

        let (token, _) = issue_token(user.id, user.role, &self.jwt_secret).context("issue token")?;
        Ok(AuthOutput { user, token })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<AuthOutput, ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        let (token, _) = issue_token(user.id, user.role, &self.jwt_secret).context("issue token")?;
        Ok(AuthOutput { user, token })
    }
}
