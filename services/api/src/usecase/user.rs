use chrono::Utc;
use uuid::Uuid;

use rately_domain::ListParams;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserFilter, UserSort, UserWithRating};
use crate::domain::validate::{
    parse_role, validate_email, validate_new_password, validate_password, validate_user_address,
    validate_user_name,
};
use crate::error::ApiError;
use crate::usecase::auth::{hash_password, verify_password};

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersOutput {
    pub users: Vec<User>,
    pub total: u64,
}

pub struct ListUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        params: &ListParams<UserFilter, UserSort>,
    ) -> Result<ListUsersOutput, ApiError> {
        let total = self.users.count(&params.filters).await?;
        let users = self.users.list(params).await?;
        Ok(ListUsersOutput { users, total })
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserWithRating, ApiError> {
        self.users
            .find_with_average_rating(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: String,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, ApiError> {
        validate_user_name(&input.name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;
        validate_user_address(input.address.as_deref())?;
        let role = parse_role(&input.role)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }

        let user = User {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            address: input.address,
            role,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;
        Ok(user)
    }
}

// ── UpdatePassword ───────────────────────────────────────────────────────────

pub struct UpdatePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct UpdatePasswordUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdatePasswordUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, input: UpdatePasswordInput) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !verify_password(&input.current_password, &user.password_hash) {
            return Err(ApiError::WrongPassword);
        }
        validate_new_password(&input.new_password)?;

        let hash = hash_password(&input.new_password)?;
        self.users.update_password(user_id, &hash).await
    }
}
