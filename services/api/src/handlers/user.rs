use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rately_domain::{ListParams, PageInfo, Role};

use crate::domain::types::{User, UserFilter, UserSort, UserWithRating};
use crate::error::ApiError;
use crate::extract::Caller;
use crate::handlers::parse_query;
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserInput, CreateUserUseCase, GetUserUseCase, ListUsersUseCase, UpdatePasswordInput,
    UpdatePasswordUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    #[serde(serialize_with = "rately_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Detail shape: the listing fields plus the average rating across the
/// stores this user owns.
#[derive(Serialize)]
pub struct UserDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    pub average_rating: f64,
    #[serde(serialize_with = "rately_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserWithRating> for UserDetailResponse {
    fn from(user: UserWithRating) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            average_rating: user.average_rating,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── GET /users ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PageInfo,
}

pub async fn list_users(
    caller: Caller,
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<UserListResponse>, ApiError> {
    if !caller.role.can_manage_users() {
        return Err(ApiError::Forbidden);
    }

    let query = parse_query(raw.as_deref())?;
    let params: ListParams<UserFilter, UserSort> = ListParams::resolve(&query);

    let uc = ListUsersUseCase {
        users: state.user_repo(),
    };
    let output = uc.execute(&params).await?;

    Ok(Json(UserListResponse {
        users: output.users.into_iter().map(UserResponse::from).collect(),
        pagination: PageInfo::new(params.page, output.total),
    }))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct GetUserResponse {
    pub user: UserDetailResponse,
}

pub async fn get_user(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GetUserResponse>, ApiError> {
    if !caller.role.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    let id: Uuid = id
        .parse()
        .map_err(|_| ApiError::InvalidInput("Invalid user id".to_owned()))?;

    let uc = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(id).await?;

    Ok(Json(GetUserResponse {
        user: UserDetailResponse::from(user),
    }))
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Echo of an admin-created account; no timestamps in this shape.
#[derive(Serialize)]
pub struct CreatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Serialize)]
pub struct CreateUserResponse {
    pub message: &'static str,
    pub user: CreatedUser,
}

pub async fn create_user(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    if !caller.role.can_manage_users() {
        return Err(ApiError::Forbidden);
    }

    let uc = CreateUserUseCase {
        users: state.user_repo(),
    };
    let user = uc
        .execute(CreateUserInput {
            name: body.name,
            email: body.email,
            password: body.password,
            address: body.address,
            role: body.role.unwrap_or_else(|| "user".to_owned()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully",
            user: CreatedUser {
                id: user.id,
                name: user.name,
                email: user.email,
                address: user.address,
                role: user.role,
            },
        }),
    ))
}

// ── PUT /users/password ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn update_password(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let uc = UpdatePasswordUseCase {
        users: state.user_repo(),
    };
    uc.execute(
        caller.id,
        UpdatePasswordInput {
            current_password: body.current_password,
            new_password: body.new_password,
        },
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}
