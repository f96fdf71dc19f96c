use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API error variants. `Display` strings are the client-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("User not found")]
    UserNotFound,
    #[error("Store not found")]
    StoreNotFound,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Store with this email or name already exists")]
    StoreAlreadyExists,
    #[error("Owner not found")]
    OwnerNotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid query string")]
    InvalidQuery,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::StoreNotFound => "STORE_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::StoreAlreadyExists => "STORE_ALREADY_EXISTS",
            Self::OwnerNotFound => "OWNER_NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::StoreNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists
            | Self::StoreAlreadyExists
            | Self::OwnerNotFound
            | Self::InvalidInput(_)
            | Self::InvalidQuery
            | Self::WrongPassword => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
