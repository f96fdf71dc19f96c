use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use rately_core::token::validate_token;
use rately_domain::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Returns 401 if the header is absent, malformed, or the token fails
/// signature or expiry validation. Role enforcement (403) is done by
/// handlers after extraction.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_owned);
        let secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(ApiError::Unauthorized)?;
            let info = validate_token(&token, &secret).map_err(|_| ApiError::Unauthorized)?;
            Ok(Self {
                id: info.user_id,
                role: info.role,
            })
        }
    }
}
