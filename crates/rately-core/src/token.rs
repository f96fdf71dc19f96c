//! Stateless session tokens.
//!
//! Sessions are HS256 JWTs carrying the user id (`sub`), the user's role
//! and an expiry. The token is self-contained: validating the signature
//! and expiry is the whole session check, no storage lookup involved.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rately_domain::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime in seconds (7 days).
pub const TOKEN_EXP: u64 = 60 * 60 * 24 * 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub exp: u64,
}

/// Validated token contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: Role,
    pub exp: u64,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issues a signed token for the user. Returns the token and its expiry
/// as a unix timestamp.
pub fn issue_token(
    user_id: Uuid,
    role: Role,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    let exp = now_secs() + TOKEN_EXP;
    let claims = TokenClaims { sub: user_id.to_string(), role, exp };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

/// Checks signature and expiry, and parses the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) => {
            TokenError::InvalidSignature
        }
        _ => TokenError::Malformed,
    })?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)?;

    Ok(TokenInfo { user_id, role: data.claims.role, exp: data.claims.exp })
}
