//! Bearer-token helpers for tests.
//!
//! The API authenticates requests with an `Authorization: Bearer <jwt>`
//! header. `TestAuth` mints real tokens signed with [`TEST_JWT_SECRET`], so
//! tests go through the production validation path instead of stubbing it.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use rately_core::token::issue_token;
use rately_domain::Role;
use uuid::Uuid;

/// Signing secret shared by test fixtures and the code under test.
pub const TEST_JWT_SECRET: &str = "rately-test-secret";

/// Identity to authenticate test requests as.
pub struct TestAuth {
    pub user_id: Uuid,
    pub role: Role,
}

impl TestAuth {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Mint a bearer token for this identity, signed with the test secret.
    pub fn bearer(&self) -> String {
        let (token, _) =
            issue_token(self.user_id, self.role, TEST_JWT_SECRET).expect("issue test token");
        format!("Bearer {token}")
    }

    /// Headers carrying the bearer token.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.bearer()).expect("token is a valid header value"),
        );
        map
    }
}
