//! Shared service plumbing: tracing setup, request-id middleware, the
//! liveness endpoint, session tokens and serialization helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod token;
pub mod tracing;
