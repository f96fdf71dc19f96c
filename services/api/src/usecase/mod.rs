pub mod auth;
pub mod rating;
pub mod store;
pub mod user;
