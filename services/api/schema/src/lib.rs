//! sea-orm entities for the Rately database.

pub mod ratings;
pub mod stores;
pub mod users;
