//! Core domain types shared across Rately services.
//!
//! Everything in this crate is plain data and pure logic: no I/O, no
//! framework types. Services depend on this crate for the role model and
//! for the listing layer (filtering, sorting, pagination) that every
//! collection endpoint shares.

pub mod listing;
pub mod pagination;
pub mod role;

pub use listing::{FilterKey, ListParams, NoFilter, SortKey, SortOrder};
pub use pagination::{PageInfo, PageRequest};
pub use role::Role;
