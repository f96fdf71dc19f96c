use chrono::{DateTime, Utc};
use uuid::Uuid;

use rately_domain::{FilterKey, Role, SortKey, SortOrder};

/// User account. `password_hash` is an argon2 PHC string, never plaintext.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Store that users can rate.
#[derive(Debug, Clone)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One user's rating of one store.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store row with rating aggregates and the owner's name joined in.
/// `average_rating` is 0 for stores with no ratings yet.
#[derive(Debug, Clone)]
pub struct StoreWithStats {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Store row with rating aggregates, as shown on the owner dashboard.
#[derive(Debug, Clone)]
pub struct OwnedStoreStats {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub average_rating: f64,
    pub rating_count: i64,
}

/// User row with the average rating across the stores they own.
#[derive(Debug, Clone)]
pub struct UserWithRating {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Rating row with the rater's name joined in.
#[derive(Debug, Clone)]
pub struct RatingWithUser {
    pub rating: i16,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a rating upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingUpsert {
    Created,
    Updated,
}

/// A store's individual ratings are visible to that store's owner and to
/// admins; other callers get 403.
pub fn can_read_store_ratings(caller_id: Uuid, caller_role: Role, store: &Store) -> bool {
    caller_role.can_manage_stores() || store.owner_id == Some(caller_id)
}

// ── Listing keys ─────────────────────────────────────────────────────────────

/// Filter keys accepted by the users listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilter {
    Name,
    Email,
    Address,
    Role,
}

impl FilterKey for UserFilter {
    fn from_param(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            "role" => Some(Self::Role),
            _ => None,
        }
    }
}

/// Sort columns accepted by the users listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSort {
    #[default]
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl SortKey for UserSort {
    fn from_param(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            "role" => Some(Self::Role),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Filter keys accepted by the stores listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFilter {
    Name,
    Address,
}

impl FilterKey for StoreFilter {
    fn from_param(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "address" => Some(Self::Address),
            _ => None,
        }
    }
}

/// Sort columns accepted by the stores listing. `AverageRating` sorts by
/// the computed aggregate, not a stored column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreSort {
    #[default]
    Name,
    Email,
    Address,
    AverageRating,
}

impl SortKey for StoreSort {
    fn from_param(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            "average_rating" => Some(Self::AverageRating),
            _ => None,
        }
    }
}

/// Sort columns accepted by a store's ratings listing. Newest first unless
/// the client asks otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingSort {
    Rating,
    #[default]
    CreatedAt,
    UserName,
}

impl SortKey for RatingSort {
    fn from_param(key: &str) -> Option<Self> {
        match key {
            "rating" => Some(Self::Rating),
            "created_at" => Some(Self::CreatedAt),
            "user_name" => Some(Self::UserName),
            _ => None,
        }
    }

    fn default_order() -> SortOrder {
        SortOrder::Desc
    }
}
