#![allow(async_fn_in_trait)]

use uuid::Uuid;

use rately_domain::{ListParams, NoFilter};

use crate::domain::types::{
    OwnedStoreStats, Rating, RatingSort, RatingUpsert, RatingWithUser, Store, StoreFilter,
    StoreSort, StoreWithStats, User, UserFilter, UserSort, UserWithRating,
};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Profile with the average rating across the stores the user owns.
    async fn find_with_average_rating(&self, id: Uuid)
    -> Result<Option<UserWithRating>, ApiError>;

    async fn list(&self, params: &ListParams<UserFilter, UserSort>) -> Result<Vec<User>, ApiError>;

    /// Row count matching the filters, ignoring pagination.
    async fn count(&self, filters: &[(UserFilter, String)]) -> Result<u64, ApiError>;

    async fn count_all(&self) -> Result<u64, ApiError>;

    async fn create(&self, user: &User) -> Result<(), ApiError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;
}

/// Repository for stores.
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError>;

    async fn find_with_stats(&self, id: Uuid) -> Result<Option<StoreWithStats>, ApiError>;

    /// Duplicate probe used before insert; matches on either column.
    async fn find_by_name_or_email(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<Store>, ApiError>;

    async fn list_with_stats(
        &self,
        params: &ListParams<StoreFilter, StoreSort>,
    ) -> Result<Vec<StoreWithStats>, ApiError>;

    /// Row count matching the filters, ignoring pagination.
    async fn count(&self, filters: &[(StoreFilter, String)]) -> Result<u64, ApiError>;

    async fn count_all(&self) -> Result<u64, ApiError>;

    /// All stores owned by the user, name ascending.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OwnedStoreStats>, ApiError>;

    async fn create(&self, store: &Store) -> Result<(), ApiError>;
}

/// Repository for store ratings.
pub trait RatingRepository: Send + Sync {
    /// Insert the rating, or overwrite the caller's existing rating of the
    /// same store, in one atomic statement.
    async fn upsert(&self, rating: &Rating) -> Result<RatingUpsert, ApiError>;

    async fn list_for_store(
        &self,
        store_id: Uuid,
        params: &ListParams<NoFilter, RatingSort>,
    ) -> Result<Vec<RatingWithUser>, ApiError>;

    async fn count_for_store(&self, store_id: Uuid) -> Result<u64, ApiError>;

    /// The user's own ratings for the given stores, for listing overlays.
    async fn find_by_user_and_stores(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<Rating>, ApiError>;

    /// Latest ratings of a store, newest first.
    async fn recent_for_store(
        &self,
        store_id: Uuid,
        limit: u64,
    ) -> Result<Vec<RatingWithUser>, ApiError>;

    async fn count_all(&self) -> Result<u64, ApiError>;
}
