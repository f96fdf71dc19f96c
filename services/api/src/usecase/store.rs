use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use rately_domain::ListParams;

use crate::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use crate::domain::types::{
    OwnedStoreStats, RatingWithUser, Store, StoreFilter, StoreSort, StoreWithStats,
};
use crate::domain::validate::{validate_email, validate_store_address, validate_store_name};
use crate::error::ApiError;

// ── ListStores ───────────────────────────────────────────────────────────────

pub struct ListStoresOutput {
    pub stores: Vec<StoreWithStats>,
    /// The caller's own rating for each listed store, keyed by store id.
    pub caller_ratings: HashMap<Uuid, i16>,
    pub total: u64,
}

pub struct ListStoresUseCase<S: StoreRepository, R: RatingRepository> {
    pub stores: S,
    pub ratings: R,
}

impl<S: StoreRepository, R: RatingRepository> ListStoresUseCase<S, R> {
    pub async fn execute(
        &self,
        caller_id: Uuid,
        params: &ListParams<StoreFilter, StoreSort>,
    ) -> Result<ListStoresOutput, ApiError> {
        let total = self.stores.count(&params.filters).await?;
        let stores = self.stores.list_with_stats(params).await?;

        // One batched query for the caller's ratings instead of one per row.
        let store_ids: Vec<Uuid> = stores.iter().map(|s| s.id).collect();
        let caller_ratings = self
            .ratings
            .find_by_user_and_stores(caller_id, &store_ids)
            .await?
            .into_iter()
            .map(|r| (r.store_id, r.rating))
            .collect();

        Ok(ListStoresOutput { stores, caller_ratings, total })
    }
}

// ── GetStore ─────────────────────────────────────────────────────────────────

pub struct GetStoreUseCase<S: StoreRepository> {
    pub stores: S,
}

impl<S: StoreRepository> GetStoreUseCase<S> {
    pub async fn execute(&self, store_id: Uuid) -> Result<StoreWithStats, ApiError> {
        self.stores
            .find_with_stats(store_id)
            .await?
            .ok_or(ApiError::StoreNotFound)
    }
}

// ── CreateStore ──────────────────────────────────────────────────────────────

pub struct CreateStoreInput {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
}

pub struct CreateStoreUseCase<S: StoreRepository, U: UserRepository> {
    pub stores: S,
    pub users: U,
}

impl<S: StoreRepository, U: UserRepository> CreateStoreUseCase<S, U> {
    pub async fn execute(&self, input: CreateStoreInput) -> Result<Store, ApiError> {
        validate_store_name(&input.name)?;
        validate_email(&input.email)?;
        validate_store_address(&input.address)?;

        if self
            .stores
            .find_by_name_or_email(&input.name, &input.email)
            .await?
            .is_some()
        {
            return Err(ApiError::StoreAlreadyExists);
        }
        if let Some(owner_id) = input.owner_id {
            if self.users.find_by_id(owner_id).await?.is_none() {
                return Err(ApiError::OwnerNotFound);
            }
        }

        let store = Store {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            address: input.address,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        };
        self.stores.create(&store).await?;
        Ok(store)
    }
}

// ── PlatformStats ────────────────────────────────────────────────────────────

pub struct PlatformStats {
    pub user_count: u64,
    pub store_count: u64,
    pub rating_count: u64,
}

pub struct PlatformStatsUseCase<U: UserRepository, S: StoreRepository, R: RatingRepository> {
    pub users: U,
    pub stores: S,
    pub ratings: R,
}

impl<U: UserRepository, S: StoreRepository, R: RatingRepository> PlatformStatsUseCase<U, S, R> {
    pub async fn execute(&self) -> Result<PlatformStats, ApiError> {
        let user_count = self.users.count_all().await?;
        let store_count = self.stores.count_all().await?;
        let rating_count = self.ratings.count_all().await?;
        Ok(PlatformStats { user_count, store_count, rating_count })
    }
}

// ── OwnerDashboard ───────────────────────────────────────────────────────────

/// How many of the latest ratings the owner dashboard shows.
const RECENT_RATINGS_LIMIT: u64 = 10;

pub struct OwnerDashboard {
    pub stores: Vec<OwnedStoreStats>,
    /// Latest ratings of the owner's first store, newest first.
    pub recent_ratings: Vec<RatingWithUser>,
}

pub struct OwnerDashboardUseCase<S: StoreRepository, R: RatingRepository> {
    pub stores: S,
    pub ratings: R,
}

impl<S: StoreRepository, R: RatingRepository> OwnerDashboardUseCase<S, R> {
    pub async fn execute(&self, owner_id: Uuid) -> Result<OwnerDashboard, ApiError> {
        let stores = self.stores.list_by_owner(owner_id).await?;
        let recent_ratings = match stores.first() {
            Some(first) => {
                self.ratings
                    .recent_for_store(first.id, RECENT_RATINGS_LIMIT)
                    .await?
            }
            None => Vec::new(),
        };
        Ok(OwnerDashboard { stores, recent_ratings })
    }
}
