use chrono::Utc;
use uuid::Uuid;

use rately_domain::{ListParams, NoFilter, Role};

use crate::domain::repository::{RatingRepository, StoreRepository};
use crate::domain::types::{
    Rating, RatingSort, RatingUpsert, RatingWithUser, can_read_store_ratings,
};
use crate::domain::validate::validate_rating_value;
use crate::error::ApiError;

// ── SubmitRating ─────────────────────────────────────────────────────────────

pub struct SubmitRatingInput {
    pub store_id: Uuid,
    pub rating: i16,
}

pub struct SubmitRatingUseCase<R: RatingRepository, S: StoreRepository> {
    pub ratings: R,
    pub stores: S,
}

impl<R: RatingRepository, S: StoreRepository> SubmitRatingUseCase<R, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: SubmitRatingInput,
    ) -> Result<RatingUpsert, ApiError> {
        validate_rating_value(input.rating)?;
        if self.stores.find_by_id(input.store_id).await?.is_none() {
            return Err(ApiError::StoreNotFound);
        }

        let now = Utc::now();
        let rating = Rating {
            id: Uuid::now_v7(),
            user_id,
            store_id: input.store_id,
            rating: input.rating,
            created_at: now,
            updated_at: now,
        };
        self.ratings.upsert(&rating).await
    }
}

// ── ListStoreRatings ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ListStoreRatingsOutput {
    pub ratings: Vec<RatingWithUser>,
    pub total: u64,
}

pub struct ListStoreRatingsUseCase<R: RatingRepository, S: StoreRepository> {
    pub ratings: R,
    pub stores: S,
}

impl<R: RatingRepository, S: StoreRepository> ListStoreRatingsUseCase<R, S> {
    pub async fn execute(
        &self,
        caller_id: Uuid,
        caller_role: Role,
        store_id: Uuid,
        params: &ListParams<NoFilter, RatingSort>,
    ) -> Result<ListStoreRatingsOutput, ApiError> {
        let store = self
            .stores
            .find_by_id(store_id)
            .await?
            .ok_or(ApiError::StoreNotFound)?;
        if !can_read_store_ratings(caller_id, caller_role, &store) {
            return Err(ApiError::Forbidden);
        }

        let total = self.ratings.count_for_store(store_id).await?;
        let ratings = self.ratings.list_for_store(store_id, params).await?;
        Ok(ListStoreRatingsOutput { ratings, total })
    }
}
