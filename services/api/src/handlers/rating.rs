use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rately_domain::{ListParams, NoFilter, PageInfo};

use crate::domain::types::{RatingSort, RatingUpsert, RatingWithUser};
use crate::error::ApiError;
use crate::extract::Caller;
use crate::handlers::parse_query;
use crate::handlers::user::MessageResponse;
use crate::state::AppState;
use crate::usecase::rating::{ListStoreRatingsUseCase, SubmitRatingInput, SubmitRatingUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RatingResponse {
    pub rating: i16,
    pub user_name: String,
    #[serde(serialize_with = "rately_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RatingWithUser> for RatingResponse {
    fn from(rating: RatingWithUser) -> Self {
        Self {
            rating: rating.rating,
            user_name: rating.user_name,
            created_at: rating.created_at,
        }
    }
}

// ── POST /ratings ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    pub rating: i16,
}

pub async fn submit_rating(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let uc = SubmitRatingUseCase {
        ratings: state.rating_repo(),
        stores: state.store_repo(),
    };
    let outcome = uc
        .execute(
            caller.id,
            SubmitRatingInput {
                store_id: body.store_id,
                rating: body.rating,
            },
        )
        .await?;

    Ok(match outcome {
        RatingUpsert::Created => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: "Rating submitted successfully",
            }),
        ),
        RatingUpsert::Updated => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Rating updated successfully",
            }),
        ),
    })
}

// ── GET /ratings/store/{store_id} ────────────────────────────────────────────

#[derive(Serialize)]
pub struct RatingListResponse {
    pub ratings: Vec<RatingResponse>,
    pub pagination: PageInfo,
}

pub async fn list_store_ratings(
    caller: Caller,
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<RatingListResponse>, ApiError> {
    let store_id: Uuid = store_id
        .parse()
        .map_err(|_| ApiError::InvalidInput("Invalid store id".to_owned()))?;

    let query = parse_query(raw.as_deref())?;
    let params: ListParams<NoFilter, RatingSort> = ListParams::resolve(&query);

    let uc = ListStoreRatingsUseCase {
        ratings: state.rating_repo(),
        stores: state.store_repo(),
    };
    let output = uc
        .execute(caller.id, caller.role, store_id, &params)
        .await?;

    Ok(Json(RatingListResponse {
        ratings: output
            .ratings
            .into_iter()
            .map(RatingResponse::from)
            .collect(),
        pagination: PageInfo::new(params.page, output.total),
    }))
}
