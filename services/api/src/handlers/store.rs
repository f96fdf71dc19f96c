use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rately_domain::{ListParams, PageInfo};

use crate::domain::types::{OwnedStoreStats, StoreFilter, StoreSort, StoreWithStats};
use crate::error::ApiError;
use crate::extract::Caller;
use crate::handlers::parse_query;
use crate::handlers::rating::RatingResponse;
use crate::state::AppState;
use crate::usecase::store::{
    CreateStoreInput, CreateStoreUseCase, GetStoreUseCase, ListStoresOutput, ListStoresUseCase,
    OwnerDashboardUseCase, PlatformStatsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Listing row: aggregates plus the caller's own rating (null when the
/// caller has not rated the store).
#[derive(Serialize)]
pub struct StoreResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    #[serde(serialize_with = "rately_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user_rating: Option<i16>,
}

/// Detail shape; same aggregates, no caller-specific field.
#[derive(Serialize)]
pub struct StoreDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub average_rating: f64,
    pub rating_count: i64,
    #[serde(serialize_with = "rately_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<StoreWithStats> for StoreDetailResponse {
    fn from(store: StoreWithStats) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            owner_name: store.owner_name,
            average_rating: store.average_rating,
            rating_count: store.rating_count,
            created_at: store.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct OwnedStoreResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub average_rating: f64,
    pub rating_count: i64,
}

impl From<OwnedStoreStats> for OwnedStoreResponse {
    fn from(store: OwnedStoreStats) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            average_rating: store.average_rating,
            rating_count: store.rating_count,
        }
    }
}

// ── GET /stores ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StoreListResponse {
    pub stores: Vec<StoreResponse>,
    pub pagination: PageInfo,
}

pub async fn list_stores(
    caller: Caller,
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<StoreListResponse>, ApiError> {
    let query = parse_query(raw.as_deref())?;
    let params: ListParams<StoreFilter, StoreSort> = ListParams::resolve(&query);

    let uc = ListStoresUseCase {
        stores: state.store_repo(),
        ratings: state.rating_repo(),
    };
    let ListStoresOutput {
        stores,
        caller_ratings,
        total,
    } = uc.execute(caller.id, &params).await?;

    Ok(Json(StoreListResponse {
        stores: stores
            .into_iter()
            .map(|store| StoreResponse {
                id: store.id,
                name: store.name,
                email: store.email,
                address: store.address,
                owner_id: store.owner_id,
                owner_name: store.owner_name,
                average_rating: store.average_rating,
                rating_count: store.rating_count,
                created_at: store.created_at,
                user_rating: caller_ratings.get(&store.id).copied(),
            })
            .collect(),
        pagination: PageInfo::new(params.page, total),
    }))
}

// ── GET /stores/{id} ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct GetStoreResponse {
    pub store: StoreDetailResponse,
}

pub async fn get_store(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GetStoreResponse>, ApiError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| ApiError::InvalidInput("Invalid store id".to_owned()))?;

    let uc = GetStoreUseCase {
        stores: state.store_repo(),
    };
    let store = uc.execute(id).await?;

    Ok(Json(GetStoreResponse {
        store: StoreDetailResponse::from(store),
    }))
}

// ── POST /stores ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

/// Echo of an admin-created store; aggregates start at zero and are not
/// part of this shape.
#[derive(Serialize)]
pub struct CreatedStore {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct CreateStoreResponse {
    pub message: &'static str,
    pub store: CreatedStore,
}

pub async fn create_store(
    caller: Caller,
    State(state): State<AppState>,
    Json(body): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreateStoreResponse>), ApiError> {
    if !caller.role.can_manage_stores() {
        return Err(ApiError::Forbidden);
    }

    let uc = CreateStoreUseCase {
        stores: state.store_repo(),
        users: state.user_repo(),
    };
    let store = uc
        .execute(CreateStoreInput {
            name: body.name,
            email: body.email,
            address: body.address,
            owner_id: body.owner_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateStoreResponse {
            message: "Store created successfully",
            store: CreatedStore {
                id: store.id,
                name: store.name,
                email: store.email,
                address: store.address,
                owner_id: store.owner_id,
            },
        }),
    ))
}

// ── GET /stores/stats/dashboard ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatsResponse {
    pub user_count: u64,
    pub store_count: u64,
    pub rating_count: u64,
}

pub async fn platform_stats(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<PlatformStatsResponse>, ApiError> {
    if !caller.role.can_view_platform_stats() {
        return Err(ApiError::Forbidden);
    }

    let uc = PlatformStatsUseCase {
        users: state.user_repo(),
        stores: state.store_repo(),
        ratings: state.rating_repo(),
    };
    let stats = uc.execute().await?;

    Ok(Json(PlatformStatsResponse {
        user_count: stats.user_count,
        store_count: stats.store_count,
        rating_count: stats.rating_count,
    }))
}

// ── GET /stores/owner/dashboard ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboardResponse {
    pub stores: Vec<OwnedStoreResponse>,
    pub recent_ratings: Vec<RatingResponse>,
}

pub async fn owner_dashboard(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<OwnerDashboardResponse>, ApiError> {
    if !caller.role.can_view_owner_dashboard() {
        return Err(ApiError::Forbidden);
    }

    let uc = OwnerDashboardUseCase {
        stores: state.store_repo(),
        ratings: state.rating_repo(),
    };
    let dashboard = uc.execute(caller.id).await?;

    Ok(Json(OwnerDashboardResponse {
        stores: dashboard
            .stores
            .into_iter()
            .map(OwnedStoreResponse::from)
            .collect(),
        recent_ratings: dashboard
            .recent_ratings
            .into_iter()
            .map(RatingResponse::from)
            .collect(),
    }))
}
