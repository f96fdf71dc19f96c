use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use rately_api::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use rately_api::domain::types::{
    OwnedStoreStats, Rating, RatingSort, RatingUpsert, RatingWithUser, Store, StoreFilter,
    StoreSort, StoreWithStats, User, UserFilter, UserSort, UserWithRating,
};
use rately_api::error::ApiError;
use rately_api::usecase::auth::hash_password;
use rately_domain::{ListParams, NoFilter, PageRequest, Role, SortOrder};

pub use rately_testing::auth::TEST_JWT_SECRET;

// ── TestWorld ────────────────────────────────────────────────────────────────

/// Shared in-memory tables handed to every mock repository. The mocks
/// reproduce the storage semantics the usecases rely on (unique email,
/// store uniqueness, the rating upsert, join aggregates) so the flows can
/// be exercised end to end without a database.
#[derive(Default)]
pub struct TestWorld {
    pub users: Arc<Mutex<Vec<User>>>,
    pub stores: Arc<Mutex<Vec<Store>>>,
    pub ratings: Arc<Mutex<Vec<Rating>>>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(&self) -> MockUserRepo {
        MockUserRepo {
            users: Arc::clone(&self.users),
            stores: Arc::clone(&self.stores),
            ratings: Arc::clone(&self.ratings),
        }
    }

    pub fn store_repo(&self) -> MockStoreRepo {
        MockStoreRepo {
            users: Arc::clone(&self.users),
            stores: Arc::clone(&self.stores),
            ratings: Arc::clone(&self.ratings),
        }
    }

    pub fn rating_repo(&self) -> MockRatingRepo {
        MockRatingRepo {
            users: Arc::clone(&self.users),
            ratings: Arc::clone(&self.ratings),
        }
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn insert_store(&self, store: Store) {
        self.stores.lock().unwrap().push(store);
    }

    pub fn insert_rating(&self, rating: Rating) {
        self.ratings.lock().unwrap().push(rating);
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn average(values: &[i16]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    f64::from(values.iter().map(|v| i32::from(*v)).sum::<i32>()) / values.len() as f64
}

fn page_slice<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

fn directed(primary: std::cmp::Ordering, order: SortOrder) -> std::cmp::Ordering {
    match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub stores: Arc<Mutex<Vec<Store>>>,
    pub ratings: Arc<Mutex<Vec<Rating>>>,
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_with_average_rating(&self, id: Uuid) -> Result<Option<UserWithRating>, ApiError> {
        let user = match self.users.lock().unwrap().iter().find(|u| u.id == id) {
            Some(user) => user.clone(),
            None => return Ok(None),
        };
        let owned: Vec<Uuid> = self
            .stores
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.owner_id == Some(id))
            .map(|s| s.id)
            .collect();
        let values: Vec<i16> = self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| owned.contains(&r.store_id))
            .map(|r| r.rating)
            .collect();

        Ok(Some(UserWithRating {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            average_rating: average(&values),
            created_at: user.created_at,
        }))
    }

    async fn list(&self, params: &ListParams<UserFilter, UserSort>) -> Result<Vec<User>, ApiError> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches_user_filters(u, &params.filters))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            let primary = match params.sort_by {
                UserSort::Name => a.name.cmp(&b.name),
                UserSort::Email => a.email.cmp(&b.email),
                UserSort::Address => a.address.cmp(&b.address),
                UserSort::Role => a.role.as_str().cmp(b.role.as_str()),
                UserSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(primary, params.sort_order).then(a.id.cmp(&b.id))
        });
        Ok(page_slice(users, params.page))
    }

    async fn count(&self, filters: &[(UserFilter, String)]) -> Result<u64, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches_user_filters(u, filters))
            .count() as u64)
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        // Mirrors the unique index on email.
        if users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::UserAlreadyExists);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_owned();
        }
        Ok(())
    }
}

fn matches_user_filters(user: &User, filters: &[(UserFilter, String)]) -> bool {
    filters.iter().all(|(filter, value)| match filter {
        UserFilter::Name => contains_ci(&user.name, value),
        UserFilter::Email => contains_ci(&user.email, value),
        UserFilter::Address => user.address.as_deref().is_some_and(|a| contains_ci(a, value)),
        UserFilter::Role => contains_ci(user.role.as_str(), value),
    })
}

// ── MockStoreRepo ────────────────────────────────────────────────────────────

pub struct MockStoreRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub stores: Arc<Mutex<Vec<Store>>>,
    pub ratings: Arc<Mutex<Vec<Rating>>>,
}

impl MockStoreRepo {
    fn stats_for(&self, store: &Store) -> StoreWithStats {
        let values: Vec<i16> = self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.store_id == store.id)
            .map(|r| r.rating)
            .collect();
        let owner_name = store.owner_id.and_then(|owner_id| {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == owner_id)
                .map(|u| u.name.clone())
        });

        StoreWithStats {
            id: store.id,
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            owner_id: store.owner_id,
            owner_name,
            average_rating: average(&values),
            rating_count: values.len() as i64,
            created_at: store.created_at,
        }
    }
}

impl StoreRepository for MockStoreRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError> {
        Ok(self
            .stores
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_with_stats(&self, id: Uuid) -> Result<Option<StoreWithStats>, ApiError> {
        let store = match self.stores.lock().unwrap().iter().find(|s| s.id == id) {
            Some(store) => store.clone(),
            None => return Ok(None),
        };
        Ok(Some(self.stats_for(&store)))
    }

    async fn find_by_name_or_email(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<Store>, ApiError> {
        Ok(self
            .stores
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name || s.email == email)
            .cloned())
    }

    async fn list_with_stats(
        &self,
        params: &ListParams<StoreFilter, StoreSort>,
    ) -> Result<Vec<StoreWithStats>, ApiError> {
        let filtered: Vec<Store> = self
            .stores
            .lock()
            .unwrap()
            .iter()
            .filter(|s| matches_store_filters(s, &params.filters))
            .cloned()
            .collect();
        let mut stores: Vec<StoreWithStats> =
            filtered.iter().map(|s| self.stats_for(s)).collect();
        stores.sort_by(|a, b| {
            let primary = match params.sort_by {
                StoreSort::Name => a.name.cmp(&b.name),
                StoreSort::Email => a.email.cmp(&b.email),
                StoreSort::Address => a.address.cmp(&b.address),
                StoreSort::AverageRating => a.average_rating.total_cmp(&b.average_rating),
            };
            directed(primary, params.sort_order).then(a.id.cmp(&b.id))
        });
        Ok(page_slice(stores, params.page))
    }

    async fn count(&self, filters: &[(StoreFilter, String)]) -> Result<u64, ApiError> {
        Ok(self
            .stores
            .lock()
            .unwrap()
            .iter()
            .filter(|s| matches_store_filters(s, filters))
            .count() as u64)
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        Ok(self.stores.lock().unwrap().len() as u64)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OwnedStoreStats>, ApiError> {
        let mut owned: Vec<Store> = self
            .stores
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.owner_id == Some(owner_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(owned
            .iter()
            .map(|store| {
                let stats = self.stats_for(store);
                OwnedStoreStats {
                    id: stats.id,
                    name: stats.name,
                    email: stats.email,
                    address: stats.address,
                    average_rating: stats.average_rating,
                    rating_count: stats.rating_count,
                }
            })
            .collect())
    }

    async fn create(&self, store: &Store) -> Result<(), ApiError> {
        {
            let stores = self.stores.lock().unwrap();
            // Mirrors the unique indexes on name and email.
            if stores
                .iter()
                .any(|s| s.name == store.name || s.email == store.email)
            {
                return Err(ApiError::StoreAlreadyExists);
            }
        }
        // Mirrors the owner foreign key.
        if let Some(owner_id) = store.owner_id {
            if !self.users.lock().unwrap().iter().any(|u| u.id == owner_id) {
                return Err(ApiError::OwnerNotFound);
            }
        }
        self.stores.lock().unwrap().push(store.clone());
        Ok(())
    }
}

fn matches_store_filters(store: &Store, filters: &[(StoreFilter, String)]) -> bool {
    filters.iter().all(|(filter, value)| match filter {
        StoreFilter::Name => contains_ci(&store.name, value),
        StoreFilter::Address => contains_ci(&store.address, value),
    })
}

// ── MockRatingRepo ───────────────────────────────────────────────────────────

pub struct MockRatingRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub ratings: Arc<Mutex<Vec<Rating>>>,
}

impl MockRatingRepo {
    /// Inner-join against the users table, as the listing queries do.
    fn named_rows(&self, store_id: Uuid) -> Vec<(Rating, String)> {
        let ratings = self.ratings.lock().unwrap();
        let users = self.users.lock().unwrap();
        ratings
            .iter()
            .filter(|r| r.store_id == store_id)
            .filter_map(|r| {
                users
                    .iter()
                    .find(|u| u.id == r.user_id)
                    .map(|u| (r.clone(), u.name.clone()))
            })
            .collect()
    }
}

impl RatingRepository for MockRatingRepo {
    async fn upsert(&self, rating: &Rating) -> Result<RatingUpsert, ApiError> {
        let mut ratings = self.ratings.lock().unwrap();
        if let Some(existing) = ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id && r.store_id == rating.store_id)
        {
            // Conflict path: overwrite the value, keep created_at.
            existing.rating = rating.rating;
            existing.updated_at = rating.updated_at;
            return Ok(RatingUpsert::Updated);
        }
        ratings.push(rating.clone());
        Ok(RatingUpsert::Created)
    }

    async fn list_for_store(
        &self,
        store_id: Uuid,
        params: &ListParams<NoFilter, RatingSort>,
    ) -> Result<Vec<RatingWithUser>, ApiError> {
        let mut rows = self.named_rows(store_id);
        rows.sort_by(|(a, a_name), (b, b_name)| {
            let primary = match params.sort_by {
                RatingSort::Rating => a.rating.cmp(&b.rating),
                RatingSort::CreatedAt => a.created_at.cmp(&b.created_at),
                RatingSort::UserName => a_name.cmp(b_name),
            };
            directed(primary, params.sort_order).then(a.id.cmp(&b.id))
        });

        Ok(page_slice(rows, params.page)
            .into_iter()
            .map(|(rating, user_name)| RatingWithUser {
                rating: rating.rating,
                user_name,
                created_at: rating.created_at,
            })
            .collect())
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<u64, ApiError> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.store_id == store_id)
            .count() as u64)
    }

    async fn find_by_user_and_stores(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<Rating>, ApiError> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && store_ids.contains(&r.store_id))
            .cloned()
            .collect())
    }

    async fn recent_for_store(
        &self,
        store_id: Uuid,
        limit: u64,
    ) -> Result<Vec<RatingWithUser>, ApiError> {
        let mut rows = self.named_rows(store_id);
        rows.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);

        Ok(rows
            .into_iter()
            .map(|(rating, user_name)| RatingWithUser {
                rating: rating.rating,
                user_name,
                created_at: rating.created_at,
            })
            .collect())
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        Ok(self.ratings.lock().unwrap().len() as u64)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(name: &str, email: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: email.to_owned(),
        password_hash: "unset".to_owned(),
        address: None,
        role,
        created_at: Utc::now(),
    }
}

/// Like [`test_user`] but with a real argon2 hash, for login flows.
pub fn test_user_with_password(name: &str, email: &str, password: &str) -> User {
    let mut user = test_user(name, email, Role::User);
    user.password_hash = hash_password(password).unwrap();
    user
}

pub fn test_store(name: &str, email: &str, owner_id: Option<Uuid>) -> Store {
    Store {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: email.to_owned(),
        address: "123 Commerce Street, Springfield".to_owned(),
        owner_id,
        created_at: Utc::now(),
    }
}

pub fn test_rating(user_id: Uuid, store_id: Uuid, rating: i16) -> Rating {
    Rating {
        id: Uuid::new_v4(),
        user_id,
        store_id,
        rating,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn days_ago(days: i64) -> chrono::DateTime<Utc> {
    Utc::now() - chrono::Duration::days(days)
}

pub fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
