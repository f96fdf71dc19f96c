//! SeaORM-backed repositories.
//!
//! Simple lookups go through the entity API; the rating aggregates use raw
//! SQL because SeaORM cannot express the grouped `AVG`/`COUNT` joins cleanly.
//! Every identifier interpolated into raw SQL comes from a fixed match on an
//! enum, never from user input; user input is always bound as `$n` values.

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, Statement, Value,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use rately_api_schema::{ratings, stores, users};
use rately_domain::{ListParams, NoFilter, Role, SortOrder};

use crate::domain::repository::{RatingRepository, StoreRepository, UserRepository};
use crate::domain::types::{
    OwnedStoreStats, Rating, RatingSort, RatingUpsert, RatingWithUser, Store, StoreFilter,
    StoreSort, StoreWithStats, User, UserFilter, UserSort, UserWithRating,
};
use crate::error::ApiError;

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_with_average_rating(&self, id: Uuid) -> Result<Option<UserWithRating>, ApiError> {
        // Average over the ratings of the stores this user owns; zero rows
        // average to 0, matching the detail endpoint for non-owners.
        let sql = r#"
            SELECT u.id, u.name, u.email, u.address, u.role, u.created_at,
                   COALESCE(AVG(r.rating), 0)::float8 AS average_rating
            FROM users u
            LEFT JOIN stores s ON u.id = s.owner_id
            LEFT JOIN ratings r ON s.id = r.store_id
            WHERE u.id = $1
            GROUP BY u.id
        "#;

        #[derive(Debug, FromQueryResult)]
        struct UserRatingRow {
            id: Uuid,
            name: String,
            email: String,
            address: Option<String>,
            role: String,
            created_at: chrono::DateTime<chrono::Utc>,
            average_rating: f64,
        }

        let row = UserRatingRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [id.into()],
        ))
        .one(&self.db)
        .await
        .context("find user with average rating")?;

        Ok(row.map(|row| UserWithRating {
            id: row.id,
            name: row.name,
            email: row.email,
            address: row.address,
            role: role_from_str(&row.role),
            average_rating: row.average_rating,
            created_at: row.created_at,
        }))
    }

    async fn list(&self, params: &ListParams<UserFilter, UserSort>) -> Result<Vec<User>, ApiError> {
        let mut query = apply_user_filters(users::Entity::find(), &params.filters);

        let order = order_from(params.sort_order);
        query = match params.sort_by {
            UserSort::Name => query.order_by(users::Column::Name, order),
            UserSort::Email => query.order_by(users::Column::Email, order),
            UserSort::Address => query.order_by(users::Column::Address, order),
            UserSort::Role => query.order_by(users::Column::Role, order),
            UserSort::CreatedAt => query.order_by(users::Column::CreatedAt, order),
        };

        // Secondary order on id keeps pages stable across equal keys.
        let models = query
            .order_by_asc(users::Column::Id)
            .offset(params.page.offset())
            .limit(u64::from(params.page.limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn count(&self, filters: &[(UserFilter, String)]) -> Result<u64, ApiError> {
        let total = apply_user_filters(users::Entity::find(), filters)
            .count(&self.db)
            .await
            .context("count users")?;
        Ok(total)
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let total = users::Entity::find()
            .count(&self.db)
            .await
            .context("count all users")?;
        Ok(total)
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password: Set(user.password_hash.clone()),
            address: Set(user.address.clone()),
            role: Set(user.role.as_str().to_owned()),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Concurrent registration with the same email loses here, not in
            // the pre-check.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ApiError::UserAlreadyExists)
            }
            Err(e) => Err(anyhow::Error::from(e).context("create user").into()),
        }
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user password")?;
        Ok(())
    }
}

fn apply_user_filters(
    mut query: sea_orm::Select<users::Entity>,
    filters: &[(UserFilter, String)],
) -> sea_orm::Select<users::Entity> {
    for (filter, value) in filters {
        let pattern = like_pattern(value);
        query = match filter {
            UserFilter::Name => query.filter(Expr::col(users::Column::Name).ilike(pattern)),
            UserFilter::Email => query.filter(Expr::col(users::Column::Email).ilike(pattern)),
            UserFilter::Address => query.filter(Expr::col(users::Column::Address).ilike(pattern)),
            UserFilter::Role => query.filter(Expr::col(users::Column::Role).ilike(pattern)),
        };
    }
    query
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password,
        address: model.address,
        role: role_from_str(&model.role),
        created_at: model.created_at,
    }
}

// ── Stores ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStoreRepository {
    pub db: DatabaseConnection,
}

impl StoreRepository for DbStoreRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError> {
        let model = stores::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find store by id")?;
        Ok(model.map(store_from_model))
    }

    async fn find_with_stats(&self, id: Uuid) -> Result<Option<StoreWithStats>, ApiError> {
        let sql = r#"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                   u.name AS owner_name,
                   COALESCE(AVG(r.rating), 0)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN users u ON s.owner_id = u.id
            LEFT JOIN ratings r ON s.id = r.store_id
            WHERE s.id = $1
            GROUP BY s.id, u.name
        "#;

        let row = StoreStatsRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [id.into()],
        ))
        .one(&self.db)
        .await
        .context("find store with stats")?;
        Ok(row.map(store_stats_from_row))
    }

    async fn find_by_name_or_email(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<Store>, ApiError> {
        let model = stores::Entity::find()
            .filter(
                Condition::any()
                    .add(stores::Column::Name.eq(name))
                    .add(stores::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await
            .context("find store by name or email")?;
        Ok(model.map(store_from_model))
    }

    async fn list_with_stats(
        &self,
        params: &ListParams<StoreFilter, StoreSort>,
    ) -> Result<Vec<StoreWithStats>, ApiError> {
        let mut values: Vec<Value> = Vec::new();
        let where_clause = store_filter_sql(&params.filters, &mut values);

        let sort_column = match params.sort_by {
            StoreSort::Name => "s.name",
            StoreSort::Email => "s.email",
            StoreSort::Address => "s.address",
            StoreSort::AverageRating => "average_rating",
        };
        let sort_dir = sql_dir(params.sort_order);

        let limit_param = values.len() + 1;
        let offset_param = values.len() + 2;
        values.push((i64::from(params.page.limit)).into());
        values.push((params.page.offset() as i64).into());

        let sql = format!(
            r#"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                   u.name AS owner_name,
                   COALESCE(AVG(r.rating), 0)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN users u ON s.owner_id = u.id
            LEFT JOIN ratings r ON s.id = r.store_id
            {where_clause}
            GROUP BY s.id, u.name
            ORDER BY {sort_column} {sort_dir}, s.id ASC
            LIMIT ${limit_param} OFFSET ${offset_param}
            "#
        );

        let rows = StoreStatsRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("list stores with stats")?;
        Ok(rows.into_iter().map(store_stats_from_row).collect())
    }

    async fn count(&self, filters: &[(StoreFilter, String)]) -> Result<u64, ApiError> {
        let mut values: Vec<Value> = Vec::new();
        let where_clause = store_filter_sql(filters, &mut values);
        // Filters only touch store columns, so the count can skip the joins.
        let sql = format!("SELECT COUNT(*) AS total FROM stores s {where_clause}");

        #[derive(Debug, FromQueryResult)]
        struct CountRow {
            total: i64,
        }

        let row = CountRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .one(&self.db)
        .await
        .context("count stores")?
        .context("count stores returned no row")?;
        Ok(row.total as u64)
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let total = stores::Entity::find()
            .count(&self.db)
            .await
            .context("count all stores")?;
        Ok(total)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OwnedStoreStats>, ApiError> {
        let sql = r#"
            SELECT s.id, s.name, s.email, s.address,
                   COALESCE(AVG(r.rating), 0)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN ratings r ON s.id = r.store_id
            WHERE s.owner_id = $1
            GROUP BY s.id
            ORDER BY s.name ASC, s.id ASC
        "#;

        #[derive(Debug, FromQueryResult)]
        struct OwnedStoreRow {
            id: Uuid,
            name: String,
            email: String,
            address: String,
            average_rating: f64,
            rating_count: i64,
        }

        let rows = OwnedStoreRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [owner_id.into()],
        ))
        .all(&self.db)
        .await
        .context("list stores by owner")?;

        Ok(rows
            .into_iter()
            .map(|row| OwnedStoreStats {
                id: row.id,
                name: row.name,
                email: row.email,
                address: row.address,
                average_rating: row.average_rating,
                rating_count: row.rating_count,
            })
            .collect())
    }

    async fn create(&self, store: &Store) -> Result<(), ApiError> {
        let result = stores::ActiveModel {
            id: Set(store.id),
            name: Set(store.name.clone()),
            email: Set(store.email.clone()),
            address: Set(store.address.clone()),
            owner_id: Set(store.owner_id),
            created_at: Set(store.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(ApiError::StoreAlreadyExists),
                // Owner deleted between the pre-check and the insert.
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => Err(ApiError::OwnerNotFound),
                _ => Err(anyhow::Error::from(e).context("create store").into()),
            },
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct StoreStatsRow {
    id: Uuid,
    name: String,
    email: String,
    address: String,
    owner_id: Option<Uuid>,
    owner_name: Option<String>,
    average_rating: f64,
    rating_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn store_stats_from_row(row: StoreStatsRow) -> StoreWithStats {
    StoreWithStats {
        id: row.id,
        name: row.name,
        email: row.email,
        address: row.address,
        owner_id: row.owner_id,
        owner_name: row.owner_name,
        average_rating: row.average_rating,
        rating_count: row.rating_count,
        created_at: row.created_at,
    }
}

/// Renders the filters as a `WHERE` clause with numbered binds, pushing the
/// bound values onto `values`. Column names come from the enum match.
fn store_filter_sql(filters: &[(StoreFilter, String)], values: &mut Vec<Value>) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let mut conditions = Vec::new();
    for (filter, value) in filters {
        let column = match filter {
            StoreFilter::Name => "s.name",
            StoreFilter::Address => "s.address",
        };
        values.push(like_pattern(value).into());
        conditions.push(format!("{column} ILIKE ${}", values.len()));
    }
    format!("WHERE {}", conditions.join(" AND "))
}

fn store_from_model(model: stores::Model) -> Store {
    Store {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        owner_id: model.owner_id,
        created_at: model.created_at,
    }
}

// ── Ratings ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
}

impl RatingRepository for DbRatingRepository {
    async fn upsert(&self, rating: &Rating) -> Result<RatingUpsert, ApiError> {
        // `xmax = 0` is true only for rows the insert created, which tells a
        // first-time rating apart from an update of an existing one.
        let sql = r#"
            INSERT INTO ratings (id, user_id, store_id, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at
            RETURNING (xmax = 0) AS inserted
        "#;

        #[derive(Debug, FromQueryResult)]
        struct UpsertRow {
            inserted: bool,
        }

        let result = UpsertRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [
                rating.id.into(),
                rating.user_id.into(),
                rating.store_id.into(),
                rating.rating.into(),
                rating.created_at.into(),
                rating.updated_at.into(),
            ],
        ))
        .one(&self.db)
        .await;

        let row = match result {
            Ok(row) => row.context("upsert rating returned no row")?,
            // Store deleted between the existence check and the insert.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                return Err(ApiError::StoreNotFound);
            }
            Err(e) => return Err(anyhow::Error::from(e).context("upsert rating").into()),
        };

        Ok(if row.inserted {
            RatingUpsert::Created
        } else {
            RatingUpsert::Updated
        })
    }

    async fn list_for_store(
        &self,
        store_id: Uuid,
        params: &ListParams<NoFilter, RatingSort>,
    ) -> Result<Vec<RatingWithUser>, ApiError> {
        let sort_column = match params.sort_by {
            RatingSort::Rating => "r.rating",
            RatingSort::CreatedAt => "r.created_at",
            RatingSort::UserName => "user_name",
        };
        let sort_dir = sql_dir(params.sort_order);

        let sql = format!(
            r#"
            SELECT r.rating, r.created_at, u.name AS user_name
            FROM ratings r
            JOIN users u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY {sort_column} {sort_dir}, r.id ASC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = RatingUserRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            [
                store_id.into(),
                i64::from(params.page.limit).into(),
                (params.page.offset() as i64).into(),
            ],
        ))
        .all(&self.db)
        .await
        .context("list ratings for store")?;
        Ok(rows.into_iter().map(rating_user_from_row).collect())
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<u64, ApiError> {
        let total = ratings::Entity::find()
            .filter(ratings::Column::StoreId.eq(store_id))
            .count(&self.db)
            .await
            .context("count ratings for store")?;
        Ok(total)
    }

    async fn find_by_user_and_stores(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<Rating>, ApiError> {
        if store_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("list user ratings for stores")?;
        Ok(models.into_iter().map(rating_from_model).collect())
    }

    async fn recent_for_store(
        &self,
        store_id: Uuid,
        limit: u64,
    ) -> Result<Vec<RatingWithUser>, ApiError> {
        let sql = r#"
            SELECT r.rating, r.created_at, u.name AS user_name
            FROM ratings r
            JOIN users u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2
        "#;

        let rows = RatingUserRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [store_id.into(), (limit as i64).into()],
        ))
        .all(&self.db)
        .await
        .context("list recent ratings for store")?;
        Ok(rows.into_iter().map(rating_user_from_row).collect())
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let total = ratings::Entity::find()
            .count(&self.db)
            .await
            .context("count all ratings")?;
        Ok(total)
    }
}

#[derive(Debug, FromQueryResult)]
struct RatingUserRow {
    rating: i16,
    user_name: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn rating_user_from_row(row: RatingUserRow) -> RatingWithUser {
    RatingWithUser {
        rating: row.rating,
        user_name: row.user_name,
        created_at: row.created_at,
    }
}

fn rating_from_model(model: ratings::Model) -> Rating {
    Rating {
        id: model.id,
        user_id: model.user_id,
        store_id: model.store_id,
        rating: model.rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Shared helpers ──────────────────────────────────────────────────────────

/// Substring match; `%` and `_` in the needle keep their LIKE meaning.
fn like_pattern(value: &str) -> String {
    format!("%{value}%")
}

fn order_from(sort_order: SortOrder) -> Order {
    match sort_order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

fn sql_dir(sort_order: SortOrder) -> &'static str {
    match sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Roles are constrained on write; anything unreadable falls back to `user`.
fn role_from_str(role: &str) -> Role {
    Role::parse(role).unwrap_or_default()
}
