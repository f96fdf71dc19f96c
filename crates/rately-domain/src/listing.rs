//! Shared resolution of listing query parameters.
//!
//! Every collection endpoint accepts the same reserved keys (`page`,
//! `limit`, `sortBy`, `sortOrder`) plus an endpoint-specific allow-list of
//! filter keys. [`ListParams::resolve`] turns a raw query map into typed
//! parameters and never fails: unknown keys are ignored, unknown sort
//! columns fall back to the endpoint default, and empty filter values are
//! dropped.

use std::collections::BTreeMap;

use crate::pagination::PageRequest;

/// Query keys that are never treated as filters.
pub const RESERVED_KEYS: [&str; 4] = ["page", "limit", "sortBy", "sortOrder"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

/// Filter keys a listing endpoint accepts.
pub trait FilterKey: Sized {
    fn from_param(key: &str) -> Option<Self>;
}

/// Sort columns a listing endpoint accepts.
///
/// `Default` is the column used when `sortBy` is missing or not in the
/// allow-list; [`SortKey::default_order`] is the direction used when
/// `sortOrder` is missing or unrecognized.
pub trait SortKey: Sized + Default {
    fn from_param(key: &str) -> Option<Self>;

    fn default_order() -> SortOrder {
        SortOrder::Asc
    }
}

/// Filter set for endpoints that accept no filters at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFilter {}

impl FilterKey for NoFilter {
    fn from_param(_key: &str) -> Option<Self> {
        None
    }
}

/// Fully resolved listing parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams<F, S> {
    pub filters: Vec<(F, String)>,
    pub sort_by: S,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl<F: FilterKey, S: SortKey> Default for ListParams<F, S> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort_by: S::default(),
            sort_order: S::default_order(),
            page: PageRequest::default(),
        }
    }
}

impl<F: FilterKey, S: SortKey> ListParams<F, S> {
    /// Resolves a raw query map into typed listing parameters.
    pub fn resolve(query: &BTreeMap<String, String>) -> Self {
        let sort_by = query
            .get("sortBy")
            .and_then(|v| S::from_param(v))
            .unwrap_or_default();
        let sort_order = query
            .get("sortOrder")
            .and_then(|v| SortOrder::from_param(v))
            .unwrap_or_else(S::default_order);
        let page = PageRequest::from_params(
            query.get("page").map(String::as_str),
            query.get("limit").map(String::as_str),
        );
        let filters = query
            .iter()
            .filter(|(key, value)| !RESERVED_KEYS.contains(&key.as_str()) && !value.is_empty())
            .filter_map(|(key, value)| F::from_param(key).map(|f| (f, value.clone())))
            .collect();

        Self { filters, sort_by, sort_order, page }
    }
}
