pub mod auth;
pub mod rating;
pub mod store;
pub mod user;

use std::collections::BTreeMap;

use crate::error::ApiError;

/// Decodes the raw query string into a key-value map.
///
/// Listing endpoints resolve filters, sort keys and pagination out of the
/// map themselves, so unknown keys survive decoding and are dropped later.
pub(crate) fn parse_query(raw: Option<&str>) -> Result<BTreeMap<String, String>, ApiError> {
    Ok(raw
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::InvalidQuery)?
        .unwrap_or_default())
}
