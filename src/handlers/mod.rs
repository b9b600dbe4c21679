// handlers/mod.rs - request handlers grouped by what a caller must present
//
// Public (no credential, or an optional one) → Protected (credential required
// unless the deployment turns mutation auth off)

pub mod protected;
pub mod public;

use crate::config::ApiConfig;
use crate::database::Page;
use crate::error::ApiError;
use serde::Deserialize;

/// `?limit=&offset=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Resolve against the configured page sizes. Without `limit` or `offset`
    /// every plot is returned. An explicit limit is capped at `max_page_size`;
    /// an offset alone pages by `default_page_size` (unbounded if unset).
    pub fn resolve(&self, api: &ApiConfig) -> Result<Page, ApiError> {
        if self.limit.is_none() && self.offset.is_none() {
            return Ok(Page::all());
        }
        if matches!(self.limit, Some(limit) if limit < 0) {
            return Err(ApiError::field_error("limit", "must not be negative"));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::field_error("offset", "must not be negative"));
        }

        let max = i64::from(api.max_page_size);
        let limit = self
            .limit
            .map(|limit| limit.min(max))
            .or(api.default_page_size.map(i64::from));

        Ok(Page { limit, offset })
    }
}
