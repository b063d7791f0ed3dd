use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<u64>,
}

impl Pagination {
    /// `next` is absent once `page * limit` covers `total` (or when `limit` is 0);
    /// `prev` is absent on page 1.
    #[must_use]
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            total,
            page,
            limit,
            next: if limit == 0 || page.saturating_mul(limit) >= total { None } else { page.checked_add(1) },
            prev: page.checked_sub(1).filter(|p| *p >= 1),
        }
    }

    /// Documents to skip before this page starts.
    #[must_use]
    pub fn offset(page: u64, limit: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(limit)
    }
}
