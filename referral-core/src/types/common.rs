//! Referral Basic Types
//!
//! Naming conventions:
//! - `_id` suffix: Primary key identifiers
//! - `_at` suffix: UTC timestamps
//! - `count`: number of users, `earnings`: whole RWF amounts

use crate::error::{ReferralError, ReferralResult};
use serde::{Deserialize, Serialize};

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Currency all earnings are denominated in
pub const CURRENCY: &str = "RWF";

/// Requested page (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    /// 0 selects the configured default
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Resolve defaults and clamp the page size
    pub fn normalize(self, default_size: u32, max_size: u32) -> ReferralResult<Self> {
        if self.page == 0 {
            return Err(ReferralError::InvalidPagination {
                reason: "page numbers start at 1".to_string(),
            });
        }
        let page_size = match self.page_size {
            0 => default_size,
            n => n.min(max_size),
        };
        Ok(Self {
            page: self.page,
            page_size,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: 0 }
    }
}

/// Pagination metadata returned with every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Build metadata for a normalized request
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let size = u64::from(request.page_size.max(1));
        let total_pages = total_items.div_ceil(size) as u32;
        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    /// Cut this page out of a fully sorted slice
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size as usize).min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::new("user:42");
        assert_eq!(id.as_str(), "user:42");
        assert_eq!(id.to_string(), "user:42");
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new("u1")).unwrap();
        assert_eq!(json, "\"u1\"");
    }

    #[test]
    fn test_page_request_normalize() {
        let req = PageRequest::new(2, 0).normalize(20, 100).unwrap();
        assert_eq!(req.page_size, 20);

        let clamped = PageRequest::new(1, 500).normalize(20, 100).unwrap();
        assert_eq!(clamped.page_size, 100);

        assert!(PageRequest::new(0, 10).normalize(20, 100).is_err());
    }

    #[test]
    fn test_pagination_slice() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Pagination::new(PageRequest::new(3, 10), items.len() as u64);

        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.slice(&items), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_pagination_past_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        let page = Pagination::new(PageRequest::new(4, 10), items.len() as u64);
        assert!(page.slice(&items).is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
