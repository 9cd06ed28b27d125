//! Uniform response envelope.
//!
//! Every endpoint returns one of two JSON bodies: a success envelope (never
//! carries `errors`) or a failure envelope (never carries `data`). The
//! failure builder owns the exposure decision: diagnostic internals appear
//! only in development mode, and only for non-operational errors.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coursedesk_core::{AppError, FieldError, GENERIC_INTERNAL_MESSAGE};

/// Upper bound on any caller-supplied page size.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Pagination block for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Compute the block from caller input. `limit` is clamped to
    /// `1..=MAX_PAGE_LIMIT` and `page` floored at 1 before any derivation.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    /// Offset of the first record on this page. Saturates instead of
    /// overflowing, so an absurd caller-supplied page yields an offset past
    /// the end of the data (an empty page), never a panic.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Body of every successful response.
#[derive(Debug, Serialize)]
pub struct SuccessBody<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Body of every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

pub fn success<T: Serialize>(
    message: impl Into<String>,
    data: Option<T>,
    pagination: Option<Pagination>,
) -> SuccessBody<T> {
    SuccessBody {
        success: true,
        message: message.into(),
        data,
        pagination,
    }
}

/// Build the failure envelope for an already-classified error.
///
/// Outside development mode a non-operational error always renders the
/// generic message; `diagnostics` (the raw error's debug rendering) is
/// included only in development mode and only for non-operational errors.
pub fn failure(
    err: &AppError,
    path: &str,
    development: bool,
    diagnostics: Option<String>,
) -> ErrorBody {
    let message = if err.operational || development {
        err.message.clone()
    } else {
        GENERIC_INTERNAL_MESSAGE.to_string()
    };
    let stack = if development && !err.operational {
        diagnostics
    } else {
        None
    };

    ErrorBody {
        success: false,
        error: err.kind.code(),
        message,
        status_code: err.status(),
        timestamp: Utc::now(),
        path: path.to_string(),
        errors: err.details.clone(),
        stack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pagination_middle_page() {
        let p = Pagination::new(3, 20, 105);
        assert_eq!(p.total_pages, 6);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn pagination_first_page_has_no_prev() {
        let p = Pagination::new(1, 20, 105);
        assert!(!p.has_prev_page);
        assert!(p.has_next_page);
    }

    #[test]
    fn pagination_last_page_has_no_next() {
        let p = Pagination::new(6, 20, 105);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(Pagination::new(1, 5000, 10).limit, MAX_PAGE_LIMIT);
        assert_eq!(Pagination::new(1, 0, 10).limit, 1);
    }

    #[test]
    fn offset_saturates_for_absurd_pages() {
        let p = Pagination::new(u64::MAX, 100, 10);
        assert_eq!(p.offset(), u64::MAX);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn success_body_never_carries_errors_field() {
        let body = success("ok", Some(serde_json::json!({"id": 1})), None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("errors").is_none());
        assert!(json.get("stack").is_none());
    }

    #[test]
    fn failure_body_never_carries_data_field() {
        let err = coursedesk_core::AppError::validation("bad input");
        let json = serde_json::to_value(failure(&err, "/users", false, None)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["path"], "/users");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn production_hides_non_operational_details() {
        let err = coursedesk_core::AppError::internal();
        let body = failure(&err, "/users", false, Some("stack frames".to_string()));
        assert_eq!(body.message, GENERIC_INTERNAL_MESSAGE);
        assert_eq!(body.stack, None);
    }

    #[test]
    fn development_exposes_diagnostics_for_non_operational_only() {
        let internal = coursedesk_core::AppError::internal();
        let body = failure(&internal, "/users", true, Some("stack frames".to_string()));
        assert_eq!(body.stack.as_deref(), Some("stack frames"));

        let operational = coursedesk_core::AppError::validation("bad input");
        let body = failure(&operational, "/users", true, Some("stack frames".to_string()));
        assert_eq!(body.stack, None);
        assert_eq!(body.message, "bad input");
    }

    proptest! {
        #[test]
        fn pagination_invariants(page in any::<u64>(), limit in any::<u64>(), total in 0u64..1_000_000) {
            let p = Pagination::new(page, limit, total);
            prop_assert!(p.limit >= 1 && p.limit <= MAX_PAGE_LIMIT);
            prop_assert!(p.page >= 1);
            prop_assert_eq!(p.has_prev_page, p.page > 1);
            prop_assert_eq!(p.has_next_page, p.page < p.total_pages);
            // Never panics, even at u64::MAX; with limit >= 1 the offset
            // skips at least one record per previous page.
            prop_assert!(p.offset() >= p.page - 1);
            // Enough pages to cover every record, never one more than needed.
            prop_assert!(p.total_pages * p.limit >= p.total);
            prop_assert!(p.total_pages == 0 || (p.total_pages - 1) * p.limit < p.total);
        }
    }
}
