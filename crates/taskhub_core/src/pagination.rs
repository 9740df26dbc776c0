//! Page/limit windowing for list use-cases.
//!
//! # Responsibility
//! - Turn caller page/limit input into a validated offset window.
//! - Compute `{total, page, last_page}` metadata for list envelopes.
//!
//! # Invariants
//! - `offset = (page - 1) * limit`.
//! - `last_page = ceil(total / limit)`, so an empty result has `last_page = 0`.
//! - `page < 1` clamps to 1; `limit <= 0` is rejected; `limit` above the
//!   configured maximum clamps to the maximum.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PROJECT_PAGE_SIZE: u32 = 10;
pub const NOTIFICATION_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Input parsing/validation errors for pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// `page` or `limit` text is not an integer.
    NotANumber { field: &'static str, value: String },
    /// `limit` is zero or negative.
    NonPositiveLimit(i64),
}

impl Display for PaginationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber { field, value } => {
                write!(f, "`{field}` must be an integer, got `{value}`")
            }
            Self::NonPositiveLimit(limit) => write!(f, "`limit` must be positive, got {limit}"),
        }
    }
}

impl Error for PaginationError {}

/// Default and maximum page sizes for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PageLimits {
    /// Builds limits, keeping `1 <= default_limit <= max_limit`.
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn projects() -> Self {
        Self::new(PROJECT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn notifications() -> Self {
        Self::new(NOTIFICATION_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

/// Raw caller pagination input. Absent values fall back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Parses query-string style input. Blank values count as absent.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        Ok(Self {
            page: parse_number("page", page)?,
            limit: parse_number("limit", limit)?,
        })
    }

    /// Resolves the request into a concrete window under `limits`.
    pub fn resolve(&self, limits: PageLimits) -> Result<PageWindow, PaginationError> {
        let limit = match self.limit {
            None => limits.default_limit,
            Some(value) if value <= 0 => return Err(PaginationError::NonPositiveLimit(value)),
            Some(value) => u32::try_from(value)
                .unwrap_or(u32::MAX)
                .min(limits.max_limit),
        };
        let page = self
            .page
            .map_or(1, |value| u32::try_from(value.max(1)).unwrap_or(u32::MAX));
        Ok(PageWindow { page, limit })
    }
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<Option<i64>, PaginationError> {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        None => Ok(None),
        Some(text) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| PaginationError::NotANumber {
                field,
                value: text.to_string(),
            }),
    }
}

/// Validated window: 1-based page and positive limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            last_page: last_page(total, self.limit),
        }
    }
}

/// `ceil(total / limit)`. `limit` is never zero for a resolved window.
pub fn last_page(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit.max(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub last_page: u64,
}

/// Paginated list envelope: `{ data, meta }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
