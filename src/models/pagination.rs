use serde::{Deserialize, Serialize};

/// Pagination parameters for list queries.
/// Both page and limit are optional; when neither is provided every result is returned.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PaginationParams {
    /// Page number (1-indexed). When None, returns all results.
    pub page: Option<usize>,
    /// Number of items per page. When None, uses default or returns all.
    pub limit: Option<usize>,
}

impl PaginationParams {
    /// Default limit when a page is requested without a limit
    pub const DEFAULT_LIMIT: usize = 50;
    /// Maximum allowed limit
    pub const MAX_LIMIT: usize = 200;

    pub fn page(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Number of items to skip. Uses the effective (capped) limit to keep page boundaries consistent.
    pub fn offset(&self) -> Option<usize> {
        self.effective_limit().map(|limit| (self.page.unwrap_or(1).max(1) - 1) * limit)
    }

    /// Get the effective limit, applying defaults and max constraints
    pub fn effective_limit(&self) -> Option<usize> {
        match self.limit {
            Some(limit) => Some(limit.clamp(1, Self::MAX_LIMIT)),
            None if self.page.is_some() => Some(Self::DEFAULT_LIMIT),
            None => None,
        }
    }
}

/// Paginated response wrapper with metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginatedResponse<T> {
    /// The actual data items
    pub data: Vec<T>,
    /// Current page number (1-indexed)
    pub page: usize,
    /// Number of items per page
    pub limit: usize,
    /// Total number of items across all pages
    pub total_items: usize,
    /// Total number of pages
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: usize, limit: usize, total_items: usize) -> Self {
        let total_pages = if limit > 0 { total_items.div_ceil(limit) } else { 1 };

        Self {
            data,
            page,
            limit,
            total_items,
            total_pages,
        }
    }
}
