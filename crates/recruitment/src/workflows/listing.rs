//! Pagination contract shared by every job and application listing.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Normalized page request. Non-positive inputs fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: normalize(page, DEFAULT_PAGE),
            limit: normalize(limit, DEFAULT_LIMIT),
        }
    }

    /// Absent values behave like non-positive ones.
    pub fn from_optional(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::new(page.unwrap_or(0), limit.unwrap_or(0))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Cut one page out of an already ordered result set, returning it with the full count.
    pub fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, u64) {
        let total = items.len() as u64;
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let page = items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect();
        (page, total)
    }
}

fn normalize(value: i64, fallback: u32) -> u32 {
    if value <= 0 {
        fallback
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: total.div_ceil(u64::from(request.limit())),
        }
    }
}

/// Listing envelope. `meta` is always present, even for an empty page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_inputs_fall_back_to_defaults() {
        assert_eq!(PageRequest::new(0, -5), PageRequest::default());
        assert_eq!(PageRequest::from_optional(None, Some(25)).limit(), 25);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(25, PageRequest::new(1, 10)).total_pages, 3);
        assert_eq!(PageMeta::new(0, PageRequest::default()).total_pages, 0);
        assert_eq!(PageMeta::new(10, PageRequest::default()).total_pages, 1);
    }

    #[test]
    fn slice_past_the_end_is_empty_but_counted() {
        let (page, total) = PageRequest::new(4, 2).slice(vec![1, 2, 3, 4, 5]);
        assert!(page.is_empty());
        assert_eq!(total, 5);
    }

    #[test]
    fn envelope_serializes_total_pages_in_camel_case() {
        let envelope = Paginated::new(vec!["a"], 1, PageRequest::default());
        let json = serde_json::to_value(&envelope).expect("serializable");
        assert_eq!(json["meta"]["totalPages"], 1);
        assert_eq!(json["meta"]["limit"], 10);
    }
}
