use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// `?page=N` on every list endpoint (1-based).
#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// PageRequest
///
/// A resolved page window handed to the repository as LIMIT/OFFSET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(query: PageQuery, size: i64) -> AppResult<Self> {
        let number = query.page.unwrap_or(1);
        let size = size.max(1);
        // The window start must fit in i64, so `offset` never overflows.
        let fits = number
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(size))
            .is_some();
        if number < 1 || !fits {
            return Err(AppError::InvalidPage);
        }
        Ok(Self { number, size })
    }

    pub fn first(size: i64) -> Self {
        Self {
            number: 1,
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// Page
///
/// Envelope for paginated lists. `next` and `previous` are page numbers, `None`
/// at either end.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wraps one window of results. Asking for a page past the end is an error,
    /// except for the first page of an empty list.
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> AppResult<Self> {
        if request.number > 1 && request.offset() >= count {
            return Err(AppError::InvalidPage);
        }

        let seen = request.offset() + results.len() as i64;
        Ok(Self {
            count,
            next: (seen < count).then_some(request.number + 1),
            previous: (request.number > 1).then_some(request.number - 1),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page_links_both_ways() {
        let request = PageRequest::new(PageQuery { page: Some(2) }, 10).unwrap();
        let page = Page::new(request, 25, vec![0; 10]).unwrap();
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn last_page_has_no_next() {
        let request = PageRequest::new(PageQuery { page: Some(3) }, 10).unwrap();
        let page = Page::new(request, 25, vec![0; 5]).unwrap();
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(2));
    }

    #[test]
    fn empty_first_page_is_valid() {
        let page: Page<i32> = Page::new(PageRequest::first(10), 0, vec![]).unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        assert!(matches!(
            PageRequest::new(PageQuery { page: Some(0) }, 10),
            Err(AppError::InvalidPage)
        ));
        assert!(matches!(
            PageRequest::new(PageQuery { page: Some(i64::MAX) }, 10),
            Err(AppError::InvalidPage)
        ));
        let request = PageRequest::new(PageQuery { page: Some(4) }, 10).unwrap();
        assert!(matches!(
            Page::<i32>::new(request, 25, vec![]),
            Err(AppError::InvalidPage)
        ));
    }
}
