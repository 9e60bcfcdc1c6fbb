use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::revision::CatalogObjectRevision;

/// A zero-based page selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// First page of the given size.
    pub fn first(size: usize) -> Self {
        Self { page: 0, size }
    }

    /// Number of elements skipped before this page starts.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Reject empty pages and pages larger than `max_size`.
    pub fn validate(&self, max_size: usize) -> Result<(), TypeError> {
        if self.size == 0 {
            return Err(TypeError::InvalidPage("page size must be positive".into()));
        }
        if self.size > max_size {
            return Err(TypeError::InvalidPage(format!(
                "page size {} exceeds maximum {max_size}",
                self.size
            )));
        }
        Ok(())
    }
}

/// One page of results plus the total number of matching elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
}

impl<T> Page<T> {
    /// Slice an already ordered sequence into the requested page.
    pub fn paginate<I>(ordered: I, request: &PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut total_elements = 0;
        let mut items = Vec::with_capacity(request.size.min(64));
        let offset = request.offset();
        for (index, item) in ordered.into_iter().enumerate() {
            total_elements += 1;
            if index >= offset && items.len() < request.size {
                items.push(item);
            }
        }
        Self {
            items,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

    pub fn is_last(&self) -> bool {
        self.page + 1 >= self.total_pages()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// A filter applied to revisions before they are paged.
pub trait RevisionPredicate: Send + Sync {
    fn matches(&self, revision: &CatalogObjectRevision) -> bool;
}

/// Predicate that keeps every revision.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl RevisionPredicate for AcceptAll {
    fn matches(&self, _revision: &CatalogObjectRevision) -> bool {
        true
    }
}

impl<F> RevisionPredicate for F
where
    F: Fn(&CatalogObjectRevision) -> bool + Send + Sync,
{
    fn matches(&self, revision: &CatalogObjectRevision) -> bool {
        self(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_middle_page() {
        let page = Page::paginate(1..=10, &PageRequest::new(1, 3));
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total_elements, 10);
        assert_eq!(page.total_pages(), 4);
        assert!(!page.is_last());
    }

    #[test]
    fn paginate_last_partial_page() {
        let page = Page::paginate(1..=10, &PageRequest::new(3, 3));
        assert_eq!(page.items, vec![10]);
        assert!(page.is_last());
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = Page::paginate(1..=4, &PageRequest::new(5, 2));
        assert!(page.is_empty());
        assert_eq!(page.total_elements, 4);
    }

    #[test]
    fn validate_rejects_zero_and_oversized() {
        assert!(PageRequest::first(0).validate(10).is_err());
        assert!(PageRequest::first(11).validate(10).is_err());
        assert!(PageRequest::first(10).validate(10).is_ok());
    }

    #[test]
    fn map_keeps_paging_fields() {
        let page = Page::paginate(1..=5, &PageRequest::new(0, 2)).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.size, 2);
    }
}
