//! The page registry.
//!
//! An ordered, grow-only collection of [`Page`]s. During extraction it is a
//! [`PageRegistry`] that accepts appends in discovery order. Sorting consumes
//! it and yields a [`SortedRegistry`], which has no mutating methods: once the
//! order is fixed, the renderer and the index builder observe the same order.

use crate::types::Page;

#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Vec<Page>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Pages in insertion order.
    pub fn snapshot(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Newest first. The sort is stable, so pages with equal timestamps keep
    /// their insertion order.
    pub fn sort_by_recency_desc(mut self) -> SortedRegistry {
        self.pages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        SortedRegistry { pages: self.pages }
    }
}

/// A registry whose order is final.
#[derive(Debug)]
pub struct SortedRegistry {
    pages: Vec<Page>,
}

impl SortedRegistry {
    pub fn snapshot(&self) -> &[Page] {
        &self.pages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<'a> IntoIterator for &'a SortedRegistry {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
