//! Maps item offsets onto the page numbers a source understands.
//!
//! Sources return pages of varying length (short pages, filtered items), so the
//! page following a known offset is remembered instead of always being derived
//! from a fixed page size.

use std::collections::BTreeMap;

use parking_lot::Mutex;

#[derive(Debug)]
pub struct Paginator {
    page_size: usize,
    first_page: usize,
    boundaries: Mutex<BTreeMap<usize, usize>>,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            first_page: 1,
            boundaries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sources counting pages from 0 use `with_first_page(0)`
    pub fn with_first_page(self, first_page: usize) -> Self {
        Self { first_page, ..self }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn first_page(&self) -> usize {
        self.first_page
    }

    pub fn page_for(&self, offset: usize) -> usize {
        if offset == 0 {
            return self.first_page;
        }
        if let Some(page) = self.boundaries.lock().get(&offset) {
            return *page;
        }
        self.first_page + offset.div_ceil(self.page_size)
    }

    /// Remember where the list continues after `page` returned `items` entries
    /// for the request made at `offset`.
    pub fn record_page_result(&self, offset: usize, page: usize, items: usize) {
        let next = if items > 0 { page + 1 } else { page };
        self.boundaries.lock().insert(offset + items, next);
    }

    pub fn reset(&self) {
        self.boundaries.lock().clear();
    }
}
