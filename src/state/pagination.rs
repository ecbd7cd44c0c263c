//! Pagination math over the image catalog.
//!
//! Purely a function of (item count, page size, page index). Out-of-range
//! pages are clamped by callers before slicing; navigation clamps at both
//! ends rather than wrapping.

use std::ops::Range;

/// Number of pages needed for `total` items: `ceil(total / page_size)`.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Half-open index range of the items visible on `page`:
/// `[page * page_size, min((page + 1) * page_size, total))`.
pub fn visible_range(total: usize, page_size: usize, page: usize) -> Range<usize> {
    let start = (page * page_size).min(total);
    let end = ((page + 1) * page_size).min(total);
    start..end
}

/// Clamp a possibly out-of-range page index to the valid range.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    let pages = page_count(total, page_size);
    if pages == 0 {
        0
    } else {
        page.min(pages - 1)
    }
}

/// Page index after advancing forward, clamped at the last page.
pub fn next_page(page: usize, total: usize, page_size: usize) -> usize {
    clamp_page(page + 1, total, page_size)
}

/// Page index after stepping backward, clamped at page 0.
pub fn prev_page(page: usize) -> usize {
    page.saturating_sub(1)
}
