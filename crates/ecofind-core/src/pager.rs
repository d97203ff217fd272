//! Numbered page-control windowing
//!
//! Given the current page and the page count, decides which page buttons the
//! console renders: at most five contiguous numbers plus optional jump-to-first
//! and jump-to-last shortcuts.

use serde::Serialize;

/// Maximum number of contiguous page buttons
pub const WINDOW: usize = 5;

/// A jump-to-first or jump-to-last button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    /// Page the button jumps to
    pub page: usize,
    /// Whether an ellipsis separates the shortcut from the window
    pub ellipsis: bool,
}

/// Rendered page controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageControls {
    /// Current page (1-based)
    pub current_page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Contiguous page numbers to show
    pub pages: Vec<usize>,
    /// Jump to page 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading: Option<Shortcut>,
    /// Jump to the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Shortcut>,
    /// Whether "previous" is enabled
    pub has_prev: bool,
    /// Whether "next" is enabled
    pub has_next: bool,
}

impl PageControls {
    /// Compute the controls for `current_page` out of `total_pages`
    #[must_use]
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        let first = if total_pages <= WINDOW || current_page <= 3 {
            1
        } else if current_page + 2 >= total_pages {
            total_pages - (WINDOW - 1)
        } else {
            current_page - 2
        };
        let pages = (first..).take(total_pages.min(WINDOW)).collect();

        let paged = total_pages > WINDOW;
        let leading = (paged && current_page > 3).then_some(Shortcut {
            page: 1,
            ellipsis: current_page > 4,
        });
        let trailing = (paged && current_page + 2 < total_pages).then_some(Shortcut {
            page: total_pages,
            ellipsis: current_page + 3 < total_pages,
        });

        Self {
            current_page,
            total_pages,
            pages,
            leading,
            trailing,
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
        }
    }
}
