//! Client half of the pagination protocol.
//!
//! [`render_page`] turns an envelope into a page model: numbered rows plus one button per
//! page. Buttons are labeled with the absolute index of the last row they lead to (`10`,
//! `20`, `25`), not with page ordinals. [`PaginationWidget`] drives the fetch/render cycle
//! against a [`PageSource`].

pub mod text;
mod widget;

pub use widget::{PageSource, PaginationState, PaginationWidget, QuerySource, TableSource, WidgetState};

use crate::core::limits::{DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_OFFSET};
use crate::core::types::{Cell, QueryResult};

/// Shown in place of SQL NULL.
pub const NULL_DISPLAY: &str = "NULL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageButton {
    /// 1-based page number.
    pub page: usize,
    /// Last absolute row index on the page; this is what the button shows.
    pub label: usize,
    pub first_row: usize,
    pub active: bool,
}

impl PageButton {
    pub fn title(&self) -> String {
        format!("rows {}-{}", self.first_row, self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberedRow {
    /// 1-based, continuous across pages.
    pub number: usize,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub columns: Vec<String>,
    pub rows: Vec<NumberedRow>,
    /// Empty when the envelope carried no `total`.
    pub buttons: Vec<PageButton>,
    pub current_page: usize,
    pub total_pages: usize,
    pub offset: usize,
    pub limit: usize,
    pub total: Option<usize>,
}

pub fn render_page(data: &QueryResult) -> RenderedPage {
    let offset = data.offset.unwrap_or(DEFAULT_PAGE_OFFSET);
    let limit = data.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_LIMIT);
    let current_page = offset / limit + 1;

    let (total_pages, buttons) = match data.total {
        Some(total) => {
            let total_pages = total.div_ceil(limit);
            let buttons = (1..=total_pages)
                .map(|page| {
                    let page_offset = (page - 1) * limit;
                    PageButton {
                        page,
                        label: (page_offset + limit).min(total),
                        first_row: page_offset + 1,
                        active: page == current_page,
                    }
                })
                .collect();
            (total_pages, buttons)
        }
        None => (0, Vec::new()),
    };

    let rows = data
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| NumberedRow {
            number: offset + i + 1,
            cells: cells.clone(),
        })
        .collect();

    RenderedPage {
        columns: data.columns.clone(),
        rows,
        buttons,
        current_page,
        total_pages,
        offset,
        limit,
        total: data.total,
    }
}

impl RenderedPage {
    /// Clicking page `page` asks for its window through `on_page_change(offset, limit)`.
    /// The active page and pages that do not exist do nothing. Returns whether the
    /// callback ran.
    pub fn click<F>(&self, page: usize, on_page_change: F) -> bool
    where
        F: FnOnce(usize, usize),
    {
        if page == self.current_page || page == 0 || page > self.total_pages {
            return false;
        }
        on_page_change((page - 1) * self.limit, self.limit);
        true
    }

    pub fn active_button(&self) -> Option<&PageButton> {
        self.buttons.iter().find(|b| b.active)
    }
}

/// Scroll position that centers the active button in its strip. Degenerate geometry
/// (zero-width container, button left of the origin) yields 0.
pub fn center_scroll_left(container_width: f64, button_left: f64, button_width: f64) -> f64 {
    let left = button_left - container_width / 2.0 + button_width / 2.0;
    if left.is_finite() && left > 0.0 {
        left
    } else {
        0.0
    }
}

/// Display text for a cell.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Null => NULL_DISPLAY.to_string(),
        Cell::String(s) => s.clone(),
        other => other.to_string(),
    }
}
