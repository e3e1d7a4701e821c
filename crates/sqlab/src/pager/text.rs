//! Plain-text rendering of a page, for terminals.

use super::{cell_text, center_scroll_left, RenderedPage};

/// Button strip on one line, then the grid.
pub fn render(page: &RenderedPage, width: usize) -> String {
    let mut out = String::new();
    if !page.buttons.is_empty() {
        out.push_str(&button_strip(page, width));
        out.push('\n');
    }
    out.push_str(&grid(page));
    out
}

/// `[10] <20> [25]`, the active page in angle brackets. A strip wider than `width` is
/// scrolled so the active button sits in the middle.
pub fn button_strip(page: &RenderedPage, width: usize) -> String {
    let mut strip = String::new();
    let mut active_span = None;
    for button in &page.buttons {
        if !strip.is_empty() {
            strip.push(' ');
        }
        let text = if button.active {
            format!("<{}>", button.label)
        } else {
            format!("[{}]", button.label)
        };
        if button.active {
            active_span = Some((strip.len(), text.len()));
        }
        strip.push_str(&text);
    }

    if width == 0 || strip.len() <= width {
        return strip;
    }
    let (left, button_width) = active_span.unwrap_or((0, 0));
    let scroll = center_scroll_left(width as f64, left as f64, button_width as f64) as usize;
    let start = scroll.min(strip.len() - width);
    strip[start..start + width].to_string()
}

/// Column-aligned grid with a leading row-number column.
pub fn grid(page: &RenderedPage) -> String {
    let header: Vec<String> = std::iter::once("#".to_string())
        .chain(page.columns.iter().cloned())
        .collect();
    let body: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.number.to_string())
                .chain(row.cells.iter().map(cell_text))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format_line(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(body.iter().map(|line| format_line(line, &widths)));
    lines.join("\n")
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::limits::PageRequest;
    use crate::core::types::QueryResult;
    use crate::pager::render_page;

    fn page(total: usize, offset: usize, limit: usize) -> RenderedPage {
        let rows = (offset..(offset + limit).min(total))
            .map(|i| vec![json!(format!("r{i}")), json!(null)])
            .collect();
        render_page(&QueryResult::page(
            vec!["name".into(), "note".into()],
            rows,
            total,
            PageRequest { offset, limit },
        ))
    }

    #[test]
    fn strip_marks_the_active_page() {
        assert_eq!(button_strip(&page(25, 10, 10), 80), "[10] <20> [25]");
    }

    #[test]
    fn long_strips_scroll_to_the_active_button() {
        let view = page(1000, 500, 10);
        let strip = button_strip(&view, 20);
        assert_eq!(strip.len(), 20);
        assert!(strip.contains("<510>"), "{strip}");
    }

    #[test]
    fn zero_width_shows_everything() {
        assert_eq!(button_strip(&page(25, 0, 10), 0), "<10> [20] [25]");
    }

    #[test]
    fn grid_numbers_rows_and_prints_null() {
        let text = grid(&page(25, 20, 10));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#  | name | note");
        assert_eq!(lines[1], "---+------+-----");
        assert_eq!(lines[2], "21 | r20  | NULL");
        assert_eq!(lines.len(), 7);
    }
}
