//! One-shot browsing from the command line: open a table or query, go to a page, print it.

use crate::{
    cli::Args,
    core::{connection::ConnectionPool, limits::effective_limit},
    error::{AppError, AppResult},
    pager::{text, PageSource, PaginationWidget, QuerySource, TableSource, WidgetState},
};

/// Width the button strip is scrolled within.
const STRIP_WIDTH: usize = 80;

pub async fn run(args: &Args, pool: ConnectionPool) -> AppResult<()> {
    let limit = effective_limit(args.page_size, args.max_rows);
    let rendered = match (&args.browse, &args.browse_query) {
        (Some(table), _) => show(PaginationWidget::new(TableSource::new(pool, table.as_str()), limit), args.page).await?,
        (None, Some(sql)) => show(PaginationWidget::new(QuerySource::new(pool, sql.as_str()), limit), args.page).await?,
        (None, None) => return Err(AppError::InvalidRequest("nothing to browse".into())),
    };
    println!("{rendered}");
    Ok(())
}

/// Opens the widget on page 1, then clicks through to `page`.
pub async fn show<S: PageSource>(mut widget: PaginationWidget<S>, page: usize) -> AppResult<String> {
    widget.open().await;
    if page > 1 {
        widget.click_page(page).await;
    }

    match widget.state() {
        WidgetState::Displaying(view) => {
            if view.current_page != page.max(1) {
                tracing::warn!(requested = page, shown = view.current_page, "page out of range");
            }
            Ok(text::render(view, STRIP_WIDTH))
        }
        WidgetState::Error(e) => Err(e.clone()),
        other => Err(AppError::Internal(format!("widget left in {other:?}"))),
    }
}
