use sqlparser::ast::{Query, Select, SetExpr, Spanned, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Location, Span, Token, Tokenizer};

/// What the parser could tell about a statement's SELECT list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectShape {
    /// Byte offset right after the last SELECT-list item.
    ListEndsAt(usize),
    NotSelect,
    NoFrom,
    /// The parser gave up, or gave back nothing usable to place the insertion.
    Unparsed,
}

pub(crate) fn locate_select_list(stmt: &str) -> SelectShape {
    let dialect = MySqlDialect {};
    let statements = match Parser::parse_sql(&dialect, stmt) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "structural parse failed");
            return SelectShape::Unparsed;
        }
    };

    let Some(Statement::Query(query)) = statements.first() else {
        return SelectShape::NotSelect;
    };
    let Some(select) = leftmost_select(query) else {
        return SelectShape::NotSelect;
    };
    let Some(last) = select.projection.last() else {
        return SelectShape::NotSelect;
    };
    if select.from.is_empty() {
        return SelectShape::NoFrom;
    }

    let span = last.span();
    if span == Span::empty() {
        return SelectShape::Unparsed;
    }
    match list_end(stmt, span.end) {
        Some(at) => SelectShape::ListEndsAt(at),
        None => SelectShape::Unparsed,
    }
}

/// Only the leftmost arm of a set operation gets the formula, so a rewritten UNION no
/// longer has matching column counts and fails at execution.
fn leftmost_select(query: &Query) -> Option<&Select> {
    let mut body = query.body.as_ref();
    loop {
        match body {
            SetExpr::Select(select) => return Some(select),
            SetExpr::Query(inner) => body = inner.body.as_ref(),
            SetExpr::SetOperation { left, .. } => body = left.as_ref(),
            _ => return None,
        }
    }
}

/// Item spans stop at the last token sqlparser records for a node, which leaves out
/// closing parentheses and wildcard arguments (`COUNT(*)` spans only `COUNT`). Walk the
/// tokens from there up to the select's FROM and take the end of the last real token.
fn list_end(stmt: &str, lower_bound: Location) -> Option<usize> {
    let dialect = MySqlDialect {};
    let tokens = Tokenizer::new(&dialect, stmt).tokenize_with_location().ok()?;

    let bound = (lower_bound.line, lower_bound.column);
    let mut end = lower_bound;
    let mut depth: i64 = 0;
    for tok in tokens
        .iter()
        .filter(|t| (t.span.start.line, t.span.start.column) >= bound)
    {
        match &tok.token {
            Token::Whitespace(_) => continue,
            Token::Word(w) if w.keyword == Keyword::FROM && depth <= 0 => {
                return byte_offset(stmt, end);
            }
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {}
        }
        end = tok.span.end;
    }
    None
}

/// Converts a 1-based (line, column-in-chars) location into a byte offset.
fn byte_offset(text: &str, loc: Location) -> Option<usize> {
    if loc.line == 0 || loc.column == 0 {
        return None;
    }
    let mut line_start = 0;
    for _ in 1..loc.line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let line = text[line_start..].split('\n').next().unwrap_or("");
    let within = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .nth((loc.column - 1) as usize)?;
    Some(line_start + within)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_of(stmt: &str) -> usize {
        match locate_select_list(stmt) {
            SelectShape::ListEndsAt(at) => at,
            other => panic!("expected a located list for {stmt:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_columns() {
        let stmt = "SELECT a, b FROM t";
        assert_eq!(&stmt[..end_of(stmt)], "SELECT a, b");
    }

    #[test]
    fn closing_parentheses_belong_to_the_item() {
        let stmt = "SELECT name, COUNT(*) FROM t GROUP BY name";
        assert_eq!(&stmt[..end_of(stmt)], "SELECT name, COUNT(*)");

        let stmt = "SELECT a, (SELECT MAX(b) FROM u) FROM t";
        assert_eq!(&stmt[..end_of(stmt)], "SELECT a, (SELECT MAX(b) FROM u)");
    }

    #[test]
    fn aliases_and_multiline_lists() {
        let stmt = "SELECT a AS first,\n       b AS second\nFROM t";
        assert_eq!(&stmt[..end_of(stmt)], "SELECT a AS first,\n       b AS second");
    }

    #[test]
    fn trailing_comment_is_not_part_of_the_list() {
        let stmt = "SELECT a -- note\nFROM t";
        assert_eq!(&stmt[..end_of(stmt)], "SELECT a");
    }

    #[test]
    fn shapes_without_a_list_to_extend() {
        assert_eq!(locate_select_list("SELECT 1+1"), SelectShape::NoFrom);
        assert_eq!(locate_select_list("UPDATE t SET a = 1"), SelectShape::NotSelect);
        assert_eq!(locate_select_list("SELECT a FROM t WHERE"), SelectShape::Unparsed);
    }

    #[test]
    fn byte_offsets_count_characters_not_bytes() {
        let text = "é\nab";
        assert_eq!(byte_offset(text, Location { line: 1, column: 2 }), Some(2));
        assert_eq!(byte_offset(text, Location { line: 2, column: 3 }), Some(5));
        assert_eq!(byte_offset(text, Location { line: 3, column: 1 }), None);
    }
}
