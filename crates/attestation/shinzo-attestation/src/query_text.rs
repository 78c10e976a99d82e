//! Text-level inspection of GraphQL queries.
//!
//! These helpers never build a full syntax tree. They find the root selection of a query and
//! the `limit:` argument well enough to drive attestation filtering.

use std::ops::Range;

use crate::error::QueryTextError;

const OPERATION_KEYWORDS: [&str; 3] = ["query", "mutation", "subscription"];
const LIMIT_KEY: &str = "limit";

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of a leading operation keyword followed by whitespace, or 0.
fn operation_keyword_len(body: &str) -> usize {
    OPERATION_KEYWORDS
        .iter()
        .find(|keyword| {
            body.get(..keyword.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
                && body[keyword.len()..].starts_with(char::is_whitespace)
        })
        .map_or(0, |keyword| keyword.len())
}

/// Byte range of the root selection's field name, skipping an alias.
fn root_field_span(query: &str) -> Result<Range<usize>, QueryTextError> {
    let body = query.trim_start();
    if body.trim_end().is_empty() {
        return Err(QueryTextError::EmptyQuery);
    }

    let search_from = (query.len() - body.len()) + operation_keyword_len(body);
    let brace = query[search_from..]
        .find('{')
        .ok_or(QueryTextError::NoOpeningBrace)?
        + search_from;

    let mut pos = brace + 1;
    loop {
        loop {
            match query[pos..].chars().next() {
                None | Some('{') => return Err(QueryTextError::NoIdentifierFound),
                Some(c) if is_identifier_start(c) => break,
                Some(c) => pos += c.len_utf8(),
            }
        }

        let start = pos;
        let end = query[start..]
            .find(|c: char| !is_identifier_char(c))
            .map_or(query.len(), |len| start + len);

        let after = query[end..].trim_start();
        match after.strip_prefix(':') {
            // `alias: Collection`
            Some(rest) => pos = query.len() - rest.len(),
            None => return Ok(start..end),
        }
    }
}

/// Byte offset just past the colon of the root field's `limit:` argument, if any.
///
/// Only keys sitting directly inside the root field's argument list count. Occurrences inside
/// string literals, filter objects, selection sets or nested fields are ignored.
fn limit_argument(query: &str) -> Option<usize> {
    let span = root_field_span(query).ok()?;
    let after_name = &query[span.end..];
    let open = span.end + (after_name.len() - after_name.trim_start().len());
    if !query[open..].starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (offset, c) in query[open..].char_indices() {
        let i = open + offset;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            prev = Some(c);
            continue;
        }

        match c {
            '"' => in_string = true,
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return None;
                }
            }
            _ if depth == 1
                && prev.map_or(false, |p| p == ',' || p == '(' || p.is_whitespace()) =>
            {
                let is_key = query
                    .get(i..i + LIMIT_KEY.len())
                    .is_some_and(|word| word.eq_ignore_ascii_case(LIMIT_KEY));
                if is_key {
                    let rest = &query[i + LIMIT_KEY.len()..];
                    if !rest.starts_with(is_identifier_char) {
                        if let Some(value) = rest.trim_start().strip_prefix(':') {
                            return Some(query.len() - value.len());
                        }
                    }
                }
            }
            _ => {}
        }
        prev = Some(c);
    }

    None
}

/// Whether `query` passes a `limit:` argument (case-insensitive).
pub fn has_limit_parameter(query: &str) -> bool {
    limit_argument(query).is_some()
}

/// The integer following `limit:`. `None` when the key is absent or its value is not a
/// non-negative integer literal.
pub fn extract_limit_value(query: &str) -> Option<u64> {
    let value = query[limit_argument(query)?..].trim_start();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    digits.parse().ok()
}

/// Name of the root field selected by `query`, with any alias dropped.
///
/// ```
/// use shinzo_attestation::query_text::extract_collection_name_from_query;
///
/// let name = extract_collection_name_from_query("query { recent: Block(limit: 5) { hash } }");
/// assert_eq!(name.unwrap(), "Block");
/// ```
pub fn extract_collection_name_from_query(query: &str) -> Result<String, QueryTextError> {
    root_field_span(query).map(|span| query[span].to_string())
}

/// Add `limit: <limit>` to the arguments of the root field.
///
/// The query is expected not to declare a limit already.
pub fn with_limit(query: &str, limit: u64) -> Result<String, QueryTextError> {
    let span = root_field_span(query)?;
    let after_name = &query[span.end..];
    let gap = after_name.len() - after_name.trim_start().len();

    let mut limited = String::with_capacity(query.len() + 16);
    if after_name[gap..].starts_with('(') {
        let open = span.end + gap + 1;
        let empty_args = query[open..].trim_start().starts_with(')');
        limited.push_str(&query[..open]);
        limited.push_str(&format!("limit: {}", limit));
        if !empty_args {
            limited.push_str(", ");
        }
        limited.push_str(&query[open..]);
    } else {
        limited.push_str(&query[..span.end]);
        limited.push_str(&format!("(limit: {})", limit));
        limited.push_str(&query[span.end..]);
    }
    Ok(limited)
}
