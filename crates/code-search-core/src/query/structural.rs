//! Structural Query Parser (spec §4.8): recognizes `implements:` and
//! `extends:` structural queries and extracts their target entity name.
//! Pure string utilities; no I/O, no graph access.

const IMPLEMENTS_PREFIX: &str = "implements:";
const EXTENDS_PREFIX: &str = "extends:";

/// Extract the target type name from an `implements:Target` structural
/// query. Accepts a leading `implements` keyword followed by `:` or
/// whitespace, case-sensitively; trims surrounding quotes from the
/// target and takes only its first whitespace-delimited token. Returns
/// `None` if the keyword is absent or the target is empty.
pub fn parse_implements_target(query: &str) -> Option<String> {
    parse_structural_target(query, "implements")
}

/// Extract the target type name from an `extends:Target` structural query.
/// Same matching rules as [`parse_implements_target`].
pub fn parse_extends_target(query: &str) -> Option<String> {
    parse_structural_target(query, "extends")
}

fn parse_structural_target(query: &str, keyword: &str) -> Option<String> {
    let trimmed = query.trim();
    if !trimmed.starts_with(keyword) {
        return None;
    }

    let rest = &trimmed[keyword.len()..];
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let target = rest
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c| c == '"' || c == '\'');

    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// True if `query` is recognized as either a structural query form.
pub fn is_structural_query(query: &str) -> bool {
    let trimmed = query.trim();
    trimmed.starts_with(IMPLEMENTS_PREFIX.trim_end_matches(':'))
        || trimmed.starts_with(EXTENDS_PREFIX.trim_end_matches(':'))
}
