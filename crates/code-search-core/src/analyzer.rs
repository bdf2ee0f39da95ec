//! Code-Aware Analyzer (spec §4.1): tokenizes text with identifier
//! splitting and stop-word removal. Deterministic, side-effect-free,
//! thread-safe and stateless after construction.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn word_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9]+").unwrap())
}

const STOPWORDS: &[&str] = &[
    "public", "private", "protected", "static", "final", "class", "interface", "void", "int",
    "implements", "extends", "abstract", "synchronized", "volatile", "transient", "native",
    "strictfp", "package", "import", "throws", "throw", "try", "catch", "finally", "new", "this",
    "super", "return", "if", "else", "for", "while", "do", "switch", "case", "default", "break",
    "continue", "null", "true", "false", "enum", "const", "var", "let", "function", "def", "self",
    "and", "or", "not", "the", "a", "an",
];

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// When true, `entity_name` tokens bypass the stop-word filter so short
    /// meaningful identifiers (e.g. "Id", "Db") survive. See spec §9 Open
    /// Question: stop-word policy on `entity_name` is picked here and
    /// applied uniformly at index time and query time.
    pub exempt_entity_name_stopwords: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exempt_entity_name_stopwords: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodeAnalyzer {
    stopwords: HashSet<&'static str>,
    config: AnalyzerConfig,
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl CodeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            config,
        }
    }

    /// Analyze general field text (content, doc_summary, ...): stop-words
    /// are always filtered.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.analyze_with_policy(text, false)
    }

    /// Analyze `entity_name` text: stop-word filtering follows
    /// `AnalyzerConfig::exempt_entity_name_stopwords`.
    pub fn analyze_entity_name(&self, text: &str) -> Vec<String> {
        self.analyze_with_policy(text, self.config.exempt_entity_name_stopwords)
    }

    fn analyze_with_policy(&self, text: &str, exempt_stopwords: bool) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();

        for raw in word_boundary_re().find_iter(text) {
            let raw = raw.as_str();

            let full = raw.to_lowercase();
            self.push_unique(&mut out, &mut seen, &full, exempt_stopwords, is_numeric(&full));

            for sub in split_compound(raw) {
                let low = sub.to_lowercase();
                let numeric = is_numeric(&low);
                if low.chars().count() == 1 && !numeric {
                    continue;
                }
                self.push_unique(&mut out, &mut seen, &low, exempt_stopwords, numeric);
            }
        }

        out
    }

    fn push_unique(
        &self,
        out: &mut Vec<String>,
        seen: &mut HashSet<String>,
        token: &str,
        exempt_stopwords: bool,
        numeric: bool,
    ) {
        if !numeric && !exempt_stopwords && self.stopwords.contains(token) {
            return;
        }
        if seen.insert(token.to_string()) {
            out.push(token.to_string());
        }
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Split a single alphanumeric run on `_` and CamelCase transitions
/// (including uppercase runs: `XMLParser` → `XML`, `Parser`).
fn split_compound(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for piece in token.split('_').filter(|p| !p.is_empty()) {
        parts.extend(split_camel(piece));
    }
    if parts.is_empty() {
        parts.push(token.to_string());
    }
    parts
}

fn split_camel(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    current.push(chars[0]);

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        let next = chars.get(i + 1);

        let boundary = (prev.is_lowercase() && cur.is_uppercase())
            || (prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
            || (prev.is_alphabetic() && cur.is_numeric())
            || (prev.is_numeric() && cur.is_alphabetic());

        if boundary && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(cur);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_user_name_splits() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("getUserName");
        assert!(tokens.contains(&"getusername".to_string()));
        assert!(tokens.contains(&"get".to_string()));
        assert!(tokens.contains(&"user".to_string()));
        assert!(tokens.contains(&"name".to_string()));
    }

    #[test]
    fn xml_parser_uppercase_run() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("XMLParser");
        assert!(tokens.contains(&"xmlparser".to_string()));
        assert!(tokens.contains(&"xml".to_string()));
        assert!(tokens.contains(&"parser".to_string()));
    }

    #[test]
    fn user_service_impl() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("UserServiceImpl");
        assert!(tokens.contains(&"user".to_string()));
        assert!(tokens.contains(&"service".to_string()));
        assert!(tokens.contains(&"impl".to_string()));
    }

    #[test]
    fn stopwords_never_emitted_from_general_fields() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("public static final class Foo");
        assert!(!tokens.contains(&"public".to_string()));
        assert!(!tokens.contains(&"static".to_string()));
        assert!(!tokens.contains(&"final".to_string()));
        assert!(!tokens.contains(&"class".to_string()));
        assert!(tokens.contains(&"foo".to_string()));
    }

    #[test]
    fn snake_case_split() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("max_retry_count");
        assert!(tokens.contains(&"max".to_string()));
        assert!(tokens.contains(&"retry".to_string()));
        assert!(tokens.contains(&"count".to_string()));
    }

    #[test]
    fn numbers_preserved() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("utf8 encoding");
        assert!(tokens.iter().any(|t| t.contains('8')));
    }

    #[test]
    fn entity_name_exemption_keeps_short_tokens() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze_entity_name("Id");
        assert!(tokens.contains(&"id".to_string()));
    }

    #[test]
    fn single_letter_subparts_dropped_from_general_fields() {
        let a = CodeAnalyzer::default();
        let tokens = a.analyze("a B c");
        // "a" is a stopword and gets filtered; bare single letters from
        // camel-splits are dropped by the length-1 rule.
        assert!(!tokens.contains(&"a".to_string()));
    }
}
