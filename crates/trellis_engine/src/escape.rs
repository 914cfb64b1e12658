//! Source-escape table.
//!
//! A fixed bijective mapping between the control characters that would
//! break a generated string literal and their source-safe token form.
//! The rewriter escapes literal template text early in the pass order and
//! directive bodies are unescaped before they are stored in the program,
//! so escaping followed by unescaping is the identity.

use regex::{Captures, Regex};

/// The escaped characters and their token forms.
const ESCAPES: [(char, &str); 7] = [
    ('\\', "\\"),
    ('\'', "'"),
    ('\r', "r"),
    ('\n', "n"),
    ('\t', "t"),
    ('\u{2028}', "u2028"),
    ('\u{2029}', "u2029"),
];

/// The bidirectional escape table.
#[derive(Debug)]
pub struct EscapeTable {
    unescape_pattern: Regex,
}

impl Default for EscapeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeTable {
    pub fn new() -> Self {
        Self {
            unescape_pattern: Regex::new(r"\\(\\|'|r|n|t|u2028|u2029)").unwrap(),
        }
    }

    /// The token form of an escapable character, without the backslash.
    pub fn token_for(c: char) -> Option<&'static str> {
        ESCAPES.iter().find(|(ch, _)| *ch == c).map(|(_, t)| *t)
    }

    /// Character class matching every escapable character, for use in a
    /// rewrite-rule pattern.
    pub fn escaper_class() -> &'static str {
        "[\\\\'\r\n\t\u{2028}\u{2029}]"
    }

    /// Escape every escapable character in `text` to its token form.
    pub fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match Self::token_for(c) {
                Some(token) => {
                    out.push('\\');
                    out.push_str(token);
                }
                None => out.push(c),
            }
        }
        out
    }

    /// Reverse the escape mapping.
    pub fn unescape(&self, text: &str) -> String {
        self.unescape_pattern
            .replace_all(text, |caps: &Captures| {
                let token = &caps[1];
                ESCAPES
                    .iter()
                    .find(|(_, t)| *t == token)
                    .map(|(c, _)| c.to_string())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_tokens() {
        let table = EscapeTable::new();
        assert_eq!(table.escape("a'b"), "a\\'b");
        assert_eq!(table.escape("line\r\nnext"), "line\\r\\nnext");
        assert_eq!(table.escape("col\tsep"), "col\\tsep");
        assert_eq!(table.escape("back\\slash"), "back\\\\slash");
        assert_eq!(table.escape("ls\u{2028}ps\u{2029}"), "ls\\u2028ps\\u2029");
    }

    #[test]
    fn test_roundtrip_identity() {
        let table = EscapeTable::new();
        let samples = [
            "plain",
            "it's a 'quoted' string",
            "tabs\tand\r\nnewlines",
            "back\\slash \\' mixed",
            "\u{2028}\u{2029}",
        ];
        for sample in samples {
            assert_eq!(table.unescape(&table.escape(sample)), sample);
        }
    }

    #[test]
    fn test_unescape_untouched_text() {
        let table = EscapeTable::new();
        assert_eq!(table.unescape("no escapes here"), "no escapes here");
    }
}
