//! Phase 1: Scanner
//!
//! A cursor over the input text. Patterns are matched only at the current
//! position; a successful match advances the cursor past it, a failed one
//! leaves it where it was. Whitespace and `/* ... */` comments are skipped
//! with [`Scanner::whitespace`].

use crate::error::SyntaxError;
use once_cell::sync::Lazy;
use regex::Regex;

static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*").unwrap());
static COMMENT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/\*").unwrap());
static COMMENT_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*/").unwrap());

/// Stateful cursor over source text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Text not yet consumed.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_eos(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Match `pattern` at the cursor and advance past it.
    ///
    /// Patterns must be anchored with `^`. Empty matches succeed without
    /// moving the cursor.
    pub fn scan(&mut self, pattern: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        let m = pattern.find(rest)?;
        if m.start() != 0 {
            return None;
        }
        self.pos += m.end();
        Some(&rest[..m.end()])
    }

    /// Match `pattern` at the cursor without consuming anything.
    pub fn check(&self, pattern: &Regex) -> bool {
        pattern.find(self.rest()).is_some_and(|m| m.start() == 0)
    }

    /// Advance to the end of the next match of `pattern`, wherever it is.
    /// Returns the skipped text including the match.
    pub fn scan_until(&mut self, pattern: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        let m = pattern.find(rest)?;
        self.pos += m.end();
        Some(&rest[..m.end()])
    }

    /// Move the cursor to the end of input, returning what was skipped.
    pub fn terminate(&mut self) -> &'a str {
        let rest = self.rest();
        self.pos = self.input.len();
        rest
    }

    /// Skip blank characters and block comments.
    ///
    /// Returns the whitespace skipped, without the comment text. An
    /// unterminated comment runs to the end of the input.
    pub fn whitespace(&mut self) -> String {
        let mut space = String::new();
        loop {
            if let Some(s) = self.scan(&SPACE) {
                space.push_str(s);
            }
            if self.scan(&COMMENT_OPEN).is_none() {
                return space;
            }
            if self.scan_until(&COMMENT_CLOSE).is_none() {
                self.terminate();
                return space;
            }
        }
    }

    /// Require `pattern` at the cursor, then skip trailing whitespace.
    pub fn expect(
        &mut self,
        pattern: &Regex,
        expected: &'static str,
    ) -> Result<&'a str, SyntaxError> {
        let matched = self
            .scan(pattern)
            .ok_or_else(|| SyntaxError::new(expected, self.pos))?;
        self.whitespace();
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[test]
    fn test_scan_advances_only_on_match() {
        let mut s = Scanner::new("foo bar");
        assert_eq!(s.scan(&re(r"^\d+")), None);
        assert_eq!(s.pos(), 0);
        assert_eq!(s.scan(&re(r"^\w+")), Some("foo"));
        assert_eq!(s.pos(), 3);
        assert_eq!(s.rest(), " bar");
    }

    #[test]
    fn test_scan_is_anchored_at_cursor() {
        let mut s = Scanner::new("foo bar");
        // "bar" exists later but not at the cursor.
        assert_eq!(s.scan(&re("^bar")), None);
        assert!(!s.check(&re("^bar")));
        assert!(s.check(&re("^foo")));
        assert_eq!(s.pos(), 0);
    }

    #[test]
    fn test_whitespace_skips_comments() {
        let mut s = Scanner::new("  /* one */ \n /* two */\tfoo");
        assert_eq!(s.whitespace(), "   \n \t");
        assert_eq!(s.rest(), "foo");
    }

    #[test]
    fn test_whitespace_unterminated_comment() {
        let mut s = Scanner::new(" /* never closed { a: b }");
        s.whitespace();
        assert!(s.is_eos());
    }

    #[test]
    fn test_expect_failure_reports_position() {
        let mut s = Scanner::new("color red");
        s.scan(&re(r"^\w+"));
        s.whitespace();
        let err = s.expect(&re("^:"), "\":\"").unwrap_err();
        assert_eq!(err.pos, 6);
        assert_eq!(err.expected, "\":\"");
    }

    #[test]
    fn test_expect_consumes_trailing_whitespace() {
        let mut s = Scanner::new(": /* c */ red");
        assert_eq!(s.expect(&re("^:"), "\":\"").unwrap(), ":");
        assert_eq!(s.rest(), "red");
        assert_eq!(s.pos(), ": /* c */ ".len());
    }
}
