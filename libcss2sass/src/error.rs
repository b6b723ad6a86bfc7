//! Error types for CSS conversion.

use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Source label used in messages when no filename is supplied.
pub const DEFAULT_SOURCE_NAME: &str = "css";

/// A required token was missing at the current scan position.
///
/// Raised by the parser and propagated unchanged until the public entry
/// point attaches a line number (see [`ParseContext::locate`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid CSS: expected {expected}")]
pub struct SyntaxError {
    /// What the parser was looking for, e.g. `":"` or `"}"`.
    pub expected: &'static str,
    /// Byte offset into the input where scanning stopped.
    pub pos: usize,
}

impl SyntaxError {
    pub fn new(expected: &'static str, pos: usize) -> Self {
        Self { expected, pos }
    }
}

/// Error type returned by the public conversion API.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not CSS the parser understands.
    #[error("({source_name}):{line}: {source}")]
    Syntax {
        source_name: String,
        /// 1-based line of the failure.
        line: usize,
        source: SyntaxError,
    },

    /// Reading the input stream failed.
    #[error("Error reading input: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the line number for syntax errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => Some(*line),
            Error::Io(_) => None,
        }
    }
}

/// Parse context carrying the source label for error reporting.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Label shown between parentheses in error messages.
    pub fn source_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_SOURCE_NAME)
    }

    /// Attach a line number to a syntax error raised while scanning `input`.
    ///
    /// The line is one more than the number of newlines in the consumed
    /// prefix.
    pub fn locate(&self, err: SyntaxError, input: &str) -> Error {
        let end = clamp_to_char_boundary(input, err.pos);
        let line = input[..end].matches('\n').count() + 1;
        Error::Syntax {
            source_name: self.source_name().to_string(),
            line,
            source: err,
        }
    }
}

fn clamp_to_char_boundary(s: &str, pos: usize) -> usize {
    let mut pos = pos.min(s.len());
    while !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
