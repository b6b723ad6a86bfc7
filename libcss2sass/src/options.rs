//! Conversion settings.

/// Widest indentation step the renderer will emit.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Settings for a conversion. The defaults produce the standard layout:
/// two-space indentation and no blank lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Spaces per nesting level, capped at [`MAX_INDENT_WIDTH`].
    pub indent_width: usize,
    /// Follow every top-level node with an empty line.
    pub blank_line_between_rules: bool,
    /// Name shown in error messages instead of `css`.
    pub filename: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent_width: 2,
            blank_line_between_rules: false,
            filename: None,
        }
    }
}

impl Options {
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.min(MAX_INDENT_WIDTH);
        self
    }

    pub fn blank_line_between_rules(mut self, enabled: bool) -> Self {
        self.blank_line_between_rules = enabled;
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }
}
