//! CSS to Sass conversion.
//!
//! Turns a flat CSS stylesheet into the nested, indentation-based Sass
//! syntax:
//!
//! ```text
//! foo { color: green; }          foo
//! foo bar { color: red; }    =>    :color green
//! foo baz { color: red; }          bar, baz
//!                                    :color red
//! ```
//!
//! # Conversion Pipeline
//!
//! 1. **Scanner**: A cursor over the text that matches patterns at the
//!    current position and skips whitespace and comments.
//!
//! 2. **Parser**: Builds a flat tree of directives and rules with their
//!    declarations.
//!
//! 3. **Transforms**: Split comma lists, nest rules by selector prefix,
//!    flatten single-child chains and fold equal siblings back into comma
//!    lists.
//!
//! 4. **Renderer**: Writes the tree as indented Sass.
//!
//! A syntax error anywhere aborts the conversion; the error carries the
//! line it occurred on, e.g. `(css):3: Invalid CSS: expected ":"`.

mod error;
mod options;
mod parser;
mod render;
mod scanner;
pub mod transform;
mod tree;

pub use error::{Error, ParseContext, Result, SyntaxError};
pub use options::{Options, MAX_INDENT_WIDTH};
pub use parser::MAX_SELECTOR_DEPTH;
pub use render::render_tree;
pub use tree::{AttrNode, Node, Root, RuleNode};

use std::io::Read;
use tracing::debug;

/// Convert a CSS document to Sass.
///
/// # Example
///
/// ```
/// let sass = libcss2sass::convert("a, b { color: red; }").unwrap();
/// assert_eq!(sass, "a, b\n  :color red\n");
/// ```
pub fn convert(input: &str) -> Result<String> {
    Css::new(input).render()
}

/// Convert a CSS document to Sass, naming `filename` in error messages.
pub fn convert_with_filename(input: &str, filename: Option<&str>) -> Result<String> {
    let options = Options {
        filename: filename.map(String::from),
        ..Options::default()
    };
    convert_with_options(input, options)
}

/// Convert a CSS document to Sass with explicit settings.
pub fn convert_with_options(input: &str, options: Options) -> Result<String> {
    Css::with_options(input, options).render()
}

/// Parse a CSS document into its raw tree, before any transforms.
pub fn parse(input: &str) -> Result<Root> {
    let ctx = ParseContext::new(None);
    let mut scanner = scanner::Scanner::new(input);
    parser::parse_document(&mut scanner).map_err(|e| ctx.locate(e, input))
}

/// A single CSS document waiting to be converted.
#[derive(Clone, Debug)]
pub struct Css {
    template: String,
    options: Options,
}

impl Css {
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_options(template, Options::default())
    }

    pub fn with_options(template: impl Into<String>, options: Options) -> Self {
        Self {
            template: template.into(),
            options,
        }
    }

    /// Read the whole document from `reader`.
    pub fn from_reader<R: Read>(mut reader: R, options: Options) -> Result<Self> {
        let mut template = String::new();
        reader.read_to_string(&mut template)?;
        Ok(Self::with_options(template, options))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse the document and run every transform over it.
    pub fn build_tree(&self) -> Result<Root> {
        let ctx = ParseContext::new(self.options.filename.as_deref());
        let mut scanner = scanner::Scanner::new(&self.template);

        let mut root =
            parser::parse_document(&mut scanner).map_err(|e| ctx.locate(e, &self.template))?;
        debug!(
            source = ctx.source_name(),
            top_level = root.children.len(),
            nodes = root.node_count(),
            "parsed"
        );

        transform::apply(&mut root);
        Ok(root)
    }

    /// Convert the document to Sass text.
    pub fn render(&self) -> Result<String> {
        let root = self.build_tree()?;
        Ok(render_tree(&root, &self.options))
    }
}
