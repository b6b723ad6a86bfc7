//! Phase 2: Parser
//!
//! Drives the scanner over the grammar
//!
//! ```text
//! document   := directive* rule*
//! directive  := '@' name value ';'
//! rule       := selector-tokens '{' attribute* '}'
//! attribute  := name ':' value (';' | lookahead '}')
//! ```
//!
//! and builds the raw, flat tree: directives first, then one rule per
//! block with its declarations as children. Selectors are kept as text;
//! comma lists and descendant chains are left for the transform passes.

use crate::error::SyntaxError;
use crate::scanner::Scanner;
use crate::tree::{AttrNode, Node, Root, RuleNode};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

type Result<T> = std::result::Result<T, SyntaxError>;

static AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@").unwrap());
static DIRECTIVE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s;]+").unwrap());
static DIRECTIVE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^;]+").unwrap());
static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^;").unwrap());
static SELECTOR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^{\s]+").unwrap());
static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{").unwrap());
static CLOSE_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}").unwrap());
static ATTR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^:}\s]+").unwrap());
static COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:").unwrap());
static VALUE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^;\s}]+").unwrap());

/// `url("foo.css")`, `"foo.css"`, `foo.css` and friends; group 2 is the bare path.
static IMPORT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(url\()?"?([^\s()"]+)\.css"?\)?$"#).unwrap());

/// Longest descendant chain accepted in one selector of a comma list.
///
/// Each token becomes one level of nesting, and every pass walks the tree
/// recursively.
pub const MAX_SELECTOR_DEPTH: usize = 256;

/// Parse a whole document into a raw tree.
pub fn parse_document(scanner: &mut Scanner<'_>) -> Result<Root> {
    let mut root = Root::default();
    scanner.whitespace();
    parse_directives(scanner, &mut root.children)?;
    parse_rules(scanner, &mut root.children)?;

    if !scanner.is_eos() {
        warn!(
            pos = scanner.pos(),
            "ignoring trailing input that does not start a rule"
        );
    }
    Ok(root)
}

// ============================================================================
// Directives
// ============================================================================

fn parse_directives(scanner: &mut Scanner<'_>, out: &mut Vec<Node>) -> Result<()> {
    while scanner.scan(&AT).is_some() {
        let name = scanner
            .scan(&DIRECTIVE_NAME)
            .ok_or_else(|| SyntaxError::new("directive name", scanner.pos()))?;
        scanner.whitespace();
        let value = scanner.scan(&DIRECTIVE_VALUE).unwrap_or("");
        scanner.expect(&SEMICOLON, "\";\"")?;

        let value = normalize_directive_value(name, value);
        trace!(directive = name, value, "directive parsed");
        out.push(Node::value(format!("@{} {};", name, value)));
    }
    Ok(())
}

/// Reduce `@import` targets to the bare stylesheet path.
///
/// Values that don't look like a `.css` import are kept as written.
fn normalize_directive_value<'a>(name: &str, value: &'a str) -> &'a str {
    if name != "import" {
        return value;
    }
    IMPORT_PATH
        .captures(value)
        .and_then(|caps| caps.get(2))
        .map_or(value, |m| m.as_str())
}

// ============================================================================
// Rules
// ============================================================================

fn parse_rules(scanner: &mut Scanner<'_>, out: &mut Vec<Node>) -> Result<()> {
    let mut selector: Vec<&str> = Vec::new();

    while let Some(token) = scanner.scan(&SELECTOR_TOKEN) {
        selector.push(token);
        scanner.whitespace();

        if scanner.scan(&OPEN_BRACE).is_some() {
            let text = selector.join(" ");
            if selector_depth(&text) > MAX_SELECTOR_DEPTH {
                return Err(SyntaxError::new(
                    "\"{\" within 256 selector tokens",
                    scanner.pos() - 1,
                ));
            }
            let mut rule = RuleNode::new(text, Vec::new());
            selector.clear();
            scanner.whitespace();

            parse_attributes(scanner, &mut rule)?;
            trace!(selector = %rule.selector, attributes = rule.children.len(), "rule parsed");
            out.push(Node::Rule(rule));
        }
    }

    if !selector.is_empty() {
        warn!(
            selector = %selector.join(" "),
            "ignoring selector with no declaration block"
        );
    }
    Ok(())
}

/// Token count of the longest selector in a comma list.
fn selector_depth(selector: &str) -> usize {
    selector
        .split(',')
        .map(|piece| piece.split_whitespace().count())
        .max()
        .unwrap_or(0)
}

fn parse_attributes(scanner: &mut Scanner<'_>, rule: &mut RuleNode) -> Result<()> {
    while let Some(name) = scanner.scan(&ATTR_NAME) {
        scanner.whitespace();
        scanner.expect(&COLON, "\":\"")?;

        let mut value = String::new();
        while let Some(token) = scanner.scan(&VALUE_TOKEN) {
            value.push_str(token);
            value.push_str(&scanner.whitespace());
        }
        value.truncate(value.trim_end().len());

        // A declaration ends with ';' unless it is the last one in the block.
        if scanner.scan(&SEMICOLON).is_some() {
            scanner.whitespace();
        } else if !scanner.check(&CLOSE_BRACE) {
            return Err(SyntaxError::new("\";\" or \"}\"", scanner.pos()));
        }

        rule.children.push(Node::Attr(AttrNode {
            name: name.to_string(),
            value,
        }));
    }

    scanner.expect(&CLOSE_BRACE, "\"}\"")?;
    Ok(())
}
