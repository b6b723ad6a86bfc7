//! Phase 4: Renderer
//!
//! Writes the transformed tree as indented Sass. Directives are emitted
//! verbatim at column zero; rules and attributes are indented by depth.

use crate::options::{Options, MAX_INDENT_WIDTH};
use crate::tree::{Node, Root};

/// Render a tree to Sass text.
pub fn render_tree(root: &Root, options: &Options) -> String {
    let mut out = String::new();
    for child in &root.children {
        render_node(child, 0, options, &mut out);
        if options.blank_line_between_rules {
            out.push('\n');
        }
    }
    out
}

fn render_node(node: &Node, depth: usize, options: &Options, out: &mut String) {
    match node {
        Node::Value(text) => {
            out.push_str(text);
            out.push('\n');
        }
        Node::Rule(rule) => {
            push_indent(depth, options, out);
            out.push_str(&rule.selector);
            out.push('\n');
            for child in &rule.children {
                render_node(child, depth + 1, options, out);
            }
        }
        Node::Attr(attr) => {
            push_indent(depth, options, out);
            out.push(':');
            out.push_str(&attr.name);
            out.push(' ');
            out.push_str(&attr.value);
            out.push('\n');
        }
    }
}

fn push_indent(depth: usize, options: &Options, out: &mut String) {
    let width = options.indent_width.min(MAX_INDENT_WIDTH);
    out.push_str(&" ".repeat(depth.saturating_mul(width)));
}
