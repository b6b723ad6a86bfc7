//! Stylesheet tree.
//!
//! A [`Root`] owns an ordered list of [`Node`]s. Rules own their bodies, so
//! the tree has no sharing and no cycles. Equality is structural: two rules
//! with equal `children` have the same declaration body.

use std::fmt;

/// A node below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A literal line, such as a directive (`@import foo;`).
    Value(String),
    /// A selector with its body.
    Rule(RuleNode),
    /// A `name: value` declaration.
    Attr(AttrNode),
}

/// A selector and the declarations and nested rules that apply to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleNode {
    pub selector: String,
    pub children: Vec<Node>,
}

/// A single property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrNode {
    pub name: String,
    pub value: String,
}

/// Top of the tree. Holds directives and rules in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Node {
    pub fn value(text: impl Into<String>) -> Self {
        Node::Value(text.into())
    }

    pub fn rule(selector: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Rule(RuleNode::new(selector, children))
    }

    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Node::Attr(AttrNode {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Returns the rule if this is a `Rule`.
    pub fn as_rule(&self) -> Option<&RuleNode> {
        match self {
            Node::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self, Node::Rule(_))
    }

    /// Number of nodes in this subtree, counting itself.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Rule(rule) => 1 + count(&rule.children),
            Node::Value(_) | Node::Attr(_) => 1,
        }
    }
}

impl RuleNode {
    pub fn new(selector: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            selector: selector.into(),
            children,
        }
    }
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        count(&self.children)
    }
}

fn count(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::node_count).sum()
}

// Outline format used for debugging: one node per line, tagged by kind.

fn write_outline(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match node {
        Node::Value(text) => writeln!(f, "{}value {:?}", pad, text),
        Node::Attr(attr) => writeln!(f, "{}attr {:?} = {:?}", pad, attr.name, attr.value),
        Node::Rule(rule) => {
            writeln!(f, "{}rule {:?}", pad, rule.selector)?;
            for child in &rule.children {
                write_outline(f, child, depth + 1)?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_outline(f, self, 0)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root")?;
        for child in &self.children {
            write_outline(f, child, 1)?;
        }
        Ok(())
    }
}
