//! Phase 3: Tree transforms
//!
//! Four passes turn the flat rule list into nested Sass structure. They run
//! in a fixed order and each one relies on the shape the previous one left:
//!
//! 1. [`expand_commas`]: `a, b { .. }` becomes `a { .. }` and `b { .. }`.
//! 2. [`nest_rules`]: rules are grouped under their first selector token,
//!    recursively.
//! 3. [`flatten_rules`]: chains of single-rule bodies collapse back into
//!    one descendant selector.
//! 4. [`fold_commas`]: adjacent sibling rules with equal bodies merge into
//!    one comma list.
//!
//! Every pass works on a child list, so the same function serves the root
//! and the body of a rule.

use crate::tree::{Node, Root, RuleNode};
use indexmap::IndexMap;
use tracing::debug;

/// Run all passes over the tree in order.
pub fn apply(root: &mut Root) {
    expand_commas(&mut root.children);
    log_stage("expand-commas", root);

    nest_rules(&mut root.children);
    log_stage("nest-rules", root);

    flatten_rules(&mut root.children);
    log_stage("flatten-rules", root);

    fold_commas(&mut root.children);
    log_stage("fold-commas", root);
}

fn log_stage(stage: &str, root: &Root) {
    debug!(
        stage,
        top_level = root.children.len(),
        nodes = root.node_count(),
        "transform pass complete"
    );
}

// ============================================================================
// expand-commas
// ============================================================================

/// Split every comma-separated rule into one rule per selector.
///
/// Transform
///
/// ```text
/// foo, bar
///   color: blue
/// ```
///
/// into
///
/// ```text
/// foo
///   color: blue
/// bar
///   color: blue
/// ```
///
/// Each new rule gets a copy of the original body, so the copies compare
/// equal until a later pass changes one of them. Only the given list is
/// touched, not nested bodies.
pub fn expand_commas(nodes: &mut Vec<Node>) {
    let expanded = std::mem::take(nodes)
        .into_iter()
        .flat_map(|node| match node {
            Node::Rule(rule) if rule.selector.contains(',') => split_rule(rule),
            other => vec![other],
        })
        .collect();
    *nodes = expanded;
}

fn split_rule(rule: RuleNode) -> Vec<Node> {
    rule.selector
        .split(',')
        .map(str::trim)
        .filter(|selector| !selector.is_empty())
        .map(|selector| Node::rule(selector, rule.children.clone()))
        .collect()
}

// ============================================================================
// nest-rules
// ============================================================================

/// Group rules by their first selector token, recursively.
///
/// ```text
/// foo
///   color: green
/// foo bar
///   color: red
/// foo baz
///   color: blue
/// ```
///
/// becomes
///
/// ```text
/// foo
///   color: green
///   bar
///     color: red
///   baz
///     color: blue
/// ```
///
/// Non-rule nodes keep their relative order; the groups follow them in the
/// order their first token was first seen.
pub fn nest_rules(nodes: &mut Vec<Node>) {
    let mut groups: IndexMap<String, RuleNode> = IndexMap::new();
    let mut kept = Vec::with_capacity(nodes.len());

    for node in std::mem::take(nodes) {
        match node {
            Node::Rule(rule) => absorb(&mut groups, rule),
            other => kept.push(other),
        }
    }

    for group in groups.values_mut() {
        nest_rules(&mut group.children);
    }

    kept.extend(groups.into_values().map(Node::Rule));
    *nodes = kept;
}

/// File `rule` under the group for its first token. A one-token rule
/// dissolves into the group header; a longer one becomes a child rule with
/// the token removed.
fn absorb(groups: &mut IndexMap<String, RuleNode>, mut rule: RuleNode) {
    let (first, rest) = split_first_token(&rule.selector);
    let rest = rest.to_string();
    let group = groups
        .entry(first.to_string())
        .or_insert_with(|| RuleNode::new(first, Vec::new()));

    if rest.is_empty() {
        group.children.append(&mut rule.children);
    } else {
        rule.selector = rest;
        group.children.push(Node::Rule(rule));
    }
}

/// Split a selector at its first run of whitespace.
fn split_first_token(selector: &str) -> (&str, &str) {
    let selector = selector.trim_start();
    match selector.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (selector, ""),
    }
}

// ============================================================================
// flatten-rules
// ============================================================================

/// Collapse chains of rules whose only child is another rule.
///
/// ```text
/// foo
///   bar
///     baz
///       color: red
/// ```
///
/// becomes
///
/// ```text
/// foo bar baz
///   color: red
/// ```
pub fn flatten_rules(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::Rule(rule) = node {
            flatten_rule(rule);
        }
    }
}

fn flatten_rule(rule: &mut RuleNode) {
    while let [Node::Rule(child)] = rule.children.as_mut_slice() {
        let child = std::mem::take(child);
        rule.selector.push(' ');
        rule.selector.push_str(&child.selector);
        rule.children = child.children;
    }

    flatten_rules(&mut rule.children);
}

// ============================================================================
// fold-commas
// ============================================================================

/// Merge sibling rules whose bodies are equal into a comma list.
///
/// ```text
/// foo
///   bar
///     color: blue
///   baz
///     color: blue
/// ```
///
/// becomes
///
/// ```text
/// foo
///   bar, baz
///     color: blue
/// ```
///
/// A rule is compared against the last rule kept at the same level. Non-rule
/// nodes in between don't break the comparison.
pub fn fold_commas(nodes: &mut Vec<Node>) {
    let mut folded: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut prev: Option<usize> = None;

    for node in std::mem::take(nodes) {
        let mut rule = match node {
            Node::Rule(rule) => rule,
            other => {
                folded.push(other);
                continue;
            }
        };

        if let Some(Node::Rule(prev_rule)) = prev.and_then(|i| folded.get_mut(i)) {
            if prev_rule.children == rule.children {
                prev_rule.selector.push_str(", ");
                prev_rule.selector.push_str(&rule.selector);
                continue;
            }
        }

        fold_commas(&mut rule.children);
        prev = Some(folded.len());
        folded.push(Node::Rule(rule));
    }

    *nodes = folded;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Vec<Node> {
        vec![Node::attr("color", "red")]
    }

    fn blue() -> Vec<Node> {
        vec![Node::attr("color", "blue")]
    }

    #[test]
    fn test_expand_commas_splits_and_trims() {
        let mut nodes = vec![
            Node::value("@import foo;"),
            Node::rule("a, b c ,d", red()),
            Node::rule("e", blue()),
        ];
        expand_commas(&mut nodes);
        assert_eq!(
            nodes,
            vec![
                Node::value("@import foo;"),
                Node::rule("a", red()),
                Node::rule("b c", red()),
                Node::rule("d", red()),
                Node::rule("e", blue()),
            ]
        );
    }

    #[test]
    fn test_expand_commas_drops_empty_pieces() {
        let mut nodes = vec![Node::rule("a,,b,", red())];
        expand_commas(&mut nodes);
        assert_eq!(nodes, vec![Node::rule("a", red()), Node::rule("b", red())]);
    }

    #[test]
    fn test_expand_commas_is_not_recursive() {
        let inner = vec![Node::rule("x, y", red())];
        let mut nodes = vec![Node::rule("a", inner.clone())];
        expand_commas(&mut nodes);
        assert_eq!(nodes, vec![Node::rule("a", inner)]);
    }

    #[test]
    fn test_split_first_token() {
        assert_eq!(split_first_token("foo"), ("foo", ""));
        assert_eq!(split_first_token("foo bar baz"), ("foo", "bar baz"));
        assert_eq!(split_first_token(" foo  bar "), ("foo", "bar"));
    }

    #[test]
    fn test_nest_rules_single_path() {
        let mut nodes = vec![Node::rule("foo bar", red())];
        nest_rules(&mut nodes);
        assert_eq!(nodes, vec![Node::rule("foo", vec![Node::rule("bar", red())])]);
    }

    #[test]
    fn test_nest_rules_groups_by_prefix() {
        let mut nodes = vec![
            Node::rule("foo", vec![Node::attr("color", "green")]),
            Node::rule("foo bar", red()),
            Node::rule("foo baz", blue()),
        ];
        nest_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule(
                "foo",
                vec![
                    Node::attr("color", "green"),
                    Node::rule("bar", red()),
                    Node::rule("baz", blue()),
                ]
            )]
        );
    }

    #[test]
    fn test_nest_rules_keeps_first_seen_order() {
        let mut nodes = vec![
            Node::value("@charset \"utf-8\";"),
            Node::rule("b x", red()),
            Node::rule("a", blue()),
            Node::rule("b", blue()),
        ];
        nest_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![
                Node::value("@charset \"utf-8\";"),
                Node::rule("b", vec![Node::attr("color", "blue"), Node::rule("x", red())]),
                Node::rule("a", blue()),
            ]
        );
    }

    #[test]
    fn test_nest_rules_revisited_groups_keep_their_slot() {
        let mut nodes = vec![
            Node::rule("b", red()),
            Node::rule("a x", blue()),
            Node::value("@import q;"),
            Node::rule("b y", blue()),
            Node::rule("a", red()),
        ];
        nest_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![
                Node::value("@import q;"),
                Node::rule("b", vec![Node::attr("color", "red"), Node::rule("y", blue())]),
                Node::rule("a", vec![Node::attr("color", "red"), Node::rule("x", blue())]),
            ]
        );
    }

    #[test]
    fn test_nest_rules_merges_repeated_single_token_rules() {
        let mut nodes = vec![
            Node::rule("a", red()),
            Node::rule("a", vec![Node::attr("margin", "0")]),
        ];
        nest_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule(
                "a",
                vec![Node::attr("color", "red"), Node::attr("margin", "0")]
            )]
        );
    }

    #[test]
    fn test_nest_rules_deep() {
        let mut nodes = vec![Node::rule("a b c", red()), Node::rule("a b d", blue())];
        nest_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule(
                "a",
                vec![Node::rule(
                    "b",
                    vec![Node::rule("c", red()), Node::rule("d", blue())]
                )]
            )]
        );
    }

    #[test]
    fn test_flatten_rules_collapses_chain() {
        let mut nodes = vec![Node::rule(
            "foo",
            vec![Node::rule("bar", vec![Node::rule("baz", red())])],
        )];
        flatten_rules(&mut nodes);
        assert_eq!(nodes, vec![Node::rule("foo bar baz", red())]);
    }

    #[test]
    fn test_flatten_rules_stops_at_branch() {
        let mut nodes = vec![Node::rule(
            "a",
            vec![Node::rule(
                "b",
                vec![
                    Node::rule("c", vec![Node::rule("d", red())]),
                    Node::rule("e", blue()),
                ],
            )],
        )];
        flatten_rules(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule(
                "a b",
                vec![Node::rule("c d", red()), Node::rule("e", blue())]
            )]
        );
    }

    #[test]
    fn test_flatten_rules_keeps_rule_with_single_attribute() {
        let mut nodes = vec![Node::rule("a", red())];
        flatten_rules(&mut nodes);
        assert_eq!(nodes, vec![Node::rule("a", red())]);
    }

    #[test]
    fn test_fold_commas_merges_equal_bodies() {
        let mut nodes = vec![
            Node::rule("a", red()),
            Node::rule("b", red()),
            Node::rule("c", blue()),
        ];
        fold_commas(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule("a, b", red()), Node::rule("c", blue())]
        );
    }

    #[test]
    fn test_fold_commas_only_compares_previous_rule() {
        let mut nodes = vec![
            Node::rule("a", red()),
            Node::rule("b", blue()),
            Node::rule("c", red()),
        ];
        fold_commas(&mut nodes);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_fold_commas_skips_non_rules() {
        let mut nodes = vec![
            Node::rule("a", red()),
            Node::value("@import foo;"),
            Node::rule("b", red()),
        ];
        fold_commas(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule("a, b", red()), Node::value("@import foo;")]
        );
    }

    #[test]
    fn test_fold_commas_recurses() {
        let mut nodes = vec![Node::rule(
            "foo",
            vec![Node::rule("bar", blue()), Node::rule("baz", blue())],
        )];
        fold_commas(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::rule("foo", vec![Node::rule("bar, baz", blue())])]
        );
    }

    #[test]
    fn test_apply_restores_comma_group() {
        let mut root = Root::new(vec![Node::rule("a, b", red())]);
        apply(&mut root);
        assert_eq!(root.children, vec![Node::rule("a, b", red())]);
    }

    #[test]
    fn test_apply_single_path_round_trip() {
        let mut root = Root::new(vec![Node::rule("foo bar", red())]);
        apply(&mut root);
        assert_eq!(root.children, vec![Node::rule("foo bar", red())]);
    }

    #[test]
    fn test_apply_shared_prefix_with_comma_list() {
        let mut root = Root::new(vec![Node::rule("ul li, ul a", red())]);
        apply(&mut root);
        assert_eq!(
            root.children,
            vec![Node::rule("ul", vec![Node::rule("li, a", red())])]
        );
    }
}
