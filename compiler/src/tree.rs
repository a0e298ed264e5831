//! Generic `{name, children}` view of the AST for tree widgets.

use serde::Serialize;

use crate::ast::Node;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
        }
    }

    /// Box-drawing rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('\n');
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let children = self.children.as_deref().unwrap_or_default();
        for (i, child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&child.name);
            out.push('\n');
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            child.render_children(&nested, out);
        }
    }
}

/// Convert the AST into the labeled-tree shape.
pub fn to_tree(node: &Node) -> TreeNode {
    match node {
        Node::Assignment {
            target,
            alias,
            value,
        } => TreeNode::branch(
            "=",
            vec![TreeNode::leaf(identifier_label(target, alias)), to_tree(value)],
        ),
        Node::Binary { op, left, right } => {
            TreeNode::branch(op.symbol(), vec![to_tree(left), to_tree(right)])
        }
        Node::Unary { op, operand } => TreeNode::branch(op.symbol(), vec![to_tree(operand)]),
        Node::Identifier { name, alias } => TreeNode::leaf(identifier_label(name, alias)),
        Node::Number(text) => TreeNode::branch("Real", vec![TreeNode::leaf(text.as_str())]),
    }
}

fn identifier_label(name: &str, alias: &Option<String>) -> String {
    format!("{name} ({})", alias.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, UnaryOp};

    #[test]
    fn test_assignment_shape() {
        let node = Node::assignment(
            "x",
            Some("id1".into()),
            Node::unary(UnaryOp::Neg, Node::identifier("y", Some("id2".into()))),
        );
        let tree = to_tree(&node);
        assert_eq!(
            tree,
            TreeNode::branch(
                "=",
                vec![
                    TreeNode::leaf("x (id1)"),
                    TreeNode::branch("-", vec![TreeNode::leaf("y (id2)")]),
                ],
            )
        );
    }

    #[test]
    fn test_number_wraps_literal() {
        let tree = to_tree(&Node::number("1/2"));
        assert_eq!(tree, TreeNode::branch("Real", vec![TreeNode::leaf("1/2")]));
    }

    #[test]
    fn test_missing_alias_leaves_parens_empty() {
        let tree = to_tree(&Node::identifier("q", None));
        assert_eq!(tree.name, "q ()");
    }

    #[test]
    fn test_json_omits_leaf_children() {
        let tree = to_tree(&Node::binary(
            BinOp::Mul,
            Node::identifier("a", Some("id1".into())),
            Node::number("2"),
        ));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "*",
                "children": [
                    { "name": "a (id1)" },
                    { "name": "Real", "children": [{ "name": "2" }] }
                ]
            })
        );
    }

    #[test]
    fn test_render() {
        let tree = to_tree(&Node::assignment(
            "s",
            Some("id1".into()),
            Node::binary(BinOp::Add, Node::identifier("a", Some("id2".into())), Node::number("1")),
        ));
        let expected = "\
=
├── s (id1)
└── +
    ├── a (id2)
    └── Real
        └── 1
";
        assert_eq!(tree.render(), expected);
    }
}
