//! Abstract Syntax Tree for assignment-or-expression programs.
//!
//! The tree is built bottom-up by the parser and never mutated afterwards;
//! each node owns its children. Radical applications do not appear here:
//! the parser has already rewritten `sqrtN(E)` into `E ^ 1/N`.

use std::fmt;

/// Binary operators, loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "^" => Some(BinOp::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix sign operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Neg),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `target = value`, only ever produced at the root.
    Assignment {
        target: String,
        alias: Option<String>,
        value: Box<Node>,
    },

    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },

    Identifier {
        name: String,
        alias: Option<String>,
    },

    /// Literal in its source spelling: `10`, `0.5`, or a rewritten `1/2`.
    Number(String),
}

impl Node {
    pub fn assignment(target: impl Into<String>, alias: Option<String>, value: Node) -> Self {
        Node::Assignment {
            target: target.into(),
            alias,
            value: Box::new(value),
        }
    }

    pub fn binary(op: BinOp, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn identifier(name: impl Into<String>, alias: Option<String>) -> Self {
        Node::Identifier {
            name: name.into(),
            alias,
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Node::Number(text.into())
    }

    /// `operand ^ 1/degree`, the expansion of a radical application.
    pub fn radical(operand: Node, degree: u64) -> Self {
        Node::binary(BinOp::Pow, operand, Node::number(format!("1/{degree}")))
    }

    /// Number of identifier and number leaves, the assignment target excluded.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Assignment { value, .. } => value.leaf_count(),
            Node::Binary { left, right, .. } => left.leaf_count() + right.leaf_count(),
            Node::Unary { operand, .. } => operand.leaf_count(),
            Node::Identifier { .. } | Node::Number(_) => 1,
        }
    }
}

/// Fully parenthesized infix rendering, handy in logs and test failures.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Assignment { target, value, .. } => write!(f, "{target} = {value}"),
            Node::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Node::Unary { op, operand } => write!(f, "({op}{operand})"),
            Node::Identifier { name, .. } => f.write_str(name),
            Node::Number(text) => f.write_str(text),
        }
    }
}
