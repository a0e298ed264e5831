//! Three-address code instruction definitions and text serialization.
//!
//! Instructions are kept structured (destination, operator, operands) and
//! only turned into text at the very end:
//!
//! ```text
//! t1 = id3 - id4          binary
//! t2 = -t1                unary
//! id1 = t2                copy
//! ```
//!
//! Temporaries `t1, t2, ...` are numbered per program. Every temporary is
//! written exactly once and read only after it was written.

use std::collections::HashSet;
use std::fmt;

use crate::ast::{BinOp, UnaryOp};

/// Destination slot used when the program is a bare expression.
pub const RESULT_SLOT: &str = "_result";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Generator-introduced temporary `tN`.
    Temp(u32),
    /// Source variable, by alias (or raw name when it has none).
    Var(String),
    /// Normalized decimal literal such as `10.0`.
    Literal(String),
    /// The `_result` slot.
    Result,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(n) => write!(f, "t{n}"),
            Operand::Var(name) => f.write_str(name),
            Operand::Literal(text) => f.write_str(text),
            Operand::Result => f.write_str(RESULT_SLOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rvalue {
    Copy(Operand),
    Unary {
        op: UnaryOp,
        operand: Operand,
    },
    Binary {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
}

impl Rvalue {
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Rvalue::Copy(operand) | Rvalue::Unary { operand, .. } => vec![operand],
            Rvalue::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }
}

impl fmt::Display for Rvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rvalue::Copy(operand) => write!(f, "{operand}"),
            Rvalue::Unary { op, operand } => write!(f, "{op}{operand}"),
            Rvalue::Binary { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub dest: Operand,
    pub value: Rvalue,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dest, self.value)
    }
}

/// A generated program, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TacProgram {
    instructions: Vec<Instruction>,
}

impl TacProgram {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Destination of the last instruction: the program's answer.
    pub fn result(&self) -> Option<&Operand> {
        self.instructions.last().map(|i| &i.dest)
    }

    pub fn lines(&self) -> Vec<String> {
        self.instructions.iter().map(ToString::to_string).collect()
    }

    /// Text for display; `no instructions` for an empty program.
    pub fn render(&self) -> String {
        if self.is_empty() {
            "no instructions".to_string()
        } else {
            self.lines().join("\n")
        }
    }

    /// Check that each temporary is written once and read only afterwards.
    pub fn is_well_formed(&self) -> bool {
        let mut defined = HashSet::new();
        for instruction in &self.instructions {
            let reads_undefined = instruction
                .value
                .operands()
                .into_iter()
                .any(|op| matches!(op, Operand::Temp(n) if !defined.contains(n)));
            if reads_undefined {
                return false;
            }
            if let Operand::Temp(n) = instruction.dest {
                if !defined.insert(n) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Operand {
        Operand::Var(name.to_string())
    }

    #[test]
    fn test_instruction_text() {
        let binary = Instruction {
            dest: Operand::Temp(1),
            value: Rvalue::Binary {
                op: BinOp::Mul,
                lhs: var("id2"),
                rhs: Operand::Literal("50.0".into()),
            },
        };
        let unary = Instruction {
            dest: Operand::Temp(2),
            value: Rvalue::Unary {
                op: UnaryOp::Neg,
                operand: Operand::Temp(1),
            },
        };
        let copy = Instruction {
            dest: Operand::Result,
            value: Rvalue::Copy(Operand::Temp(2)),
        };
        assert_eq!(binary.to_string(), "t1 = id2 * 50.0");
        assert_eq!(unary.to_string(), "t2 = -t1");
        assert_eq!(copy.to_string(), "_result = t2");
    }

    #[test]
    fn test_render_placeholder() {
        assert_eq!(TacProgram::default().render(), "no instructions");
        assert_eq!(TacProgram::default().result(), None);
    }

    #[test]
    fn test_render_joins_lines() {
        let program = TacProgram::new(vec![
            Instruction {
                dest: Operand::Temp(1),
                value: Rvalue::Unary {
                    op: UnaryOp::Plus,
                    operand: var("id1"),
                },
            },
            Instruction {
                dest: var("id2"),
                value: Rvalue::Copy(Operand::Temp(1)),
            },
        ]);
        assert_eq!(program.render(), "t1 = +id1\nid2 = t1");
        assert_eq!(program.result(), Some(&var("id2")));
    }

    #[test]
    fn test_use_before_definition_is_ill_formed() {
        let program = TacProgram::new(vec![Instruction {
            dest: Operand::Result,
            value: Rvalue::Copy(Operand::Temp(1)),
        }]);
        assert!(!program.is_well_formed());
    }

    #[test]
    fn test_double_definition_is_ill_formed() {
        let write = Instruction {
            dest: Operand::Temp(1),
            value: Rvalue::Copy(Operand::Literal("1.0".into())),
        };
        let program = TacProgram::new(vec![write.clone(), write]);
        assert!(!program.is_well_formed());
    }
}
