//! Code generator — AST to three-address code.
//!
//! A post-order walk: the left subtree is lowered completely before the
//! right one, then the node itself emits one instruction into a fresh
//! temporary. Leaves emit nothing and hand back an operand directly
//! (an alias, or a literal normalized to decimal form).
//!
//! The temporary counter lives in a [`Generator`] created per call, so two
//! generations never share numbering state.

use log::{debug, trace};

use crate::ast::{BinOp, Node, UnaryOp};
use crate::errors::CodegenError;
use crate::tac::{Instruction, Operand, Rvalue, TacProgram};

/// Lower a program tree into TAC.
///
/// An assignment root ends with `<alias> = <value>`; any other root ends
/// with `_result = <value>`.
pub fn generate(ast: &Node) -> Result<TacProgram, CodegenError> {
    let mut generator = Generator::new();
    let answer = generator.lower(ast)?;
    if !matches!(ast, Node::Assignment { .. }) {
        generator.emit(Operand::Result, Rvalue::Copy(answer));
    }

    let program = TacProgram::new(generator.instructions);
    debug_assert!(program.is_well_formed(), "generated TAC reuses a temporary");
    debug!("generated {} instructions", program.len());
    Ok(program)
}

/// Per-call generation state.
struct Generator {
    next_temp: u32,
    instructions: Vec<Instruction>,
}

impl Generator {
    fn new() -> Self {
        Self {
            next_temp: 1,
            instructions: Vec::new(),
        }
    }

    fn new_temp(&mut self) -> Operand {
        let temp = Operand::Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    fn emit(&mut self, dest: Operand, value: Rvalue) {
        let instruction = Instruction { dest, value };
        trace!("emit {instruction}");
        self.instructions.push(instruction);
    }

    /// Lower `node` and return the operand holding its value.
    fn lower(&mut self, node: &Node) -> Result<Operand, CodegenError> {
        match node {
            Node::Number(text) => Ok(Operand::Literal(to_float_literal(text)?)),
            Node::Identifier { name, alias } => {
                Ok(Operand::Var(variable_name(name, alias, "Identifier")?))
            }
            Node::Unary { op, operand } => self.lower_unary(*op, operand),
            Node::Binary { op, left, right } => self.lower_binary(*op, left, right),
            Node::Assignment {
                target,
                alias,
                value,
            } => {
                let value = self.lower(value)?;
                let target = Operand::Var(variable_name(target, alias, "Assignment")?);
                self.emit(target.clone(), Rvalue::Copy(value));
                Ok(target)
            }
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Node) -> Result<Operand, CodegenError> {
        let operand = self.lower(operand)?;
        let temp = self.new_temp();
        self.emit(temp.clone(), Rvalue::Unary { op, operand });
        Ok(temp)
    }

    fn lower_binary(&mut self, op: BinOp, left: &Node, right: &Node) -> Result<Operand, CodegenError> {
        let lhs = self.lower(left)?;
        let rhs = self.lower(right)?;
        let temp = self.new_temp();
        self.emit(temp.clone(), Rvalue::Binary { op, lhs, rhs });
        Ok(temp)
    }
}

/// Alias if assigned, otherwise the raw name.
fn variable_name(
    name: &str,
    alias: &Option<String>,
    node: &'static str,
) -> Result<String, CodegenError> {
    let chosen = alias.as_deref().unwrap_or(name);
    if chosen.is_empty() {
        return Err(CodegenError::Unnamed { node });
    }
    Ok(chosen.to_string())
}

/// Normalize a literal's source text to decimal form.
///
/// - `a/b` is divided out: `1/2` → `0.5`, `4/2` → `2.0`
/// - a bare integer gains `.0`: `10` → `10.0`
/// - anything else (already decimal) is returned unchanged
pub fn to_float_literal(text: &str) -> Result<String, CodegenError> {
    let malformed = || CodegenError::MalformedLiteral {
        text: text.to_string(),
    };

    if let Some((numerator, denominator)) = text.split_once('/') {
        let numerator: f64 = numerator.trim().parse().map_err(|_| malformed())?;
        let denominator: f64 = denominator.trim().parse().map_err(|_| malformed())?;
        let quotient = numerator / denominator;
        if !quotient.is_finite() {
            return Err(malformed());
        }
        return Ok(if quotient.fract() == 0.0 {
            format!("{quotient}.0")
        } else {
            quotient.to_string()
        });
    }

    if is_integer(text) {
        return Ok(format!("{text}.0"));
    }

    Ok(text.to_string())
}

/// `-?digits`
fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn compile_source(source: &str) -> TacProgram {
        let lexed = tokenize(source).expect("lex errors");
        let ast = parse(&lexed.tokens).expect("parse errors");
        generate(&ast).expect("codegen errors")
    }

    fn lines(source: &str) -> Vec<String> {
        compile_source(source).lines()
    }

    #[test]
    fn test_literal_normalization() {
        assert_eq!(to_float_literal("10").unwrap(), "10.0");
        assert_eq!(to_float_literal("-7").unwrap(), "-7.0");
        assert_eq!(to_float_literal("0.5").unwrap(), "0.5");
        assert_eq!(to_float_literal("1/2").unwrap(), "0.5");
        assert_eq!(to_float_literal("4/2").unwrap(), "2.0");
        assert_eq!(to_float_literal("1/3").unwrap(), "0.3333333333333333");
    }

    #[test]
    fn test_literal_normalization_is_idempotent() {
        for text in ["10", "1/2", "1/3", "4/2", "2.25", "0"] {
            let once = to_float_literal(text).unwrap();
            let twice = to_float_literal(&once).unwrap();
            assert_eq!(once, twice, "{text}");
        }
    }

    #[test]
    fn test_malformed_literal() {
        assert_eq!(
            to_float_literal("x/2"),
            Err(CodegenError::MalformedLiteral { text: "x/2".into() })
        );
        assert!(to_float_literal("1/0").is_err());
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            lines("area = a + b * 50"),
            vec!["t1 = id3 * 50.0", "t2 = id2 + t1", "id1 = t2"]
        );
    }

    #[test]
    fn test_right_associative_power() {
        assert_eq!(
            lines("2 ^ 3 ^ 2"),
            vec!["t1 = 3.0 ^ 2.0", "t2 = 2.0 ^ t1", "_result = t2"]
        );
    }

    #[test]
    fn test_radical_literal() {
        assert_eq!(
            lines("sqrt3(X)"),
            vec!["t1 = id1 ^ 0.3333333333333333", "_result = t1"]
        );
    }

    #[test]
    fn test_scenario_program() {
        assert_eq!(
            lines("A = sqrt(B - ( C - D ) ^ E ) - 10"),
            vec![
                "t1 = id3 - id4",
                "t2 = t1 ^ id5",
                "t3 = id2 - t2",
                "t4 = t3 ^ 0.5",
                "t5 = t4 - 10.0",
                "id1 = t5",
            ]
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(lines("y = -x"), vec!["t1 = -id2", "id1 = t1"]);
        assert_eq!(lines("+-3"), vec!["t1 = -3.0", "t2 = +t1", "_result = t2"]);
    }

    #[test]
    fn test_leaf_only_programs() {
        assert_eq!(lines("x"), vec!["_result = id1"]);
        assert_eq!(lines("x = 5"), vec!["id1 = 5.0"]);
        assert_eq!(lines("0.25"), vec!["_result = 0.25"]);
    }

    #[test]
    fn test_counter_is_per_call() {
        let first = compile_source("a + b + c");
        let second = compile_source("a + b + c");
        assert_eq!(first, second);
        assert_eq!(first.lines()[0], "t1 = id1 + id2");
    }

    #[test]
    fn test_programs_are_well_formed() {
        for source in [
            "A = sqrt(B - ( C - D ) ^ E ) - 10",
            "area = a + b * 50",
            "-(x - -y) / 4 ^ z ^ 2",
            "q = sqrt4(sqrt(p) * p) - +r",
        ] {
            let program = compile_source(source);
            assert!(program.is_well_formed(), "{source}");
            assert!(!program.is_empty());
        }
    }

    #[test]
    fn test_radical_matches_explicit_power() {
        let rewritten = compile_source("r = sqrt(a + b)");
        let explicit = compile_source("r = (a + b) ^ (1/2)");
        // the explicit exponent is a division and costs one more temporary
        assert_eq!(
            rewritten.lines(),
            vec!["t1 = id2 + id3", "t2 = t1 ^ 0.5", "id1 = t2"]
        );
        assert_eq!(
            explicit.lines(),
            vec!["t1 = id2 + id3", "t2 = 1.0 / 2.0", "t3 = t1 ^ t2", "id1 = t3"]
        );
        assert_eq!(rewritten.result(), explicit.result());
    }

    #[test]
    fn test_result_target() {
        let program = compile_source("A = sqrt(B - ( C - D ) ^ E ) - 10");
        assert_eq!(program.result(), Some(&Operand::Var("id1".into())));
        let program = compile_source("1 + 1");
        assert_eq!(program.result(), Some(&Operand::Result));
    }

    #[test]
    fn test_identifier_without_alias_uses_name() {
        let ast = Node::binary(BinOp::Add, Node::identifier("raw", None), Node::number("1"));
        assert_eq!(generate(&ast).unwrap().lines(), vec!["t1 = raw + 1.0", "_result = t1"]);
    }

    #[test]
    fn test_unnamed_identifier_rejected() {
        let ast = Node::identifier("", None);
        assert_eq!(generate(&ast), Err(CodegenError::Unnamed { node: "Identifier" }));
    }

    #[test]
    fn test_nested_assignment_yields_alias() {
        let ast = Node::binary(
            BinOp::Mul,
            Node::assignment("x", Some("id1".into()), Node::number("2")),
            Node::number("3"),
        );
        assert_eq!(
            generate(&ast).unwrap().lines(),
            vec!["id1 = 2.0", "t1 = id1 * 3.0", "_result = t1"]
        );
    }
}
