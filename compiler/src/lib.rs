//! tacc — compiles one assignment or expression into three-address code.
//!
//! # Compiler Pipeline
//!
//! ```text
//! Source text   "A = sqrt(B - C) - 10"
//!     │
//!     ▼
//! ┌──────────┐
//! │ Validate  │  Caller-side sanity checks (empty, parens, stray words)
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │  Lexer    │  Tokens with spans, identifier aliases, transformed echo
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │  Parser   │  Recursive descent; sqrtN(E) rewritten to E ^ 1/N
//! └────┬─────┘
//!      ├──────────────► Tree    {name, children} view for display
//!      ▼
//! ┌──────────┐
//! │ Codegen   │  Post-order walk emitting TAC into fresh temporaries
//! └────┬─────┘
//!      ▼
//! t1 = id2 - id3
//! t2 = t1 ^ 0.5
//! t3 = t2 - 10.0
//! id1 = t3
//! ```
//!
//! Each stage is a pure function of the previous stage's output and fails
//! with its own error type on the first problem it sees.

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod tac;
pub mod token;
pub mod tree;
pub mod validate;

use log::debug;

use crate::ast::Node;
use crate::errors::CompileError;
use crate::lexer::Lexed;
use crate::tac::TacProgram;
use crate::tree::TreeNode;

/// Output of every stage for one source string.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub lexed: Lexed,
    pub ast: Node,
    pub tree: TreeNode,
    pub tac: TacProgram,
}

/// Validate, then run the whole pipeline.
pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    validate::validate_input(source)?;
    compile_unchecked(source)
}

/// Run lexer, parser and code generator without the input checks.
pub fn compile_unchecked(source: &str) -> Result<Compilation, CompileError> {
    let lexed = lexer::tokenize(source)?;
    let ast = parser::parse(&lexed.tokens)?;
    let tree = tree::to_tree(&ast);
    let tac = codegen::generate(&ast)?;
    debug!(
        "compiled {} tokens into {} instructions",
        lexed.tokens.len(),
        tac.len()
    );
    Ok(Compilation {
        lexed,
        ast,
        tree,
        tac,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LexError, ParseError, ValidationError};
    use crate::tac::Operand;

    #[test]
    fn test_scenario_assignment_with_radical() {
        let out = compile("A = sqrt(B - ( C - D ) ^ E ) - 10").unwrap();
        let aliases: Vec<_> = out.lexed.aliases.values().map(String::as_str).collect();
        assert_eq!(aliases, vec!["id1", "id2", "id3", "id4", "id5"]);
        assert_eq!(out.lexed.aliases["E"], "id5");
        assert!(matches!(out.ast, Node::Assignment { ref alias, .. } if alias.as_deref() == Some("id1")));
        assert_eq!(out.tac.result(), Some(&Operand::Var("id1".into())));
        assert_eq!(out.tree.name, "=");
    }

    #[test]
    fn test_scenario_precedence() {
        let out = compile("area = a + b * 50").unwrap();
        let lines = out.tac.lines();
        let mul = lines.iter().position(|l| l.contains('*')).unwrap();
        let add = lines.iter().position(|l| l.contains('+')).unwrap();
        assert!(mul < add);
    }

    #[test]
    fn test_scenario_right_associative_power() {
        let out = compile("2 ^ 3 ^ 2").unwrap();
        assert_eq!(out.tac.render(), "t1 = 3.0 ^ 2.0\nt2 = 2.0 ^ t1\n_result = t2");
    }

    #[test]
    fn test_scenario_cube_root() {
        let out = compile("sqrt3(X)").unwrap();
        assert_eq!(out.lexed.transformed, "(id1) ^ 1/3");
        assert!(out.tac.render().contains("0.3333333333333333"));
        assert!(!out.tac.render().contains("1/3"));
    }

    #[test]
    fn test_scenario_errors_by_stage() {
        // validation sees the open paren first
        assert!(matches!(
            compile("A = ("),
            Err(CompileError::Validation(ValidationError::Unbalanced))
        ));
        // the parser rejects it once validation is skipped
        assert!(matches!(
            compile_unchecked("A = ("),
            Err(CompileError::Parse(ParseError::UnexpectedEnd { .. }))
        ));
        assert!(matches!(
            compile("1A = 5"),
            Err(CompileError::Validation(ValidationError::DigitLeadingIdentifier { .. }))
        ));
        assert!(matches!(
            compile_unchecked("1A = 5"),
            Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert!(matches!(compile(""), Err(CompileError::Validation(ValidationError::Empty))));
        assert!(matches!(
            compile_unchecked("a = b $ c"),
            Err(CompileError::Lex(LexError::UnknownToken { .. }))
        ));
    }

    #[test]
    fn test_tree_and_tac_agree_on_target() {
        let out = compile("total = sqrt4(x) * x").unwrap();
        assert_eq!(
            out.tree.children.as_ref().map(|c| c[0].name.as_str()),
            Some("total (id1)")
        );
        assert_eq!(
            out.tac.lines(),
            vec!["t1 = id2 ^ 0.25", "t2 = t1 * id2", "id1 = t2"]
        );
    }

    #[test]
    fn test_concurrent_compilations_are_independent() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let source = format!("v{i} = a * b + {i}");
                    compile(&source).map(|out| out.tac.lines())
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let lines = handle.join().unwrap().unwrap();
            assert_eq!(
                lines,
                vec![
                    "t1 = id2 * id3".to_string(),
                    format!("t2 = t1 + {i}.0"),
                    "id1 = t2".to_string(),
                ]
            );
        }
    }
}
