//! Formula language: parse text into an immutable function of `x`.
//!
//! ```text
//! x^2 - 3x + 2
//! sin(x) / x
//! |x| + sqrt(max(x, 0))
//! 2^-x
//! ```
//!
//! Evaluation never yields NaN or infinity; anything undefined is reported
//! as a [`DomainError`].

mod eval;
mod lexer;
mod parser;

use crate::error::{DomainError, ParseError};
use eval::Node;
use std::fmt;
use std::str::FromStr;

/// A parsed formula in the single variable `x`.
///
/// Immutable once built. Editing a formula produces a new `Expression`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
    uses_x: bool,
}

impl Expression {
    /// The text this expression was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the value is the same for every `x`.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        !self.uses_x
    }

    /// Evaluate at `x`.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] where the function is undefined or the result
    /// is not finite.
    pub fn eval(&self, x: f64) -> Result<f64, DomainError> {
        self.root.eval(x)
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source.trim())
    }
}

/// Parse formula text.
///
/// # Errors
///
/// Returns a [`ParseError`] with the byte offset of the first offending
/// token.
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    let tokens = lexer::tokenize(text)?;
    let root = parser::Parser::new(text, tokens).parse()?;
    Ok(Expression {
        source: text.to_string(),
        uses_x: root.uses_x(),
        root,
    })
}

/// Evaluate `expr` at `x`.
///
/// # Errors
///
/// See [`Expression::eval`].
pub fn evaluate(expr: &Expression, x: f64) -> Result<f64, DomainError> {
    expr.eval(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use proptest::prelude::*;

    fn eval_at(text: &str, x: f64) -> f64 {
        evaluate(&parse(text).unwrap(), x).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_square() {
        let expr = parse("x^2").unwrap();
        assert_eq!(evaluate(&expr, 3.0), Ok(9.0));
        assert_eq!(evaluate(&expr, -3.0), Ok(9.0));
    }

    #[test]
    fn test_reciprocal_pole() {
        let expr = parse("1/x").unwrap();
        assert_eq!(evaluate(&expr, 0.0), Err(DomainError::DivisionByZero));
    }

    #[test]
    fn test_precedence() {
        assert_close(eval_at("1 + 2 * 3", 0.0), 7.0);
        assert_close(eval_at("(1 + 2) * 3", 0.0), 9.0);
        assert_close(eval_at("10 - 4 - 3", 0.0), 3.0);
        assert_close(eval_at("2^3^2", 0.0), 512.0);
        assert_close(eval_at("-x^2", 3.0), -9.0);
        assert_close(eval_at("2^-1", 0.0), 0.5);
        assert_close(eval_at("7 % 3", 0.0), 1.0);
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_close(eval_at("2x", 4.0), 8.0);
        assert_close(eval_at("3sin(x)", 1.0), 3.0 * 1.0_f64.sin());
        assert_close(eval_at("(x+1)(x-1)", 3.0), 8.0);
        assert_close(eval_at("2pi", 0.0), 2.0 * std::f64::consts::PI);
        assert_close(eval_at("2e", 0.0), 2.0 * std::f64::consts::E);
        assert_close(eval_at("2x^2", 3.0), 18.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_close(eval_at("sin(x)", 0.5), 0.5_f64.sin());
        assert_close(eval_at("sqrt(x)", 2.0), 2.0_f64.sqrt());
        assert_close(eval_at("log(x)", 1000.0), 3.0);
        assert_close(eval_at("log2(x)", 8.0), 3.0);
        assert_close(eval_at("ln(e)", 0.0), 1.0);
        assert_close(eval_at("max(x, 2)", 1.0), 2.0);
        assert_close(eval_at("atan2(1, 1)", 0.0), std::f64::consts::FRAC_PI_4);
        assert_close(eval_at("|x - 5|", 2.0), 3.0);
        assert_close(eval_at("tau / π", 0.0), 2.0);
    }

    #[test]
    fn test_domain_errors() {
        let sqrt = parse("sqrt(x)").unwrap();
        assert!(matches!(
            evaluate(&sqrt, -1.0),
            Err(DomainError::OutOfDomain { function: "sqrt" })
        ));
        let pow = parse("x^0.5").unwrap();
        assert_eq!(evaluate(&pow, -2.0), Err(DomainError::NonFinite));
    }

    #[test]
    fn test_parse_errors() {
        let err = parse("x+*2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken("*".to_string()));
        assert_eq!(err.position, 2);

        assert_eq!(parse("   ").unwrap_err().kind, ParseErrorKind::Empty);
        assert_eq!(parse("x+").unwrap_err().kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(parse("x+").unwrap_err().position, 2);

        let err = parse("sin(x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unbalanced('('));
        assert_eq!(err.position, 3);

        let err = parse("|x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unbalanced('|'));

        let err = parse("2 * y").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownIdentifier("y".to_string()));
        assert_eq!(err.position, 4);

        let err = parse("min(x)").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Arity {
                expected: 2,
                found: 1,
                ..
            }
        ));

        let err = parse("sin x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingArguments("sin".to_string()));

        assert!(parse("x)").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let err = parse(&"(".repeat(5_000)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(256));
        assert_eq!(err.position, 256);

        let err = parse(&format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000))).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(256));

        let err = parse(&format!("{}x", "-".repeat(5_000))).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(256));
        assert_eq!(err.position, 256);

        let err = parse(&format!("{}1", "2^".repeat(5_000))).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(256));
    }

    #[test]
    fn test_long_chains_are_bounded() {
        // Left-leaning sums grow the tree without recursing in the parser.
        let err = parse(&format!("{}x", "x+".repeat(300))).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(256));
        assert_eq!(err.position, 511);

        assert_close(eval_at(&format!("{}x", "x+".repeat(200)), 1.0), 201.0);
        assert_close(eval_at(&format!("{}x", "-".repeat(200)), 3.0), 3.0);
        let nested = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        assert_close(eval_at(&nested, 2.0), 2.0);
    }

    #[test]
    fn test_source_and_constant() {
        let expr: Expression = " x + 1 ".parse().unwrap();
        assert_eq!(expr.source(), " x + 1 ");
        assert_eq!(expr.to_string(), "x + 1");
        assert!(!expr.is_constant());
        assert!(parse("pi * 2").unwrap().is_constant());
    }

    #[test]
    fn test_expression_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Expression>();
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(text in "[x0-9+*/^()|., a-z-]{0,24}") {
            let _ = parse(&text);
        }

        #[test]
        fn prop_evaluation_is_finite_or_error(x in -1e6f64..1e6) {
            let expr = parse("tan(x) / (x - 1) + sqrt(x) * ln(x)").unwrap();
            if let Ok(y) = evaluate(&expr, x) {
                prop_assert!(y.is_finite());
            }
        }

        #[test]
        fn prop_evaluation_is_deterministic(x in -100.0f64..100.0) {
            let expr = parse("sin(x)^2 + cos(x)^2").unwrap();
            prop_assert_eq!(evaluate(&expr, x), evaluate(&expr, x));
            prop_assert!((evaluate(&expr, x).unwrap() - 1.0).abs() < 1e-9);
        }
    }
}
