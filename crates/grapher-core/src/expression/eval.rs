//! Expression tree and its evaluation.

use crate::error::DomainError;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func1 {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Cbrt,
    Abs,
    Ln,
    Log10,
    Log2,
    Exp,
    Floor,
    Ceil,
    Round,
    Sign,
}

/// Two-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func2 {
    Min,
    Max,
    Atan2,
    Pow,
}

impl Func1 {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" | "arcsin" => Self::Asin,
            "acos" | "arccos" => Self::Acos,
            "atan" | "arctan" => Self::Atan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "sqrt" => Self::Sqrt,
            "cbrt" => Self::Cbrt,
            "abs" => Self::Abs,
            "ln" => Self::Ln,
            "log" => Self::Log10,
            "log2" => Self::Log2,
            "exp" => Self::Exp,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sign" | "signum" => Self::Sign,
            _ => return None,
        })
    }

    fn apply(self, v: f64) -> Result<f64, DomainError> {
        let out_of_domain = |function| Err(DomainError::OutOfDomain { function });
        match self {
            Self::Sin => Ok(v.sin()),
            Self::Cos => Ok(v.cos()),
            Self::Tan => Ok(v.tan()),
            Self::Asin if !(-1.0..=1.0).contains(&v) => out_of_domain("asin"),
            Self::Asin => Ok(v.asin()),
            Self::Acos if !(-1.0..=1.0).contains(&v) => out_of_domain("acos"),
            Self::Acos => Ok(v.acos()),
            Self::Atan => Ok(v.atan()),
            Self::Sinh => Ok(v.sinh()),
            Self::Cosh => Ok(v.cosh()),
            Self::Tanh => Ok(v.tanh()),
            Self::Sqrt if v < 0.0 => out_of_domain("sqrt"),
            Self::Sqrt => Ok(v.sqrt()),
            Self::Cbrt => Ok(v.cbrt()),
            Self::Abs => Ok(v.abs()),
            Self::Ln if v <= 0.0 => out_of_domain("ln"),
            Self::Ln => Ok(v.ln()),
            Self::Log10 if v <= 0.0 => out_of_domain("log"),
            Self::Log10 => Ok(v.log10()),
            Self::Log2 if v <= 0.0 => out_of_domain("log2"),
            Self::Log2 => Ok(v.log2()),
            Self::Exp => Ok(v.exp()),
            Self::Floor => Ok(v.floor()),
            Self::Ceil => Ok(v.ceil()),
            Self::Round => Ok(v.round()),
            Self::Sign if v == 0.0 => Ok(0.0),
            Self::Sign => Ok(v.signum()),
        }
    }
}

impl Func2 {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "atan2" => Self::Atan2,
            "pow" => Self::Pow,
            _ => return None,
        })
    }

    fn apply(self, a: f64, b: f64) -> Result<f64, DomainError> {
        match self {
            Self::Min => Ok(a.min(b)),
            Self::Max => Ok(a.max(b)),
            Self::Atan2 => Ok(a.atan2(b)),
            Self::Pow => BinOp::Pow.apply(a, b),
        }
    }
}

impl BinOp {
    fn apply(self, a: f64, b: f64) -> Result<f64, DomainError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Sub => Ok(a - b),
            Self::Mul => Ok(a * b),
            Self::Div | Self::Rem if b == 0.0 => Err(DomainError::DivisionByZero),
            Self::Div => Ok(a / b),
            Self::Rem => Ok(a.rem_euclid(b)),
            Self::Pow => Ok(a.powf(b)),
        }
    }
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    X,
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call1(Func1, Box<Node>),
    Call2(Func2, Box<Node>, Box<Node>),
}

impl Node {
    /// Evaluate at `x`. Every intermediate result must be finite.
    pub(crate) fn eval(&self, x: f64) -> Result<f64, DomainError> {
        let value = match self {
            Self::Number(v) => *v,
            Self::X => x,
            Self::Neg(inner) => -inner.eval(x)?,
            Self::Binary(op, lhs, rhs) => op.apply(lhs.eval(x)?, rhs.eval(x)?)?,
            Self::Call1(func, arg) => func.apply(arg.eval(x)?)?,
            Self::Call2(func, a, b) => func.apply(a.eval(x)?, b.eval(x)?)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DomainError::NonFinite)
        }
    }

    pub(crate) fn uses_x(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::X => true,
            Self::Neg(inner) | Self::Call1(_, inner) => inner.uses_x(),
            Self::Binary(_, a, b) | Self::Call2(_, a, b) => a.uses_x() || b.uses_x(),
        }
    }
}
