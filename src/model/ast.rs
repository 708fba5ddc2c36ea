//! Expression tree for model definitions.
//!
//! A parsed model is a small AST over `x`, resolved parameter slots, numeric
//! literals, and a fixed set of unary functions. Evaluation is a plain
//! recursive walk per point; model expressions are tiny, so there is no
//! compilation step.

/// Built-in unary functions available in model expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "asin" => Some(Func::Asin),
            "acos" => Some(Func::Acos),
            "atan" => Some(Func::Atan),
            "sinh" => Some(Func::Sinh),
            "cosh" => Some(Func::Cosh),
            "tanh" => Some(Func::Tanh),
            "exp" => Some(Func::Exp),
            "ln" => Some(Func::Ln),
            "log10" => Some(Func::Log10),
            "sqrt" => Some(Func::Sqrt),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }

    pub fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Log10 => v.log10(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
        }
    }
}

/// A parsed model expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Num(f64),
    /// The independent variable.
    X,
    /// A parameter slot, resolved to its position at parse time.
    Param(usize),
    Neg(Box<Ast>),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
    Div(Box<Ast>, Box<Ast>),
    Pow(Box<Ast>, Box<Ast>),
    Call(Func, Box<Ast>),
}

impl Ast {
    /// Evaluate at one point. Every `Param` slot must be inside `params`;
    /// the parser guarantees this for loaded models.
    pub fn eval(&self, params: &[f64], x: f64) -> f64 {
        match self {
            Ast::Num(v) => *v,
            Ast::X => x,
            Ast::Param(i) => params[*i],
            Ast::Neg(a) => -a.eval(params, x),
            Ast::Add(a, b) => a.eval(params, x) + b.eval(params, x),
            Ast::Sub(a, b) => a.eval(params, x) - b.eval(params, x),
            Ast::Mul(a, b) => a.eval(params, x) * b.eval(params, x),
            Ast::Div(a, b) => a.eval(params, x) / b.eval(params, x),
            Ast::Pow(a, b) => a.eval(params, x).powf(b.eval(params, x)),
            Ast::Call(f, a) => f.apply(a.eval(params, x)),
        }
    }
}
