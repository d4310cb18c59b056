//! Filter and bind expressions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::term::{Iri, Term, Variable};

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// The operator's surface symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
        }
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
}

impl UnaryOp {
    /// The operator's surface symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}

/// The callee of a function call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    /// A builtin such as `RAND` or `STR`, stored upper-case.
    Builtin(Arc<str>),
    /// An extension function named by IRI.
    Iri(Iri),
}

impl Function {
    /// Creates a builtin callee, normalizing the name to upper case.
    pub fn builtin(name: impl AsRef<str>) -> Self {
        Function::Builtin(Arc::from(name.as_ref().to_ascii_uppercase()))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(name) => f.write_str(name),
            Function::Iri(iri) => iri.fmt(f),
        }
    }
}

/// An expression as used by `FILTER` and `BIND`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// A constant or variable.
    Term(Term),
    /// `left op right`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expression>,
    },
    /// `function(args...)`
    Call {
        /// Callee
        function: Function,
        /// Arguments
        args: Vec<Expression>,
    },
    /// `operand [NOT] IN (list...)`
    In {
        /// Tested expression
        operand: Box<Expression>,
        /// Candidate values
        list: Vec<Expression>,
        /// `NOT IN` when set
        negated: bool,
    },
}

impl Expression {
    /// A variable reference.
    pub fn var(name: impl AsRef<str>) -> Self {
        Expression::Term(Term::Variable(Variable::new(name)))
    }

    /// A constant term.
    pub fn constant(term: impl Into<Term>) -> Self {
        Expression::Term(term.into())
    }

    /// A binary operation.
    #[must_use]
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// A unary operation.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// A builtin function call.
    pub fn call(name: impl AsRef<str>, args: Vec<Expression>) -> Self {
        Expression::Call {
            function: Function::builtin(name),
            args,
        }
    }

    /// Precedence used when deciding whether to parenthesize.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::In { .. } => 3,
            Expression::Unary { .. } => 6,
            Expression::Term(_) | Expression::Call { .. } => 7,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Term(term) => term.fmt(f),
            Expression::Binary { op, left, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, left.precedence() < prec)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, right.precedence() <= prec)
            }
            Expression::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                operand.fmt_operand(f, operand.precedence() < 6)
            }
            Expression::Call { function, args } => {
                write!(f, "{function}(")?;
                fmt_list(f, args)?;
                f.write_str(")")
            }
            Expression::In {
                operand,
                list,
                negated,
            } => {
                operand.fmt_operand(f, operand.precedence() <= 3)?;
                f.write_str(if *negated { " NOT IN (" } else { " IN (" })?;
                fmt_list(f, list)?;
                f.write_str(")")
            }
        }
    }
}
