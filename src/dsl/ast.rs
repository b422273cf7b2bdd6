//! AST types for the filter DSL.

use std::fmt;

/// Root filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Boolean AND: `expr and expr`
    And(Box<Expr>, Box<Expr>),

    /// Boolean OR: `expr or expr`
    Or(Box<Expr>, Box<Expr>),

    /// Scalar comparison: `age>=18`, `name='bob'`
    Compare {
        field: String,
        op: CompareOp,
        literal: Literal,
    },

    /// Set test: `sex in (boy,girl)`, `tags ∩ (a,b)`
    SetTest {
        field: String,
        op: SetOp,
        literals: Vec<Literal>,
    },
}

/// A literal operand as written in the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub quoted: bool,
}

impl Literal {
    pub fn bare(text: impl Into<String>) -> Self {
        Literal {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Literal {
            text: text.into(),
            quoted: true,
        }
    }
}

/// Scalar comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Set operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    In,            // in
    NotIn,         // !in
    Intersects,    // ∩
    NotIntersects, // !∩
}

impl SetOp {
    pub fn is_negated(self) -> bool {
        matches!(self, SetOp::NotIn | SetOp::NotIntersects)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOp::In => write!(f, "in"),
            SetOp::NotIn => write!(f, "!in"),
            SetOp::Intersects => write!(f, "∩"),
            SetOp::NotIntersects => write!(f, "!∩"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "'{}'", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Or(left, right) => {
                write!(f, "{} or ", left)?;
                write_grouped(f, right, matches!(**right, Expr::Or(..)))
            }
            Expr::And(left, right) => {
                write_grouped(f, left, matches!(**left, Expr::Or(..)))?;
                write!(f, " and ")?;
                let grouped = matches!(**right, Expr::And(..) | Expr::Or(..));
                write_grouped(f, right, grouped)
            }
            Expr::Compare { field, op, literal } => write!(f, "{}{}{}", field, op, literal),
            Expr::SetTest {
                field,
                op,
                literals,
            } => {
                write!(f, "{} {} (", field, op)?;
                for (i, literal) in literals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", literal)?;
                }
                write!(f, ")")
            }
        }
    }
}

// Chains parse left-leaning, so a right-nested operand keeps its parentheses.
fn write_grouped(f: &mut fmt::Formatter<'_>, expr: &Expr, grouped: bool) -> fmt::Result {
    if grouped {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// Distinct field names referenced by the expression, in first-use order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Expr::Compare { field, .. } | Expr::SetTest { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
        }
    }
}
