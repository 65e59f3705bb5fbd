//! The term language (§3.1). Every variant carries its source `line`;
//! synthetic nodes introduced by a pass (dictionary values, curried
//! constructors, desugared `cons`) carry the line of the statement that
//! produced them.

use std::fmt;

use indexmap::IndexMap;

use poly_common::Line;

use crate::types::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Lit {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Bool(true) => write!(f, "true"),
            Lit::Bool(false) => write!(f, "false"),
            Lit::Int(n) => write!(f, "{n}"),
            Lit::Str(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RelOp {
    Gt,
    Lt,
    Geq,
    Leq,
    Eq,
    Neq,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Gt => ">",
            RelOp::Lt => "<",
            RelOp::Geq => ">=",
            RelOp::Leq => "<=",
            RelOp::Eq => "==",
            RelOp::Neq => "!=",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AddOp {
    Add,
    Sub,
}

impl fmt::Display for AddOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == AddOp::Add { "+" } else { "-" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MulOp {
    Mul,
    Div,
    Mod,
}

impl fmt::Display for MulOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MulOp::Mul => "*",
            MulOp::Div => "/",
            MulOp::Mod => "%",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Term {
    Var {
        name: String,
        line: Line,
    },
    Lit {
        value: Lit,
        line: Line,
    },
    List {
        elements: Vec<Term>,
        line: Line,
    },
    Record {
        fields: IndexMap<String, Term>,
        line: Line,
    },
    Lambda {
        param_name: String,
        param_type: Type,
        body: Box<Term>,
        line: Line,
    },
    TypeLambda {
        param_name: String,
        trait_bounds: Vec<String>,
        body: Box<Term>,
        line: Line,
    },
    App {
        func: Box<Term>,
        arg: Box<Term>,
        line: Line,
    },
    TypeApp {
        func: Box<Term>,
        type_arg: Type,
        line: Line,
    },
    FieldAccess {
        record: Box<Term>,
        field_name: String,
        line: Line,
    },
    Annotated {
        expr: Box<Term>,
        ty: Type,
        line: Line,
    },
    If {
        cond: Box<Term>,
        then_branch: Box<Term>,
        else_branch: Box<Term>,
        line: Line,
    },
    Or {
        left: Box<Term>,
        right: Box<Term>,
        line: Line,
    },
    And {
        left: Box<Term>,
        right: Box<Term>,
        line: Line,
    },
    Not {
        expr: Box<Term>,
        line: Line,
    },
    Rel {
        op: RelOp,
        left: Box<Term>,
        right: Box<Term>,
        line: Line,
    },
    Add {
        op: AddOp,
        left: Box<Term>,
        right: Box<Term>,
        line: Line,
    },
    Mul {
        op: MulOp,
        left: Box<Term>,
        right: Box<Term>,
        line: Line,
    },
    Neg {
        expr: Box<Term>,
        line: Line,
    },
}

impl Term {
    pub fn line(&self) -> Line {
        match self {
            Term::Var { line, .. }
            | Term::Lit { line, .. }
            | Term::List { line, .. }
            | Term::Record { line, .. }
            | Term::Lambda { line, .. }
            | Term::TypeLambda { line, .. }
            | Term::App { line, .. }
            | Term::TypeApp { line, .. }
            | Term::FieldAccess { line, .. }
            | Term::Annotated { line, .. }
            | Term::If { line, .. }
            | Term::Or { line, .. }
            | Term::And { line, .. }
            | Term::Not { line, .. }
            | Term::Rel { line, .. }
            | Term::Add { line, .. }
            | Term::Mul { line, .. }
            | Term::Neg { line, .. } => *line,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Term::Lambda { .. } | Term::TypeLambda { .. } => 0,
            Term::If { .. } => 1,
            Term::Or { .. } => 2,
            Term::And { .. } => 3,
            Term::Not { .. } => 4,
            Term::Rel { .. } => 5,
            Term::Add { .. } => 6,
            Term::Mul { .. } => 7,
            Term::Neg { .. } => 8,
            Term::App { .. } | Term::TypeApp { .. } | Term::Annotated { .. } => 9,
            Term::FieldAccess { .. } => 10,
            Term::Var { .. } | Term::Lit { .. } | Term::List { .. } | Term::Record { .. } => 11,
        }
    }

    fn wrap(&self, arg: &Term) -> String {
        if arg.precedence() < self.precedence() {
            format!("({arg})")
        } else {
            format!("{arg}")
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var { name, .. } => write!(f, "{name}"),
            Term::Lit { value, .. } => write!(f, "{value}"),
            Term::List { elements, .. } => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Term::Record { fields, .. } => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                write!(f, "}}")
            }
            Term::Lambda {
                param_name,
                param_type,
                body,
                ..
            } => write!(f, "\\{param_name}: {param_type}. {body}"),
            Term::TypeLambda {
                param_name,
                trait_bounds,
                body,
                ..
            } => {
                if trait_bounds.is_empty() {
                    write!(f, "\\{param_name}. {body}")
                } else {
                    write!(f, "\\{param_name} impl {}. {body}", trait_bounds.join(" + "))
                }
            }
            Term::App { func, arg, .. } => write!(f, "{} {}", self.wrap(func), self.wrap(arg)),
            Term::TypeApp { func, type_arg, .. } => write!(f, "{} @{type_arg}", self.wrap(func)),
            Term::FieldAccess {
                record, field_name, ..
            } => write!(f, "{}.{field_name}", self.wrap(record)),
            Term::Annotated { expr, ty, .. } => write!(f, "{}: {ty}", self.wrap(expr)),
            Term::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => write!(
                f,
                "if {} then {} else {}",
                self.wrap(cond),
                self.wrap(then_branch),
                self.wrap(else_branch)
            ),
            Term::Or { left, right, .. } => write!(f, "{} || {}", self.wrap(left), self.wrap(right)),
            Term::And { left, right, .. } => write!(f, "{} && {}", self.wrap(left), self.wrap(right)),
            Term::Not { expr, .. } => write!(f, "!{}", self.wrap(expr)),
            Term::Rel { op, left, right, .. } => {
                write!(f, "{} {op} {}", self.wrap(left), self.wrap(right))
            }
            Term::Add { op, left, right, .. } => {
                write!(f, "{} {op} {}", self.wrap(left), self.wrap(right))
            }
            Term::Mul { op, left, right, .. } => {
                write!(f, "{} {op} {}", self.wrap(left), self.wrap(right))
            }
            Term::Neg { expr, .. } => write!(f, "-{}", self.wrap(expr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parenthesizes_lower_precedence_children() {
        let inner = Term::Add {
            op: AddOp::Add,
            left: Box::new(Term::Lit {
                value: Lit::Int(1),
                line: 1,
            }),
            right: Box::new(Term::Lit {
                value: Lit::Int(2),
                line: 1,
            }),
            line: 1,
        };
        let neg = Term::Neg {
            expr: Box::new(inner),
            line: 1,
        };
        assert_eq!(neg.to_string(), "-(1 + 2)");
    }

    #[test]
    fn line_reaches_through_every_variant() {
        let t = Term::Lit {
            value: Lit::Int(7),
            line: 42,
        };
        assert_eq!(t.line(), 42);
    }
}
