//! Predicate expression trees.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not};

use crate::entity::Prop;
use crate::sql::Token;
use crate::value::Value;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn token(self) -> Token {
        match self {
            CompareOp::Eq => Token::Eq,
            CompareOp::Ne => Token::Ne,
            CompareOp::Lt => Token::Lt,
            CompareOp::Lte => Token::Lte,
            CompareOp::Gt => Token::Gt,
            CompareOp::Gte => Token::Gte,
        }
    }

    /// `<`, `<=`, `>` or `>=`.
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Wildcard placement for string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeKind {
    Contains,
    StartsWith,
    EndsWith,
}

impl LikeKind {
    /// Escape character declared in the generated `ESCAPE` clause.
    pub const ESCAPE: char = '!';

    /// Escape wildcards in a search string, then attach `%` wildcards.
    ///
    /// `%`, `_` and `[` in `text` match literally.
    pub fn pattern(self, text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '%' | '_' | '[') || c == Self::ESCAPE {
                escaped.push(Self::ESCAPE);
            }
            escaped.push(c);
        }
        let text = escaped;
        match self {
            LikeKind::Contains => format!("%{text}%"),
            LikeKind::StartsWith => format!("{text}%"),
            LikeKind::EndsWith => format!("%{text}"),
        }
    }
}

/// Untyped predicate tree over property names.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Property reference by name.
    Member(String),
    Const(Value),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Value>,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        kind: LikeKind,
    },
}

impl Expr {
    pub fn member(name: impl Into<String>) -> Self {
        Expr::Member(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Const(value.into())
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Member(name) => write!(f, "{name}"),
            Expr::Const(Value::String(s)) => write!(f, "{s:?}"),
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Compare { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::And(l, r) => write!(f, "({l} AND {r})"),
            Expr::Or(l, r) => write!(f, "({l} OR {r})"),
            Expr::Not(inner) => write!(f, "NOT {inner}"),
            Expr::IsNull { expr, negated } => {
                write!(f, "{expr} IS {}NULL", if *negated { "NOT " } else { "" })
            }
            Expr::InList { expr, list, negated } => {
                write!(f, "{expr} {}IN (", if *negated { "NOT " } else { "" })?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Expr::Like { expr, pattern, kind } => write!(f, "{expr} {kind:?} {pattern}"),
        }
    }
}

/// A predicate over entity `E`.
pub struct Predicate<E> {
    expr: Expr,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Predicate<E> {
    pub fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    pub fn and(self, other: Predicate<E>) -> Self {
        Self::from_expr(self.expr.and(other.expr))
    }

    pub fn or(self, other: Predicate<E>) -> Self {
        Self::from_expr(self.expr.or(other.expr))
    }

    /// AND predicates in the order given; `None` when there are none.
    pub fn all(predicates: impl IntoIterator<Item = Predicate<E>>) -> Option<Self> {
        predicates.into_iter().reduce(Predicate::and)
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<E> PartialEq for Predicate<E> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<E> fmt::Display for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}

impl<E> BitAnd for Predicate<E> {
    type Output = Predicate<E>;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl<E> BitOr for Predicate<E> {
    type Output = Predicate<E>;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl<E> Not for Predicate<E> {
    type Output = Predicate<E>;

    fn not(self) -> Self {
        Self::from_expr(self.expr.negate())
    }
}

// =============================================================================
// Prop builders
// =============================================================================

impl<E> Prop<E> {
    fn member(self) -> Expr {
        Expr::Member(self.name().to_string())
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Predicate<E> {
        Predicate::from_expr(Expr::compare(op, self.member(), Expr::Const(value.into())))
    }

    pub fn eq(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Ne, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Gte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Predicate<E> {
        self.compare(CompareOp::Lte, value)
    }

    /// Column-to-column equality.
    pub fn eq_prop(self, other: Prop<E>) -> Predicate<E> {
        Predicate::from_expr(Expr::compare(CompareOp::Eq, self.member(), other.member()))
    }

    pub fn is_null(self) -> Predicate<E> {
        Predicate::from_expr(Expr::IsNull {
            expr: Box::new(self.member()),
            negated: false,
        })
    }

    pub fn is_not_null(self) -> Predicate<E> {
        Predicate::from_expr(Expr::IsNull {
            expr: Box::new(self.member()),
            negated: true,
        })
    }

    pub fn in_list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate<E> {
        self.list(values, false)
    }

    pub fn not_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate<E> {
        self.list(values, true)
    }

    fn list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>, negated: bool) -> Predicate<E> {
        Predicate::from_expr(Expr::InList {
            expr: Box::new(self.member()),
            list: values.into_iter().map(Into::into).collect(),
            negated,
        })
    }

    pub fn contains(self, text: impl Into<Value>) -> Predicate<E> {
        self.like(text, LikeKind::Contains)
    }

    pub fn starts_with(self, text: impl Into<Value>) -> Predicate<E> {
        self.like(text, LikeKind::StartsWith)
    }

    pub fn ends_with(self, text: impl Into<Value>) -> Predicate<E> {
        self.like(text, LikeKind::EndsWith)
    }

    fn like(self, text: impl Into<Value>, kind: LikeKind) -> Predicate<E> {
        Predicate::from_expr(Expr::Like {
            expr: Box::new(self.member()),
            pattern: Box::new(Expr::Const(text.into())),
            kind,
        })
    }

    /// A boolean property used directly as a predicate.
    pub fn is_true(self) -> Predicate<E> {
        Predicate::from_expr(self.member())
    }
}
