//! Expression nodes.
//!
//! Covers tensor algebra (`+`, `-`, `*`, `/`, `.*`, `./`), comparisons,
//! boolean operators, negation and transpose, calls, map-reduce assembly,
//! tensor/tuple reads, field reads, variable references, and literals.

use lattice_common::Span;

use crate::Ident;

/// Stable identity of an expression node within one HIR tree.
///
/// Allocated by [`crate::Builder`]; the semantic analyzer keys its inferred
/// type side-map on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub span: Span,
    pub kind: ExprKind,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    /// Matrix multiplication `*`.
    MatMul,
    /// Scalar/tensor division `/`.
    Div,
    /// Element-wise multiplication `.*`.
    ElwiseMul,
    /// Element-wise division `./`.
    ElwiseDiv,
}

impl BinaryOp {
    /// The source spelling of the operator, used in diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Xor => "xor",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::MatMul => "*",
            BinaryOp::Div => "/",
            BinaryOp::ElwiseMul => ".*",
            BinaryOp::ElwiseDiv => "./",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    /// Postfix `'`.
    Transpose,
}

/// Reduction operators for map-reduce assembly. Only summation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Add,
}

/// One index position in a tensor read.
#[derive(Debug, Clone)]
pub enum Index {
    /// A whole-axis slice `:`.
    Slice(Span),
    Expr(Expr),
}

/// A dense tensor literal: nested bracketed rows of int or float scalars.
///
/// Shape and component kind are inferred by the semantic analyzer; the
/// parser records the nesting as written.
#[derive(Debug, Clone)]
pub enum DenseLit {
    Int(i64),
    Float(f64),
    List(Vec<DenseLit>),
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Var(Ident),
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    /// A dense literal; `transposed` marks a trailing `'` and is significant
    /// for rank-1 literals only.
    TensorLit { lit: DenseLit, transposed: bool },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    /// `map f(partials) to target reduce +`.
    Map {
        func: Ident,
        partials: Vec<Expr>,
        target: Ident,
        reduce: ReduceOp,
    },
    /// `base(i1, ..., in)` over a tensor or tuple.
    TensorRead {
        base: Box<Expr>,
        indices: Vec<Index>,
    },
    /// `base.field` over an element or a set.
    FieldRead {
        base: Box<Expr>,
        field: Ident,
    },
}
