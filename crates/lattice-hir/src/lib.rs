//! High-level IR for the Lattice compiler.
//!
//! The HIR is the tree the parser hands to semantic analysis: an owned sum
//! type per syntactic category, with a source span on every node and a
//! stable [`ExprId`] on every expression so downstream passes can attach
//! side-maps (inferred types, lowered IR references) without mutating the
//! tree.
//!
//! # Architecture
//!
//! - [`ty`]: type annotations as written in source (scalars, element
//!   references, sets, tuples, tensors with index-set dimensions)
//! - [`expr`]: expressions, including map-reduce assembly and dense
//!   tensor literals
//! - [`stmt`]: statements and the `for` range domain
//! - [`decl`]: top-level declarations and [`Program`]
//! - [`build`]: a small builder that allocates expression ids, used by the
//!   parser and by test harnesses that assemble trees directly

pub mod build;
pub mod decl;
pub mod expr;
pub mod stmt;
pub mod ty;

use lattice_common::Span;

pub use build::Builder;
pub use decl::{Decl, Field, FuncDecl, FuncParam, Program};
pub use expr::{BinaryOp, DenseLit, Expr, ExprId, ExprKind, Index, ReduceOp, UnaryOp};
pub use stmt::{IdentDecl, RangeDomain, Stmt};
pub use ty::{IndexSetExpr, ScalarKind, TypeExpr};

/// An identifier with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    /// Create an identifier positioned at `span`.
    pub fn at(text: impl Into<String>, span: Span) -> Self {
        Ident { text: text.into(), span }
    }

    /// Create an identifier with no source position (synthesized trees).
    pub fn new(text: impl Into<String>) -> Self {
        Ident::at(text, Span::DUMMY)
    }
}
