//! Top-level declarations and the program root.

use lattice_common::Span;

use crate::stmt::{IdentDecl, Stmt};
use crate::ty::TypeExpr;
use crate::Ident;

/// A field of an element kind.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Ident,
    pub ty: TypeExpr,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Field { name: Ident::new(name), ty }
    }
}

/// A function parameter; `inout` parameters are writable in the body.
#[derive(Debug, Clone)]
pub struct FuncParam {
    pub decl: IdentDecl,
    pub inout: bool,
}

impl FuncParam {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        FuncParam { decl: IdentDecl::new(name, ty), inout: false }
    }

    pub fn inout(name: impl Into<String>, ty: TypeExpr) -> Self {
        FuncParam { decl: IdentDecl::new(name, ty), inout: true }
    }
}

/// A function or procedure declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<FuncParam>,
    pub results: Vec<IdentDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    /// `element Point ... end`
    Element {
        name: Ident,
        fields: Vec<Field>,
        span: Span,
    },
    /// `extern points : set{Point};`
    Extern { decl: IdentDecl, span: Span },
    Func(FuncDecl),
}

/// The root of one compilation unit, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}
