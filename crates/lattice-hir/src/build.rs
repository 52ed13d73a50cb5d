//! Expression construction with id allocation.
//!
//! [`Builder`] hands out sequential [`ExprId`]s so that every expression in
//! a tree is uniquely addressable. The parser threads one builder through a
//! whole compilation unit; test harnesses use the same constructors to
//! assemble trees directly.

use lattice_common::Span;

use crate::expr::{BinaryOp, DenseLit, Expr, ExprId, ExprKind, Index, ReduceOp, UnaryOp};
use crate::Ident;

/// Allocates expression ids and builds expression nodes.
#[derive(Debug, Default)]
pub struct Builder {
    next_expr: u32,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ExprId {
        let id = ExprId(self.next_expr);
        self.next_expr += 1;
        id
    }

    /// Build an expression node at a known source position.
    pub fn expr_at(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr { id: self.next_id(), span, kind }
    }

    /// Build an expression node with no source position.
    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        self.expr_at(kind, Span::DUMMY)
    }

    pub fn var(&mut self, name: impl Into<String>) -> Expr {
        self.expr(ExprKind::Var(Ident::new(name)))
    }

    pub fn var_at(&mut self, name: impl Into<String>, span: Span) -> Expr {
        self.expr_at(ExprKind::Var(Ident::at(name, span)), span)
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::IntLit(value))
    }

    pub fn float(&mut self, value: f64) -> Expr {
        self.expr(ExprKind::FloatLit(value))
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::BoolLit(value))
    }

    pub fn tensor_lit(&mut self, lit: DenseLit, transposed: bool) -> Expr {
        self.expr(ExprKind::TensorLit { lit, transposed })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span.merge(rhs.span);
        self.expr_at(
            ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
            span,
        )
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        let span = operand.span;
        self.expr_at(ExprKind::Unary { op, operand: Box::new(operand) }, span)
    }

    pub fn call(&mut self, callee: impl Into<String>, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call { callee: Ident::new(callee), args })
    }

    /// `map func to target reduce +`.
    pub fn map(&mut self, func: impl Into<String>, target: impl Into<String>) -> Expr {
        self.map_with(func, Vec::new(), target)
    }

    /// `map func(partials) to target reduce +`.
    pub fn map_with(
        &mut self,
        func: impl Into<String>,
        partials: Vec<Expr>,
        target: impl Into<String>,
    ) -> Expr {
        self.expr(ExprKind::Map {
            func: Ident::new(func),
            partials,
            target: Ident::new(target),
            reduce: ReduceOp::Add,
        })
    }

    pub fn read(&mut self, base: Expr, indices: Vec<Index>) -> Expr {
        let span = base.span;
        self.expr_at(ExprKind::TensorRead { base: Box::new(base), indices }, span)
    }

    /// A whole-axis slice index `:`.
    pub fn slice(&mut self) -> Index {
        Index::Slice(Span::DUMMY)
    }

    pub fn field(&mut self, base: Expr, field: impl Into<String>) -> Expr {
        let span = base.span;
        self.expr_at(
            ExprKind::FieldRead { base: Box::new(base), field: Ident::new(field) },
            span,
        )
    }
}
