//! The semantic analyzer: one top-down walk from HIR to typed IR.
//!
//! The walk registers element kinds and function signatures into the
//! program context, lowers type annotations to IR types, infers the type
//! list of every expression, and enforces the operator shape rules.
//!
//! Error recovery is uniform: every inference operation returns `Option`,
//! reports a diagnostic before yielding `None`, and parents skip only the
//! checks that depend on an undefined child while continuing with
//! siblings. One pass therefore surfaces every independent fault, in walk
//! order.

use rustc_hash::FxHashMap;

use lattice_common::Span;
use lattice_hir as hir;
use lattice_hir::{BinaryOp, DenseLit, Expr, ExprKind, Index, ScalarKind, UnaryOp};

use crate::builtins;
use crate::env::{Access, Environment, FuncSignature, Param, Symbol};
use crate::error::{SymbolKind, TypeError, TypeErrorKind};
use crate::literal;
use crate::ty::{
    ElementField, ElementType, IndexDomain, IndexSet, SetType, TensorType, TupleType, Type,
};
use crate::TypeckResult;

/// Type-check a whole program.
pub fn check(program: &hir::Program) -> TypeckResult {
    let mut checker = Checker::new();
    checker.check_program(program);
    let Checker { env, errors, expr_types } = checker;
    TypeckResult { env, errors, expr_types }
}

struct Checker {
    env: Environment,
    errors: Vec<TypeError>,
    expr_types: FxHashMap<hir::ExprId, Vec<Type>>,
}

impl Checker {
    fn new() -> Self {
        let mut env = Environment::new();
        builtins::register_intrinsics(&mut env);
        Checker { env, errors: Vec::new(), expr_types: FxHashMap::default() }
    }

    fn report(&mut self, kind: TypeErrorKind, span: Span) {
        self.errors.push(TypeError::new(kind, span));
    }

    // ── Declarations ───────────────────────────────────────────────────

    fn check_program(&mut self, program: &hir::Program) {
        for decl in &program.decls {
            match decl {
                hir::Decl::Element { name, fields, span } => {
                    self.check_element_decl(name, fields, *span)
                }
                hir::Decl::Extern { decl, span } => self.check_extern_decl(decl, *span),
                hir::Decl::Func(func) => self.check_func_decl(func),
            }
        }
    }

    fn check_element_decl(&mut self, name: &hir::Ident, fields: &[hir::Field], span: Span) {
        let mut lowered = Vec::new();
        for field in fields {
            // fields whose annotation fails are skipped; the element kind is
            // registered with the fields that did check
            if let Some(ty) = self.lower_type(&field.ty) {
                lowered.push(ElementField { name: field.name.text.clone(), ty });
            }
        }
        let element = ElementType { name: name.text.clone(), fields: lowered };
        if !self.env.add_element_type(element) {
            self.report(
                TypeErrorKind::MultipleDefinitions {
                    kind: SymbolKind::ElementType,
                    name: name.text.clone(),
                },
                span,
            );
        }
    }

    fn check_extern_decl(&mut self, decl: &hir::IdentDecl, span: Span) {
        let ty = self.lower_type(&decl.ty);
        if self.env.symbols.contains_local(&decl.name.text) {
            self.report(
                TypeErrorKind::MultipleDefinitions {
                    kind: SymbolKind::Variable,
                    name: decl.name.text.clone(),
                },
                span,
            );
            return;
        }
        self.env.symbols.insert(decl.name.text.clone(), Symbol::new(ty, Access::ReadWrite));
    }

    fn check_func_decl(&mut self, func: &hir::FuncDecl) {
        self.env.symbols.scope();

        let mut params = Vec::new();
        for p in &func.params {
            let ty = self.lower_type(&p.decl.ty);
            let access = if p.inout { Access::ReadWrite } else { Access::Read };
            self.env
                .symbols
                .insert(p.decl.name.text.clone(), Symbol::new(ty.clone(), access));
            params.push(Param { name: p.decl.name.text.clone(), ty });
        }

        let mut results = Vec::new();
        for r in &func.results {
            let ty = self.lower_type(&r.ty);
            self.env
                .symbols
                .insert(r.name.text.clone(), Symbol::new(ty.clone(), Access::Write));
            results.push(Param { name: r.name.text.clone(), ty });
        }

        self.check_body(&func.body);
        self.env.symbols.unscope();

        let sig = FuncSignature { name: func.name.text.clone(), params, results, intrinsic: false };
        if !self.env.add_function(sig) {
            self.report(
                TypeErrorKind::MultipleDefinitions {
                    kind: SymbolKind::Function,
                    name: func.name.text.clone(),
                },
                func.span,
            );
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn check_body(&mut self, body: &[hir::Stmt]) {
        for stmt in body {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &hir::Stmt) {
        match stmt {
            hir::Stmt::Var { decl, init } => self.check_var_decl(decl, init.as_ref(), false),
            hir::Stmt::Const { decl, init } => self.check_var_decl(decl, Some(init), true),
            hir::Stmt::Assign { targets, value, span } => {
                self.check_assign(targets, value, *span)
            }
            hir::Stmt::While { cond, body } => {
                self.check_condition(cond);
                self.env.symbols.scope();
                self.check_body(body);
                self.env.symbols.unscope();
            }
            hir::Stmt::If { cond, then_body, else_body } => {
                self.check_condition(cond);
                self.env.symbols.scope();
                self.check_body(then_body);
                self.env.symbols.unscope();
                self.env.symbols.scope();
                self.check_body(else_body);
                self.env.symbols.unscope();
            }
            hir::Stmt::For { var, domain, body } => {
                self.check_bound(&domain.lower);
                self.check_bound(&domain.upper);
                self.env.symbols.scope();
                self.env
                    .symbols
                    .insert(var.text.clone(), Symbol::new(Some(Type::int()), Access::Read));
                self.check_body(body);
                self.env.symbols.unscope();
            }
            hir::Stmt::Print { expr, span } => {
                if let Some(ty) = self.infer_value(expr) {
                    if !matches!(ty, Type::Tensor(_)) {
                        self.report(TypeErrorKind::NotPrintable { found: ty }, *span);
                    }
                }
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr) {
        if let Some(ty) = self.infer_value(cond) {
            if !ty.is_scalar_of(ScalarKind::Bool) {
                self.report(TypeErrorKind::NonBooleanCondition { found: ty }, cond.span);
            }
        }
    }

    fn check_bound(&mut self, bound: &Expr) {
        if let Some(ty) = self.infer_value(bound) {
            if !ty.is_scalar_of(ScalarKind::Int) {
                self.report(TypeErrorKind::NonIntegerBound { found: ty }, bound.span);
            }
        }
    }

    fn check_var_decl(&mut self, decl: &hir::IdentDecl, init: Option<&Expr>, is_const: bool) {
        let declared = self.lower_type(&decl.ty);
        if self.env.symbols.contains_local(&decl.name.text) {
            self.report(
                TypeErrorKind::MultipleDefinitions {
                    kind: SymbolKind::Variable,
                    name: decl.name.text.clone(),
                },
                decl.span,
            );
            return;
        }
        let access = if is_const { Access::Read } else { Access::ReadWrite };
        // The binding is visible to its own initializer; scope rules reject
        // self-reference without any cycle machinery.
        self.env
            .symbols
            .insert(decl.name.text.clone(), Symbol::new(declared.clone(), access));

        let Some(init) = init else { return };
        let Some(init_ty) = self.infer_value(init) else { return };
        let Some(declared) = declared else { return };
        if !init_compatible(&declared, &init_ty, is_const) {
            self.report(
                TypeErrorKind::AssignMismatch { value: init_ty, target: declared },
                init.span,
            );
        }
    }

    fn check_assign(&mut self, targets: &[Expr], value: &Expr, span: Span) {
        let value_types = self.infer_expr(value);
        if let Some(vs) = &value_types {
            if vs.len() != targets.len() {
                self.report(
                    TypeErrorKind::AssignCount { values: vs.len(), targets: targets.len() },
                    span,
                );
            }
        }

        for (i, target) in targets.iter().enumerate() {
            let rhs = value_types.as_ref().and_then(|vs| vs.get(i)).cloned();
            match &target.kind {
                ExprKind::Var(name) => {
                    let existing = self.env.symbols.get(&name.text).cloned();
                    match existing {
                        Some(sym) => {
                            if !sym.access.writable() {
                                self.report(
                                    TypeErrorKind::NotWritable { name: name.text.clone() },
                                    target.span,
                                );
                                continue;
                            }
                            if let Some(ty) = &sym.ty {
                                self.expr_types.insert(target.id, vec![ty.clone()]);
                            }
                            if let (Some(t), Some(r)) = (sym.ty, rhs) {
                                if !assign_compatible(&t, &r) {
                                    self.report(
                                        TypeErrorKind::AssignMismatch { value: r, target: t },
                                        target.span,
                                    );
                                }
                            }
                        }
                        None => {
                            // a write target with no binding introduces a new
                            // local of the assigned type
                            if let Some(ty) = &rhs {
                                self.expr_types.insert(target.id, vec![ty.clone()]);
                            }
                            self.env
                                .symbols
                                .insert(name.text.clone(), Symbol::new(rhs, Access::ReadWrite));
                        }
                    }
                }
                ExprKind::TensorRead { .. } | ExprKind::FieldRead { .. } => {
                    if let (Some(t), Some(r)) = (self.infer_write_target(target), rhs) {
                        if !assign_compatible(&t, &r) {
                            self.report(
                                TypeErrorKind::AssignMismatch { value: r, target: t },
                                target.span,
                            );
                        }
                    }
                }
                _ => self.report(TypeErrorKind::InvalidAssignTarget, target.span),
            }
        }
    }

    /// Infer the type of a tensor- or field-write target. The write mark
    /// propagates to the base: an unbound base variable yields undefined
    /// without a diagnostic, and permissions are checked for writing.
    fn infer_write_target(&mut self, expr: &Expr) -> Option<Type> {
        let ty = match &expr.kind {
            ExprKind::Var(name) => {
                let sym = self.env.symbols.get(&name.text).cloned()?;
                if !sym.access.writable() {
                    self.report(TypeErrorKind::NotWritable { name: name.text.clone() }, expr.span);
                    return None;
                }
                sym.ty?
            }
            ExprKind::TensorRead { base, indices } => {
                let base_ty = self.infer_write_target(base)?;
                self.check_read(&base_ty, indices, expr.span)?
            }
            ExprKind::FieldRead { base, field } => {
                let base_ty = self.infer_write_target(base)?;
                let hint = set_name_hint(base);
                self.check_field_read(&base_ty, hint, field, expr.span)?
            }
            _ => {
                self.report(TypeErrorKind::InvalidAssignTarget, expr.span);
                return None;
            }
        };
        self.expr_types.insert(expr.id, vec![ty.clone()]);
        Some(ty)
    }

    // ── Type annotation lowering ───────────────────────────────────────

    fn lower_type(&mut self, ty: &hir::TypeExpr) -> Option<Type> {
        match ty {
            hir::TypeExpr::Scalar { kind, .. } => Some(Type::scalar(*kind)),
            hir::TypeExpr::Element(name) => {
                let element = self.lookup_element(name)?;
                Some(Type::Element(element))
            }
            hir::TypeExpr::Set { element, endpoints, .. } => {
                // element and every endpoint are checked independently so
                // one bad endpoint does not hide the others
                let elem = self.env.element_type(&element.text).cloned();
                if elem.is_none() {
                    self.report(
                        TypeErrorKind::Undeclared {
                            kind: SymbolKind::ElementType,
                            name: element.text.clone(),
                        },
                        element.span,
                    );
                }
                let mut ok = true;
                let mut names = Vec::new();
                for ep in endpoints {
                    match self.env.symbols.get(&ep.text).cloned() {
                        None => {
                            self.report(
                                TypeErrorKind::Undeclared {
                                    kind: SymbolKind::Set,
                                    name: ep.text.clone(),
                                },
                                ep.span,
                            );
                            ok = false;
                        }
                        Some(sym) => match sym.ty {
                            None => ok = false,
                            Some(Type::Set(_)) => names.push(ep.text.clone()),
                            Some(_) => {
                                self.report(
                                    TypeErrorKind::EndpointNotSet { name: ep.text.clone() },
                                    ep.span,
                                );
                                ok = false;
                            }
                        },
                    }
                }
                let elem = elem?;
                if !ok {
                    return None;
                }
                Some(Type::Set(SetType { element: elem, endpoints: names }))
            }
            hir::TypeExpr::Tuple { element, len, span } => {
                let elem = self.lookup_element(element);
                if *len < 1 {
                    self.report(TypeErrorKind::TupleLength { len: *len }, *span);
                    return None;
                }
                Some(Type::Tuple(TupleType { element: elem?, len: *len as usize }))
            }
            hir::TypeExpr::Tensor { index_sets, block, column_vector, span } => {
                let sets: Vec<Option<IndexSet>> =
                    index_sets.iter().map(|is| self.lower_index_set(is)).collect();
                let block_ty = self.lower_type(block)?;
                let Type::Tensor(b) = block_ty else {
                    self.report(TypeErrorKind::TensorBlock { found: block_ty }, block.span());
                    return None;
                };
                let sets: Vec<IndexSet> = sets.into_iter().collect::<Option<_>>()?;

                let dims: Vec<IndexDomain> = if b.order() == 0 {
                    sets.into_iter().map(IndexDomain::flat).collect()
                } else if b.order() == sets.len() {
                    // the block's axes nest under the new outer dimensions
                    sets.into_iter()
                        .zip(&b.dims)
                        .map(|(outer, block_dim)| {
                            let mut index_sets = vec![outer];
                            index_sets.extend(block_dim.index_sets.iter().cloned());
                            IndexDomain { index_sets }
                        })
                        .collect()
                } else {
                    self.report(
                        TypeErrorKind::BlockDimensionMismatch {
                            block_order: b.order(),
                            outer: sets.len(),
                        },
                        *span,
                    );
                    return None;
                };

                if *column_vector && dims.len() != 1 {
                    self.report(TypeErrorKind::ColumnVectorOrder { order: dims.len() }, *span);
                    return None;
                }
                Some(Type::Tensor(TensorType::new(b.component, dims, *column_vector)))
            }
        }
    }

    fn lookup_element(&mut self, name: &hir::Ident) -> Option<ElementType> {
        match self.env.element_type(&name.text).cloned() {
            Some(elem) => Some(elem),
            None => {
                self.report(
                    TypeErrorKind::Undeclared {
                        kind: SymbolKind::ElementType,
                        name: name.text.clone(),
                    },
                    name.span,
                );
                None
            }
        }
    }

    fn lower_index_set(&mut self, is: &hir::IndexSetExpr) -> Option<IndexSet> {
        match is {
            hir::IndexSetExpr::Range { len, .. } => Some(IndexSet::Range(*len)),
            hir::IndexSetExpr::Dynamic { .. } => Some(IndexSet::Dynamic),
            hir::IndexSetExpr::Set(name) => match self.env.symbols.get(&name.text).cloned() {
                None => {
                    self.report(
                        TypeErrorKind::Undeclared {
                            kind: SymbolKind::Set,
                            name: name.text.clone(),
                        },
                        name.span,
                    );
                    None
                }
                Some(sym) => match sym.ty {
                    None => None,
                    Some(Type::Set(_)) => Some(IndexSet::Set(name.text.clone())),
                    Some(_) => {
                        self.report(TypeErrorKind::InvalidIndexSet, name.span);
                        None
                    }
                },
            },
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    /// Infer the value list of an expression, recording it in the side-map.
    fn infer_expr(&mut self, expr: &Expr) -> Option<Vec<Type>> {
        let types = match &expr.kind {
            ExprKind::Var(name) => vec![self.infer_var(name, expr.span)?],
            ExprKind::IntLit(_) => vec![Type::int()],
            ExprKind::FloatLit(_) => vec![Type::float()],
            ExprKind::BoolLit(_) => vec![Type::boolean()],
            ExprKind::TensorLit { lit, transposed } => {
                vec![self.infer_tensor_lit(lit, *transposed, expr.span)?]
            }
            ExprKind::Binary { op, lhs, rhs } => {
                vec![self.infer_binary(*op, lhs, rhs, expr.span)?]
            }
            ExprKind::Unary { op, operand } => {
                vec![self.infer_unary(*op, operand, expr.span)?]
            }
            ExprKind::Call { callee, args } => self.infer_call(callee, args, expr.span)?,
            ExprKind::Map { func, partials, target, .. } => {
                self.infer_map(func, partials, target, expr.span)?
            }
            ExprKind::TensorRead { base, indices } => {
                let base_ty = self.infer_value(base)?;
                vec![self.check_read(&base_ty, indices, expr.span)?]
            }
            ExprKind::FieldRead { base, field } => {
                let hint = set_name_hint(base);
                let base_ty = self.infer_value(base)?;
                vec![self.check_field_read(&base_ty, hint, field, expr.span)?]
            }
        };
        self.expr_types.insert(expr.id, types.clone());
        Some(types)
    }

    /// Infer an expression that must produce exactly one value.
    fn infer_value(&mut self, expr: &Expr) -> Option<Type> {
        let types = self.infer_expr(expr)?;
        if types.len() != 1 {
            self.report(TypeErrorKind::ExpectedSingleValue { found: types.len() }, expr.span);
            return None;
        }
        types.into_iter().next()
    }

    fn infer_var(&mut self, name: &hir::Ident, span: Span) -> Option<Type> {
        let Some(sym) = self.env.symbols.get(&name.text).cloned() else {
            self.report(
                TypeErrorKind::Undeclared {
                    kind: SymbolKind::Variable,
                    name: name.text.clone(),
                },
                span,
            );
            return None;
        };
        if !sym.access.readable() {
            self.report(TypeErrorKind::NotReadable { name: name.text.clone() }, span);
            return None;
        }
        // an undefined binding stays silent: the declaration already reported
        sym.ty
    }

    fn infer_tensor_lit(&mut self, lit: &DenseLit, transposed: bool, span: Span) -> Option<Type> {
        match literal::shape_of(lit) {
            Ok((kind, shape)) => {
                let dims: Vec<IndexDomain> = shape
                    .into_iter()
                    .map(|len| IndexDomain::flat(IndexSet::Range(len)))
                    .collect();
                let column = transposed && dims.len() == 1;
                Some(Type::Tensor(TensorType::new(kind, dims, column)))
            }
            Err(error) => {
                self.report(TypeErrorKind::LiteralShape { error }, span);
                None
            }
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, span: Span) -> Option<Type> {
        // both operands are inferred before bailing so each reports its own
        // faults
        let lt = self.infer_value(lhs);
        let rt = self.infer_value(rhs);
        let (lt, rt) = (lt?, rt?);
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::ElwiseMul | BinaryOp::ElwiseDiv => {
                self.infer_elementwise(op, lt, rt, span)
            }
            BinaryOp::Div => self.infer_division(lt, rt, span),
            BinaryOp::MatMul => self.infer_matmul(lt, rt, span),
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt
            | BinaryOp::Ge => self.infer_comparison(op, lt, rt, span),
            BinaryOp::Or | BinaryOp::And | BinaryOp::Xor => {
                self.infer_boolean(op, lt, rt, span)
            }
        }
    }

    fn numeric_tensor(&mut self, op: BinaryOp, ty: &Type, span: Span) -> Option<TensorType> {
        match ty {
            Type::Tensor(t) if t.is_numeric() => Some(t.clone()),
            _ => {
                self.report(
                    TypeErrorKind::NonNumericOperand { op: op.symbol(), found: ty.clone() },
                    span,
                );
                None
            }
        }
    }

    fn infer_elementwise(&mut self, op: BinaryOp, lt: Type, rt: Type, span: Span) -> Option<Type> {
        let l = self.numeric_tensor(op, &lt, span);
        let r = self.numeric_tensor(op, &rt, span);
        let (l, r) = (l?, r?);

        if l.is_scalar() != r.is_scalar() {
            // scalar against tensor: component kinds must agree exactly and
            // the tensor side carries the result type
            if l.component != r.component {
                self.report(
                    TypeErrorKind::OperandMismatch { op: op.symbol(), lhs: lt, rhs: rt },
                    span,
                );
                return None;
            }
            return Some(Type::Tensor(if l.is_scalar() { r } else { l }));
        }
        if l != r {
            self.report(
                TypeErrorKind::OperandMismatch { op: op.symbol(), lhs: lt, rhs: rt },
                span,
            );
            return None;
        }
        Some(Type::Tensor(l))
    }

    fn infer_division(&mut self, lt: Type, rt: Type, span: Span) -> Option<Type> {
        let op = BinaryOp::Div;
        let l = self.numeric_tensor(op, &lt, span);
        let r = self.numeric_tensor(op, &rt, span);
        let (l, r) = (l?, r?);

        if l.component != r.component {
            self.report(
                TypeErrorKind::OperandMismatch { op: op.symbol(), lhs: lt, rhs: rt },
                span,
            );
            return None;
        }
        if !l.is_scalar() && !r.is_scalar() {
            self.report(TypeErrorKind::TensorDivision, span);
            return None;
        }
        // the non-scalar side carries the type; the left does when both are
        // scalar
        Some(Type::Tensor(if r.is_scalar() { l } else { r }))
    }

    fn infer_matmul(&mut self, lt: Type, rt: Type, span: Span) -> Option<Type> {
        let op = BinaryOp::MatMul;
        let l = self.numeric_tensor(op, &lt, span);
        let r = self.numeric_tensor(op, &rt, span);
        let (l, r) = (l?, r?);

        if l.component != r.component {
            self.report(
                TypeErrorKind::OperandMismatch { op: op.symbol(), lhs: lt, rhs: rt },
                span,
            );
            return None;
        }
        if l.order() > 2 || r.order() > 2 {
            self.report(TypeErrorKind::MatrixOrder, span);
            return None;
        }

        match (l.order(), r.order()) {
            (0, _) => Some(Type::Tensor(r)),
            (_, 0) => Some(Type::Tensor(l)),
            (1, 1) => match (l.column_vector, r.column_vector) {
                (true, true) => {
                    self.report(TypeErrorKind::TwoColumnVectors, span);
                    None
                }
                (false, false) => {
                    self.report(TypeErrorKind::TwoRowVectors, span);
                    None
                }
                (true, false) => {
                    // column x row: outer product
                    if l.dims[0] != r.dims[0] {
                        self.report(TypeErrorKind::DimensionMismatch { lhs: lt, rhs: rt }, span);
                        return None;
                    }
                    Some(Type::Tensor(TensorType::new(
                        l.component,
                        vec![l.dims[0].clone(), r.dims[0].clone()],
                        false,
                    )))
                }
                (false, true) => {
                    // row x column: inner product
                    if l.dims[0] != r.dims[0] {
                        self.report(TypeErrorKind::DimensionMismatch { lhs: lt, rhs: rt }, span);
                        return None;
                    }
                    Some(Type::scalar(l.component))
                }
            },
            (2, 1) => {
                if !r.column_vector {
                    self.report(TypeErrorKind::ColumnVectorRequired, span);
                    return None;
                }
                if l.dims[1] != r.dims[0] {
                    self.report(TypeErrorKind::DimensionMismatch { lhs: lt, rhs: rt }, span);
                    return None;
                }
                Some(Type::Tensor(TensorType::new(l.component, vec![l.dims[0].clone()], true)))
            }
            (1, 2) => {
                if l.column_vector {
                    self.report(TypeErrorKind::RowVectorRequired, span);
                    return None;
                }
                if l.dims[0] != r.dims[0] {
                    self.report(TypeErrorKind::DimensionMismatch { lhs: lt, rhs: rt }, span);
                    return None;
                }
                Some(Type::Tensor(TensorType::new(l.component, vec![r.dims[1].clone()], false)))
            }
            (2, 2) => {
                if l.dims[1] != r.dims[0] {
                    self.report(TypeErrorKind::DimensionMismatch { lhs: lt, rhs: rt }, span);
                    return None;
                }
                Some(Type::Tensor(TensorType::new(
                    l.component,
                    vec![l.dims[0].clone(), r.dims[1].clone()],
                    false,
                )))
            }
            _ => unreachable!("orders above 2 are rejected before shape dispatch"),
        }
    }

    fn infer_comparison(&mut self, op: BinaryOp, lt: Type, rt: Type, span: Span) -> Option<Type> {
        let l = self.scalar_operand(&lt, span);
        let r = self.scalar_operand(&rt, span);
        let (l, r) = (l?, r?);
        if l != r {
            self.report(
                TypeErrorKind::OperandMismatch { op: op.symbol(), lhs: lt, rhs: rt },
                span,
            );
            return None;
        }
        Some(Type::boolean())
    }

    fn scalar_operand(&mut self, ty: &Type, span: Span) -> Option<ScalarKind> {
        match ty {
            Type::Tensor(t) if t.is_scalar() => Some(t.component),
            _ => {
                self.report(TypeErrorKind::NonScalarComparison { found: ty.clone() }, span);
                None
            }
        }
    }

    fn infer_boolean(&mut self, op: BinaryOp, lt: Type, rt: Type, span: Span) -> Option<Type> {
        let mut ok = true;
        for ty in [&lt, &rt] {
            if !ty.is_scalar_of(ScalarKind::Bool) {
                self.report(
                    TypeErrorKind::NonBooleanOperand { op: op.symbol(), found: ty.clone() },
                    span,
                );
                ok = false;
            }
        }
        ok.then(Type::boolean)
    }

    fn infer_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Option<Type> {
        let ty = self.infer_value(operand)?;
        match op {
            UnaryOp::Neg => match &ty {
                Type::Tensor(t) if t.is_numeric() => Some(ty),
                _ => {
                    self.report(TypeErrorKind::NonNumericOperand { op: "-", found: ty }, span);
                    None
                }
            },
            UnaryOp::Not => {
                if ty.is_scalar_of(ScalarKind::Bool) {
                    Some(ty)
                } else {
                    self.report(TypeErrorKind::NonBooleanOperand { op: "not", found: ty }, span);
                    None
                }
            }
            UnaryOp::Transpose => {
                let Type::Tensor(t) = ty else {
                    self.report(TypeErrorKind::TransposeOperand { found: ty }, span);
                    return None;
                };
                match t.order() {
                    0 => Some(Type::Tensor(t)),
                    1 => {
                        let flipped = !t.column_vector;
                        Some(Type::Tensor(TensorType::new(t.component, t.dims, flipped)))
                    }
                    2 => {
                        let mut dims = t.dims;
                        dims.swap(0, 1);
                        Some(Type::Tensor(TensorType::new(t.component, dims, false)))
                    }
                    _ => {
                        self.report(TypeErrorKind::TransposeOrder, span);
                        None
                    }
                }
            }
        }
    }

    fn infer_call(&mut self, callee: &hir::Ident, args: &[Expr], span: Span) -> Option<Vec<Type>> {
        // argument faults surface even when the callee is unknown
        let arg_types: Vec<Option<Type>> = args.iter().map(|a| self.infer_value(a)).collect();

        let Some(sig) = self.env.function(&callee.text).cloned() else {
            self.report(
                TypeErrorKind::Undeclared {
                    kind: SymbolKind::Function,
                    name: callee.text.clone(),
                },
                callee.span,
            );
            return None;
        };

        // zero-parameter intrinsics are shape-polymorphic: no arity or
        // argument checks
        if !(sig.intrinsic && sig.params.is_empty()) {
            if args.len() != sig.params.len() {
                self.report(
                    TypeErrorKind::CallArity {
                        func: callee.text.clone(),
                        expected: sig.params.len(),
                        found: args.len(),
                    },
                    span,
                );
            } else {
                for ((arg, at), param) in args.iter().zip(&arg_types).zip(&sig.params) {
                    if let (Some(found), Some(expected)) = (at, &param.ty) {
                        if found != expected {
                            self.report(
                                TypeErrorKind::CallArgMismatch {
                                    func: callee.text.clone(),
                                    found: found.clone(),
                                    expected: expected.clone(),
                                },
                                arg.span,
                            );
                        }
                    }
                }
            }
        }

        sig.results.iter().map(|r| r.ty.clone()).collect()
    }

    fn infer_map(
        &mut self,
        func: &hir::Ident,
        partials: &[Expr],
        target: &hir::Ident,
        span: Span,
    ) -> Option<Vec<Type>> {
        // partial actuals first; each contributes exactly one value
        let mut actuals: Vec<Option<Type>> =
            partials.iter().map(|p| self.infer_value(p)).collect();

        let Some(sig) = self.env.function(&func.text).cloned() else {
            self.report(
                TypeErrorKind::Undeclared { kind: SymbolKind::Function, name: func.text.clone() },
                func.span,
            );
            return None;
        };
        let Some(target_sym) = self.env.symbols.get(&target.text).cloned() else {
            self.report(
                TypeErrorKind::Undeclared { kind: SymbolKind::Set, name: target.text.clone() },
                target.span,
            );
            return None;
        };
        let target_ty = target_sym.ty?;
        let Type::Set(set) = target_ty else {
            self.report(
                TypeErrorKind::MapTarget { name: target.text.clone(), found: target_ty },
                target.span,
            );
            return None;
        };

        // the assembly function receives one element of the target set...
        actuals.push(Some(Type::Element(set.element.clone())));

        // ...and, over an edge set, the endpoint tuple
        if !set.endpoints.is_empty() {
            let mut endpoint_elements = Vec::new();
            for ep in &set.endpoints {
                match self.env.symbols.get(ep).cloned().and_then(|s| s.ty) {
                    Some(Type::Set(s)) => endpoint_elements.push(s.element),
                    _ => {
                        self.report(
                            TypeErrorKind::EndpointNotSet { name: ep.clone() },
                            target.span,
                        );
                        return None;
                    }
                }
            }
            let first = endpoint_elements[0].clone();
            if endpoint_elements.iter().any(|e| *e != first) {
                self.report(
                    TypeErrorKind::HeterogeneousEndpoints { set: target.text.clone() },
                    span,
                );
                return None;
            }
            actuals.push(Some(Type::Tuple(TupleType {
                element: first,
                len: set.endpoints.len(),
            })));
        }

        if actuals.len() != sig.params.len() {
            self.report(
                TypeErrorKind::MapArity {
                    func: func.text.clone(),
                    expected: sig.params.len(),
                    found: actuals.len(),
                },
                span,
            );
        } else {
            for (actual, param) in actuals.iter().zip(&sig.params) {
                if let (Some(found), Some(expected)) = (actual, &param.ty) {
                    if found != expected {
                        self.report(
                            TypeErrorKind::MapArgMismatch {
                                func: func.text.clone(),
                                found: found.clone(),
                                expected: expected.clone(),
                            },
                            span,
                        );
                    }
                }
            }
        }

        sig.results.iter().map(|r| r.ty.clone()).collect()
    }

    // ── Reads ──────────────────────────────────────────────────────────

    fn check_read(&mut self, base: &Type, indices: &[Index], span: Span) -> Option<Type> {
        match base {
            Type::Tensor(t) => self.check_tensor_read(t, indices, span),
            Type::Tuple(t) => self.check_tuple_read(t, indices, span),
            _ => {
                self.report(TypeErrorKind::NotIndexable { found: base.clone() }, span);
                None
            }
        }
    }

    fn check_tensor_read(
        &mut self,
        tensor: &TensorType,
        indices: &[Index],
        span: Span,
    ) -> Option<Type> {
        if indices.len() != tensor.order() {
            // index expressions are still inferred for their own diagnostics
            for index in indices {
                if let Index::Expr(e) = index {
                    self.infer_value(e);
                }
            }
            self.report(
                TypeErrorKind::IndexArity { expected: tensor.order(), found: indices.len() },
                span,
            );
            return None;
        }

        for (index, dim) in indices.iter().zip(&tensor.dims) {
            let Index::Expr(e) = index else { continue };
            let Some(ty) = self.infer_value(e) else { continue };
            if !self.index_compatible(&ty, dim.outer()) {
                self.report(TypeErrorKind::IndexType { found: ty }, e.span);
            }
        }

        // sliced axes survive with their whole domain; consumed axes drop out
        let survivors: Vec<IndexDomain> = indices
            .iter()
            .zip(&tensor.dims)
            .filter(|(index, _)| matches!(index, Index::Slice(_)))
            .map(|(_, dim)| dim.clone())
            .collect();

        if survivors.is_empty() {
            return Some(Type::Tensor(tensor.block_type()));
        }
        let column = survivors.len() == 1 && matches!(indices.last(), Some(Index::Expr(_)));
        Some(Type::Tensor(TensorType::new(tensor.component, survivors, column)))
    }

    /// Whether `ty` can index an axis whose outer dimension is `outer`:
    /// integer scalars always can, and an element of the axis's set can
    /// when the axis is a named set.
    fn index_compatible(&self, ty: &Type, outer: &IndexSet) -> bool {
        if ty.is_scalar_of(ScalarKind::Int) {
            return true;
        }
        if let IndexSet::Set(set_name) = outer {
            if let Some(Some(Type::Set(s))) =
                self.env.symbols.get(set_name).map(|sym| sym.ty.as_ref())
            {
                if let Type::Element(e) = ty {
                    return *e == s.element;
                }
            }
        }
        false
    }

    fn check_tuple_read(
        &mut self,
        tuple: &TupleType,
        indices: &[Index],
        span: Span,
    ) -> Option<Type> {
        if indices.len() != 1 {
            self.report(TypeErrorKind::IndexArity { expected: 1, found: indices.len() }, span);
            return None;
        }
        let Index::Expr(e) = &indices[0] else {
            self.report(TypeErrorKind::TupleSlice, span);
            return None;
        };
        if let Some(ty) = self.infer_value(e) {
            if !ty.is_scalar_of(ScalarKind::Int) {
                self.report(TypeErrorKind::TupleIndexType { found: ty }, e.span);
            }
        }
        Some(Type::Element(tuple.element.clone()))
    }

    fn check_field_read(
        &mut self,
        base: &Type,
        set_name: Option<&str>,
        field: &hir::Ident,
        span: Span,
    ) -> Option<Type> {
        match base {
            Type::Element(element) => {
                let Some(f) = element.field(&field.text) else {
                    self.report(
                        TypeErrorKind::UndefinedField { name: field.text.clone() },
                        field.span,
                    );
                    return None;
                };
                Some(f.ty.clone())
            }
            Type::Set(set) => {
                let Some(f) = set.element.field(&field.text).cloned() else {
                    self.report(
                        TypeErrorKind::UndefinedField { name: field.text.clone() },
                        field.span,
                    );
                    return None;
                };
                let Type::Tensor(ft) = &f.ty else {
                    self.report(
                        TypeErrorKind::SetFieldOrder { name: field.text.clone() },
                        field.span,
                    );
                    return None;
                };
                if ft.order() > 1 {
                    self.report(
                        TypeErrorKind::SetFieldOrder { name: field.text.clone() },
                        field.span,
                    );
                    return None;
                }
                // one global axis over the set, with the field's own
                // dimensions nested as the per-element block
                let outer = match set_name {
                    Some(name) => IndexSet::Set(name.to_string()),
                    None => IndexSet::Dynamic,
                };
                let mut index_sets = vec![outer];
                if let Some(dim) = ft.dims.first() {
                    index_sets.extend(dim.index_sets.iter().cloned());
                }
                let dims = vec![IndexDomain { index_sets }];
                Some(Type::Tensor(TensorType::new(ft.component, dims, true)))
            }
            _ => {
                self.report(TypeErrorKind::NoFields { found: base.clone() }, span);
                None
            }
        }
    }
}

/// The set symbol name behind a field-read base, when the base is a plain
/// variable reference. Non-variable set expressions fall back to a dynamic
/// outer dimension.
fn set_name_hint(base: &Expr) -> Option<&str> {
    match &base.kind {
        ExprKind::Var(name) => Some(name.text.as_str()),
        _ => None,
    }
}

/// Assignment compatibility: types must be equal, except that a tensor
/// target accepts a scalar of its component kind.
fn assign_compatible(target: &Type, value: &Type) -> bool {
    if target == value {
        return true;
    }
    match (target, value) {
        (Type::Tensor(t), Type::Tensor(v)) => v.is_scalar() && t.component == v.component,
        _ => false,
    }
}

/// Initializer compatibility for `var`/`const` declarations. Constants
/// additionally tolerate literal shape slack: leading and trailing unit
/// outer dimensions are not significant.
fn init_compatible(declared: &Type, init: &Type, is_const: bool) -> bool {
    if declared == init {
        return true;
    }
    if let (Type::Tensor(d), Type::Tensor(i)) = (declared, init) {
        if i.is_scalar() && d.component == i.component {
            return true;
        }
        if is_const && d.component == i.component {
            return trim_unit_dims(d) == trim_unit_dims(i);
        }
    }
    false
}

/// Drop leading and trailing axes that are plain ranges of length 1.
fn trim_unit_dims(tensor: &TensorType) -> &[IndexDomain] {
    let is_unit = |d: &IndexDomain| d.index_sets == [IndexSet::Range(1)];
    let mut dims = &tensor.dims[..];
    while dims.first().is_some_and(is_unit) {
        dims = &dims[1..];
    }
    while dims.last().is_some_and(is_unit) {
        dims = &dims[..dims.len() - 1];
    }
    dims
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_tensor(component: ScalarKind, lens: &[u64]) -> TensorType {
        TensorType::new(
            component,
            lens.iter().map(|l| IndexDomain::flat(IndexSet::Range(*l))).collect(),
            false,
        )
    }

    #[test]
    fn trim_unit_dims_strips_both_ends() {
        let t = flat_tensor(ScalarKind::Float, &[1, 3, 1]);
        let trimmed = trim_unit_dims(&t);
        assert_eq!(trimmed, &[IndexDomain::flat(IndexSet::Range(3))]);

        let bare = flat_tensor(ScalarKind::Float, &[3]);
        assert_eq!(trim_unit_dims(&t), trim_unit_dims(&bare));
    }

    #[test]
    fn trim_unit_dims_keeps_interior_units() {
        let t = flat_tensor(ScalarKind::Int, &[3, 1, 3]);
        assert_eq!(trim_unit_dims(&t).len(), 3);
    }

    #[test]
    fn assign_compatibility_accepts_scalar_into_tensor() {
        let matrix = Type::Tensor(flat_tensor(ScalarKind::Float, &[3, 3]));
        assert!(assign_compatible(&matrix, &Type::float()));
        assert!(!assign_compatible(&matrix, &Type::int()));
        assert!(!assign_compatible(&Type::float(), &matrix));
    }

    #[test]
    fn const_slack_is_asymmetric() {
        let declared = Type::Tensor(flat_tensor(ScalarKind::Float, &[3, 1]));
        let literal = Type::Tensor(flat_tensor(ScalarKind::Float, &[1, 3]));
        assert!(init_compatible(&declared, &literal, true));
        assert!(!init_compatible(&declared, &literal, false));
    }
}
