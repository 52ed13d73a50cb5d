//! Lattice semantic analysis: HIR to typed IR.
//!
//! This crate lowers the parsed HIR of a Lattice program into typed IR:
//! it resolves names across nested lexical scopes, infers and checks the
//! structural type system (element records, sets, edge sets, tuples, and
//! tensors whose dimensions are index sets), validates map-reduce
//! assembly, and recovers from errors so that one pass collects every
//! independent diagnostic.
//!
//! # Architecture
//!
//! - [`ty`]: IR value types with structural equality and source-syntax
//!   display
//! - [`env`]: scope-stack symbol table and the program context registries
//! - [`builtins`]: intrinsic function signatures
//! - [`error`]: semantic diagnostics; `Display` is the message source of
//!   truth
//! - [`literal`]: dense tensor literal shape inference
//! - [`infer`]: the checker walk
//! - [`diagnostics`]: ariadne rendering with stable error codes

pub mod builtins;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod infer;
pub mod literal;
pub mod ty;

use rustc_hash::FxHashMap;

use lattice_hir::{ExprId, Program};

use crate::diagnostics::DiagnosticOptions;
use crate::env::Environment;
use crate::error::TypeError;
use crate::ty::Type;

/// The result of type checking one Lattice program.
///
/// Downstream passes read the populated program context (element kinds,
/// function signatures, the global symbol scope) and the per-expression
/// inferred types; drivers render the accumulated diagnostics.
pub struct TypeckResult {
    /// The populated program context. The symbol stack is back at depth 1
    /// (global scope only) when checking completes.
    pub env: Environment,
    /// Semantic errors, in the order the walk encountered them.
    pub errors: Vec<TypeError>,
    /// Inferred value list per HIR expression node. Expressions whose type
    /// is undefined (a previous error) are absent.
    pub expr_types: FxHashMap<ExprId, Vec<Type>>,
}

impl TypeckResult {
    /// Render all errors as formatted diagnostic strings.
    pub fn render_errors(
        &self,
        source: &str,
        filename: &str,
        options: &DiagnosticOptions,
    ) -> Vec<String> {
        self.errors
            .iter()
            .map(|err| diagnostics::render_diagnostic(err, source, filename, options))
            .collect()
    }
}

/// Type-check a parsed Lattice program.
///
/// This is the main entry point. Checking is synchronous, deterministic,
/// and never panics on user errors; all failures appear in
/// [`TypeckResult::errors`].
pub fn check(program: &Program) -> TypeckResult {
    infer::check(program)
}
