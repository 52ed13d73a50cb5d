//! Semantic diagnostics.
//!
//! Every failing check produces one [`TypeError`] with a source span.
//! Errors are collected during the walk rather than aborting at the first
//! fault, so one pass reports every independent problem. The `Display`
//! impl is the source of truth for message text; the renderer in
//! [`crate::diagnostics`] only adds presentation.

use std::fmt;

use lattice_common::Span;

use crate::literal::ShapeError;
use crate::ty::Type;

/// What kind of name a resolution diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    ElementType,
    Set,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::ElementType => write!(f, "element type"),
            SymbolKind::Set => write!(f, "set"),
        }
    }
}

/// A semantic error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        TypeError { kind, span }
    }
}

/// The specific kind of semantic error.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// A name was referenced but never declared.
    Undeclared { kind: SymbolKind, name: String },
    /// A name was declared twice in the same scope or registry.
    MultipleDefinitions { kind: SymbolKind, name: String },
    /// A write-only binding (a function result) was read.
    NotReadable { name: String },
    /// A read-only binding (an argument, constant, or loop variable) was
    /// written.
    NotWritable { name: String },
    /// A tensor dimension named something that is not a set.
    InvalidIndexSet,
    /// An endpoint of a set type is not a set.
    EndpointNotSet { name: String },
    /// A tuple type was declared with length < 1.
    TupleLength { len: i64 },
    /// A blocked tensor annotation whose outer dimension count does not
    /// match the block's order.
    BlockDimensionMismatch { block_order: usize, outer: usize },
    /// A column-vector annotation of order other than 1.
    ColumnVectorOrder { order: usize },
    /// A tensor annotation whose component is neither a scalar nor a
    /// tensor.
    TensorBlock { found: Type },
    /// An arithmetic operand that is not a numeric tensor.
    NonNumericOperand { op: &'static str, found: Type },
    /// Structurally incompatible operands for a binary operator.
    OperandMismatch { op: &'static str, lhs: Type, rhs: Type },
    /// Non-scalar divided by non-scalar.
    TensorDivision,
    /// `*` applied to a tensor of order 3 or greater.
    MatrixOrder,
    TwoRowVectors,
    TwoColumnVectors,
    /// A matrix multiplied by something other than a column vector on the
    /// right.
    ColumnVectorRequired,
    /// A matrix multiplied by something other than a row vector on the
    /// left.
    RowVectorRequired,
    /// Inner dimensions of a matrix multiply disagree.
    DimensionMismatch { lhs: Type, rhs: Type },
    /// A transpose operand that is not a tensor.
    TransposeOperand { found: Type },
    /// Transpose of a tensor of order 3 or greater.
    TransposeOrder,
    /// A comparison operand that is not a scalar.
    NonScalarComparison { found: Type },
    /// A boolean operator applied to a non-boolean.
    NonBooleanOperand { op: &'static str, found: Type },
    /// A `while`/`if` condition that is not a boolean scalar.
    NonBooleanCondition { found: Type },
    /// A `for` bound that is not an integer scalar.
    NonIntegerBound { found: Type },
    /// An indexed read over something that is neither tensor nor tuple.
    NotIndexable { found: Type },
    /// A read with the wrong number of indices.
    IndexArity { expected: usize, found: usize },
    /// A tensor index that is neither an integer nor an element of the
    /// dimension's set.
    IndexType { found: Type },
    /// A tuple index that is not an integer.
    TupleIndexType { found: Type },
    /// A slice used in a tuple read.
    TupleSlice,
    /// A field access naming a field the element kind does not have.
    UndefinedField { name: String },
    /// A field access over a value with no fields.
    NoFields { found: Type },
    /// A set field read whose field is of order greater than 1.
    SetFieldOrder { name: String },
    /// A multi-valued expression where a single value is required.
    ExpectedSingleValue { found: usize },
    /// Assignment (or initialization) with incompatible types.
    AssignMismatch { value: Type, target: Type },
    /// Assignment with a value-count/target-count mismatch.
    AssignCount { values: usize, targets: usize },
    /// An expression form that cannot be written to.
    InvalidAssignTarget,
    /// A call with the wrong number of arguments.
    CallArity { func: String, expected: usize, found: usize },
    /// A call argument whose type disagrees with the declared parameter.
    CallArgMismatch { func: String, found: Type, expected: Type },
    /// A map whose synthesized actuals disagree with the assembly
    /// function's arity.
    MapArity { func: String, expected: usize, found: usize },
    /// A map actual whose type disagrees with the assembly function's
    /// declared parameter.
    MapArgMismatch { func: String, found: Type, expected: Type },
    /// A map whose target is not a set.
    MapTarget { name: String, found: Type },
    /// A map over an edge set with endpoints of differing element kinds.
    HeterogeneousEndpoints { set: String },
    /// `print` of a non-tensor.
    NotPrintable { found: Type },
    /// A malformed dense tensor literal.
    LiteralShape { error: ShapeError },
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undeclared { kind, name } => write!(f, "undeclared {kind} '{name}'"),
            Self::MultipleDefinitions { kind, name } => {
                write!(f, "multiple definitions of {kind} '{name}'")
            }
            Self::NotReadable { name } => {
                write!(f, "cannot read from write-only variable '{name}'")
            }
            Self::NotWritable { name } => {
                write!(f, "cannot write to read-only variable '{name}'")
            }
            Self::InvalidIndexSet => {
                write!(f, "index set must be a set, a range, or dynamic (*)")
            }
            Self::EndpointNotSet { name } => write!(f, "endpoint '{name}' must be a set"),
            Self::TupleLength { len } => {
                write!(f, "tuple length must be at least 1, not {len}")
            }
            Self::BlockDimensionMismatch { block_order, outer } => write!(
                f,
                "blocked tensor expects {block_order} outer dimensions but {outer} were given"
            ),
            Self::ColumnVectorOrder { order } => {
                write!(f, "column vectors must have exactly one dimension, not {order}")
            }
            Self::TensorBlock { found } => {
                write!(f, "tensor components must be scalars or tensors, found '{found}'")
            }
            Self::NonNumericOperand { op, found } => {
                write!(f, "operands of '{op}' must be numeric tensors, found '{found}'")
            }
            Self::OperandMismatch { op, lhs, rhs } => {
                write!(f, "mismatched operands for '{op}': '{lhs}' and '{rhs}'")
            }
            Self::TensorDivision => {
                write!(f, "dividing a tensor by a non-scalar tensor is not supported")
            }
            Self::MatrixOrder => {
                write!(f, "cannot multiply tensors of order 3 or greater using *")
            }
            Self::TwoRowVectors => write!(f, "cannot multiply two row vectors"),
            Self::TwoColumnVectors => write!(f, "cannot multiply two column vectors"),
            Self::ColumnVectorRequired => {
                write!(f, "a matrix can only be multiplied by a column vector")
            }
            Self::RowVectorRequired => {
                write!(f, "only a row vector can multiply a matrix")
            }
            Self::DimensionMismatch { lhs, rhs } => {
                write!(f, "mismatched dimensions in matrix multiply: '{lhs}' by '{rhs}'")
            }
            Self::TransposeOperand { found } => {
                write!(f, "cannot transpose a value of type '{found}'")
            }
            Self::TransposeOrder => {
                write!(f, "cannot transpose tensors of order 3 or greater")
            }
            Self::NonScalarComparison { found } => {
                write!(f, "comparison operands must be scalars, found '{found}'")
            }
            Self::NonBooleanOperand { op, found } => {
                write!(f, "operands of '{op}' must be boolean scalars, found '{found}'")
            }
            Self::NonBooleanCondition { found } => {
                write!(f, "conditions must be boolean scalars, found '{found}'")
            }
            Self::NonIntegerBound { found } => {
                write!(f, "loop bounds must be integer scalars, found '{found}'")
            }
            Self::NotIndexable { found } => {
                write!(f, "cannot index a value of type '{found}'")
            }
            Self::IndexArity { expected, found } => {
                write!(f, "wrong number of indices: expected {expected}, found {found}")
            }
            Self::IndexType { found } => write!(
                f,
                "tensor indices must be integers or elements of the dimension's set, found '{found}'"
            ),
            Self::TupleIndexType { found } => {
                write!(f, "tuple indices must be integers, found '{found}'")
            }
            Self::TupleSlice => write!(f, "tuples cannot be sliced"),
            Self::UndefinedField { name } => write!(f, "undefined field '{name}'"),
            Self::NoFields { found } => {
                write!(f, "cannot access fields of a value of type '{found}'")
            }
            Self::SetFieldOrder { name } => write!(
                f,
                "field '{name}' must be a scalar or vector to be read through a set"
            ),
            Self::ExpectedSingleValue { found } => {
                write!(f, "expected a single value but found {found}")
            }
            Self::AssignMismatch { value, target } => write!(
                f,
                "cannot assign a value of type '{value}' to a target of type '{target}'"
            ),
            Self::AssignCount { values, targets } => {
                write!(f, "cannot assign {values} values to {targets} targets")
            }
            Self::InvalidAssignTarget => write!(f, "invalid assignment target"),
            Self::CallArity { func, expected, found } => write!(
                f,
                "function '{func}' expects {expected} arguments but {found} were given"
            ),
            Self::CallArgMismatch { func, found, expected } => write!(
                f,
                "call passes argument of type '{found}' but function '{func}' expects argument of type '{expected}'"
            ),
            Self::MapArity { func, expected, found } => write!(
                f,
                "map operation passes {found} arguments to assembly function but function '{func}' expects {expected} arguments"
            ),
            Self::MapArgMismatch { func, found, expected } => write!(
                f,
                "map operation passes argument of type '{found}' to assembly function but function '{func}' expects argument of type '{expected}'"
            ),
            Self::MapTarget { name, found } => {
                write!(f, "map target '{name}' must be a set but has type '{found}'")
            }
            Self::HeterogeneousEndpoints { set } => write!(
                f,
                "map operation over '{set}' is not supported: heterogeneous edge sets are reserved"
            ),
            Self::NotPrintable { found } => {
                write!(f, "cannot print a value of type '{found}'")
            }
            Self::LiteralShape { error } => write!(f, "{error}"),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {}
