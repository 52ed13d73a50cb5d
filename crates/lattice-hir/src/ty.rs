//! Type annotations as written in source.
//!
//! These are syntax, not semantics: names are unresolved, tensor dimensions
//! are index-set expressions, and nothing is checked. The semantic analyzer
//! lowers them to IR types.

use std::fmt;

use lattice_common::Span;

use crate::Ident;

/// The scalar component kinds of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Bool => write!(f, "bool"),
        }
    }
}

/// One axis of a tensor type annotation.
#[derive(Debug, Clone)]
pub enum IndexSetExpr {
    /// A statically known range, e.g. the `3` in `tensor[3](float)`.
    Range { len: u64, span: Span },
    /// A named set, e.g. the `points` in `tensor[points](float)`.
    Set(Ident),
    /// The dynamic wildcard `*`.
    Dynamic { span: Span },
}

impl IndexSetExpr {
    /// A range axis with no source position.
    pub fn range(len: u64) -> Self {
        IndexSetExpr::Range { len, span: Span::DUMMY }
    }

    /// A named-set axis with no source position.
    pub fn set(name: impl Into<String>) -> Self {
        IndexSetExpr::Set(Ident::new(name))
    }

    /// A dynamic axis with no source position.
    pub fn dynamic() -> Self {
        IndexSetExpr::Dynamic { span: Span::DUMMY }
    }

    pub fn span(&self) -> Span {
        match self {
            IndexSetExpr::Range { span, .. } => *span,
            IndexSetExpr::Set(name) => name.span,
            IndexSetExpr::Dynamic { span } => *span,
        }
    }
}

/// A type annotation.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `int`, `float`, or `bool`.
    Scalar { kind: ScalarKind, span: Span },
    /// A reference to a declared element kind, e.g. `Point`.
    Element(Ident),
    /// `set{Point}` or, for an edge set, `set{Spring}(points,points)`.
    Set {
        element: Ident,
        endpoints: Vec<Ident>,
        span: Span,
    },
    /// A fixed-length endpoint tuple, e.g. `(Point*2)`.
    Tuple {
        element: Ident,
        len: i64,
        span: Span,
    },
    /// `tensor[i1,...,in](block)`, optionally marked as a column vector
    /// with a trailing `'`.
    Tensor {
        index_sets: Vec<IndexSetExpr>,
        block: Box<TypeExpr>,
        column_vector: bool,
        span: Span,
    },
}

impl TypeExpr {
    /// A scalar annotation with no source position.
    pub fn scalar(kind: ScalarKind) -> Self {
        TypeExpr::Scalar { kind, span: Span::DUMMY }
    }

    /// An element-kind reference with no source position.
    pub fn element(name: impl Into<String>) -> Self {
        TypeExpr::Element(Ident::new(name))
    }

    /// A set annotation with no source position.
    pub fn set(element: impl Into<String>, endpoints: &[&str]) -> Self {
        TypeExpr::Set {
            element: Ident::new(element),
            endpoints: endpoints.iter().map(|e| Ident::new(*e)).collect(),
            span: Span::DUMMY,
        }
    }

    /// A tuple annotation with no source position.
    pub fn tuple(element: impl Into<String>, len: i64) -> Self {
        TypeExpr::Tuple { element: Ident::new(element), len, span: Span::DUMMY }
    }

    /// A tensor annotation with no source position.
    pub fn tensor(index_sets: Vec<IndexSetExpr>, block: TypeExpr) -> Self {
        TypeExpr::Tensor {
            index_sets,
            block: Box::new(block),
            column_vector: false,
            span: Span::DUMMY,
        }
    }

    /// Mark a tensor annotation as a column vector.
    pub fn column(self) -> Self {
        match self {
            TypeExpr::Tensor { index_sets, block, span, .. } => TypeExpr::Tensor {
                index_sets,
                block,
                column_vector: true,
                span,
            },
            other => other,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Scalar { span, .. } => *span,
            TypeExpr::Element(name) => name.span,
            TypeExpr::Set { span, .. } => *span,
            TypeExpr::Tuple { span, .. } => *span,
            TypeExpr::Tensor { span, .. } => *span,
        }
    }
}
