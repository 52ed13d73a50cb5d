//! IR value types.
//!
//! Defines the typed-IR side of semantic analysis: scalars, tensors whose
//! dimensions are index sets (with block nesting and a column-vector flag),
//! element records, set types with endpoint lists, and fixed-length tuples.
//! Equality is structural throughout; tensor equality includes the
//! column-vector flag. `Display` prints source syntax, which is what every
//! diagnostic message embeds.
//!
//! An *undefined* type -- the result of a previously reported error -- is
//! never materialized here; the checker models it as `Option<Type>::None`,
//! which short-circuits comparisons and follow-on checks by construction.

use std::fmt;

pub use lattice_hir::ScalarKind;

/// The domain of one tensor axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSet {
    /// A statically known range of the given length.
    Range(u64),
    /// A named set; the symbol resolves to a set type at the point the
    /// reference is checked.
    Set(String),
    /// The dynamic wildcard `*`.
    Dynamic,
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSet::Range(len) => write!(f, "{len}"),
            IndexSet::Set(name) => write!(f, "{name}"),
            IndexSet::Dynamic => write!(f, "*"),
        }
    }
}

/// The ordered index sets of one tensor axis. The first entry is the outer
/// dimension; the rest record the block nesting introduced when a tensor
/// type is built over a tensor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDomain {
    pub index_sets: Vec<IndexSet>,
}

impl IndexDomain {
    /// A domain with a single (unnested) index set.
    pub fn flat(set: IndexSet) -> Self {
        IndexDomain { index_sets: vec![set] }
    }

    /// The outer dimension of this axis.
    pub fn outer(&self) -> &IndexSet {
        &self.index_sets[0]
    }

    /// The nested (block) index sets of this axis, outermost first.
    pub fn inner(&self) -> &[IndexSet] {
        &self.index_sets[1..]
    }
}

/// A tensor type: component kind, axis domains, and the column-vector flag.
///
/// A tensor of order 0 is a bare scalar. The column-vector flag is
/// significant only at order 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorType {
    pub component: ScalarKind,
    pub dims: Vec<IndexDomain>,
    pub column_vector: bool,
}

impl TensorType {
    pub fn new(component: ScalarKind, dims: Vec<IndexDomain>, column_vector: bool) -> Self {
        TensorType { component, dims, column_vector }
    }

    /// An order-0 tensor.
    pub fn scalar(component: ScalarKind) -> Self {
        TensorType::new(component, Vec::new(), false)
    }

    /// The number of axis domains.
    pub fn order(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Whether the component participates in arithmetic. Boolean tensors do
    /// not.
    pub fn is_numeric(&self) -> bool {
        matches!(self.component, ScalarKind::Int | ScalarKind::Float)
    }

    /// The per-element block of this tensor: the tensor formed from the
    /// nested index sets of every axis, or the bare component when no axis
    /// nests.
    pub fn block_type(&self) -> TensorType {
        let dims: Vec<IndexDomain> = self
            .dims
            .iter()
            .filter(|d| !d.inner().is_empty())
            .map(|d| IndexDomain { index_sets: d.inner().to_vec() })
            .collect();
        TensorType::new(self.component, dims, false)
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            return write!(f, "{}", self.component);
        }
        write!(f, "tensor[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim.outer())?;
        }
        write!(f, "]({})", self.block_type())?;
        if self.column_vector {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// A field of an element kind. Tensor dimensions in the field type may
/// reference previously declared sets by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementField {
    pub name: String,
    pub ty: Type,
}

/// A named record of scalar and tensor fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementType {
    pub name: String,
    pub fields: Vec<ElementField>,
}

impl ElementType {
    pub fn field(&self, name: &str) -> Option<&ElementField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A set of elements of one kind. A vertex set has no endpoints; a k-ary
/// edge set names the k sets its elements connect, in order. Two set types
/// with the same element kind and the same endpoint list are the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetType {
    pub element: ElementType,
    pub endpoints: Vec<String>,
}

/// A fixed-length tuple of elements of one kind. Length is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleType {
    pub element: ElementType,
    pub len: usize,
}

/// An IR value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Tensor(TensorType),
    Element(ElementType),
    Set(SetType),
    Tuple(TupleType),
}

impl Type {
    /// An order-0 tensor of the given component kind.
    pub fn scalar(kind: ScalarKind) -> Type {
        Type::Tensor(TensorType::scalar(kind))
    }

    pub fn int() -> Type {
        Type::scalar(ScalarKind::Int)
    }

    pub fn float() -> Type {
        Type::scalar(ScalarKind::Float)
    }

    pub fn boolean() -> Type {
        Type::scalar(ScalarKind::Bool)
    }

    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            Type::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this is an order-0 tensor of the given kind.
    pub fn is_scalar_of(&self, kind: ScalarKind) -> bool {
        matches!(self, Type::Tensor(t) if t.is_scalar() && t.component == kind)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Tensor(t) => write!(f, "{t}"),
            Type::Element(e) => write!(f, "{}", e.name),
            Type::Set(s) => {
                write!(f, "set{{{}}}", s.element.name)?;
                if !s.endpoints.is_empty() {
                    write!(f, "({})", s.endpoints.join(","))?;
                }
                Ok(())
            }
            Type::Tuple(t) => write!(f, "({}*{})", t.element.name, t.len),
        }
    }
}
