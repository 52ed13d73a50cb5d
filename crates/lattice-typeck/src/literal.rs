//! Shape inference for dense tensor literals.
//!
//! A row of N scalars is a rank-1 shape of length N with a fixed component
//! kind; a nesting of M rows of rank-k shape S is the rank-(k+1) shape
//! (M, S...). Int and float elements may not mix, and sibling rows must
//! agree in shape and kind. Failures are ordinary values -- the checker
//! turns them into diagnostics at the literal's span.

use std::fmt;

use lattice_hir::{DenseLit, ScalarKind};

/// Why a dense literal has no well-formed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    /// Integer and floating-point elements in one literal.
    MixedKinds,
    /// Sibling rows of differing shapes.
    Ragged,
    /// A bracket level with no elements.
    Empty,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::MixedKinds => {
                write!(f, "tensor literals cannot mix integer and floating-point elements")
            }
            ShapeError::Ragged => write!(f, "tensor literal rows must have the same shape"),
            ShapeError::Empty => write!(f, "tensor literals cannot be empty"),
        }
    }
}

/// Infer the component kind and per-axis lengths of a nested bracketed
/// literal. A bare scalar has the empty shape.
pub fn shape_of(lit: &DenseLit) -> Result<(ScalarKind, Vec<u64>), ShapeError> {
    match lit {
        DenseLit::Int(_) => Ok((ScalarKind::Int, Vec::new())),
        DenseLit::Float(_) => Ok((ScalarKind::Float, Vec::new())),
        DenseLit::List(items) => {
            let first = items.first().ok_or(ShapeError::Empty)?;
            let (kind, shape) = shape_of(first)?;
            for item in &items[1..] {
                let (item_kind, item_shape) = shape_of(item)?;
                if item_kind != kind {
                    return Err(ShapeError::MixedKinds);
                }
                if item_shape != shape {
                    return Err(ShapeError::Ragged);
                }
            }
            let mut dims = Vec::with_capacity(shape.len() + 1);
            dims.push(items.len() as u64);
            dims.extend(shape);
            Ok((kind, dims))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> DenseLit {
        DenseLit::List(values.iter().map(|v| DenseLit::Int(*v)).collect())
    }

    fn floats(values: &[f64]) -> DenseLit {
        DenseLit::List(values.iter().map(|v| DenseLit::Float(*v)).collect())
    }

    #[test]
    fn row_literal() {
        let (kind, shape) = shape_of(&floats(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(kind, ScalarKind::Float);
        assert_eq!(shape, vec![3]);
    }

    #[test]
    fn nested_literal_composes_shapes() {
        let lit = DenseLit::List(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
        let (kind, shape) = shape_of(&lit).unwrap();
        assert_eq!(kind, ScalarKind::Int);
        assert_eq!(shape, vec![2, 3]);
    }

    #[test]
    fn rank_three_literal() {
        let plane = |base: i64| DenseLit::List(vec![ints(&[base, base + 1]), ints(&[base + 2, base + 3])]);
        let lit = DenseLit::List(vec![plane(0), plane(10), plane(20)]);
        let (_, shape) = shape_of(&lit).unwrap();
        assert_eq!(shape, vec![3, 2, 2]);
    }

    #[test]
    fn mixed_kinds_rejected() {
        let lit = DenseLit::List(vec![DenseLit::Int(1), DenseLit::Float(2.0)]);
        assert_eq!(shape_of(&lit), Err(ShapeError::MixedKinds));
    }

    #[test]
    fn ragged_rows_rejected() {
        let lit = DenseLit::List(vec![ints(&[1, 2, 3]), ints(&[4, 5])]);
        assert_eq!(shape_of(&lit), Err(ShapeError::Ragged));
    }

    #[test]
    fn deep_mismatch_surfaces() {
        let lit = DenseLit::List(vec![
            DenseLit::List(vec![ints(&[1, 2]), ints(&[3, 4])]),
            DenseLit::List(vec![ints(&[1, 2]), floats(&[3.0, 4.0])]),
        ]);
        assert_eq!(shape_of(&lit), Err(ShapeError::MixedKinds));
    }

    #[test]
    fn empty_literal_rejected() {
        assert_eq!(shape_of(&DenseLit::List(Vec::new())), Err(ShapeError::Empty));
    }
}
