use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};

use crate::embedding::ActiveSpaceError;
use crate::orthogonalisation::{orthogonalising_transform, OrthogonalisationKind};

fn max_abs(a: &Array2<f64>) -> f64 {
    a.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
}

#[test]
fn test_orthogonalisation_symmetric_identity_overlap() {
    let s = Array2::eye(3);
    let c = orthogonalising_transform(&s, OrthogonalisationKind::Symmetric, 1e-8).unwrap();
    assert_abs_diff_eq!(max_abs(&(&c - &Array2::<f64>::eye(3))), 0.0, epsilon = 1e-12);
}

#[test]
fn test_orthogonalisation_symmetric_orthonormalises() {
    let s = array![[1.0, 0.4, 0.1], [0.4, 1.0, 0.2], [0.1, 0.2, 1.0]];
    let c = orthogonalising_transform(&s, OrthogonalisationKind::Symmetric, 1e-8).unwrap();
    let residual = c.t().dot(&s).dot(&c) - Array2::<f64>::eye(3);
    assert_abs_diff_eq!(max_abs(&residual), 0.0, epsilon = 1e-10);
    // Symmetric orthogonalisation gives a symmetric transform.
    assert_abs_diff_eq!(max_abs(&(&c - &c.t().to_owned())), 0.0, epsilon = 1e-10);
}

#[test]
fn test_orthogonalisation_canonical_orthonormalises() {
    let s = array![[1.0, 0.4, 0.1], [0.4, 1.0, 0.2], [0.1, 0.2, 1.0]];
    let c = orthogonalising_transform(&s, OrthogonalisationKind::Canonical, 1e-8).unwrap();
    let residual = c.t().dot(&s).dot(&c) - Array2::<f64>::eye(3);
    assert_abs_diff_eq!(max_abs(&residual), 0.0, epsilon = 1e-10);
}

#[test]
fn test_orthogonalisation_rejects_ill_conditioned_overlap() {
    // Rank-deficient: second basis function duplicates the first.
    let s = array![[1.0, 1.0], [1.0, 1.0]];
    let res = orthogonalising_transform(&s, OrthogonalisationKind::Symmetric, 1e-8);
    assert!(matches!(
        res,
        Err(ActiveSpaceError::IllConditionedOverlap(_))
    ));
}

#[test]
fn test_orthogonalisation_rejects_non_square_overlap() {
    let s = Array2::<f64>::zeros((2, 3));
    let res = orthogonalising_transform(&s, OrthogonalisationKind::Symmetric, 1e-8);
    assert!(matches!(res, Err(ActiveSpaceError::DimensionMismatch(_))));
}
