//! Orthogonalising transforms of the atomic-orbital basis.
//!
//! The DMET partitioner interprets density-matrix eigenvalues as occupation
//! numbers, which requires the density matrix to be expressed in a basis
//! where the overlap is the identity. This module constructs such a
//! transform $`\mathbf{C}_{\perp}`$ from the overlap matrix alone,
//! satisfying $`\mathbf{C}_{\perp}^{\mathsf{T}} \mathbf{S}
//! \mathbf{C}_{\perp} = \mathbf{I}`$.

use std::fmt;

use ndarray::{Array2, Axis};
use ndarray_linalg::{Eigh, UPLO};
use serde::{Deserialize, Serialize};

use crate::embedding::ActiveSpaceError;

#[cfg(test)]
#[path = "orthogonalisation_tests.rs"]
mod orthogonalisation_tests;

/// An enumerated type specifying the orthogonalisation method.
///
/// The partitioner's logic is independent of the method; only the transform
/// it receives differs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrthogonalisationKind {
    /// Symmetric (Löwdin) orthogonalisation,
    /// $`\mathbf{C}_{\perp} = \mathbf{S}^{-1/2}`$, which stays closest to
    /// the original atomic orbitals and keeps their chemical labelling
    /// meaningful.
    #[default]
    Symmetric,

    /// Canonical orthogonalisation,
    /// $`\mathbf{C}_{\perp} = \mathbf{U} \boldsymbol{\sigma}^{-1/2}`$ where
    /// $`\mathbf{S} = \mathbf{U} \boldsymbol{\sigma}
    /// \mathbf{U}^{\mathsf{T}}`$.
    Canonical,
}

impl fmt::Display for OrthogonalisationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrthogonalisationKind::Symmetric => write!(f, "symmetric (Löwdin)"),
            OrthogonalisationKind::Canonical => write!(f, "canonical"),
        }
    }
}

/// Constructs an orthogonalising transform of the atomic-orbital basis from
/// the overlap matrix.
///
/// # Arguments
///
/// * `sao` - The atomic-orbital overlap matrix $`\mathbf{S}`$.
/// * `kind` - The orthogonalisation method.
/// * `thresh` - The linear-independence threshold: an overlap eigenvalue at
///   or below this value renders the orthogonalisation unstable.
///
/// # Returns
///
/// The transform $`\mathbf{C}_{\perp}`$, or an [`ActiveSpaceError`] if the
/// overlap matrix is not square, not numerically positive-definite, or its
/// eigensolve fails.
pub fn orthogonalising_transform(
    sao: &Array2<f64>,
    kind: OrthogonalisationKind,
    thresh: f64,
) -> Result<Array2<f64>, ActiveSpaceError> {
    let nao = sao.nrows();
    if sao.ncols() != nao {
        return Err(ActiveSpaceError::DimensionMismatch(format!(
            "the overlap matrix has shape {:?}, which is not square",
            sao.shape()
        )));
    }

    let (s_eig, umat) = sao.eigh(UPLO::Lower).map_err(|err| {
        ActiveSpaceError::NonConvergentEigensolve(format!(
            "eigendecomposition of the overlap matrix failed: {err}"
        ))
    })?;

    // Ascending eigenvalues from `eigh`, so the first is the smallest.
    let s_min = s_eig[0];
    if s_min <= thresh {
        return Err(ActiveSpaceError::IllConditionedOverlap(format!(
            "the smallest overlap eigenvalue {s_min:.3e} does not exceed the \
            linear-independence threshold {thresh:.3e}"
        )));
    }

    let s_invsqrt = Array2::from_diag(&s_eig.mapv(|x| 1.0 / x.sqrt()));
    let transform = match kind {
        OrthogonalisationKind::Symmetric => umat.dot(&s_invsqrt).dot(&umat.t()),
        OrthogonalisationKind::Canonical => umat.dot(&s_invsqrt),
    };
    debug_assert_eq!(transform.len_of(Axis(0)), nao);
    Ok(transform)
}
