//! DMET partitioning of a mean-field density matrix into core, active, and
//! external orbital subspaces.
//!
//! Given a spin-traced one-particle density matrix expressed in an
//! orthogonalised atomic-orbital basis, the impurity--bath decomposition of
//! density-matrix embedding theory splits the orbital space into:
//! - the *impurity* orbitals, spanned exactly by the selected atomic
//!   orbitals,
//! - the *bath* orbitals, natural orbitals of the complement block ordered
//!   by decreasing occupation, of which the most strongly occupied become
//!   the doubly occupied core and the next most entangled join the impurity
//!   orbitals in the active space,
//! - the *external* orbitals, the remaining weakly occupied complement.
//!
//! Each block is finally canonicalised against the mean-field Fock operator
//! restricted to it, which fixes the intra-block orbital ordering (ascending
//! orbital energy) and preserves spatial-symmetry labelling.

use std::fmt;

use indexmap::IndexSet;
use itertools::Itertools;
use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};
use ndarray_linalg::{Determinant, Eigh, UPLO};
use serde::{Deserialize, Serialize};


// ======================
// Error type definitions
// ======================

/// An enumerated type describing the ways in which the construction of a
/// DMET active-space partition can fail.
///
/// None of these failures is recoverable within the partitioner: the caller
/// must supply corrected inputs (different active-space sizes, a different
/// impurity selection, or a better-conditioned basis) and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveSpaceError {
    /// Variant for any matrix or index-set shape inconsistency.
    DimensionMismatch(String),

    /// Variant for partition sizes that cannot tile the orbital space, such
    /// as an active space smaller than the impurity set.
    InvalidPartition(String),

    /// Variant for a symmetric eigensolve that fails to converge on a
    /// sub-block.
    NonConvergentEigensolve(String),

    /// Variant for an overlap matrix that is not numerically
    /// positive-definite.
    IllConditionedOverlap(String),
}

impl fmt::Display for ActiveSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveSpaceError::DimensionMismatch(msg) => {
                write!(f, "Dimension mismatch: {msg}")
            }
            ActiveSpaceError::InvalidPartition(msg) => {
                write!(f, "Invalid partition: {msg}")
            }
            ActiveSpaceError::NonConvergentEigensolve(msg) => {
                write!(f, "Non-convergent eigensolve: {msg}")
            }
            ActiveSpaceError::IllConditionedOverlap(msg) => {
                write!(f, "Ill-conditioned overlap: {msg}")
            }
        }
    }
}

impl std::error::Error for ActiveSpaceError {}

// ==================
// Struct definitions
// ==================

/// A structure containing the result of a DMET partitioning: the assembled
/// orbital coefficient matrix together with the per-block natural-orbital
/// occupations and canonical orbital energies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveSpacePartition {
    /// The assembled coefficient matrix, columns ordered as
    /// core ⧺ active ⧺ external.
    orbitals: Array2<f64>,

    /// The number of doubly occupied core orbitals.
    ncore: usize,

    /// The number of active orbitals (impurity ⧺ truncated bath).
    ncas: usize,

    /// The number of impurity orbitals leading the active block.
    nimp: usize,

    /// Natural-orbital occupations of the core block before
    /// canonicalisation, in the eigenvalue ordering used for slicing.
    core_occupations: Array1<f64>,

    /// Natural-orbital occupations of the active block before
    /// canonicalisation: impurity occupations followed by bath occupations.
    active_occupations: Array1<f64>,

    /// Natural-orbital occupations of the external block before
    /// canonicalisation.
    external_occupations: Array1<f64>,

    /// Canonical orbital energies of the core block (ascending).
    core_energies: Array1<f64>,

    /// Canonical orbital energies of the active block (ascending).
    active_energies: Array1<f64>,

    /// Canonical orbital energies of the external block (ascending).
    external_energies: Array1<f64>,
}

impl ActiveSpacePartition {
    /// Returns the assembled coefficient matrix, columns ordered as
    /// core ⧺ active ⧺ external.
    pub fn orbitals(&self) -> &Array2<f64> {
        &self.orbitals
    }

    /// Returns the number of doubly occupied core orbitals.
    pub fn ncore(&self) -> usize {
        self.ncore
    }

    /// Returns the number of active orbitals.
    pub fn ncas(&self) -> usize {
        self.ncas
    }

    /// Returns the number of impurity orbitals leading the active block.
    pub fn nimp(&self) -> usize {
        self.nimp
    }

    /// Returns the number of bath orbitals trailing the active block.
    pub fn nbath(&self) -> usize {
        self.ncas - self.nimp
    }

    /// Returns the number of external orbitals.
    pub fn n_external(&self) -> usize {
        self.orbitals.ncols() - self.ncore - self.ncas
    }

    /// Returns a view of the core orbital coefficients.
    pub fn core(&self) -> ArrayView2<f64> {
        self.orbitals.slice(s![.., 0..self.ncore])
    }

    /// Returns a view of the active orbital coefficients.
    pub fn active(&self) -> ArrayView2<f64> {
        self.orbitals.slice(s![.., self.ncore..self.ncore + self.ncas])
    }

    /// Returns a view of the external orbital coefficients.
    pub fn external(&self) -> ArrayView2<f64> {
        self.orbitals.slice(s![.., self.ncore + self.ncas..])
    }

    /// Returns the pre-canonicalisation natural-orbital occupations of the
    /// core block.
    pub fn core_occupations(&self) -> &Array1<f64> {
        &self.core_occupations
    }

    /// Returns the pre-canonicalisation natural-orbital occupations of the
    /// active block, impurity orbitals first.
    pub fn active_occupations(&self) -> &Array1<f64> {
        &self.active_occupations
    }

    /// Returns the pre-canonicalisation natural-orbital occupations of the
    /// external block.
    pub fn external_occupations(&self) -> &Array1<f64> {
        &self.external_occupations
    }

    /// Returns the canonical orbital energies of the core block.
    pub fn core_energies(&self) -> &Array1<f64> {
        &self.core_energies
    }

    /// Returns the canonical orbital energies of the active block.
    pub fn active_energies(&self) -> &Array1<f64> {
        &self.active_energies
    }

    /// Returns the canonical orbital energies of the external block.
    pub fn external_energies(&self) -> &Array1<f64> {
        &self.external_energies
    }
}

// =========
// Functions
// =========

/// Eigendecomposes a symmetric block, tolerating the empty block that arises
/// when an impurity or external set is empty.
fn eigh_block(block: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>), ActiveSpaceError> {
    if block.nrows() == 0 {
        return Ok((Array1::zeros(0), Array2::zeros((0, 0))));
    }
    block.eigh(UPLO::Lower).map_err(|err| {
        ActiveSpaceError::NonConvergentEigensolve(format!(
            "eigendecomposition of a {}-dimensional symmetric block failed: {err}",
            block.nrows()
        ))
    })
}

/// Canonicalises a block of orbitals against the Fock operator restricted to
/// it, returning the rotated block and the ascending block orbital energies.
fn canonicalise_block(
    block: ArrayView2<f64>,
    fock: &Array2<f64>,
) -> Result<(Array2<f64>, Array1<f64>), ActiveSpaceError> {
    let fock_block = block.t().dot(fock).dot(&block);
    let (energies, u) = eigh_block(&fock_block)?;
    Ok((block.dot(&u), energies))
}

/// Constructs a DMET active-space partition of the orbital space.
///
/// The spin-traced density matrix is transformed into the orthogonal basis
/// defined by `orth_transform`, where its eigenstructure is directly
/// interpretable as occupation numbers. The impurity block and its
/// complement are then diagonalised separately; the negation of each block
/// before the eigensolve makes the most strongly occupied natural orbitals
/// sort first under the ascending eigenvalue order, a convention the block
/// slicing below relies on.
///
/// # Arguments
///
/// * `sao` - The atomic-orbital overlap matrix $`\mathbf{S}`$.
/// * `density_alpha` - The $`\alpha`$-spin one-particle density matrix.
/// * `density_beta` - The $`\beta`$-spin one-particle density matrix.
/// * `impurity_indices` - The ordered set of distinct atomic-orbital indices
///   spanning the impurity.
/// * `orth_transform` - An orthogonalising transform $`\mathbf{C}_{\perp}`$
///   satisfying $`\mathbf{C}_{\perp}^{\mathsf{T}} \mathbf{S}
///   \mathbf{C}_{\perp} = \mathbf{I}`$.
/// * `fock` - The mean-field Fock matrix in the atomic-orbital basis, used
///   to canonicalise each block.
/// * `ncore` - The number of doubly occupied core orbitals.
/// * `ncas` - The number of active orbitals.
///
/// # Returns
///
/// The assembled [`ActiveSpacePartition`], or an [`ActiveSpaceError`] if the
/// inputs fail the partition preconditions or an eigensolve does not
/// converge.
#[allow(clippy::too_many_arguments)]
pub fn build_active_space(
    sao: &Array2<f64>,
    density_alpha: &Array2<f64>,
    density_beta: &Array2<f64>,
    impurity_indices: &IndexSet<usize>,
    orth_transform: &Array2<f64>,
    fock: &Array2<f64>,
    ncore: usize,
    ncas: usize,
) -> Result<ActiveSpacePartition, ActiveSpaceError> {
    let nao = sao.nrows();
    if sao.ncols() != nao {
        return Err(ActiveSpaceError::DimensionMismatch(format!(
            "the overlap matrix has shape {:?}, which is not square",
            sao.shape()
        )));
    }
    for (name, mat) in [
        ("alpha density", density_alpha),
        ("beta density", density_beta),
        ("orthogonalising transform", orth_transform),
        ("Fock", fock),
    ] {
        if mat.shape() != [nao, nao] {
            return Err(ActiveSpaceError::DimensionMismatch(format!(
                "the {name} matrix has shape {:?}, but ({nao}, {nao}) expected",
                mat.shape()
            )));
        }
    }
    if let Some(out_of_range) = impurity_indices.iter().find(|&&i| i >= nao) {
        return Err(ActiveSpaceError::DimensionMismatch(format!(
            "impurity index {out_of_range} lies outside the orbital range [0, {nao})"
        )));
    }

    let nimp = impurity_indices.len();
    if nimp > ncas {
        return Err(ActiveSpaceError::InvalidPartition(format!(
            "{nimp} impurity orbitals cannot fit into an active space of {ncas} orbitals"
        )));
    }
    if ncore + ncas > nao {
        return Err(ActiveSpaceError::InvalidPartition(format!(
            "ncore + ncas = {} exceeds the orbital space dimension {nao}",
            ncore + ncas
        )));
    }
    let nbath = ncas - nimp;

    // Spin-traced density in the orthogonal basis.
    let dm = density_alpha + density_beta;
    let cinv = orth_transform.t().dot(sao);
    let dm_orth = cinv.dot(&dm).dot(&cinv.t());

    // Order-preserving split of the orbital range into impurity and
    // bath-candidate indices.
    let imp = impurity_indices.iter().copied().collect_vec();
    let bath_cand = (0..nao).filter(|i| !impurity_indices.contains(i)).collect_vec();

    // Negation sorts the most strongly occupied natural orbitals first under
    // the ascending eigenvalue order of the symmetric eigensolver.
    let dm_imp = dm_orth.select(Axis(0), &imp).select(Axis(1), &imp);
    let dm_bath = dm_orth.select(Axis(0), &bath_cand).select(Axis(1), &bath_cand);
    let (neg_occ_imp, u_imp) = eigh_block(&dm_imp.mapv(|x| -x))?;
    let (neg_occ_bath, u_bath) = eigh_block(&dm_bath.mapv(|x| -x))?;

    let imporb = orth_transform.select(Axis(1), &imp).dot(&u_imp);
    let bathorb = orth_transform.select(Axis(1), &bath_cand).dot(&u_bath);

    // Core takes the most strongly occupied bath-candidate orbitals; the
    // active space is the impurity plus the truncated bath; the external
    // space is whatever remains.
    let mocore = bathorb.slice(s![.., 0..ncore]);
    let mocas = concatenate![
        Axis(1),
        imporb.view(),
        bathorb.slice(s![.., ncore..ncore + nbath])
    ];
    let moext = bathorb.slice(s![.., ncore + nbath..]);

    let (core, core_energies) = canonicalise_block(mocore, fock)?;
    let (active, active_energies) = canonicalise_block(mocas.view(), fock)?;
    let (external, external_energies) = canonicalise_block(moext, fock)?;

    let orbitals = concatenate![Axis(1), core.view(), active.view(), external.view()];
    debug_assert_eq!(orbitals.ncols(), nao);

    let occ_imp = neg_occ_imp.mapv(|x| -x);
    let occ_bath = neg_occ_bath.mapv(|x| -x);
    let core_occupations = occ_bath.slice(s![0..ncore]).to_owned();
    let active_occupations = concatenate![
        Axis(0),
        occ_imp.view(),
        occ_bath.slice(s![ncore..ncore + nbath])
    ];
    let external_occupations = occ_bath.slice(s![ncore + nbath..]).to_owned();

    Ok(ActiveSpacePartition {
        orbitals,
        ncore,
        ncas,
        nimp,
        core_occupations,
        active_occupations,
        external_occupations,
        core_energies,
        active_energies,
        external_energies,
    })
}

/// Computes the overlap determinant between two active-space orbital sets,
/// ```math
///     \det\left(
///         \mathbf{C}_{a}^{\mathsf{T}} \mathbf{S} \mathbf{C}_{b}
///     \right),
/// ```
/// a measure of how well the two active spaces span the same subspace. Two
/// perfectly overlapping spaces give a determinant of unit magnitude.
pub fn active_space_overlap(
    cas_a: ArrayView2<f64>,
    cas_b: ArrayView2<f64>,
    sao: &Array2<f64>,
) -> Result<f64, ActiveSpaceError> {
    if cas_a.nrows() != sao.nrows() || cas_b.nrows() != sao.ncols() {
        return Err(ActiveSpaceError::DimensionMismatch(format!(
            "active-space coefficient matrices of shapes {:?} and {:?} cannot be contracted \
            with an overlap matrix of shape {:?}",
            cas_a.shape(),
            cas_b.shape(),
            sao.shape()
        )));
    }
    if cas_a.ncols() != cas_b.ncols() {
        return Err(ActiveSpaceError::DimensionMismatch(format!(
            "active spaces of {} and {} orbitals cannot be compared",
            cas_a.ncols(),
            cas_b.ncols()
        )));
    }
    let s_ab = cas_a.t().dot(sao).dot(&cas_b);
    s_ab.det().map_err(|err| {
        ActiveSpaceError::NonConvergentEigensolve(format!(
            "determinant of the active-space overlap failed: {err}"
        ))
    })
}
