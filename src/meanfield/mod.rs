//! Mean-field reference data.
//!
//! The DMET partitioner consumes the converged quantities of an upstream
//! (restricted open-shell) mean-field calculation: the atomic-orbital
//! overlap matrix, the spin-resolved one-particle density matrices, and the
//! molecular-orbital coefficients and energies from which the Fock operator
//! is reconstructed. These are bundled into a single immutable value object
//! validated at construction.

use derive_builder::Builder;
use ndarray::{Array1, Array2};


/// A structure containing the converged mean-field data from which an
/// active-space guess is constructed.
///
/// All matrices are expressed in the same atomic-orbital basis with a
/// consistent ordering.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct MeanFieldReference {
    /// The atomic-orbital overlap matrix $`\mathbf{S}`$.
    sao: Array2<f64>,

    /// The $`\alpha`$-spin one-particle density matrix.
    density_alpha: Array2<f64>,

    /// The $`\beta`$-spin one-particle density matrix.
    density_beta: Array2<f64>,

    /// The molecular-orbital coefficient matrix $`\mathbf{C}`$ of the
    /// mean-field solution.
    mo_coefficients: Array2<f64>,

    /// The molecular-orbital energies $`\boldsymbol{\epsilon}`$ of the
    /// mean-field solution.
    mo_energies: Array1<f64>,

    /// The threshold for numerical comparisons on the supplied matrices.
    #[builder(default = "1e-7")]
    threshold: f64,
}

impl MeanFieldReferenceBuilder {
    fn validate(&self) -> Result<(), String> {
        let sao = self.sao.as_ref().ok_or("No overlap matrix found.".to_string())?;
        let nao = sao.nrows();
        if sao.ncols() != nao {
            return Err(format!(
                "The overlap matrix has shape {:?}, which is not square.",
                sao.shape()
            ));
        }

        let threshold = self.threshold.unwrap_or(1e-7);
        let asymmetry = (sao - &sao.t())
            .iter()
            .fold(0.0f64, |acc, x| acc.max(x.abs()));
        if asymmetry > threshold {
            return Err(format!(
                "The overlap matrix deviates from symmetry by {asymmetry:.3e}, which exceeds the \
                threshold {threshold:.3e}.",
            ));
        }

        for (name, dm) in [
            ("alpha density", self.density_alpha.as_ref()),
            ("beta density", self.density_beta.as_ref()),
            ("coefficient", self.mo_coefficients.as_ref()),
        ] {
            let mat = dm.ok_or(format!("No {name} matrix found."))?;
            if mat.shape() != [nao, nao] {
                return Err(format!(
                    "The {name} matrix has shape {:?}, which does not match the dimension {nao} \
                    of the overlap matrix.",
                    mat.shape()
                ));
            }
        }

        let mo_energies = self
            .mo_energies
            .as_ref()
            .ok_or("No molecular-orbital energies found.".to_string())?;
        if mo_energies.len() != nao {
            return Err(format!(
                "{} molecular-orbital energies found, but {nao} expected.",
                mo_energies.len()
            ));
        }

        Ok(())
    }
}

impl MeanFieldReference {
    /// Returns a builder to construct a [`MeanFieldReference`] structure.
    pub fn builder() -> MeanFieldReferenceBuilder {
        MeanFieldReferenceBuilder::default()
    }

    /// Returns the number of atomic-orbital basis functions.
    pub fn nao(&self) -> usize {
        self.sao.nrows()
    }

    /// Returns the atomic-orbital overlap matrix.
    pub fn sao(&self) -> &Array2<f64> {
        &self.sao
    }

    /// Returns the $`\alpha`$-spin one-particle density matrix.
    pub fn density_alpha(&self) -> &Array2<f64> {
        &self.density_alpha
    }

    /// Returns the $`\beta`$-spin one-particle density matrix.
    pub fn density_beta(&self) -> &Array2<f64> {
        &self.density_beta
    }

    /// Returns the threshold for numerical comparisons.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the spin-traced one-particle density matrix
    /// $`\mathbf{D} = \mathbf{D}^{\alpha} + \mathbf{D}^{\beta}`$.
    pub fn spin_traced_density(&self) -> Array2<f64> {
        &self.density_alpha + &self.density_beta
    }

    /// Reconstructs the mean-field Fock matrix in the atomic-orbital basis,
    /// ```math
    ///     \mathbf{F} = \mathbf{S} \mathbf{C}
    ///     \mathrm{diag}(\boldsymbol{\epsilon}) \mathbf{C}^{\mathsf{T}}
    ///     \mathbf{S},
    /// ```
    /// from the molecular-orbital coefficients and energies.
    pub fn fock_matrix(&self) -> Array2<f64> {
        let ce = self.mo_coefficients.dot(&Array2::from_diag(&self.mo_energies));
        self.sao
            .dot(&ce)
            .dot(&self.mo_coefficients.t())
            .dot(&self.sao)
    }
}
