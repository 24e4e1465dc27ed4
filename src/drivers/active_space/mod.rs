//! Driver for DMET active-space construction in `dmetcas`.
//!
//! The driver glues the pieces of a construction run together: it resolves
//! the impurity selection against the atomic-orbital basis, builds the
//! orthogonalising transform, reconstructs the mean-field Fock matrix,
//! invokes the partitioner, verifies the orthonormality of the assembled
//! orbitals, and reports the per-block occupations and canonical energies.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, format_err, Context};
use derive_builder::Builder;
use indexmap::IndexSet;
use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::basis::BasisLabels;
use crate::drivers::DmetCasDriver;
use crate::embedding::{build_active_space, ActiveSpacePartition};
use crate::io::format::{
    dmetcas_output, dmetcas_warn, log_subtitle, log_title, nice_bool, DmetCasOutput,
};
use crate::io::{write_dmetcas_binary, DmetCasFileType};
use crate::meanfield::MeanFieldReference;
use crate::orthogonalisation::{orthogonalising_transform, OrthogonalisationKind};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_linear_independence_threshold() -> f64 {
    1e-8
}

/// An enumerated type specifying how the impurity atomic orbitals are
/// selected.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImpuritySelection {
    /// Variant for an explicit ordered list of distinct atomic-orbital
    /// indices.
    Indices(Vec<usize>),

    /// Variant for substring patterns matched against the atomic-orbital
    /// labels, *e.g.* `["Fe 3d", "Fe 4d", "Fe 4s", "N 2pz"]`. Requires the
    /// basis labels to be available to the driver.
    Labels(Vec<String>),
}

impl ImpuritySelection {
    /// Resolves the selection into an ordered set of distinct impurity
    /// indices.
    ///
    /// # Arguments
    ///
    /// * `labels` - The atomic-orbital labels, required for pattern-based
    ///   selection.
    /// * `nao` - The number of atomic-orbital basis functions.
    fn resolve(
        &self,
        labels: Option<&BasisLabels>,
        nao: usize,
    ) -> Result<IndexSet<usize>, anyhow::Error> {
        match self {
            ImpuritySelection::Indices(indices) => {
                let set: IndexSet<usize> = indices.iter().copied().collect();
                if set.len() != indices.len() {
                    return Err(format_err!(
                        "The explicit impurity index list contains duplicates."
                    ));
                }
                Ok(set)
            }
            ImpuritySelection::Labels(patterns) => {
                let labels = labels.ok_or_else(|| {
                    format_err!(
                        "Pattern-based impurity selection requires atomic-orbital basis labels."
                    )
                })?;
                if labels.n_funcs() != nao {
                    return Err(format_err!(
                        "{} basis labels found, but {nao} basis functions expected.",
                        labels.n_funcs()
                    ));
                }
                let set = labels.select(patterns);
                if set.is_empty() {
                    return Err(format_err!(
                        "No atomic orbital matches any of the impurity patterns {patterns:?}."
                    ));
                }
                Ok(set)
            }
        }
    }
}

/// Structure containing control parameters for DMET active-space
/// construction.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct ActiveSpaceParams {
    /// The number of doubly occupied core orbitals.
    pub ncore: usize,

    /// The number of active orbitals.
    pub ncas: usize,

    /// The impurity selection.
    pub impurity: ImpuritySelection,

    /// The orthogonalisation method for the atomic-orbital basis.
    #[builder(default)]
    #[serde(default)]
    pub orthogonalisation: OrthogonalisationKind,

    /// The threshold below which an overlap eigenvalue renders the basis
    /// linearly dependent.
    #[builder(default = "1e-8")]
    #[serde(default = "default_linear_independence_threshold")]
    pub linear_independence_threshold: f64,

    /// Optional spatial-symmetry label of the target active-space
    /// wavefunction, passed through opaquely to the downstream solver.
    #[builder(default = "None")]
    #[serde(default)]
    pub wavefunction_symmetry: Option<String>,

    /// The output verbosity level.
    #[builder(default = "0")]
    #[serde(default)]
    pub verbose: u8,

    /// Optional name for saving the construction result as a binary file of
    /// type [`DmetCasFileType::Orb`]. If `None`, the result will not be
    /// saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,
}

impl ActiveSpaceParams {
    /// Returns a builder to construct an [`ActiveSpaceParams`] structure.
    pub fn builder() -> ActiveSpaceParamsBuilder {
        ActiveSpaceParamsBuilder::default()
    }
}

impl fmt::Display for ActiveSpaceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Core orbitals: {}", self.ncore)?;
        writeln!(f, "Active orbitals: {}", self.ncas)?;
        match &self.impurity {
            ImpuritySelection::Indices(indices) => {
                writeln!(f, "Impurity selection: explicit indices {indices:?}")?;
            }
            ImpuritySelection::Labels(patterns) => {
                writeln!(f, "Impurity selection: label patterns {patterns:?}")?;
            }
        }
        writeln!(f, "Orthogonalisation: {}", self.orthogonalisation)?;
        writeln!(
            f,
            "Linear independence threshold: {:.3e}",
            self.linear_independence_threshold
        )?;
        writeln!(
            f,
            "Wavefunction symmetry: {}",
            self.wavefunction_symmetry.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "Output level: {}", self.verbose)?;
        writeln!(
            f,
            "Save result to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                let mut path = name.clone();
                path.set_extension(DmetCasFileType::Orb.ext());
                path.display().to_string()
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;

        Ok(())
    }
}

// ------
// Result
// ------

/// Structure to contain DMET active-space construction results.
#[derive(Clone, Builder, Debug)]
pub struct ActiveSpaceResult<'a> {
    /// The control parameters used to obtain this result.
    parameters: &'a ActiveSpaceParams,

    /// The resolved impurity indices, in basis order.
    impurity_indices: IndexSet<usize>,

    /// The constructed partition.
    pub partition: ActiveSpacePartition,

    /// The pass-through spatial-symmetry label for the downstream solver.
    pub wavefunction_symmetry: Option<String>,
}

impl<'a> ActiveSpaceResult<'a> {
    fn builder() -> ActiveSpaceResultBuilder<'a> {
        ActiveSpaceResultBuilder::default()
    }

    /// Returns the control parameters used to obtain this result.
    pub fn parameters(&self) -> &ActiveSpaceParams {
        self.parameters
    }

    /// Returns the resolved impurity indices, in basis order.
    pub fn impurity_indices(&self) -> &IndexSet<usize> {
        &self.impurity_indices
    }
}

// ------
// Driver
// ------

/// Driver for DMET active-space construction.
#[derive(Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ActiveSpaceDriver<'a> {
    /// The control parameters for the construction.
    parameters: &'a ActiveSpaceParams,

    /// The mean-field data from which the active space is constructed.
    mean_field: &'a MeanFieldReference,

    /// The atomic-orbital basis labels, required for pattern-based impurity
    /// selection.
    #[builder(default = "None")]
    basis_labels: Option<&'a BasisLabels>,

    /// The result of the construction.
    #[builder(setter(skip), default = "None")]
    result: Option<ActiveSpaceResult<'a>>,
}

impl<'a> ActiveSpaceDriverBuilder<'a> {
    fn validate(&self) -> Result<(), String> {
        let params = self
            .parameters
            .ok_or("No active-space construction parameters found.".to_string())?;
        let mean_field = self
            .mean_field
            .ok_or("No mean-field reference found.".to_string())?;
        let nao = mean_field.nao();
        if params.ncore + params.ncas > nao {
            return Err(format!(
                "ncore + ncas = {} exceeds the basis dimension {nao}.",
                params.ncore + params.ncas
            ));
        }
        if let ImpuritySelection::Labels(_) = params.impurity {
            if matches!(self.basis_labels, None | Some(None)) {
                return Err(
                    "Pattern-based impurity selection requires atomic-orbital basis labels."
                        .to_string(),
                );
            }
        }
        if let Some(Some(labels)) = self.basis_labels {
            if labels.n_funcs() != nao {
                return Err(format!(
                    "{} basis labels found, but {nao} basis functions expected.",
                    labels.n_funcs()
                ));
            }
        }
        Ok(())
    }
}

impl<'a> ActiveSpaceDriver<'a> {
    /// Returns a builder to construct an [`ActiveSpaceDriver`] structure.
    pub fn builder() -> ActiveSpaceDriverBuilder<'a> {
        ActiveSpaceDriverBuilder::default()
    }

    /// Executes the DMET active-space construction.
    fn construct_active_space(&mut self) -> Result<(), anyhow::Error> {
        log_title("DMET Active-Space Construction");
        dmetcas_output!("");
        let params = self.parameters;
        params.log_output_display();

        let mean_field = self.mean_field;
        let nao = mean_field.nao();

        let impurity_indices = params.impurity.resolve(self.basis_labels, nao)?;
        let nimp = impurity_indices.len();
        dmetcas_output!(
            "Impurity space: {nimp} atomic orbital{} of {nao}",
            if nimp == 1 { "" } else { "s" }
        );
        if params.verbose >= 1 {
            if let Some(labels) = self.basis_labels {
                for &i in impurity_indices.iter() {
                    dmetcas_output!("  [{i:>4}] {}", labels.labels()[i]);
                }
            } else {
                dmetcas_output!("  {}", impurity_indices.iter().join(", "));
            }
        }
        dmetcas_output!("");

        let orth_transform = orthogonalising_transform(
            mean_field.sao(),
            params.orthogonalisation,
            params.linear_independence_threshold,
        )?;
        let fock = mean_field.fock_matrix();

        let partition = build_active_space(
            mean_field.sao(),
            mean_field.density_alpha(),
            mean_field.density_beta(),
            &impurity_indices,
            &orth_transform,
            &fock,
            params.ncore,
            params.ncas,
        )?;

        // The assembled orbitals must resolve the identity with respect to
        // the overlap metric.
        let m = partition.orbitals();
        let residual = m.t().dot(mean_field.sao()).dot(m) - Array2::<f64>::eye(nao);
        let max_residual = residual.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        if max_residual > mean_field.threshold() {
            dmetcas_warn!(
                "The assembled orbitals deviate from orthonormality by {max_residual:.3e}."
            );
        }

        log_subtitle("Partition");
        dmetcas_output!("");
        dmetcas_output!(
            "  core: {}  active: {} (impurity: {}, bath: {})  external: {}",
            partition.ncore(),
            partition.ncas(),
            partition.nimp(),
            partition.nbath(),
            partition.n_external(),
        );
        dmetcas_output!("  orthonormality residual: {max_residual:.3e}");
        dmetcas_output!("");

        if params.verbose >= 1 {
            dmetcas_output!("{:>8} {:>12} {:>16}", "Block", "Occupation", "Energy / E_h");
            dmetcas_output!("{}", "┈".repeat(40));
            for (occ, e) in partition
                .core_occupations()
                .iter()
                .zip(partition.core_energies().iter())
            {
                dmetcas_output!("{:>8} {occ:>12.6} {e:>16.8}", "core");
            }
            for (occ, e) in partition
                .active_occupations()
                .iter()
                .zip(partition.active_energies().iter())
            {
                dmetcas_output!("{:>8} {occ:>12.6} {e:>16.8}", "active");
            }
            for (occ, e) in partition
                .external_occupations()
                .iter()
                .zip(partition.external_energies().iter())
            {
                dmetcas_output!("{:>8} {occ:>12.6} {e:>16.8}", "external");
            }
            dmetcas_output!("");
        }

        if let Some(name) = params.result_save_name.as_ref() {
            write_dmetcas_binary(name, DmetCasFileType::Orb, &partition)
                .with_context(|| "Unable to save the active-space construction result")?;
            dmetcas_output!(
                "Result saved as {}.",
                name.display().to_string() + "." + &DmetCasFileType::Orb.ext()
            );
            dmetcas_output!("");
        }

        self.result = Some(
            ActiveSpaceResult::builder()
                .parameters(params)
                .impurity_indices(impurity_indices)
                .partition(partition)
                .wavefunction_symmetry(params.wavefunction_symmetry.clone())
                .build()
                .map_err(|err| format_err!(err))?,
        );
        Ok(())
    }
}

impl<'a> DmetCasDriver for ActiveSpaceDriver<'a> {
    type Params = ActiveSpaceParams;

    type Outcome = ActiveSpaceResult<'a>;

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.construct_active_space()
    }

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No active-space construction result found."))
    }
}
