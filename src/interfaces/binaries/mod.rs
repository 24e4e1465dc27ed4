//! `dmetcas` interface with binary data files.
//!
//! The upstream mean-field solver exports its converged matrices as plain
//! binary files of floating-point values; this interface reads them back
//! into a validated [`MeanFieldReference`].

use std::path::PathBuf;

use anyhow::{self, Context};
use byteorder::{BigEndian, LittleEndian};
use derive_builder::Builder;
use ndarray::{Array1, Array2, ShapeBuilder};
use serde::{Deserialize, Serialize};

use crate::basis::BasisLabels;
use crate::io::numeric::NumericReader;
use crate::meanfield::MeanFieldReference;


/// Enumerated type indicating the order matrix elements are packed in binary
/// files.
#[derive(Clone, Serialize, Deserialize, Default)]
pub enum MatrixOrder {
    #[default]
    RowMajor,
    ColMajor,
}

/// Enumerated type indicating the byte order of numerical values in binary
/// files.
#[derive(Clone, Serialize, Deserialize, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Serialisable/deserialisable structure containing the paths to the binary
/// files making up a mean-field reference.
#[derive(Clone, Builder, Serialize, Deserialize)]
pub struct BinariesMeanFieldSource {
    /// The number of atomic-orbital basis functions.
    pub nao: usize,

    /// Path to a binary file containing the atomic-orbital overlap matrix.
    pub sao: PathBuf,

    /// Path to a binary file containing the $`\alpha`$-spin one-particle
    /// density matrix.
    pub density_alpha: PathBuf,

    /// Path to a binary file containing the $`\beta`$-spin one-particle
    /// density matrix.
    pub density_beta: PathBuf,

    /// Path to a binary file containing the molecular-orbital coefficient
    /// matrix.
    pub coefficients: PathBuf,

    /// Path to a binary file containing the molecular-orbital energies.
    pub mo_energies: PathBuf,

    /// Optional ordered atomic-orbital labels, required for pattern-based
    /// impurity selection.
    #[builder(default = "None")]
    #[serde(default)]
    pub basis_labels: Option<Vec<String>>,

    /// Specification of the order matrix elements are packed in binary
    /// files.
    #[builder(default)]
    #[serde(default)]
    pub matrix_order: MatrixOrder,

    /// Specification of the byte order numerical values are stored in binary
    /// files.
    #[builder(default)]
    #[serde(default)]
    pub byte_order: ByteOrder,
}

impl BinariesMeanFieldSource {
    /// Returns a builder to construct a [`BinariesMeanFieldSource`]
    /// structure.
    pub fn builder() -> BinariesMeanFieldSourceBuilder {
        BinariesMeanFieldSourceBuilder::default()
    }

    fn read_values(&self, path: &PathBuf, name: &str) -> Result<Vec<f64>, anyhow::Error> {
        let values = match self.byte_order {
            ByteOrder::LittleEndian => NumericReader::<_, LittleEndian, f64>::from_file(path)
                .map(|r| r.collect::<Vec<_>>()),
            ByteOrder::BigEndian => NumericReader::<_, BigEndian, f64>::from_file(path)
                .map(|r| r.collect::<Vec<_>>()),
        };
        values.with_context(|| format!("Unable to read the specified {name} binary file"))
    }

    fn read_square_matrix(
        &self,
        path: &PathBuf,
        name: &str,
    ) -> Result<Array2<f64>, anyhow::Error> {
        let v = self.read_values(path, name)?;
        let mat = match self.matrix_order {
            MatrixOrder::RowMajor => Array2::from_shape_vec((self.nao, self.nao), v),
            MatrixOrder::ColMajor => Array2::from_shape_vec((self.nao, self.nao).f(), v),
        };
        mat.with_context(|| {
            format!(
                "Unable to construct the {name} matrix of dimension {} from the read-in binary \
                file",
                self.nao
            )
        })
    }

    /// Reads the binary files and assembles a validated mean-field
    /// reference, together with the basis labels if specified.
    pub fn load(&self) -> Result<(MeanFieldReference, Option<BasisLabels>), anyhow::Error> {
        let sao = self.read_square_matrix(&self.sao, "AO overlap")?;
        let density_alpha = self.read_square_matrix(&self.density_alpha, "alpha density")?;
        let density_beta = self.read_square_matrix(&self.density_beta, "beta density")?;
        let coefficients = self.read_square_matrix(&self.coefficients, "coefficient")?;
        let mo_energies = Array1::from_vec(
            self.read_values(&self.mo_energies, "molecular-orbital energy")?,
        );

        let mean_field = MeanFieldReference::builder()
            .sao(sao)
            .density_alpha(density_alpha)
            .density_beta(density_beta)
            .mo_coefficients(coefficients)
            .mo_energies(mo_energies)
            .build()
            .with_context(|| "Unable to assemble a mean-field reference from the binary files")?;

        let labels = self
            .basis_labels
            .as_ref()
            .map(|labels| BasisLabels::new(labels.iter().cloned()));
        Ok((mean_field, labels))
    }
}
