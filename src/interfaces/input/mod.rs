//! YAML configuration interface of the `dmetcas` binary.

use anyhow::{self, format_err, Context};
use serde::{Deserialize, Serialize};

use crate::drivers::active_space::{ActiveSpaceDriver, ActiveSpaceParams};
use crate::drivers::DmetCasDriver;
use crate::embedding::ActiveSpacePartition;
use crate::interfaces::binaries::BinariesMeanFieldSource;

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// An enumerated type representing possible sources of the mean-field data
/// in a YAML input file.
#[derive(Clone, Serialize, Deserialize)]
pub enum MeanFieldSource {
    /// Variant indicating that the mean-field matrices will be read from
    /// binary files.
    Binaries(BinariesMeanFieldSource),
}

/// A structure containing `dmetcas` input parameters which can be serialised
/// into and deserialised from a YAML input file.
#[derive(Clone, Serialize, Deserialize)]
pub struct Input {
    /// Specification of the mean-field data source.
    pub mean_field: MeanFieldSource,

    /// Parameters for the DMET active-space construction.
    pub active_space: ActiveSpaceParams,
}

impl Input {
    /// Handles the input: loads the mean-field data, runs the active-space
    /// construction driver, and returns the constructed partition.
    pub fn handle(&self) -> Result<ActiveSpacePartition, anyhow::Error> {
        match &self.mean_field {
            MeanFieldSource::Binaries(source) => {
                let (mean_field, labels) = source
                    .load()
                    .with_context(|| "Unable to load the binaries mean-field source")?;
                let mut driver = ActiveSpaceDriver::builder()
                    .parameters(&self.active_space)
                    .mean_field(&mean_field)
                    .basis_labels(labels.as_ref())
                    .build()
                    .map_err(|err| format_err!(err))?;
                driver.run().with_context(|| {
                    "Unable to run the active-space construction driver successfully"
                })?;
                Ok(driver.result()?.partition.clone())
            }
        }
    }
}
