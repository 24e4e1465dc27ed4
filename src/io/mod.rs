//! Input/output for `dmetcas` files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;
pub(crate) mod numeric;

/// An enumerated type for `dmetcas` file types.
pub enum DmetCasFileType {
    /// Variant for binary files containing active-space construction results.
    Orb,
}

impl DmetCasFileType {
    /// Returns the extension of the file type.
    pub fn ext(&self) -> String {
        match self {
            DmetCasFileType::Orb => "dmetcas.orb".to_string(),
        }
    }
}

/// Reads a `dmetcas` binary file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (without `dmetcas`-specific extensions).
/// * `file_type` - The type of the `dmetcas` file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_dmetcas_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: DmetCasFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    let mut reader = BufReader::new(File::open(path).map_err(|err| format_err!(err))?);
    bincode::deserialize_from(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `dmetcas` binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written (without `dmetcas`-specific extensions).
/// * `file_type` - The type of the `dmetcas` file to be written.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_dmetcas_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: DmetCasFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|err| format_err!(err))
}

/// Reads a `dmetcas` configuration YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_dmetcas_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}
