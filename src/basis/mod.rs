//! Atomic-orbital basis labels.
//!
//! The impurity orbitals of a DMET partition are chemically motivated and
//! are most conveniently picked out by their atomic-orbital labels (*e.g.*
//! `Fe 3d` and `N 2pz` for a metal--ligand active space) rather than by raw
//! indices. This module carries the ordered label list of the atomic-orbital
//! basis and the substring selection over it.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "basis_tests.rs"]
mod basis_tests;

/// A structure containing the ordered labels of the atomic-orbital basis
/// functions, consistent with the row ordering of every matrix supplied by
/// the mean-field solver.
///
/// A label typically encodes the atom, the shell, and the angular component,
/// *e.g.* `0 Fe 3dxy` or `2 N 2pz`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasisLabels {
    labels: Vec<String>,
}

impl BasisLabels {
    /// Constructs a new [`BasisLabels`] from an ordered list of labels.
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(|l| l.into()).collect(),
        }
    }

    /// Returns the number of basis functions.
    pub fn n_funcs(&self) -> usize {
        self.labels.len()
    }

    /// Returns the ordered labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the ordered set of indices of the basis functions whose label
    /// contains at least one of the specified patterns as a substring.
    ///
    /// The returned set preserves the basis ordering, which the DMET
    /// partitioner relies on.
    ///
    /// # Arguments
    ///
    /// * `patterns` - The substring patterns selecting impurity orbitals.
    pub fn select<S: AsRef<str>>(&self, patterns: &[S]) -> IndexSet<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| patterns.iter().any(|p| label.contains(p.as_ref())))
            .map(|(i, _)| i)
            .collect()
    }
}
