//! # `dmetcas`: DMET-based active-space construction
//!
//! `dmetcas` builds initial-guess orbitals for multi-configurational
//! (CASSCF/DMRG) calculations by partitioning a mean-field one-particle
//! density matrix in the spirit of density-matrix embedding theory (DMET):
//! a chemically motivated set of *impurity* atomic orbitals is kept exactly,
//! the most entangled *bath* orbitals are appended to it to form the active
//! space, and the remaining orbitals are assigned to the doubly occupied
//! core and the empty external spaces. Each block is canonicalised against
//! the mean-field Fock operator so that the returned orbitals carry a
//! deterministic, energy-ordered structure that preserves any spatial
//! symmetry labelling used downstream.
//!
//! The crate exposes:
//! - [`embedding`]: the pure partitioning routine and its typed failures,
//! - [`orthogonalisation`]: symmetric/canonical orthogonalising transforms
//!   of the atomic-orbital basis,
//! - [`meanfield`]: the value object carrying the upstream mean-field data,
//! - [`drivers`]: the driver layer orchestrating a full construction run,
//! - [`interfaces`]: the YAML/CLI/binary-file front ends of the `dmetcas`
//!   binary.
//!
//! The mean-field solver producing the input density matrix and the
//! correlated solver consuming the output orbitals are external
//! collaborators; neither is reimplemented here.

pub mod basis;
pub mod drivers;
pub mod embedding;
pub mod interfaces;
pub mod io;
pub mod meanfield;
pub mod orthogonalisation;
