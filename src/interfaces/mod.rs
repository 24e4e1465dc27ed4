//! Interfaces between `dmetcas` and the outside world.

pub mod binaries;
pub mod cli;
pub mod input;
