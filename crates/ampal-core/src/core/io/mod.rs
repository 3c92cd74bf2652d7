//! Provides input/output functionality for structure file formats.
//!
//! The [`pdb`] module reads and writes the classic fixed-column PDB format;
//! [`traits`] holds the format-independent file interface.

pub mod pdb;
pub mod traits;
