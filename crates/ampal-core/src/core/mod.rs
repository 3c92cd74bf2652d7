//! # Core Module
//!
//! The structural model and its PDB codec.
//!
//! - **Structural hierarchy** ([`models`]) - Atoms, monomers, polymers, assemblies and containers
//! - **File I/O** ([`io`]) - The PDB parser, lowering into the hierarchy and the serializer
//! - **Residue vocabulary** ([`topology`]) - Amino-acid, nucleotide and solvent tables
//! - **Utilities** ([`utils`]) - Rotation helpers shared by the geometric mutators

pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
