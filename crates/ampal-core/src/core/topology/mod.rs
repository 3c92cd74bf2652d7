//! # Topology Module
//!
//! Static residue knowledge used while classifying parsed records: the standard
//! amino-acid and nucleotide vocabularies with their one-letter codes, solvent
//! residue names and the canonical protein backbone labels.

pub mod residues;
