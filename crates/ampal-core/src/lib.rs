//! # AMPAL
//!
//! A hierarchical model of macromolecular structures with a round-trip PDB
//! parser and serializer.
//!
//! ## Layout
//!
//! - **[`core::models`]: The hierarchy.** Atoms grouped into monomers (residues,
//!   nucleotides, ligands), monomers into polymers, polymers into assemblies and
//!   assemblies into containers for multi-model files. Monomers carry alternate
//!   conformational states with a selectable active state.
//!
//! - **[`core::io`]: PDB in and out.** A record-dispatch parser builds an
//!   intermediate tree keyed by model, chain and residue; lowering classifies
//!   chains and residues and reconciles alternate states; the serializer emits
//!   fixed-column records that parse back to the same hierarchy.
//!
//! - **[`core::topology`]: Residue vocabulary.** Static tables of amino acids,
//!   nucleotides and solvent names.
//!
//! ## Example
//!
//! ```
//! use ampal::{LabelRegistry, ParseOptions, WriteOptions, parse_str};
//!
//! let text = "ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\n";
//! let mut registry = LabelRegistry::new();
//! let outcome = parse_str(text, &ParseOptions::default().with_id("demo"), &mut registry).unwrap();
//! let pdb = outcome.structure.to_pdb(&WriteOptions::default(), &registry);
//! assert!(pdb.contains(" CA  GLY A   1"));
//! ```

pub mod core;

pub use crate::core::io::pdb::{
    LabelRegistry, ParseOptions, ParseOutcome, PdbError, PdbFile, WriteOptions, parse_reader, parse_str,
};
pub use crate::core::io::traits::StructureFile;
pub use crate::core::models::{
    assembly::Assembly, atom::Atom, container::Container, container::Structure, error::ModelError,
    monomer::Monomer, polymer::MoleculeType, polymer::Polymer,
};
