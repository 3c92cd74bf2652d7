//! # Core Models Module
//!
//! The structural hierarchy: atoms grouped into monomers, monomers into polymers,
//! polymers into assemblies, and assemblies into multi-model containers.
//!
//! ## Overview
//!
//! Ownership flows strictly downward. An [`assembly::Assembly`] is the arena that
//! owns its polymers and monomers; polymers refer to their monomers and to their
//! associated ligand group through [`ids`] handles, and monomers and atoms point
//! back at their owners through the same handles. Nothing holds a reference
//! cycle, and releasing an assembly (or the container holding it) releases
//! everything beneath it.
//!
//! ## Key Components
//!
//! - [`atom`] - Labelled coordinates with PDB record metadata and a state label
//! - [`monomer`] - Residues, nucleotides and ligands with their alternate states
//! - [`polymer`] - Chains of one [`polymer::MoleculeType`]
//! - [`assembly`] - One structural snapshot and its read/mutate interface
//! - [`container`] - Multi-model wrapper and the [`container::Structure`] result type
//! - [`tags`] - Free-form annotations available at every level
//!
//! ## Usage
//!
//! ```ignore
//! use ampal::core::models::assembly::Assembly;
//! use ampal::core::models::polymer::MoleculeType;
//!
//! let mut assembly = Assembly::new("1abc");
//! let chain = assembly.add_polymer("A", MoleculeType::Protein)?;
//! assembly.push_monomer(chain, monomer)?;
//! ```

pub mod assembly;
pub mod atom;
pub mod container;
pub mod error;
pub mod ids;
pub mod monomer;
pub mod polymer;
pub mod tags;
