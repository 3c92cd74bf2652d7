use crate::core::models::error::ModelError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}\n  {content}")]
    Parse {
        line: usize,
        content: String,
        kind: PdbParseErrorKind,
    },

    #[error("Invalid atom record on line {line}: {source}")]
    InvalidAtom { line: usize, source: ModelError },

    #[error(
        "Malformed PDB, chain '{chain}' of model {model} mixes protein and nucleic-acid ATOM records (first conflicting record on line {line})"
    )]
    ChainTypeConflict {
        model: usize,
        chain: String,
        line: usize,
    },

    #[error("Unknown monomer type for residue '{residue}' of chain '{chain}' in model {model}")]
    UnknownMonomerType {
        model: usize,
        chain: String,
        residue: String,
    },

    #[error(
        "Malformed PDB, residue '{residue}' of chain '{chain}' in model {model} has multiple labels ({labels}) starting on line {line}",
        labels = labels.join(", ")
    )]
    ConflictingResidueRecords {
        model: usize,
        chain: String,
        residue: String,
        labels: Vec<String>,
        line: usize,
    },

    #[error("Empty structure, no ATOM or HETATM records found; check the input PDB format")]
    EmptyStructure,

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Coordinate in columns {columns} is not finite (value: '{value}')")]
    NonFiniteCoordinate { columns: &'static str, value: String },
    #[error("Non-ASCII character in column {column}; PDB records are fixed-width ASCII")]
    NonAscii { column: usize },
    #[error("Line is too short for an ATOM/HETATM record ({length} chars, at least 54 required)")]
    LineTooShort { length: usize },
}
