use super::monomer::MonomerKind;
use super::polymer::MoleculeType;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("No {kind} with key '{key}' was found")]
    MissingKey { kind: &'static str, key: String },

    #[error("{kind} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Number of {kind} ({expected}) and number of labels ({found}) must be equal")]
    LabelCountMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "Residue {chain} {mol_code} {residue} is missing backbone atoms ({missing}); N, CA, C and O are required",
        missing = missing.join(", ")
    )]
    MissingBackbone {
        chain: String,
        residue: String,
        mol_code: String,
        missing: Vec<String>,
    },

    #[error("Polymer '{polymer}' holds {expected} monomers and cannot take a {found} monomer")]
    TypeMismatch {
        polymer: String,
        expected: MoleculeType,
        found: MonomerKind,
    },

    #[error("Polymer '{polymer}' holds {found} monomers; a backbone view needs a protein")]
    NotProtein { polymer: String, found: MoleculeType },

    #[error("Atom label '{label}' already exists in state '{state}'")]
    DuplicateAtomLabel { label: String, state: char },

    #[error("Chain '{chain}' already holds a polymer of this assembly")]
    DuplicateChain { chain: String },

    #[error("State label must be a single non-blank character (got {0:?})")]
    InvalidStateLabel(char),

    #[error("Polymer handle does not belong to this assembly")]
    UnknownPolymer,

    #[error("Monomer handle does not belong to this assembly")]
    UnknownMonomer,
}
