use super::ids::{MonomerId, PolymerId};
use super::monomer::MonomerKind;
use super::tags::Tags;
use std::fmt;
use std::str::FromStr;

/// The closed set of polymer kinds, decided once during lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeType {
    Protein,
    NucleicAcid,
    /// A group of free ligands, either standalone or attached to a parent polymer.
    LigandGroup,
}

impl MoleculeType {
    /// Whether a polymer of this type may hold monomers of `kind`.
    pub fn accepts(self, kind: MonomerKind) -> bool {
        matches!(
            (self, kind),
            (MoleculeType::Protein, MonomerKind::Residue)
                | (MoleculeType::NucleicAcid, MonomerKind::Nucleotide)
                | (MoleculeType::LigandGroup, MonomerKind::Ligand)
        )
    }

    /// `true` for the chain-forming types, which own an associated ligand group.
    pub fn is_polymeric(self) -> bool {
        !matches!(self, MoleculeType::LigandGroup)
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoleculeType::Protein => "protein",
            MoleculeType::NucleicAcid => "nucleic-acid",
            MoleculeType::LigandGroup => "ligands",
        };
        f.write_str(name)
    }
}

impl FromStr for MoleculeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protein" => Ok(MoleculeType::Protein),
            "nucleic-acid" | "nucleic_acid" => Ok(MoleculeType::NucleicAcid),
            "ligands" | "ligand" => Ok(MoleculeType::LigandGroup),
            _ => Err(format!("Unknown molecule type: {}", s)),
        }
    }
}

/// An ordered run of monomers sharing one molecule type.
///
/// Polymers live in an [`Assembly`](super::assembly::Assembly) arena; the monomer
/// list and the ligand link are handles into that arena.
#[derive(Debug, Clone)]
pub struct Polymer {
    /// PDB chain identifier.
    pub id: String,
    pub tags: Tags,
    /// Smoothing level used by helical-geometry consumers.
    pub sl: u32,
    molecule_type: MoleculeType,
    pub(crate) monomers: Vec<MonomerId>,
    pub(crate) ligands: Option<PolymerId>,
    pub(crate) owner: Option<PolymerId>,
}

impl Polymer {
    pub(crate) fn new(id: &str, molecule_type: MoleculeType) -> Self {
        Self {
            id: id.to_string(),
            tags: Tags::new(),
            sl: 2,
            molecule_type,
            monomers: Vec::new(),
            ligands: None,
            owner: None,
        }
    }

    pub fn molecule_type(&self) -> MoleculeType {
        self.molecule_type
    }

    pub fn monomer_ids(&self) -> &[MonomerId] {
        &self.monomers
    }

    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    /// The associated ligand group of a protein or nucleic-acid polymer.
    pub fn ligands(&self) -> Option<PolymerId> {
        self.ligands
    }

    /// For an associated ligand group, the polymer it belongs to.
    pub fn owner(&self) -> Option<PolymerId> {
        self.owner
    }
}
