use super::tree::ResidueTree;
use crate::core::models::monomer::MonomerKind;
use crate::core::topology::residues::BACKBONE_ATOM_LABELS;
use std::collections::HashSet;

/// Where a hetero residue should go when lowering a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeteroPlacement {
    pub kind: MonomerKind,
    /// `true` to place the residue in the chain's own monomer sequence.
    pub on_chain: bool,
}

/// A rule deciding whether a HETATM residue belongs to the polymer.
///
/// Filters run in order and the first match wins. Residues that no filter
/// claims become ligands.
pub trait HeteroFilter: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn classify(&self, res_name: &str, residue: &ResidueTree) -> Option<HeteroPlacement>;
}

/// Claims non-canonical amino acids that are still part of the chain: a
/// three-letter residue name and all of the backbone atoms N, CA, C and O.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonCanonicalAminoAcid;

impl HeteroFilter for NonCanonicalAminoAcid {
    fn name(&self) -> &'static str {
        "non-canonical-amino-acid"
    }

    fn classify(&self, res_name: &str, residue: &ResidueTree) -> Option<HeteroPlacement> {
        if res_name.chars().count() != 3 {
            return None;
        }
        let labels: HashSet<&str> = residue.atom_labels().collect();
        BACKBONE_ATOM_LABELS
            .iter()
            .all(|label| labels.contains(label))
            .then_some(HeteroPlacement {
                kind: MonomerKind::Residue,
                on_chain: true,
            })
    }
}

/// The filters applied when none are configured.
pub fn default_filters() -> Vec<Box<dyn HeteroFilter>> {
    vec![Box::new(NonCanonicalAminoAcid)]
}
