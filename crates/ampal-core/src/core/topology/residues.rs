use phf::{Map, Set, phf_map, phf_set};

/// Labels of the canonical protein main-chain atoms, in their conventional order.
pub const BACKBONE_ATOM_LABELS: [&str; 4] = ["N", "CA", "C", "O"];

/// Three-letter codes of the standard amino acids (plus `UNK`) and their one-letter codes.
#[rustfmt::skip]
static AMINO_ACID_LETTERS: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    "UNK" => 'X',
};

#[rustfmt::skip]
static NUCLEOTIDE_LETTERS: Map<&'static str, char> = phf_map! {
    // --- Ribonucleotides ---
    "A" => 'A', "C" => 'C', "G" => 'G', "U" => 'U', "I" => 'I', "N" => 'N',
    // --- Deoxyribonucleotides ---
    "DA" => 'A', "DC" => 'C', "DG" => 'G', "DT" => 'T', "DU" => 'U', "DI" => 'I', "DN" => 'N',
};

static SOLVENT_CODES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "D2O", "SOL",
};

/// Returns `true` for residue names in the standard amino-acid vocabulary.
pub fn is_standard_amino_acid(res_name: &str) -> bool {
    AMINO_ACID_LETTERS.contains_key(res_name.trim())
}

pub fn amino_acid_letter(res_name: &str) -> Option<char> {
    AMINO_ACID_LETTERS.get(res_name.trim()).copied()
}

pub fn nucleotide_letter(res_name: &str) -> Option<char> {
    NUCLEOTIDE_LETTERS.get(res_name.trim()).copied()
}

pub fn is_solvent(res_name: &str) -> bool {
    SOLVENT_CODES.contains(res_name.trim())
}

pub fn is_backbone_label(label: &str) -> bool {
    BACKBONE_ATOM_LABELS.contains(&label.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_amino_acids_are_recognised() {
        for code in ["ALA", "GLY", "SER", "TRP", "UNK"] {
            assert!(is_standard_amino_acid(code), "{code} should be standard");
        }
    }

    #[test]
    fn nucleotides_and_modified_residues_are_not_amino_acids() {
        assert!(!is_standard_amino_acid("DA"));
        assert!(!is_standard_amino_acid("MSE"));
        assert!(!is_standard_amino_acid("HOH"));
        assert!(!is_standard_amino_acid(""));
    }

    #[test]
    fn letters_are_looked_up_after_trimming() {
        assert_eq!(amino_acid_letter(" LYS"), Some('K'));
        assert_eq!(amino_acid_letter("UNK"), Some('X'));
        assert_eq!(amino_acid_letter("MSE"), None);
        assert_eq!(nucleotide_letter(" DT"), Some('T'));
        assert_eq!(nucleotide_letter("U"), Some('U'));
        assert_eq!(nucleotide_letter("PSU"), None);
    }

    #[test]
    fn solvent_and_backbone_helpers() {
        assert!(is_solvent("HOH"));
        assert!(!is_solvent("SO4"));
        assert!(is_backbone_label(" CA "));
        assert!(!is_backbone_label("CB"));
    }
}
