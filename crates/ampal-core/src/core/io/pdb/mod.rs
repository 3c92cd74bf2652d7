//! Reading and writing the fixed-column PDB format.
//!
//! Parsing runs in two phases. [`parser::PdbParser`] dispatches each line on its
//! record keyword and files coordinate records into a [`tree::ParseTree`] keyed
//! by model, chain, residue and atom serial. [`lowering::Lowering`] then
//! classifies chains and residues and builds the structural hierarchy,
//! reconciling alternate states on the way. [`writer`] is the inverse mapping.

pub mod error;
pub mod filters;
pub mod labels;
pub mod lowering;
pub mod parser;
pub mod record;
pub mod tree;
pub mod writer;

pub use error::{PdbError, PdbParseErrorKind};
pub use labels::{LabelRegistry, LabelRegistryError};
pub use parser::{ParseOptions, ParseOutcome, PdbParser, RecordAction, parse_reader, parse_str};
pub use writer::WriteOptions;

use super::traits::StructureFile;
use crate::core::models::container::Structure;
use std::io::{BufRead, Write};

/// The PDB implementation of [`StructureFile`].
pub struct PdbFile;

impl StructureFile for PdbFile {
    type ReadOptions = ParseOptions;
    type WriteOptions = WriteOptions;
    type Outcome = ParseOutcome;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
        registry: &mut LabelRegistry,
    ) -> Result<Self::Outcome, Self::Error> {
        parse_reader(reader, options, registry)
    }

    fn write_to(
        structure: &Structure,
        options: &Self::WriteOptions,
        registry: &LabelRegistry,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writer.write_all(structure.to_pdb(options, registry).as_bytes())?;
        Ok(())
    }

    fn named_after(options: &Self::ReadOptions, stem: &str) -> Self::ReadOptions {
        if options.id.is_empty() {
            options.clone().with_id(stem)
        } else {
            options.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::container::Structure;
    use crate::core::models::polymer::MoleculeType;
    use std::collections::{BTreeMap, BTreeSet, HashSet};
    use tempfile::tempdir;

    #[allow(clippy::too_many_arguments)]
    fn line(rec: &str, serial: i64, name: &str, alt: char, res: &str, chain: char, seq: i64, x: f64, element: &str) -> String {
        let name = if name.len() >= 4 {
            name.to_string()
        } else {
            format!(" {:<3}", name)
        };
        format!(
            "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}  ",
            rec, serial, name, alt, res, chain, seq, x, x / 2.0, -x, 1.0, 10.0, element
        )
    }

    struct Fixture {
        lines: Vec<String>,
        serial: i64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                lines: vec!["HEADER    SYNTHETIC TEST STRUCTURE".to_string()],
                serial: 0,
            }
        }

        fn residue(&mut self, rec: &str, res: &str, chain: char, seq: i64, atoms: &[(&str, char)]) -> &mut Self {
            for (name, alt) in atoms {
                self.serial += 1;
                let element = &name[..1];
                let x = self.serial as f64 * 1.25;
                self.lines.push(line(rec, self.serial, name, *alt, res, chain, seq, x, element));
            }
            self
        }

        fn raw(&mut self, text: &str) -> &mut Self {
            self.lines.push(text.to_string());
            self
        }

        fn text(&self) -> String {
            let mut text = self.lines.join("\n");
            text.push('\n');
            text
        }
    }

    fn single_model() -> String {
        let mut f = Fixture::new();
        f.residue("ATOM", "ALA", 'A', 1, &[("N", ' '), ("CA", ' '), ("C", ' '), ("O", ' '), ("CB", ' ')])
            .residue("ATOM", "GLY", 'A', 2, &[("N", ' '), ("CA", ' '), ("C", ' '), ("O", ' ')])
            .residue(
                "ATOM",
                "SER",
                'A',
                3,
                &[
                    ("N", ' '),
                    ("CA", ' '),
                    ("C", ' '),
                    ("O", ' '),
                    ("CB", 'A'),
                    ("CB", 'B'),
                    ("OG", 'A'),
                ],
            )
            .residue(
                "HETATM",
                "MSE",
                'A',
                4,
                &[("N", ' '), ("CA", ' '), ("C", ' '), ("O", ' '), ("CB", ' '), ("SE", ' ')],
            )
            .raw("TER")
            .residue("ATOM", "DA", 'B', 1, &[("P", ' '), ("C1'", ' ')])
            .residue("ATOM", "DG", 'B', 2, &[("P", ' '), ("C1'", ' ')])
            .raw("TER")
            .residue("HETATM", "SO4", 'C', 1, &[("S", ' '), ("O1", ' '), ("O2", ' ')])
            .residue("HETATM", "HOH", 'A', 101, &[("O", ' ')])
            .raw("END");
        f.text()
    }

    fn multi_model(models: usize) -> String {
        let mut f = Fixture::new();
        for m in 1..=models {
            f.raw(&format!("MODEL     {:>4}", m))
                .residue("ATOM", "ALA", 'A', 1, &[("N", ' '), ("CA", ' ')])
                .residue("ATOM", "DC", 'B', 1, &[("P", ' ')])
                .raw("ENDMDL");
        }
        f.raw("END");
        f.text()
    }

    fn parse(text: &str) -> ParseOutcome {
        let mut registry = LabelRegistry::new();
        parse_str(text, &ParseOptions::default().with_id("test"), &mut registry).unwrap()
    }

    fn serialize(structure: &Structure, options: &WriteOptions) -> String {
        structure.to_pdb(options, &LabelRegistry::new())
    }

    fn coordinate_lines(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| l.starts_with("ATOM") || l.starts_with("HETATM"))
            .collect()
    }

    fn composition(text: &str) -> BTreeMap<(String, String), usize> {
        let mut counts = BTreeMap::new();
        for l in coordinate_lines(text) {
            let element = l.get(76..78).unwrap_or("").trim().to_string();
            let res_name = l[17..20].trim().to_string();
            *counts.entry((element, res_name)).or_insert(0) += 1;
        }
        counts
    }

    fn all_states() -> WriteOptions {
        WriteOptions {
            alt_states: true,
            ..WriteOptions::default()
        }
    }

    #[test]
    fn round_trip_preserves_atom_count() {
        let text = single_model();
        let outcome = parse(&text);
        let output = serialize(&outcome.structure, &all_states());
        assert_eq!(coordinate_lines(&output).len(), coordinate_lines(&text).len());
        assert_eq!(coordinate_lines(&text).len(), 30);
    }

    #[test]
    fn round_trip_preserves_composition() {
        let text = single_model();
        let output = serialize(&parse(&text).structure, &all_states());
        assert_eq!(composition(&output), composition(&text));
    }

    #[test]
    fn single_state_file_round_trips_with_default_options() {
        let text = multi_model(1).replace("ENDMDL\n", "");
        let output = serialize(&parse(&text).structure, &WriteOptions::default());
        assert_eq!(coordinate_lines(&output).len(), 3);
        assert_eq!(composition(&output), composition(&text));
    }

    #[test]
    fn alternate_states_expose_the_same_labels() {
        let outcome = parse(&single_model());
        let assembly = outcome.structure.as_assembly().unwrap();
        let mut checked = 0;
        for monomer in assembly.get_monomers(true) {
            if !monomer.has_alternate_states() {
                continue;
            }
            let label_sets: Vec<HashSet<&str>> = monomer
                .states()
                .values()
                .map(|set| set.labels().collect())
                .collect();
            assert!(label_sets.windows(2).all(|pair| pair[0] == pair[1]));
            checked += 1;
        }
        assert_eq!(checked, 1);
    }

    #[test]
    fn multi_model_file_fans_out_into_container() {
        let outcome = parse(&multi_model(3));
        let container = outcome.structure.as_container().unwrap();
        assert_eq!(container.len(), 3);
        let ids: Vec<&str> = container.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["test_state_1", "test_state_2", "test_state_3"]);

        let chain_sets: Vec<BTreeSet<String>> = container
            .iter()
            .map(|a| a.polymers().map(|(_, p)| p.id.clone()).collect())
            .collect();
        assert!(chain_sets.iter().all(|s| s == &chain_sets[0]));
        assert_eq!(outcome.info.get(&"MODEL".to_string()).map(Vec::len), Some(3));
    }

    #[test]
    fn re_serialization_is_idempotent() {
        for text in [single_model(), multi_model(2)] {
            for options in [WriteOptions::default(), all_states()] {
                let first = serialize(&parse(&text).structure, &options);
                let second = serialize(&parse(&first).structure, &options);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn atom_records_of_standard_residues_classify_as_protein() {
        let mut f = Fixture::new();
        for (seq, res) in ["ALA", "GLY", "SER"].iter().enumerate() {
            f.residue("ATOM", res, 'A', seq as i64 + 1, &[("N", ' '), ("CA", ' '), ("C", ' '), ("O", ' ')]);
        }
        let outcome = parse(&f.text());
        let assembly = outcome.structure.as_assembly().unwrap();
        let a = assembly.polymer_by_chain("A").unwrap();
        assert_eq!(assembly.polymer(a).unwrap().molecule_type(), MoleculeType::Protein);
        assert_eq!(assembly.sequence(a).as_deref(), Some("AGS"));
    }

    #[test]
    fn hetatm_residues_without_backbone_become_ligands() {
        let mut f = Fixture::new();
        for (seq, res) in ["ALA", "GLY", "SER"].iter().enumerate() {
            f.residue("HETATM", res, 'A', seq as i64 + 1, &[("CB", ' '), ("OG", ' ')]);
        }
        let outcome = parse(&f.text());
        let assembly = outcome.structure.as_assembly().unwrap();
        let a = assembly.polymer_by_chain("A").unwrap();
        let polymer = assembly.polymer(a).unwrap();
        assert_eq!(polymer.molecule_type(), MoleculeType::LigandGroup);
        assert_eq!(assembly.get_ligands(true).len(), 3);
        assert!(assembly.sequences().is_empty());
    }

    #[test]
    fn hetatm_residue_without_backbone_joins_the_chain_ligands() {
        let mut f = Fixture::new();
        f.residue("ATOM", "ALA", 'A', 1, &[("N", ' '), ("CA", ' '), ("C", ' '), ("O", ' ')])
            .residue("HETATM", "SER", 'A', 2, &[("CB", ' '), ("OG", ' ')]);
        let outcome = parse(&f.text());
        let assembly = outcome.structure.as_assembly().unwrap();
        let a = assembly.polymer_by_chain("A").unwrap();
        assert_eq!(assembly.polymer(a).unwrap().len(), 1);
        assert_eq!(assembly.polymer_monomer_ids(a, true).len(), 2);
    }

    #[test]
    fn protein_and_nucleic_atoms_in_one_chain_conflict() {
        let mut f = Fixture::new();
        f.residue("ATOM", "ALA", 'A', 1, &[("CA", ' ')])
            .residue("ATOM", "DA", 'A', 2, &[("P", ' ')]);
        let mut registry = LabelRegistry::new();
        let err = parse_str(&f.text(), &ParseOptions::default(), &mut registry).unwrap_err();
        match err {
            PdbError::ChainTypeConflict { model, chain, line } => {
                assert_eq!(model, 0);
                assert_eq!(chain, "A");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn conflicting_residue_labels_are_rejected() {
        let mut f = Fixture::new();
        f.residue("ATOM", "ALA", 'A', 1, &[("CA", ' ')])
            .residue("ATOM", "GLY", 'A', 1, &[("N", ' ')]);
        let mut registry = LabelRegistry::new();
        let err = parse_str(&f.text(), &ParseOptions::default(), &mut registry).unwrap_err();
        assert!(matches!(
            err,
            PdbError::ConflictingResidueRecords { ref labels, line: 2, .. } if labels.len() == 2
        ));
    }

    #[test]
    fn six_digit_serials_stay_in_their_columns() {
        let outcome = parse(&single_model());
        let Structure::Assembly(mut assembly) = outcome.structure else {
            panic!("expected a single assembly");
        };
        assembly.relabel_atoms(99_999);
        let output = assembly.to_pdb(&WriteOptions::default(), &LabelRegistry::new());
        let lines = coordinate_lines(&output);
        assert_eq!(&lines[0][6..11], "99999");
        assert_eq!(&lines[1][6..11], "00000");
        assert!(lines.iter().all(|l| l.len() == 80 && &l[11..12] == " "));
    }

    #[test]
    fn pdb_file_reads_from_path_using_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1xyz.pdb");
        std::fs::write(&path, single_model()).unwrap();

        let mut registry = LabelRegistry::new();
        let outcome = PdbFile::read_from_path(&path, &ParseOptions::default(), &mut registry).unwrap();
        assert_eq!(outcome.structure.id(), "1xyz");

        let named = ParseOptions::default().with_id("given");
        let outcome = PdbFile::read_from_path(&path, &named, &mut registry).unwrap();
        assert_eq!(outcome.structure.id(), "given");

        let out_path = dir.path().join("out.pdb");
        PdbFile::write_to_path(&outcome.structure, &WriteOptions::default(), &registry, &out_path).unwrap();
        let written = std::fs::read_to_string(&out_path).unwrap();
        assert!(written.starts_with("HEADER    given"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let mut registry = LabelRegistry::new();
        let err = PdbFile::read_from_path(dir.path().join("absent.pdb"), &ParseOptions::default(), &mut registry)
            .unwrap_err();
        assert!(matches!(err, PdbError::Io(_)));
    }
}
