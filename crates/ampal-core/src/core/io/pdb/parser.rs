use super::error::PdbError;
use super::labels::LabelRegistry;
use super::lowering::Lowering;
use super::record::{RecordType, parse_atom_record};
use super::tree::{ChainMarker, InfoRecords, ParseTree};
use crate::core::models::container::Structure;
use crate::core::topology::residues::is_standard_amino_acid;
use std::io::BufRead;
use tracing::{debug, instrument};

/// Options controlling a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Identifier given to the resulting structure.
    pub id: String,
    /// Keep scanning past END records.
    pub ignore_end: bool,
}

impl ParseOptions {
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_ignore_end(mut self, ignore_end: bool) -> Self {
        self.ignore_end = ignore_end;
        self
    }
}

/// What the scan loop should do after a line has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Continue,
    Stop,
}

/// A fully lowered parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub structure: Structure,
    /// Unrecognized records by keyword, verbatim.
    pub info: InfoRecords,
    /// `true` if atom labels unknown to the registry were found.
    pub new_labels: bool,
}

/// The record-dispatch state machine.
///
/// Lines are fed one at a time; each ATOM or HETATM record is filed into the
/// parse tree under the current model, ENDMDL opens the next model and END asks
/// the caller to stop unless END records are ignored.
#[derive(Debug)]
pub struct PdbParser<'r> {
    options: ParseOptions,
    registry: &'r mut LabelRegistry,
    tree: ParseTree,
    line_no: usize,
    new_labels: bool,
}

impl<'r> PdbParser<'r> {
    pub fn new(options: ParseOptions, registry: &'r mut LabelRegistry) -> Self {
        Self {
            options,
            registry,
            tree: ParseTree::default(),
            line_no: 0,
            new_labels: false,
        }
    }

    /// Dispatches one line on its record keyword.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::Parse`] for malformed coordinate records.
    pub fn feed_line(&mut self, line: &str) -> Result<RecordAction, PdbError> {
        self.line_no += 1;
        let (record_type, keyword) = RecordType::of(line);
        match record_type {
            RecordType::Atom | RecordType::Hetatm => {
                self.ingest_atom(line, record_type == RecordType::Hetatm)?;
            }
            RecordType::EndModel => {
                self.tree.start_model();
                debug!(line = self.line_no, model = self.tree.models.len(), "Started new model.");
            }
            RecordType::End if self.options.ignore_end => {
                debug!(line = self.line_no, "Ignoring END record.");
            }
            RecordType::End => {
                debug!(line = self.line_no, "END record reached, stopping scan.");
                return Ok(RecordAction::Stop);
            }
            RecordType::Other => self.tree.push_info(keyword, line),
        }
        Ok(RecordAction::Continue)
    }

    /// Feeds every line of `text` until a stop is requested.
    pub fn feed_str(&mut self, text: &str) -> Result<(), PdbError> {
        for line in text.lines() {
            if self.feed_line(line)? == RecordAction::Stop {
                break;
            }
        }
        Ok(())
    }

    pub fn feed_reader(&mut self, reader: &mut impl BufRead) -> Result<(), PdbError> {
        for line in reader.lines() {
            if self.feed_line(&line?)? == RecordAction::Stop {
                break;
            }
        }
        Ok(())
    }

    /// Ends the scan, returning the raw tree and the new-labels flag.
    pub fn finish(self) -> (ParseTree, bool) {
        (self.tree, self.new_labels)
    }

    /// Ends the scan and lowers the tree with the default hetero filters.
    pub fn lower(self) -> Result<ParseOutcome, PdbError> {
        self.lower_with(&Lowering::default())
    }

    pub fn lower_with(self, lowering: &Lowering) -> Result<ParseOutcome, PdbError> {
        let id = self.options.id.clone();
        let (tree, new_labels) = self.finish();
        let structure = lowering.lower(&tree, &id)?;
        Ok(ParseOutcome {
            structure,
            info: tree.info,
            new_labels,
        })
    }

    fn ingest_atom(&mut self, line: &str, hetero: bool) -> Result<(), PdbError> {
        let record = parse_atom_record(line, self.line_no, hetero)?;
        if self.registry.learn(&record.name, &record.raw_name) {
            debug!(label = %record.name, column = %record.raw_name, "Learned new atom label.");
            self.new_labels = true;
        }
        let marker = if hetero {
            ChainMarker::Hetero
        } else if is_standard_amino_acid(&record.res_name) {
            ChainMarker::Protein
        } else {
            ChainMarker::NucleicAcid
        };
        self.tree.insert(record, marker);
        Ok(())
    }
}

/// Parses PDB text into the structural hierarchy.
///
/// # Arguments
///
/// * `text` - The PDB text.
/// * `options` - Identifier and END handling.
/// * `registry` - Atom-label layouts; labels new to it are recorded.
///
/// # Errors
///
/// Returns a [`PdbError`] for malformed records, chain classification failures
/// or input without coordinate records.
#[instrument(skip_all, name = "pdb_parse", fields(id = %options.id))]
pub fn parse_str(text: &str, options: &ParseOptions, registry: &mut LabelRegistry) -> Result<ParseOutcome, PdbError> {
    let mut parser = PdbParser::new(options.clone(), registry);
    parser.feed_str(text)?;
    parser.lower()
}

#[instrument(skip_all, name = "pdb_parse", fields(id = %options.id))]
pub fn parse_reader(
    reader: &mut impl BufRead,
    options: &ParseOptions,
    registry: &mut LabelRegistry,
) -> Result<ParseOutcome, PdbError> {
    let mut parser = PdbParser::new(options.clone(), registry);
    parser.feed_reader(reader)?;
    parser.lower()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::polymer::MoleculeType;

    const TWO_CHAINS: &str = "\
HEADER    TEST STRUCTURE
REMARK   1 FIRST
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  P    DG B   1       1.000   2.000   3.000  1.00  0.00           P
REMARK   2 SECOND
HETATM    4  O   HOH A 101       0.000   0.000   0.000  1.00  0.00           O
END
ATOM      5  CA  GLY A   2       1.000   1.000   1.000  1.00  0.00           C
";

    fn parse(text: &str, options: &ParseOptions) -> Result<ParseOutcome, PdbError> {
        let mut registry = LabelRegistry::new();
        parse_str(text, options, &mut registry)
    }

    #[test]
    fn end_record_stops_the_scan() {
        let outcome = parse(TWO_CHAINS, &ParseOptions::default()).unwrap();
        let assembly = outcome.structure.as_assembly().unwrap();
        assert_eq!(assembly.get_atoms(true, true).count(), 4);
        assert_eq!(assembly.len(), 2);
    }

    #[test]
    fn ignore_end_keeps_scanning() {
        let options = ParseOptions::default().with_ignore_end(true);
        let outcome = parse(TWO_CHAINS, &options).unwrap();
        assert_eq!(outcome.structure.as_assembly().unwrap().get_atoms(true, true).count(), 5);
    }

    #[test]
    fn info_records_are_grouped_by_keyword_in_order() {
        let outcome = parse(TWO_CHAINS, &ParseOptions::default()).unwrap();
        let keys: Vec<&String> = outcome.info.keys().collect();
        assert_eq!(keys, vec!["HEADER", "REMARK"]);
        let remarks = outcome.info.get(&"REMARK".to_string()).unwrap();
        assert_eq!(remarks.len(), 2);
        assert!(remarks[1].ends_with("SECOND"));
    }

    #[test]
    fn chains_are_classified_in_first_seen_order() {
        let outcome = parse(TWO_CHAINS, &ParseOptions::default().with_id("demo")).unwrap();
        let assembly = outcome.structure.as_assembly().unwrap();
        assert_eq!(assembly.id, "demo");
        let types: Vec<(String, MoleculeType)> = assembly
            .polymers()
            .map(|(_, p)| (p.id.clone(), p.molecule_type()))
            .collect();
        assert_eq!(
            types,
            vec![
                ("A".to_string(), MoleculeType::Protein),
                ("B".to_string(), MoleculeType::NucleicAcid)
            ]
        );
    }

    #[test]
    fn new_labels_flag_tracks_registry_additions() {
        let mut registry = LabelRegistry::new();
        let text = "ATOM      1  C1A HEM A   1       0.000   0.000   0.000  1.00  0.00           C\n";
        let first = parse_str(text, &ParseOptions::default(), &mut registry).unwrap();
        assert!(first.new_labels);
        assert_eq!(registry.column("C1A"), " C1A");

        let second = parse_str(text, &ParseOptions::default(), &mut registry).unwrap();
        assert!(!second.new_labels);
    }

    #[test]
    fn feed_line_reports_stop_signal() {
        let mut registry = LabelRegistry::new();
        let mut parser = PdbParser::new(ParseOptions::default(), &mut registry);
        assert_eq!(parser.feed_line("REMARK").unwrap(), RecordAction::Continue);
        assert_eq!(parser.feed_line("END").unwrap(), RecordAction::Stop);
        let (tree, new_labels) = parser.finish();
        assert!(!new_labels);
        assert_eq!(tree.record_count(), 0);
    }

    #[test]
    fn text_without_coordinates_is_empty_structure() {
        let err = parse("HEADER    NOTHING\nEND\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, PdbError::EmptyStructure));
    }

    #[test]
    fn malformed_record_reports_line_number() {
        let text = "REMARK\nATOM      1  CA  ALA A   x       0.000   0.000   0.000\n";
        match parse(text, &ParseOptions::default()).unwrap_err() {
            PdbError::Parse { line, content, .. } => {
                assert_eq!(line, 2);
                assert!(content.starts_with("ATOM"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
