use super::record::AtomRecord;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// A map that iterates in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K: Eq + Hash, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// The value for `key`, inserted with `make` on first use.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, make()));
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// Unrecognized records, verbatim, grouped by keyword in first-seen order.
pub type InfoRecords = OrderedMap<String, Vec<String>>;

/// Chain-level evidence about what kind of molecule a chain holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainMarker {
    /// An ATOM record with a standard amino-acid residue name.
    Protein,
    /// An ATOM record with any other residue name.
    NucleicAcid,
    /// A HETATM record.
    Hetero,
}

/// Residue key: sequence number plus insertion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResidueKey {
    pub seq: i64,
    pub insertion_code: char,
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.seq, self.insertion_code.to_string().trim())
    }
}

/// What a residue's records say it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueLabel {
    pub hetero: bool,
    pub res_name: String,
}

impl fmt::Display for ResidueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = if self.hetero { "HETATM" } else { "ATOM" };
        write!(f, "{} {}", record, self.res_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidueTree {
    /// Distinct labels in first-seen order. More than one is malformed input.
    pub labels: Vec<ResidueLabel>,
    /// Records grouped by atom serial; one serial carries one record per alternate location.
    pub atoms: OrderedMap<i64, Vec<AtomRecord>>,
    /// Line number of the first record of the residue.
    pub first_line: usize,
}

impl ResidueTree {
    /// Every atom label recorded for this residue, in any state.
    pub fn atom_labels(&self) -> impl Iterator<Item = &str> {
        self.atoms.values().flatten().map(|r| r.name.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &AtomRecord> {
        self.atoms.values().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainTree {
    /// Each marker with the line number where it was first seen.
    pub markers: BTreeMap<ChainMarker, usize>,
    pub residues: OrderedMap<ResidueKey, ResidueTree>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTree {
    pub chains: OrderedMap<String, ChainTree>,
}

/// Raw parse result: models keyed by index, then chain id, residue key and
/// atom serial.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    pub info: InfoRecords,
    pub models: Vec<ModelTree>,
    /// `true` once an ENDMDL record has been seen.
    pub multi_model: bool,
}

impl Default for ParseTree {
    fn default() -> Self {
        Self {
            info: InfoRecords::new(),
            models: vec![ModelTree::default()],
            multi_model: false,
        }
    }
}

impl ParseTree {
    /// Files a coordinate record under the current (last) model.
    pub fn insert(&mut self, record: AtomRecord, marker: ChainMarker) {
        let Some(model) = self.models.last_mut() else {
            return;
        };
        let chain = model
            .chains
            .get_or_insert_with(record.chain_id.clone(), ChainTree::default);
        chain.markers.entry(marker).or_insert(record.line);

        let key = ResidueKey {
            seq: record.res_seq,
            insertion_code: record.insertion_code,
        };
        let residue = chain.residues.get_or_insert_with(key, || ResidueTree {
            first_line: record.line,
            ..Default::default()
        });
        let label = ResidueLabel {
            hetero: record.hetero,
            res_name: record.res_name.clone(),
        };
        if !residue.labels.contains(&label) {
            residue.labels.push(label);
        }
        residue
            .atoms
            .get_or_insert_with(record.serial, Vec::new)
            .push(record);
    }

    pub fn start_model(&mut self) {
        self.models.push(ModelTree::default());
        self.multi_model = true;
    }

    pub fn push_info(&mut self, keyword: &str, line: &str) {
        self.info
            .get_or_insert_with(keyword.to_string(), Vec::new)
            .push(line.to_string());
    }

    /// Number of coordinate records filed across all models.
    pub fn record_count(&self) -> usize {
        self.models
            .iter()
            .flat_map(|m| m.chains.values())
            .flat_map(|c| c.residues.values())
            .map(|r| r.records().count())
            .sum()
    }
}
