use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Width of the atom-name field of a coordinate record (columns 13-16).
pub const ATOM_NAME_WIDTH: usize = 4;

/// Column layouts of common atom labels as they appear in columns 13-16.
///
/// One-letter elements start in column 14, two-letter elements in column 13.
#[rustfmt::skip]
static DEFAULT_COLUMNS: Map<&'static str, &'static str> = phf_map! {
    // --- Protein backbone ---
    "N" => " N  ", "CA" => " CA ", "C" => " C  ", "O" => " O  ", "OXT" => " OXT",
    "H" => " H  ", "HA" => " HA ",
    // --- Protein side chains ---
    "CB" => " CB ", "CG" => " CG ", "CG1" => " CG1", "CG2" => " CG2", "CD" => " CD ",
    "CD1" => " CD1", "CD2" => " CD2", "CE" => " CE ", "CE1" => " CE1", "CE2" => " CE2",
    "CE3" => " CE3", "CZ" => " CZ ", "CZ2" => " CZ2", "CZ3" => " CZ3", "CH2" => " CH2",
    "ND1" => " ND1", "ND2" => " ND2", "NE" => " NE ", "NE1" => " NE1", "NE2" => " NE2",
    "NH1" => " NH1", "NH2" => " NH2", "NZ" => " NZ ", "OD1" => " OD1", "OD2" => " OD2",
    "OE1" => " OE1", "OE2" => " OE2", "OG" => " OG ", "OG1" => " OG1", "OH" => " OH ",
    "SD" => " SD ", "SG" => " SG ", "SE" => "SE  ",
    // --- Nucleic acids ---
    "P" => " P  ", "OP1" => " OP1", "OP2" => " OP2", "OP3" => " OP3",
    "O5'" => " O5'", "C5'" => " C5'", "C4'" => " C4'", "O4'" => " O4'", "C3'" => " C3'",
    "O3'" => " O3'", "C2'" => " C2'", "O2'" => " O2'", "C1'" => " C1'",
    "N1" => " N1 ", "C2" => " C2 ", "N2" => " N2 ", "O2" => " O2 ", "N3" => " N3 ",
    "C4" => " C4 ", "N4" => " N4 ", "O4" => " O4 ", "C5" => " C5 ", "C6" => " C6 ",
    "N6" => " N6 ", "O6" => " O6 ", "N7" => " N7 ", "C7" => " C7 ", "C8" => " C8 ",
    "N9" => " N9 ",
    // --- Common ions ---
    "FE" => "FE  ", "ZN" => "ZN  ", "MG" => "MG  ", "CL" => "CL  ", "NA" => "NA  ",
    "CU" => "CU  ", "MN" => "MN  ", "CO" => "CO  ", "NI" => "NI  ", "BR" => "BR  ",
};

/// The atom-label to column-layout registry used when serializing.
///
/// The parser records the exact columns 13-16 of every label it has not seen
/// before, so that output reproduces the input's name alignment. Built-in
/// layouts cover the common labels; anything else falls back to the standard
/// alignment rule in [`LabelRegistry::column`].
///
/// A registry is an explicit value passed to the parser and the writer. One
/// registry can be reused across parses to accumulate labels, and persisted
/// with [`LabelRegistry::save`] / [`LabelRegistry::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelRegistry {
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum LabelRegistryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("TOML serialization error for '{path}': {source}")]
    Serialize {
        path: String,
        source: toml::ser::Error,
    },
}

impl LabelRegistry {
    /// Creates a registry holding only the built-in layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads learned layouts from a TOML file with a `[labels]` table.
    pub fn load(path: &Path) -> Result<Self, LabelRegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| LabelRegistryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut registry: LabelRegistry =
            toml::from_str(&content).map_err(|e| LabelRegistryError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        registry
            .labels
            .retain(|_, column| column.chars().count() == ATOM_NAME_WIDTH);
        debug!(path = %path.display(), labels = registry.labels.len(), "Loaded label registry");
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<(), LabelRegistryError> {
        let content = toml::to_string(self).map_err(|e| LabelRegistryError::Serialize {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(|e| LabelRegistryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// `true` if the label has a built-in or learned layout.
    pub fn knows(&self, label: &str) -> bool {
        DEFAULT_COLUMNS.contains_key(label) || self.labels.contains_key(label)
    }

    /// Records the raw columns 13-16 of a label seen in input.
    ///
    /// Returns `true` if the label was new to the registry.
    pub fn learn(&mut self, label: &str, raw_column: &str) -> bool {
        if label.is_empty() || self.knows(label) || raw_column.chars().count() != ATOM_NAME_WIDTH {
            return false;
        }
        self.labels
            .insert(label.to_string(), raw_column.to_string());
        true
    }

    /// The four-column layout of a label.
    ///
    /// [`learn`](Self::learn) never records a built-in label, so a learned layout
    /// only replaces a built-in one when it comes from a registry file loaded
    /// with [`load`](Self::load). Unknown labels of four or more characters are
    /// used as they are; shorter ones start in column 14.
    pub fn column(&self, label: &str) -> String {
        if let Some(column) = self.labels.get(label) {
            return column.clone();
        }
        if let Some(column) = DEFAULT_COLUMNS.get(label) {
            return (*column).to_string();
        }
        if label.chars().count() >= ATOM_NAME_WIDTH {
            label.to_string()
        } else {
            format!(" {:<3}", label)
        }
    }

    /// Number of learned layouts.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Learned layouts in label order.
    pub fn learned(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Adds every learned layout of `other` that this registry does not know yet.
    pub fn merge(&mut self, other: &LabelRegistry) {
        for (label, column) in other.learned() {
            self.learn(label, column);
        }
    }
}
