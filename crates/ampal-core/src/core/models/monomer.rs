use super::atom::{Atom, DEFAULT_STATE, validate_state_label};
use super::error::ModelError;
use super::ids::PolymerId;
use super::tags::Tags;
use crate::core::topology::residues::{
    self, BACKBONE_ATOM_LABELS, amino_acid_letter, nucleotide_letter,
};
use nalgebra::{Point3, Rotation3, Vector3};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// The chemical kind of a monomer, decided once when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonomerKind {
    /// An amino-acid residue, canonical or not.
    Residue,
    Nucleotide,
    /// A free ligand or solvent molecule.
    Ligand,
}

impl fmt::Display for MonomerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MonomerKind::Residue => "residue",
            MonomerKind::Nucleotide => "nucleotide",
            MonomerKind::Ligand => "ligand",
        };
        f.write_str(name)
    }
}

/// Identity of a monomer inside an assembly, usable as a map key when matching
/// per-residue output of external tools back onto the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonomerKey {
    pub chain: String,
    /// `" "` for polymer residues, `"W"` for water and `"H_<code>"` for other hetero groups.
    pub hetero_flag: String,
    pub id: String,
    pub insertion_code: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomKey {
    pub monomer: MonomerKey,
    pub label: String,
}

impl fmt::Display for MonomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.chain, self.id, self.insertion_code.to_string().trim())
    }
}

/// The atoms of one conformational state, in insertion order and indexed by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSet {
    atoms: Vec<Atom>,
    index: HashMap<String, usize>,
}

impl AtomSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&Atom> {
        self.index.get(label).map(|&i| &self.atoms[i])
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Atom> {
        self.index.get(label).map(|&i| &mut self.atoms[i])
    }

    /// Positional access in insertion order.
    pub fn at(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Atom> {
        self.atoms.iter_mut()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|a| a.label())
    }

    pub(crate) fn insert(&mut self, atom: Atom) -> Result<(), ModelError> {
        if self.index.contains_key(atom.label()) {
            return Err(ModelError::DuplicateAtomLabel {
                label: atom.label().to_string(),
                state: atom.state(),
            });
        }
        self.index.insert(atom.label().to_string(), self.atoms.len());
        self.atoms.push(atom);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AtomSet {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

/// One residue, nucleotide or ligand instance with its alternate conformations.
///
/// A monomer always holds at least one state, and the active state always names
/// one of them. Switching the active state only changes which atoms are viewed;
/// stored atoms are never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Monomer {
    /// PDB residue sequence number, kept as text.
    pub id: String,
    pub insertion_code: char,
    /// Residue name such as "ALA", "DG" or "HOH".
    pub mol_code: String,
    pub is_hetero: bool,
    pub tags: Tags,
    kind: MonomerKind,
    states: BTreeMap<char, AtomSet>,
    active_state: char,
    pub(crate) polymer: Option<PolymerId>,
}

impl Monomer {
    /// Creates an empty monomer with a single, empty default state.
    pub fn new(kind: MonomerKind, mol_code: &str, id: &str) -> Self {
        let mut states = BTreeMap::new();
        states.insert(DEFAULT_STATE, AtomSet::new());
        Self {
            id: id.to_string(),
            insertion_code: ' ',
            mol_code: mol_code.to_string(),
            is_hetero: kind == MonomerKind::Ligand,
            tags: Tags::new(),
            kind,
            states,
            active_state: DEFAULT_STATE,
            polymer: None,
        }
    }

    pub fn with_insertion_code(mut self, insertion_code: char) -> Self {
        self.insertion_code = insertion_code;
        self
    }

    pub fn with_hetero(mut self, is_hetero: bool) -> Self {
        self.is_hetero = is_hetero;
        self
    }

    /// Builds a monomer from atoms that already carry their state labels.
    ///
    /// States are created on demand; the active state is the lexicographically
    /// first label. With no atoms, the monomer holds one empty default state.
    pub fn from_atoms<I>(kind: MonomerKind, mol_code: &str, id: &str, atoms: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = Atom>,
    {
        let mut monomer = Self::new(kind, mol_code, id);
        monomer.states.clear();
        for atom in atoms {
            monomer.insert_atom(atom)?;
        }
        if monomer.states.is_empty() {
            monomer.states.insert(DEFAULT_STATE, AtomSet::new());
        }
        monomer.active_state = monomer.first_state();
        Ok(monomer)
    }

    pub fn kind(&self) -> MonomerKind {
        self.kind
    }

    /// The polymer holding this monomer, once it belongs to an assembly.
    pub fn polymer(&self) -> Option<PolymerId> {
        self.polymer
    }

    pub fn states(&self) -> &BTreeMap<char, AtomSet> {
        &self.states
    }

    pub fn state_labels(&self) -> impl Iterator<Item = char> + '_ {
        self.states.keys().copied()
    }

    pub fn has_alternate_states(&self) -> bool {
        self.states.len() > 1
    }

    /// Atoms of the named state.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if no such state exists.
    pub fn state(&self, label: char) -> Result<&AtomSet, ModelError> {
        self.states.get(&label).ok_or_else(|| missing_state(label))
    }

    pub fn active_state(&self) -> char {
        self.active_state
    }

    /// Selects which state is exposed as the monomer's atoms.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] and leaves the selection unchanged if the
    /// label is not one of this monomer's states.
    pub fn set_active_state(&mut self, label: char) -> Result<(), ModelError> {
        if !self.states.contains_key(&label) {
            return Err(missing_state(label));
        }
        self.active_state = label;
        Ok(())
    }

    /// The atoms of the active state.
    pub fn atoms(&self) -> &AtomSet {
        // The active state is always a key of `states`.
        &self.states[&self.active_state]
    }

    pub fn atom(&self, label: &str) -> Result<&Atom, ModelError> {
        self.atoms().get(label).ok_or_else(|| ModelError::MissingKey {
            kind: "atom",
            key: label.to_string(),
        })
    }

    pub fn atom_mut(&mut self, label: &str) -> Result<&mut Atom, ModelError> {
        let active = self.active_state;
        self.states
            .get_mut(&active)
            .and_then(|set| set.get_mut(label))
            .ok_or_else(|| ModelError::MissingKey {
                kind: "atom",
                key: label.to_string(),
            })
    }

    /// Number of atoms in the active state.
    pub fn len(&self) -> usize {
        self.atoms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms().is_empty()
    }

    /// Leaf atoms: the active state only, or every state in label order.
    pub fn get_atoms(&self, inc_alt_states: bool) -> impl Iterator<Item = &Atom> + '_ {
        let active = self.active_state;
        self.states
            .iter()
            .filter(move |(label, _)| inc_alt_states || **label == active)
            .flat_map(|(_, set)| set.iter())
    }

    pub fn get_atoms_mut(&mut self, inc_alt_states: bool) -> impl Iterator<Item = &mut Atom> + '_ {
        let active = self.active_state;
        self.states
            .iter_mut()
            .filter(move |(label, _)| inc_alt_states || **label == active)
            .flat_map(|(_, set)| set.iter_mut())
    }

    /// Adds an atom to the state named by its own state label, creating the state
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateAtomLabel`] if the state already holds an
    /// atom with the same label.
    pub fn insert_atom(&mut self, mut atom: Atom) -> Result<(), ModelError> {
        validate_state_label(atom.state())?;
        atom.monomer = None;
        self.states.entry(atom.state()).or_default().insert(atom)
    }

    /// Rotates every atom of every state.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>, pivot: Option<&Point3<f64>>) {
        for atom in self.get_atoms_mut(true) {
            atom.rotate(rotation, pivot);
        }
    }

    pub fn translate(&mut self, vector: &Vector3<f64>) {
        for atom in self.get_atoms_mut(true) {
            atom.translate(vector);
        }
    }

    /// Renumbers atom serials sequentially over every state, starting at `start`.
    /// Returns the next unused serial.
    pub fn relabel_atoms(&mut self, start: i64) -> i64 {
        let mut serial = start;
        for atom in self.get_atoms_mut(true) {
            atom.serial = serial;
            serial += 1;
        }
        serial
    }

    /// Makes every state expose the same set of atom labels.
    ///
    /// The reference state is the best-populated one (ties go to the first label).
    /// Atoms missing from a state are copied in from the reference state, and then
    /// from any other state still holding them, and marked as backfilled. Returns
    /// the number of copies made.
    pub fn reconcile_states(&mut self) -> Result<usize, ModelError> {
        if self.states.len() < 2 {
            return Ok(0);
        }
        let label_sets: Vec<HashSet<&str>> =
            self.states.values().map(|set| set.labels().collect()).collect();
        if label_sets.windows(2).all(|pair| pair[0] == pair[1]) {
            return Ok(0);
        }

        let reference = self
            .states
            .iter()
            .fold(None::<(char, usize)>, |best, (label, set)| match best {
                Some((_, n)) if n >= set.len() => best,
                _ => Some((*label, set.len())),
            })
            .map(|(label, _)| label)
            .unwrap_or(DEFAULT_STATE);

        // Donor order: the reference state first, then the others by label.
        let mut donors: Vec<Atom> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let ordered = std::iter::once(reference).chain(self.states.keys().copied().filter(|l| *l != reference));
        for label in ordered.collect::<Vec<_>>() {
            for atom in self.states[&label].iter() {
                if seen.insert(atom.label().to_string()) {
                    donors.push(atom.clone());
                }
            }
        }

        let mut copies = 0;
        for (label, set) in self.states.iter_mut() {
            for donor in &donors {
                if !set.contains(donor.label()) {
                    set.insert(donor.backfilled_copy(*label))?;
                    copies += 1;
                }
            }
        }
        Ok(copies)
    }

    /// A new residue holding only the backbone atoms N, CA, C and O of the active state.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingBackbone`] naming every missing label. The chain
    /// field of the error is left empty; callers holding the chain fill it in.
    pub fn backbone(&self) -> Result<Monomer, ModelError> {
        let active = self.atoms();
        let missing: Vec<String> = BACKBONE_ATOM_LABELS
            .iter()
            .filter(|label| !active.contains(label))
            .map(|label| label.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::MissingBackbone {
                chain: String::new(),
                residue: self.id.clone(),
                mol_code: self.mol_code.clone(),
                missing,
            });
        }

        let atoms = BACKBONE_ATOM_LABELS
            .iter()
            .filter_map(|label| active.get(label))
            .map(|atom| {
                let mut copy = atom.clone();
                copy.backfilled = false;
                copy
            });
        let mut backbone = Monomer::from_atoms(MonomerKind::Residue, &self.mol_code, &self.id, atoms)?
            .with_insertion_code(self.insertion_code)
            .with_hetero(self.is_hetero);
        backbone.tags = self.tags.clone();
        Ok(backbone)
    }

    /// The identity tuple of this monomer within the chain `chain`.
    pub fn unique_id(&self, chain: &str) -> MonomerKey {
        let hetero_flag = if !self.is_hetero {
            " ".to_string()
        } else if self.mol_code == "HOH" {
            "W".to_string()
        } else {
            format!("H_{}", self.mol_code)
        };
        MonomerKey {
            chain: chain.to_string(),
            hetero_flag,
            id: self.id.clone(),
            insertion_code: self.insertion_code,
        }
    }

    pub fn is_solvent(&self) -> bool {
        residues::is_solvent(&self.mol_code)
    }

    /// One-letter sequence code; `None` for ligands.
    pub fn letter(&self) -> Option<char> {
        match self.kind {
            MonomerKind::Residue => Some(amino_acid_letter(&self.mol_code).unwrap_or('X')),
            MonomerKind::Nucleotide => Some(nucleotide_letter(&self.mol_code).unwrap_or('N')),
            MonomerKind::Ligand => None,
        }
    }

    fn first_state(&self) -> char {
        self.states.keys().next().copied().unwrap_or(DEFAULT_STATE)
    }
}

fn missing_state(label: char) -> ModelError {
    ModelError::MissingKey {
        kind: "state",
        key: label.to_string(),
    }
}
