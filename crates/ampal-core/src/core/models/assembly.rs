use super::atom::Atom;
use super::error::ModelError;
use super::ids::{MonomerId, PolymerId};
use super::monomer::{AtomKey, Monomer, MonomerKey};
use super::polymer::{MoleculeType, Polymer};
use super::tags::{TagValue, Tags};
use nalgebra::{Point3, Rotation3, Vector3};
use slotmap::SlotMap;
use tracing::debug;

/// Tag under which [`Assembly::tag_atoms_unique_ids`] stores atom identities.
pub const UNIQUE_ID_TAG: &str = "unique_id";

const FASTA_LINE_WIDTH: usize = 79;

/// One complete structural snapshot: an ordered collection of polymers.
///
/// The assembly is the arena that owns every polymer and monomer beneath it.
/// Polymers and monomers are addressed by slotmap handles, and child-to-parent
/// navigation goes through those handles rather than through ownership. The
/// ligand group attached to a protein or nucleic-acid polymer lives in the same
/// arena but is not part of the top-level polymer order.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub id: String,
    pub tags: Tags,
    polymers: SlotMap<PolymerId, Polymer>,
    order: Vec<PolymerId>,
    monomers: SlotMap<MonomerId, Monomer>,
}

impl Assembly {
    /// Creates a new, empty assembly.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Retrieves a polymer by its handle.
    ///
    /// # Arguments
    ///
    /// * `id` - The polymer handle to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Polymer)` if the polymer belongs to this assembly, otherwise `None`.
    pub fn polymer(&self, id: PolymerId) -> Option<&Polymer> {
        self.polymers.get(id)
    }

    pub fn polymer_mut(&mut self, id: PolymerId) -> Option<&mut Polymer> {
        self.polymers.get_mut(id)
    }

    /// Retrieves a monomer by its handle.
    ///
    /// # Arguments
    ///
    /// * `id` - The monomer handle to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Monomer)` if the monomer belongs to this assembly, otherwise `None`.
    pub fn monomer(&self, id: MonomerId) -> Option<&Monomer> {
        self.monomers.get(id)
    }

    pub fn monomer_mut(&mut self, id: MonomerId) -> Option<&mut Monomer> {
        self.monomers.get_mut(id)
    }

    /// Handles of the top-level polymers, in order.
    pub fn polymer_ids(&self) -> &[PolymerId] {
        &self.order
    }

    /// Iterates the top-level polymers in order.
    pub fn polymers(&self) -> impl Iterator<Item = (PolymerId, &Polymer)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.polymers.get(id).map(|p| (id, p)))
    }

    /// Number of top-level polymers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Finds a top-level polymer by chain id.
    ///
    /// Protein and nucleic-acid polymers are preferred over a standalone ligand
    /// group sharing the same chain id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if no polymer carries the chain id.
    pub fn polymer_by_chain(&self, chain: &str) -> Result<PolymerId, ModelError> {
        let mut fallback = None;
        for (id, polymer) in self.polymers() {
            if polymer.id == chain {
                if polymer.molecule_type().is_polymeric() {
                    return Ok(id);
                }
                fallback.get_or_insert(id);
            }
        }
        fallback.ok_or_else(|| ModelError::MissingKey {
            kind: "polymer",
            key: chain.to_string(),
        })
    }

    /// Finds a top-level polymer by position.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] if `index` is past the end.
    pub fn polymer_at(&self, index: usize) -> Result<PolymerId, ModelError> {
        self.order
            .get(index)
            .copied()
            .ok_or(ModelError::IndexOutOfRange {
                kind: "polymer",
                index,
                len: self.order.len(),
            })
    }

    /// Finds a monomer of a polymer by residue id, with the insertion code appended
    /// when present (e.g. "52" or "52A").
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownPolymer`] for a foreign handle and
    /// [`ModelError::MissingKey`] if no monomer carries the id.
    pub fn monomer_by_id(&self, polymer: PolymerId, residue_id: &str) -> Result<MonomerId, ModelError> {
        let polymer = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        polymer
            .monomers
            .iter()
            .copied()
            .find(|&mid| {
                self.monomers.get(mid).is_some_and(|m| {
                    let icode = m.insertion_code.to_string();
                    format!("{}{}", m.id, icode.trim()) == residue_id
                })
            })
            .ok_or_else(|| ModelError::MissingKey {
                kind: "monomer",
                key: residue_id.to_string(),
            })
    }

    /// Finds a monomer of a polymer by position.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownPolymer`] for a foreign handle and
    /// [`ModelError::IndexOutOfRange`] if `index` is past the end.
    pub fn monomer_at(&self, polymer: PolymerId, index: usize) -> Result<MonomerId, ModelError> {
        let polymer = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        polymer
            .monomers
            .get(index)
            .copied()
            .ok_or(ModelError::IndexOutOfRange {
                kind: "monomer",
                index,
                len: polymer.monomers.len(),
            })
    }

    /// Adds an empty top-level polymer.
    ///
    /// Protein and nucleic-acid polymers get an empty associated ligand group
    /// immediately, so ligands can always be appended the same way.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain identifier of the new polymer.
    /// * `molecule_type` - The molecule type its monomers must match.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateChain`] if another protein or nucleic-acid
    /// polymer already uses the chain id.
    pub fn add_polymer(&mut self, chain: &str, molecule_type: MoleculeType) -> Result<PolymerId, ModelError> {
        if molecule_type.is_polymeric()
            && self
                .polymers()
                .any(|(_, p)| p.id == chain && p.molecule_type().is_polymeric())
        {
            return Err(ModelError::DuplicateChain {
                chain: chain.to_string(),
            });
        }

        let id = self.polymers.insert(Polymer::new(chain, molecule_type));
        if molecule_type.is_polymeric() {
            let mut group = Polymer::new(chain, MoleculeType::LigandGroup);
            group.owner = Some(id);
            let group_id = self.polymers.insert(group);
            self.polymers[id].ligands = Some(group_id);
        }
        self.order.push(id);
        Ok(id)
    }

    /// Appends a monomer to a polymer's own sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownPolymer`] for a foreign handle and
    /// [`ModelError::TypeMismatch`] if the monomer kind does not fit the polymer.
    pub fn push_monomer(&mut self, polymer: PolymerId, mut monomer: Monomer) -> Result<MonomerId, ModelError> {
        let target = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        if !target.molecule_type().accepts(monomer.kind()) {
            return Err(ModelError::TypeMismatch {
                polymer: target.id.clone(),
                expected: target.molecule_type(),
                found: monomer.kind(),
            });
        }

        monomer.polymer = Some(polymer);
        let id = self.monomers.insert(monomer);
        for atom in self.monomers[id].get_atoms_mut(true) {
            atom.monomer = Some(id);
        }
        self.polymers[polymer].monomers.push(id);
        Ok(id)
    }

    /// Appends a ligand to the ligand group associated with `polymer`, or to
    /// `polymer` itself when it is a ligand group.
    pub fn push_ligand(&mut self, polymer: PolymerId, monomer: Monomer) -> Result<MonomerId, ModelError> {
        let target = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        let group = target.ligands.unwrap_or(polymer);
        self.push_monomer(group, monomer)
    }

    /// Appends several monomers to a polymer, stopping at the first rejected one.
    pub fn extend_polymer<I>(&mut self, polymer: PolymerId, monomers: I) -> Result<Vec<MonomerId>, ModelError>
    where
        I: IntoIterator<Item = Monomer>,
    {
        monomers
            .into_iter()
            .map(|m| self.push_monomer(polymer, m))
            .collect()
    }

    /// Moves every polymer of `other` to the end of this assembly.
    ///
    /// Chain ids are checked as for [`Assembly::add_polymer`]; on error this
    /// assembly is left unchanged.
    pub fn extend(&mut self, mut other: Assembly) -> Result<(), ModelError> {
        let mut staged = self.clone();
        for pid in std::mem::take(&mut other.order) {
            let Some(source) = other.polymers.get(pid) else {
                continue;
            };
            let (chain, molecule_type, tags, sl) = (
                source.id.clone(),
                source.molecule_type(),
                source.tags.clone(),
                source.sl,
            );
            let own = source.monomers.clone();
            let ligands = source
                .ligands
                .and_then(|g| other.polymers.get(g))
                .map(|g| g.monomers.clone())
                .unwrap_or_default();

            let new_id = staged.add_polymer(&chain, molecule_type)?;
            if let Some(p) = staged.polymers.get_mut(new_id) {
                p.tags = tags;
                p.sl = sl;
            }
            for mid in own {
                if let Some(m) = other.monomers.remove(mid) {
                    staged.push_monomer(new_id, m)?;
                }
            }
            for mid in ligands {
                if let Some(m) = other.monomers.remove(mid) {
                    staged.push_ligand(new_id, m)?;
                }
            }
        }
        *self = staged;
        Ok(())
    }

    /// Monomer handles of one polymer, followed by its associated ligands when
    /// `ligands` is set.
    pub fn polymer_monomer_ids(&self, polymer: PolymerId, ligands: bool) -> Vec<MonomerId> {
        let Some(p) = self.polymers.get(polymer) else {
            return Vec::new();
        };
        let mut ids = p.monomers.clone();
        if ligands {
            if let Some(group) = p.ligands.and_then(|g| self.polymers.get(g)) {
                ids.extend(group.monomers.iter().copied());
            }
        }
        ids
    }

    /// Monomer handles of the whole assembly in traversal order.
    ///
    /// Each polymer contributes its own monomers and then its ligands. Standalone
    /// ligand groups are skipped when `ligands` is unset.
    pub fn monomer_ids(&self, ligands: bool) -> Vec<MonomerId> {
        self.polymers()
            .filter(|(_, p)| ligands || p.molecule_type().is_polymeric())
            .flat_map(|(id, _)| self.polymer_monomer_ids(id, ligands))
            .collect()
    }

    pub fn get_monomers(&self, ligands: bool) -> impl Iterator<Item = &Monomer> + '_ {
        self.monomer_ids(ligands)
            .into_iter()
            .filter_map(move |id| self.monomers.get(id))
    }

    /// Leaf atoms of the assembly in traversal order.
    ///
    /// # Arguments
    ///
    /// * `ligands` - Include ligand monomers.
    /// * `inc_alt_states` - Include every conformational state rather than only the active one.
    pub fn get_atoms(&self, ligands: bool, inc_alt_states: bool) -> impl Iterator<Item = &Atom> + '_ {
        self.get_monomers(ligands)
            .flat_map(move |m| m.get_atoms(inc_alt_states))
    }

    pub fn polymer_atoms(
        &self,
        polymer: PolymerId,
        ligands: bool,
        inc_alt_states: bool,
    ) -> impl Iterator<Item = &Atom> + '_ {
        self.polymer_monomer_ids(polymer, ligands)
            .into_iter()
            .filter_map(move |id| self.monomers.get(id))
            .flat_map(move |m| m.get_atoms(inc_alt_states))
    }

    /// The chain id of the polymer holding a monomer.
    pub fn chain_of(&self, monomer: MonomerId) -> Option<&str> {
        let pid = self.monomers.get(monomer)?.polymer?;
        self.polymers.get(pid).map(|p| p.id.as_str())
    }

    pub fn monomer_key(&self, monomer: MonomerId) -> Result<MonomerKey, ModelError> {
        let m = self.monomers.get(monomer).ok_or(ModelError::UnknownMonomer)?;
        Ok(m.unique_id(self.chain_of(monomer).unwrap_or_default()))
    }

    pub fn atom_key(&self, monomer: MonomerId, label: &str) -> Result<AtomKey, ModelError> {
        let key = self.monomer_key(monomer)?;
        let m = self.monomers.get(monomer).ok_or(ModelError::UnknownMonomer)?;
        m.atom(label)?;
        Ok(AtomKey {
            monomer: key,
            label: label.to_string(),
        })
    }

    /// Backbone-only copy of a monomer, see [`Monomer::backbone`].
    pub fn backbone_of(&self, monomer: MonomerId) -> Result<Monomer, ModelError> {
        let m = self.monomers.get(monomer).ok_or(ModelError::UnknownMonomer)?;
        m.backbone().map_err(|err| match err {
            ModelError::MissingBackbone {
                residue,
                mol_code,
                missing,
                ..
            } => ModelError::MissingBackbone {
                chain: self.chain_of(monomer).unwrap_or_default().to_string(),
                residue,
                mol_code,
                missing,
            },
            other => other,
        })
    }

    /// A new assembly holding a backbone-only copy of one protein polymer.
    ///
    /// Ligands and tags are not carried over.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotProtein`] for a nucleic-acid or ligand polymer and
    /// [`ModelError::MissingBackbone`] for the first residue lacking N, CA, C or O.
    pub fn polymer_backbone(&self, polymer: PolymerId) -> Result<Assembly, ModelError> {
        let mut backbone = Assembly::new(&self.id);
        self.copy_backbone_into(polymer, &mut backbone)?;
        Ok(backbone)
    }

    /// A new assembly with a backbone-only copy of every protein polymer.
    ///
    /// Nucleic acids and ligands are left out.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingBackbone`] for the first residue lacking N, CA, C or O.
    pub fn backbone(&self) -> Result<Assembly, ModelError> {
        let mut backbone = Assembly::new(&self.id);
        let proteins: Vec<PolymerId> = self
            .polymers()
            .filter(|(_, p)| p.molecule_type() == MoleculeType::Protein)
            .map(|(id, _)| id)
            .collect();
        for pid in proteins {
            self.copy_backbone_into(pid, &mut backbone)?;
        }
        Ok(backbone)
    }

    fn copy_backbone_into(&self, polymer: PolymerId, target: &mut Assembly) -> Result<PolymerId, ModelError> {
        let p = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        if p.molecule_type() != MoleculeType::Protein {
            return Err(ModelError::NotProtein {
                polymer: p.id.clone(),
                found: p.molecule_type(),
            });
        }
        let residues = p
            .monomers
            .iter()
            .map(|&mid| self.backbone_of(mid))
            .collect::<Result<Vec<_>, _>>()?;
        let copy = target.add_polymer(&p.id, MoleculeType::Protein)?;
        if let Some(c) = target.polymers.get_mut(copy) {
            c.sl = p.sl;
        }
        target.extend_polymer(copy, residues)?;
        Ok(copy)
    }

    /// Top-level polymers whose molecule type is not in `excluded`.
    pub fn filter_molecule_types(&self, excluded: &[MoleculeType]) -> Vec<PolymerId> {
        self.polymers()
            .filter(|(_, p)| !excluded.contains(&p.molecule_type()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Rotates every atom of every state, ligands included.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>, pivot: Option<&Point3<f64>>) {
        for monomer in self.monomers.values_mut() {
            monomer.rotate(rotation, pivot);
        }
    }

    pub fn translate(&mut self, vector: &Vector3<f64>) {
        for monomer in self.monomers.values_mut() {
            monomer.translate(vector);
        }
    }

    pub fn rotate_polymer(
        &mut self,
        polymer: PolymerId,
        rotation: &Rotation3<f64>,
        pivot: Option<&Point3<f64>>,
    ) -> Result<(), ModelError> {
        for id in self.owned_monomers(polymer)? {
            if let Some(m) = self.monomers.get_mut(id) {
                m.rotate(rotation, pivot);
            }
        }
        Ok(())
    }

    pub fn translate_polymer(&mut self, polymer: PolymerId, vector: &Vector3<f64>) -> Result<(), ModelError> {
        for id in self.owned_monomers(polymer)? {
            if let Some(m) = self.monomers.get_mut(id) {
                m.translate(vector);
            }
        }
        Ok(())
    }

    /// Renames the top-level polymers, with their ligand groups following their parent.
    ///
    /// Without labels, polymers are named `A`, `B`, `C`, ... in order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LabelCountMismatch`] if the number of labels differs
    /// from the number of polymers.
    pub fn relabel_polymers(&mut self, labels: Option<&[String]>) -> Result<(), ModelError> {
        let labels: Vec<String> = match labels {
            Some(labels) => {
                check_label_count("polymers", self.order.len(), labels.len())?;
                labels.to_vec()
            }
            None => (0..self.order.len()).map(default_chain_label).collect(),
        };
        for (pid, label) in self.order.clone().into_iter().zip(labels) {
            if let Some(group) = self.polymers.get(pid).and_then(|p| p.ligands) {
                if let Some(g) = self.polymers.get_mut(group) {
                    g.id = label.clone();
                }
            }
            if let Some(p) = self.polymers.get_mut(pid) {
                p.id = label;
            }
        }
        Ok(())
    }

    /// Renames the monomers of one polymer (its ligands excluded).
    ///
    /// Without labels, monomers are numbered `1`, `2`, `3`, ... and insertion
    /// codes are cleared.
    pub fn relabel_monomers(&mut self, polymer: PolymerId, labels: Option<&[String]>) -> Result<(), ModelError> {
        let ids = self
            .polymers
            .get(polymer)
            .ok_or(ModelError::UnknownPolymer)?
            .monomers
            .clone();
        let labels: Vec<String> = match labels {
            Some(labels) => {
                check_label_count("monomers", ids.len(), labels.len())?;
                labels.to_vec()
            }
            None => (1..=ids.len()).map(|i| i.to_string()).collect(),
        };
        for (mid, label) in ids.into_iter().zip(labels) {
            if let Some(m) = self.monomers.get_mut(mid) {
                m.id = label;
                m.insertion_code = ' ';
            }
        }
        Ok(())
    }

    /// Renumbers atom serials across the whole assembly in traversal order.
    /// Returns the next unused serial.
    pub fn relabel_atoms(&mut self, start: i64) -> i64 {
        let mut serial = start;
        for id in self.monomer_ids(true) {
            if let Some(m) = self.monomers.get_mut(id) {
                serial = m.relabel_atoms(serial);
            }
        }
        serial
    }

    /// Applies default labels to polymers, monomers and atoms.
    pub fn relabel_all(&mut self) -> Result<(), ModelError> {
        self.relabel_polymers(None)?;
        for pid in self.order.clone() {
            self.relabel_monomers(pid, None)?;
        }
        self.relabel_atoms(1);
        Ok(())
    }

    /// One-letter sequence of a protein or nucleic-acid polymer.
    pub fn sequence(&self, polymer: PolymerId) -> Option<String> {
        let p = self.polymers.get(polymer)?;
        if !p.molecule_type().is_polymeric() {
            return None;
        }
        Some(
            p.monomers
                .iter()
                .filter_map(|&id| self.monomers.get(id))
                .filter_map(Monomer::letter)
                .collect(),
        )
    }

    /// `(chain id, sequence)` for every protein and nucleic-acid polymer.
    pub fn sequences(&self) -> Vec<(String, String)> {
        self.polymers()
            .filter_map(|(id, p)| self.sequence(id).map(|s| (p.id.clone(), s)))
            .collect()
    }

    /// FASTA text with one record per protein or nucleic-acid polymer.
    pub fn fasta(&self) -> String {
        let mut out = String::new();
        for (chain, sequence) in self.sequences() {
            out.push_str(&format!(
                ">{}:{}|PDBID|CHAIN|SEQUENCE\n",
                self.id.to_uppercase(),
                chain
            ));
            let chars: Vec<char> = sequence.chars().collect();
            for line in chars.chunks(FASTA_LINE_WIDTH) {
                out.extend(line.iter());
                out.push('\n');
            }
        }
        out
    }

    /// Every ligand monomer, attached or standalone, optionally without solvent.
    pub fn get_ligands(&self, solvent: bool) -> Vec<MonomerId> {
        let mut ids = Vec::new();
        for (_, p) in self.polymers() {
            let group = match p.ligands {
                Some(g) => self.polymers.get(g),
                None if !p.molecule_type().is_polymeric() => Some(p),
                None => None,
            };
            let Some(group) = group else { continue };
            ids.extend(
                group
                    .monomers
                    .iter()
                    .copied()
                    .filter(|&id| solvent || self.monomers.get(id).is_some_and(|m| !m.is_solvent())),
            );
        }
        ids
    }

    /// Monomers of a polymer from residue id `start` to residue id `end`, inclusive.
    ///
    /// Residues with insertion codes sitting between the two ends are included.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingKey`] if either end is not a residue id of the polymer.
    pub fn monomers_in_range(&self, polymer: PolymerId, start: i64, end: i64) -> Result<Vec<MonomerId>, ModelError> {
        let p = self.polymers.get(polymer).ok_or(ModelError::UnknownPolymer)?;
        let (start_key, end_key) = (start.to_string(), end.to_string());
        let position = |key: &str, last: bool| {
            let matches = |mid: &MonomerId| self.monomers.get(*mid).is_some_and(|m| m.id == key);
            let found = if last {
                p.monomers.iter().rposition(matches)
            } else {
                p.monomers.iter().position(matches)
            };
            found.ok_or_else(|| ModelError::MissingKey {
                kind: "monomer",
                key: key.to_string(),
            })
        };
        let first = position(&start_key, false)?;
        let last = position(&end_key, true)?;
        if first > last {
            return Ok(Vec::new());
        }
        Ok(p.monomers[first..=last].to_vec())
    }

    /// Stores each atom's identity in its tag map under [`UNIQUE_ID_TAG`].
    ///
    /// The value is a list `[chain, hetero flag, residue id, insertion code, label]`.
    /// Existing tags are kept unless `force` is set.
    pub fn tag_atoms_unique_ids(&mut self, force: bool) {
        let mut tagged = 0usize;
        for mid in self.monomer_ids(true) {
            let Ok(key) = self.monomer_key(mid) else {
                continue;
            };
            let Some(m) = self.monomers.get_mut(mid) else {
                continue;
            };
            for atom in m.get_atoms_mut(true) {
                if force || !atom.tags.contains_key(UNIQUE_ID_TAG) {
                    let value = TagValue::List(vec![
                        TagValue::from(key.chain.as_str()),
                        TagValue::from(key.hetero_flag.as_str()),
                        TagValue::from(key.id.as_str()),
                        TagValue::from(key.insertion_code.to_string()),
                        TagValue::from(atom.label()),
                    ]);
                    atom.tags.insert(UNIQUE_ID_TAG.to_string(), value);
                    tagged += 1;
                }
            }
        }
        debug!(assembly = %self.id, tagged, "Tagged atoms with unique ids");
    }

    /// Own monomers of a polymer plus its associated ligands.
    fn owned_monomers(&self, polymer: PolymerId) -> Result<Vec<MonomerId>, ModelError> {
        if !self.polymers.contains_key(polymer) {
            return Err(ModelError::UnknownPolymer);
        }
        Ok(self.polymer_monomer_ids(polymer, true))
    }
}

fn check_label_count(kind: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::LabelCountMismatch { kind, expected, found })
    }
}

/// `A`..`Z`, then `a`..`z`, then `0`..`9`, then decimal indices.
pub(crate) fn default_chain_label(index: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    match ALPHABET.get(index) {
        Some(&c) => (c as char).to_string(),
        None => index.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::monomer::MonomerKind;

    fn residue(code: &str, id: &str, labels: &[&str]) -> Monomer {
        let atoms = labels
            .iter()
            .enumerate()
            .map(|(i, l)| Atom::new(l, &l[..1], Point3::new(i as f64, 0.0, 0.0)));
        Monomer::from_atoms(MonomerKind::Residue, code, id, atoms).unwrap()
    }

    fn ligand(code: &str, id: &str) -> Monomer {
        let atoms = [Atom::new("O", "O", Point3::origin())];
        Monomer::from_atoms(MonomerKind::Ligand, code, id, atoms)
            .unwrap()
            .with_hetero(true)
    }

    fn two_chain_assembly() -> (Assembly, PolymerId, PolymerId) {
        let mut assembly = Assembly::new("1abc");
        let a = assembly.add_polymer("A", MoleculeType::Protein).unwrap();
        let b = assembly.add_polymer("B", MoleculeType::Protein).unwrap();
        for (i, code) in ["ALA", "GLY", "SER"].iter().enumerate() {
            let id = (i + 1).to_string();
            assembly
                .push_monomer(a, residue(code, &id, &["N", "CA", "C", "O"]))
                .unwrap();
        }
        assembly
            .push_monomer(b, residue("TRP", "10", &["N", "CA", "C", "O", "CB"]))
            .unwrap();
        assembly.push_ligand(a, ligand("HOH", "301")).unwrap();
        assembly.push_ligand(a, ligand("HEM", "302")).unwrap();
        (assembly, a, b)
    }

    #[test]
    fn add_polymer_creates_ligand_group_and_rejects_duplicate_chain() {
        let (mut assembly, a, _) = two_chain_assembly();
        let group = assembly.polymer(a).unwrap().ligands().unwrap();
        assert_eq!(assembly.polymer(group).unwrap().owner(), Some(a));
        assert_eq!(assembly.len(), 2);

        let err = assembly.add_polymer("A", MoleculeType::NucleicAcid).unwrap_err();
        assert_eq!(err, ModelError::DuplicateChain { chain: "A".to_string() });
        assert!(assembly.add_polymer("A", MoleculeType::LigandGroup).is_ok());
    }

    #[test]
    fn push_monomer_rejects_mismatched_kind() {
        let (mut assembly, a, _) = two_chain_assembly();
        let err = assembly
            .push_monomer(a, Monomer::new(MonomerKind::Nucleotide, "DA", "4"))
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { expected: MoleculeType::Protein, .. }));
        assert_eq!(assembly.polymer(a).unwrap().len(), 3);
    }

    #[test]
    fn push_monomer_sets_back_references() {
        let (assembly, a, _) = two_chain_assembly();
        let mid = assembly.monomer_at(a, 1).unwrap();
        let monomer = assembly.monomer(mid).unwrap();
        assert_eq!(monomer.polymer(), Some(a));
        assert!(monomer.get_atoms(true).all(|atom| atom.monomer() == Some(mid)));
        assert_eq!(assembly.chain_of(mid), Some("A"));
    }

    #[test]
    fn lookup_distinguishes_missing_key_from_out_of_range() {
        let (assembly, a, _) = two_chain_assembly();
        assert!(matches!(
            assembly.polymer_by_chain("Z").unwrap_err(),
            ModelError::MissingKey { kind: "polymer", .. }
        ));
        assert!(matches!(
            assembly.polymer_at(5).unwrap_err(),
            ModelError::IndexOutOfRange { kind: "polymer", index: 5, len: 2 }
        ));
        assert!(matches!(
            assembly.monomer_by_id(a, "99").unwrap_err(),
            ModelError::MissingKey { kind: "monomer", .. }
        ));
        let mid = assembly.monomer_by_id(a, "2").unwrap();
        assert_eq!(assembly.monomer(mid).unwrap().mol_code, "GLY");
    }

    #[test]
    fn traversal_includes_ligands_on_request() {
        let (assembly, _, _) = two_chain_assembly();
        assert_eq!(assembly.get_monomers(false).count(), 4);
        assert_eq!(assembly.get_monomers(true).count(), 6);
        assert_eq!(assembly.get_atoms(false, false).count(), 17);
        assert_eq!(assembly.get_atoms(true, true).count(), 19);
    }

    #[test]
    fn get_ligands_can_exclude_solvent() {
        let (assembly, _, _) = two_chain_assembly();
        assert_eq!(assembly.get_ligands(true).len(), 2);
        let no_water = assembly.get_ligands(false);
        assert_eq!(no_water.len(), 1);
        assert_eq!(assembly.monomer(no_water[0]).unwrap().mol_code, "HEM");
    }

    #[test]
    fn relabel_polymers_checks_label_count_and_renames_ligand_groups() {
        let (mut assembly, a, _) = two_chain_assembly();
        let err = assembly.relabel_polymers(Some(&["X".to_string()])).unwrap_err();
        assert_eq!(
            err,
            ModelError::LabelCountMismatch { kind: "polymers", expected: 2, found: 1 }
        );

        assembly
            .relabel_polymers(Some(&["H".to_string(), "L".to_string()]))
            .unwrap();
        let group = assembly.polymer(a).unwrap().ligands().unwrap();
        assert_eq!(assembly.polymer(a).unwrap().id, "H");
        assert_eq!(assembly.polymer(group).unwrap().id, "H");

        assembly.relabel_polymers(None).unwrap();
        assert_eq!(assembly.polymer(a).unwrap().id, "A");
    }

    #[test]
    fn relabel_all_numbers_monomers_and_atoms() {
        let (mut assembly, _, b) = two_chain_assembly();
        assembly.relabel_all().unwrap();
        let mid = assembly.monomer_at(b, 0).unwrap();
        assert_eq!(assembly.monomer(mid).unwrap().id, "1");
        let serials: Vec<i64> = assembly.get_atoms(true, true).map(|a| a.serial).collect();
        assert_eq!(serials, (1..=19).collect::<Vec<_>>());
    }

    #[test]
    fn sequences_and_fasta_cover_polymeric_chains() {
        let (assembly, _, _) = two_chain_assembly();
        assert_eq!(
            assembly.sequences(),
            vec![("A".to_string(), "AGS".to_string()), ("B".to_string(), "W".to_string())]
        );
        let fasta = assembly.fasta();
        assert!(fasta.starts_with(">1ABC:A|PDBID|CHAIN|SEQUENCE\nAGS\n"));
        assert_eq!(fasta.lines().count(), 4);
    }

    #[test]
    fn fasta_wraps_long_sequences() {
        let mut assembly = Assembly::new("long");
        let a = assembly.add_polymer("A", MoleculeType::Protein).unwrap();
        for i in 0..100 {
            assembly
                .push_monomer(a, residue("ALA", &i.to_string(), &["CA"]))
                .unwrap();
        }
        let fasta = assembly.fasta();
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines[1].len(), 79);
        assert_eq!(lines[2].len(), 21);
    }

    #[test]
    fn monomers_in_range_is_inclusive() {
        let (assembly, a, _) = two_chain_assembly();
        let ids = assembly.monomers_in_range(a, 2, 3).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(assembly.monomers_in_range(a, 2, 8).is_err());
    }

    #[test]
    fn tag_atoms_unique_ids_respects_force() {
        let (mut assembly, a, _) = two_chain_assembly();
        assembly.tag_atoms_unique_ids(false);
        let mid = assembly.monomer_at(a, 0).unwrap();
        let tag = assembly.monomer(mid).unwrap().atom("CA").unwrap().tags[UNIQUE_ID_TAG].clone();
        assert_eq!(tag.to_string(), "[A,  , 1,  , CA]");

        assembly.relabel_polymers(Some(&["Q".to_string(), "R".to_string()])).unwrap();
        assembly.tag_atoms_unique_ids(false);
        let kept = &assembly.monomer(mid).unwrap().atom("CA").unwrap().tags[UNIQUE_ID_TAG];
        assert_eq!(kept, &tag);
        assembly.tag_atoms_unique_ids(true);
        let forced = &assembly.monomer(mid).unwrap().atom("CA").unwrap().tags[UNIQUE_ID_TAG];
        assert!(forced.to_string().starts_with("[Q,"));
    }

    #[test]
    fn backbone_of_names_the_chain() {
        let (mut assembly, _, b) = two_chain_assembly();
        let partial = assembly.push_monomer(b, residue("GLY", "11", &["CA"])).unwrap();
        match assembly.backbone_of(partial).unwrap_err() {
            ModelError::MissingBackbone { chain, missing, .. } => {
                assert_eq!(chain, "B");
                assert_eq!(missing.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn polymer_backbone_keeps_only_main_chain_atoms() {
        let (assembly, _, b) = two_chain_assembly();
        let backbone = assembly.polymer_backbone(b).unwrap();
        assert_eq!(backbone.id, "1abc");
        assert_eq!(backbone.len(), 1);
        let chain = backbone.polymer_by_chain("B").unwrap();
        let labels: Vec<&str> = backbone.polymer_atoms(chain, true, true).map(|a| a.label()).collect();
        assert_eq!(labels, vec!["N", "CA", "C", "O"]);
        assert_eq!(assembly.get_atoms(false, false).count(), 17);
    }

    #[test]
    fn polymer_backbone_rejects_ligand_groups_and_partial_residues() {
        let (mut assembly, a, b) = two_chain_assembly();
        let group = assembly.polymer(a).unwrap().ligands().unwrap();
        assert!(matches!(
            assembly.polymer_backbone(group).unwrap_err(),
            ModelError::NotProtein { found: MoleculeType::LigandGroup, .. }
        ));

        assembly.push_monomer(b, residue("GLY", "11", &["N", "CA"])).unwrap();
        match assembly.polymer_backbone(b).unwrap_err() {
            ModelError::MissingBackbone { chain, residue, missing, .. } => {
                assert_eq!(chain, "B");
                assert_eq!(residue, "11");
                assert_eq!(missing, vec!["C".to_string(), "O".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn assembly_backbone_drops_ligands_and_nucleic_acids() {
        let (mut assembly, _, _) = two_chain_assembly();
        let dna = assembly.add_polymer("D", MoleculeType::NucleicAcid).unwrap();
        let da = Monomer::from_atoms(MonomerKind::Nucleotide, "DA", "1", [Atom::new("P", "P", Point3::origin())])
            .unwrap();
        assembly.push_monomer(dna, da).unwrap();

        let backbone = assembly.backbone().unwrap();
        assert_eq!(backbone.len(), 2);
        assert_eq!(backbone.get_monomers(true).count(), 4);
        assert_eq!(backbone.get_atoms(true, true).count(), 16);
        assert!(backbone.polymer_by_chain("D").is_err());
        assert_eq!(backbone.sequences(), assembly.sequences()[..2].to_vec());
    }

    #[test]
    fn assembly_backbone_fails_on_any_incomplete_residue() {
        let (mut assembly, a, _) = two_chain_assembly();
        assembly.push_monomer(a, residue("LYS", "4", &["CA", "CB"])).unwrap();
        assert!(matches!(
            assembly.backbone().unwrap_err(),
            ModelError::MissingBackbone { ref chain, .. } if chain == "A"
        ));
    }

    #[test]
    fn filter_molecule_types_excludes_the_given_types() {
        let (mut assembly, a, b) = two_chain_assembly();
        let solo = assembly.add_polymer("C", MoleculeType::LigandGroup).unwrap();
        assembly.push_monomer(solo, ligand("SO4", "500")).unwrap();

        assert_eq!(assembly.filter_molecule_types(&[MoleculeType::LigandGroup]), vec![a, b]);
        assert_eq!(assembly.filter_molecule_types(&[MoleculeType::Protein]), vec![solo]);
        assert_eq!(assembly.filter_molecule_types(&[]).len(), 3);
    }

    #[test]
    fn extend_moves_polymers_and_checks_chains() {
        let (mut first, _, _) = two_chain_assembly();
        let mut second = Assembly::new("2xyz");
        let c = second.add_polymer("C", MoleculeType::Protein).unwrap();
        second.push_monomer(c, residue("ALA", "1", &["CA"])).unwrap();
        second.push_ligand(c, ligand("SO4", "400")).unwrap();

        first.extend(second).unwrap();
        assert_eq!(first.len(), 3);
        let c = first.polymer_by_chain("C").unwrap();
        assert_eq!(first.polymer_monomer_ids(c, true).len(), 2);

        let (dup, _, _) = two_chain_assembly();
        assert!(first.extend(dup).is_err());
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn translate_polymer_moves_its_ligands_only() {
        let (mut assembly, a, b) = two_chain_assembly();
        assembly.translate_polymer(a, &Vector3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(assembly.polymer_atoms(a, true, true).all(|atom| atom.y() == 5.0));
        assert!(assembly.polymer_atoms(b, true, true).all(|atom| atom.y() == 0.0));
    }

    #[test]
    fn default_chain_labels_extend_past_alphabet() {
        assert_eq!(default_chain_label(0), "A");
        assert_eq!(default_chain_label(26), "a");
        assert_eq!(default_chain_label(61), "9");
        assert_eq!(default_chain_label(62), "62");
    }
}
