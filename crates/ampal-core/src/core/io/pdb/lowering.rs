use super::error::PdbError;
use super::filters::{HeteroFilter, default_filters};
use super::tree::{ChainMarker, ChainTree, ModelTree, ParseTree, ResidueKey, ResidueLabel, ResidueTree};
use crate::core::models::assembly::Assembly;
use crate::core::models::atom::{Atom, DEFAULT_STATE};
use crate::core::models::container::{Container, Structure};
use crate::core::models::error::ModelError;
use crate::core::models::monomer::{Monomer, MonomerKind};
use crate::core::models::polymer::MoleculeType;
use nalgebra::Point3;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument, warn};

/// Turns a [`ParseTree`] into the structural hierarchy.
///
/// Lowering is all-or-nothing: either every model lowers cleanly or an error
/// is returned and nothing is exposed.
#[derive(Debug)]
pub struct Lowering {
    filters: Vec<Box<dyn HeteroFilter>>,
}

impl Default for Lowering {
    fn default() -> Self {
        Self {
            filters: default_filters(),
        }
    }
}

impl Lowering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the hetero-residue filters. With no filters, every HETATM
    /// residue becomes a ligand.
    pub fn with_filters(filters: Vec<Box<dyn HeteroFilter>>) -> Self {
        Self { filters }
    }

    /// Lowers every non-empty model of the tree.
    ///
    /// A tree that saw an ENDMDL record lowers to a [`Container`] whose
    /// assemblies are named `{id}_state_{n}` (1-based model number); otherwise
    /// to a single [`Assembly`] named `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::EmptyStructure`] if no model holds any record, and
    /// the chain and residue classification errors of [`PdbError`].
    #[instrument(skip_all, name = "pdb_lowering", fields(id = %id))]
    pub fn lower(&self, tree: &ParseTree, id: &str) -> Result<Structure, PdbError> {
        let models: Vec<(usize, &ModelTree)> = tree
            .models
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.chains.is_empty())
            .collect();
        if models.is_empty() {
            return Err(PdbError::EmptyStructure);
        }

        if !tree.multi_model {
            let (index, model) = models[0];
            let assembly = self.lower_model(model, index, id)?;
            info!(
                polymers = assembly.len(),
                monomers = assembly.get_monomers(true).count(),
                "Lowered single-model structure."
            );
            return Ok(Structure::Assembly(assembly));
        }

        let topology = |m: &ModelTree| m.chains.keys().cloned().collect::<BTreeSet<String>>();
        let reference = topology(models[0].1);
        let mut container = Container::new(id);
        for (index, model) in models {
            if topology(model) != reference {
                warn!(model = index + 1, "Model chain ids differ from the first model.");
            }
            let assembly_id = format!("{}_state_{}", id, index + 1);
            container.push(self.lower_model(model, index, &assembly_id)?);
        }
        info!(models = container.len(), "Lowered multi-model structure.");
        Ok(Structure::Container(container))
    }

    fn lower_model(&self, model: &ModelTree, index: usize, assembly_id: &str) -> Result<Assembly, PdbError> {
        let mut assembly = Assembly::new(assembly_id);
        for (chain_id, chain) in model.chains.iter() {
            self.lower_chain(&mut assembly, chain_id, chain, index)?;
        }
        debug!(assembly = assembly_id, polymers = assembly.len(), "Lowered model.");
        Ok(assembly)
    }

    fn lower_chain(
        &self,
        assembly: &mut Assembly,
        chain_id: &str,
        chain: &ChainTree,
        model: usize,
    ) -> Result<(), PdbError> {
        let unknown = |key: &ResidueKey| PdbError::UnknownMonomerType {
            model,
            chain: chain_id.to_string(),
            residue: key.to_string(),
        };

        let Some(molecule_type) = classify_chain(chain, chain_id, model)? else {
            return match chain.residues.keys().next() {
                Some(key) => Err(unknown(key)),
                None => Ok(()),
            };
        };
        let polymer = assembly.add_polymer(chain_id, molecule_type)?;

        for (key, residue) in chain.residues.iter() {
            let label = residue_label(residue, key, chain_id, model)?.ok_or_else(|| unknown(key))?;
            if !label.hetero {
                let kind = match molecule_type {
                    MoleculeType::Protein => MonomerKind::Residue,
                    MoleculeType::NucleicAcid => MonomerKind::Nucleotide,
                    MoleculeType::LigandGroup => return Err(unknown(key)),
                };
                let monomer = build_monomer(residue, key, &label.res_name, kind, false)?;
                assembly.push_monomer(polymer, monomer)?;
                continue;
            }

            let placement = self
                .filters
                .iter()
                .find_map(|f| f.classify(&label.res_name, residue));
            match placement {
                Some(p) if p.on_chain && molecule_type.accepts(p.kind) => {
                    let monomer = build_monomer(residue, key, &label.res_name, p.kind, true)?;
                    assembly.push_monomer(polymer, monomer)?;
                }
                _ => {
                    let monomer = build_monomer(residue, key, &label.res_name, MonomerKind::Ligand, true)?;
                    assembly.push_ligand(polymer, monomer)?;
                }
            }
        }
        Ok(())
    }
}

/// Decides the molecule type of a chain from its markers.
///
/// Returns `None` for a chain without markers.
fn classify_chain(chain: &ChainTree, chain_id: &str, model: usize) -> Result<Option<MoleculeType>, PdbError> {
    let protein = chain.markers.get(&ChainMarker::Protein);
    let nucleic = chain.markers.get(&ChainMarker::NucleicAcid);
    let hetero = chain.markers.get(&ChainMarker::Hetero);
    match (protein, nucleic, hetero) {
        (Some(&p), Some(&n), _) => Err(PdbError::ChainTypeConflict {
            model,
            chain: chain_id.to_string(),
            line: p.max(n),
        }),
        (Some(_), None, _) => Ok(Some(MoleculeType::Protein)),
        (None, Some(_), _) => Ok(Some(MoleculeType::NucleicAcid)),
        (None, None, Some(_)) => Ok(Some(MoleculeType::LigandGroup)),
        (None, None, None) => Ok(None),
    }
}

/// The single label of a residue, `None` if it has none.
fn residue_label<'a>(
    residue: &'a ResidueTree,
    key: &ResidueKey,
    chain_id: &str,
    model: usize,
) -> Result<Option<&'a ResidueLabel>, PdbError> {
    if residue.labels.len() > 1 {
        return Err(PdbError::ConflictingResidueRecords {
            model,
            chain: chain_id.to_string(),
            residue: key.to_string(),
            labels: residue.labels.iter().map(ToString::to_string).collect(),
            line: residue.first_line,
        });
    }
    Ok(residue.labels.first())
}

/// Builds a monomer from a residue's records and reconciles its states.
///
/// A blank alternate location maps to the default state.
pub(crate) fn build_monomer(
    residue: &ResidueTree,
    key: &ResidueKey,
    res_name: &str,
    kind: MonomerKind,
    hetero: bool,
) -> Result<Monomer, PdbError> {
    let mut seen: HashSet<(char, &str)> = HashSet::new();
    let mut atoms = Vec::with_capacity(residue.records().count());
    for record in residue.records() {
        let invalid = |source: ModelError| PdbError::InvalidAtom {
            line: record.line,
            source,
        };
        let state = record.alt_loc.unwrap_or(DEFAULT_STATE);
        if !seen.insert((state, record.name.as_str())) {
            return Err(invalid(ModelError::DuplicateAtomLabel {
                label: record.name.clone(),
                state,
            }));
        }
        let mut atom = Atom::new(
            &record.name,
            &record.element,
            Point3::new(record.x, record.y, record.z),
        )
        .with_serial(record.serial)
        .with_state(state)
        .map_err(invalid)?;
        atom.occupancy = record.occupancy;
        atom.temp_factor = record.temp_factor;
        atom.charge = record.charge.clone();
        atoms.push(atom);
    }

    let mut monomer = Monomer::from_atoms(kind, res_name, &key.seq.to_string(), atoms)?
        .with_insertion_code(key.insertion_code)
        .with_hetero(hetero);
    let copies = monomer.reconcile_states()?;
    if copies > 0 {
        debug!(
            residue = %key,
            mol_code = res_name,
            copies,
            "Backfilled atoms missing from alternate states."
        );
    }
    Ok(monomer)
}
