use super::labels::{ATOM_NAME_WIDTH, LabelRegistry};
use crate::core::models::assembly::Assembly;
use crate::core::models::atom::{Atom, DEFAULT_STATE};
use crate::core::models::container::{Container, Structure};
use crate::core::models::error::ModelError;
use crate::core::models::ids::PolymerId;
use crate::core::models::monomer::Monomer;
use crate::core::models::polymer::Polymer;
use crate::core::models::tags::TagValue;
use serde::{Deserialize, Serialize};

/// Width every fixed-format record is padded to.
pub const RECORD_WIDTH: usize = 80;

/// Monomer tag overriding the chain column of its atoms.
pub const CHAIN_ID_TAG: &str = "chain_id";

const EXPDTA_TEXT: &str = "THEORETICAL MODEL";

/// Options controlling serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WriteOptions {
    /// Include ligand groups.
    pub ligands: bool,
    /// Write every state of monomers with alternate states.
    pub alt_states: bool,
    /// Blank the alternate-location column.
    pub strip_states: bool,
    /// Start with HEADER and EXPDTA records.
    pub header: bool,
    /// Finish with an END record.
    pub footer: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            ligands: true,
            alt_states: false,
            strip_states: false,
            header: true,
            footer: true,
        }
    }
}

/// The last `width` characters of `value`.
///
/// Over-long fields are cut from the left so they never spill into the next column.
pub fn cap(value: &str, width: usize) -> &str {
    let len = value.chars().count();
    if len <= width {
        return value;
    }
    let start = value
        .char_indices()
        .nth(len - width)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &value[start..]
}

fn padded(text: &str) -> String {
    format!("{:<width$}\n", text, width = RECORD_WIDTH)
}

/// Renders the coordinate records of a run of monomers.
///
/// # Arguments
///
/// * `monomers` - The monomers, in output order.
/// * `chain_id` - Chain column value; ids longer than one character are written blank.
/// * `alt_states` - Write every state of monomers with alternate states.
/// * `strip_states` - Blank the alternate-location column and write only active states.
/// * `registry` - Atom-name column layouts.
pub fn write_monomers<'a, I>(
    monomers: I,
    chain_id: &str,
    alt_states: bool,
    strip_states: bool,
    registry: &LabelRegistry,
) -> String
where
    I: IntoIterator<Item = &'a Monomer>,
{
    let mut out = String::new();
    for monomer in monomers {
        render_monomer(&mut out, monomer, &monomer.id, chain_id, alt_states, strip_states, registry);
    }
    out
}

fn render_monomer(
    out: &mut String,
    monomer: &Monomer,
    residue_id: &str,
    chain_id: &str,
    alt_states: bool,
    strip_states: bool,
    registry: &LabelRegistry,
) {
    let chain = match monomer.tags.get(CHAIN_ID_TAG) {
        Some(TagValue::Text(tagged)) => tagged.as_str(),
        _ if chain_id.chars().count() > 1 => " ",
        _ => chain_id,
    };
    let all_states = monomer.has_alternate_states() && alt_states && !strip_states;

    let atoms: Box<dyn Iterator<Item = &Atom> + '_> = if all_states {
        Box::new(monomer.get_atoms(true).filter(|atom| !atom.is_backfilled()))
    } else {
        Box::new(monomer.atoms().iter())
    };
    for atom in atoms {
        let alt_loc = if strip_states || (!all_states && atom.state() == DEFAULT_STATE) {
            ' '
        } else {
            atom.state()
        };
        out.push_str(&format_atom_line(atom, monomer, residue_id, chain, alt_loc, registry));
        out.push('\n');
    }
}

/// One fixed-column ATOM or HETATM line, without the trailing newline.
pub fn format_atom_line(
    atom: &Atom,
    monomer: &Monomer,
    residue_id: &str,
    chain: &str,
    alt_loc: char,
    registry: &LabelRegistry,
) -> String {
    let record = if monomer.is_hetero { "HETATM" } else { "ATOM" };
    let serial = atom.serial.to_string();
    let name = registry.column(atom.label());
    let x = format!("{:.3}", atom.x());
    let y = format!("{:.3}", atom.y());
    let z = format!("{:.3}", atom.z());
    let occupancy = format!("{:.2}", atom.occupancy);
    let temp_factor = format!("{:.2}", atom.temp_factor);
    let insertion_code = monomer.insertion_code.to_string();

    format!(
        "{:<6}{:>5} {:<4}{:1}{:>3} {:1}{:>4}{:1}   {:>8}{:>8}{:>8}{:>6}{:>6}          {:>2}{:<2}",
        record,
        cap(&serial, 5),
        cap(&name, ATOM_NAME_WIDTH),
        alt_loc,
        cap(&monomer.mol_code, 3),
        cap(chain, 1),
        cap(residue_id, 4),
        cap(&insertion_code, 1),
        cap(&x, 8),
        cap(&y, 8),
        cap(&z, 8),
        cap(&occupancy, 6),
        cap(&temp_factor, 6),
        cap(&atom.element, 2),
        cap(&atom.charge, 2),
    )
}

impl Monomer {
    /// Coordinate records of the active state.
    pub fn to_pdb(&self, chain_id: &str, registry: &LabelRegistry) -> String {
        write_monomers(std::iter::once(self), chain_id, false, false, registry)
    }
}

impl Assembly {
    /// Coordinate records of one polymer, followed by its ligands when requested.
    ///
    /// If any of the polymer's own monomers has an empty id, its monomers are
    /// written numbered from 1 in order.
    pub fn polymer_to_pdb(
        &self,
        polymer: PolymerId,
        options: &WriteOptions,
        registry: &LabelRegistry,
    ) -> Result<String, ModelError> {
        let p = self.polymer(polymer).ok_or(ModelError::UnknownPolymer)?;
        Ok(self.render_polymer(p, options, registry))
    }

    fn render_polymer(&self, p: &Polymer, options: &WriteOptions, registry: &LabelRegistry) -> String {
        let own: Vec<&Monomer> = p.monomer_ids().iter().filter_map(|&id| self.monomer(id)).collect();
        let renumber = own.iter().any(|m| m.id.is_empty());

        let mut out = String::new();
        for (i, monomer) in own.iter().enumerate() {
            let residue_id = if renumber { (i + 1).to_string() } else { monomer.id.clone() };
            render_monomer(
                &mut out,
                monomer,
                &residue_id,
                &p.id,
                options.alt_states,
                options.strip_states,
                registry,
            );
        }
        if options.ligands {
            if let Some(group) = p.ligands().and_then(|g| self.polymer(g)) {
                let ligands = group.monomer_ids().iter().filter_map(|&id| self.monomer(id));
                out.push_str(&write_monomers(
                    ligands,
                    &p.id,
                    options.alt_states,
                    options.strip_states,
                    registry,
                ));
            }
        }
        out
    }

    /// PDB text for the assembly: one block per polymer, each closed by TER.
    pub fn to_pdb(&self, options: &WriteOptions, registry: &LabelRegistry) -> String {
        let mut out = String::new();
        if options.header {
            push_header(&mut out, &self.id);
        }
        for (_, polymer) in self.polymers() {
            if !options.ligands && !polymer.molecule_type().is_polymeric() {
                continue;
            }
            out.push_str(&self.render_polymer(polymer, options, registry));
            out.push_str(&padded("TER"));
        }
        if options.footer {
            out.push_str(&padded("END"));
        }
        out
    }
}

impl Container {
    /// PDB text for every model, separated and closed by ENDMDL records.
    pub fn to_pdb(&self, options: &WriteOptions, registry: &LabelRegistry) -> String {
        let body_options = WriteOptions {
            header: false,
            footer: false,
            ..*options
        };
        let mut out = String::new();
        if options.header {
            push_header(&mut out, &self.id);
        }
        for assembly in self.iter() {
            out.push_str(&assembly.to_pdb(&body_options, registry));
            out.push_str("ENDMDL\n");
        }
        if options.footer {
            out.push_str(&padded("END"));
        }
        out
    }
}

impl Structure {
    pub fn to_pdb(&self, options: &WriteOptions, registry: &LabelRegistry) -> String {
        match self {
            Structure::Assembly(a) => a.to_pdb(options, registry),
            Structure::Container(c) => c.to_pdb(options, registry),
        }
    }
}

fn push_header(out: &mut String, id: &str) {
    out.push_str(&padded(&format!("HEADER    {}", id)));
    out.push_str(&padded(&format!("EXPDTA    {}", EXPDTA_TEXT)));
}
