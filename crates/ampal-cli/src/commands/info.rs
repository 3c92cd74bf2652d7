use super::read_structure;
use crate::cli::InfoArgs;
use crate::config::AppConfig;
use crate::error::Result;
use ampal::core::io::pdb::ParseOutcome;
use ampal::core::models::assembly::Assembly;
use std::fmt::Write as _;
use tracing::info;

pub fn run(args: InfoArgs, config: &AppConfig) -> Result<()> {
    let mut registry = config.load_registry()?;
    let outcome = read_structure(&args.input, &config.read, &mut registry)?;
    print!("{}", summarize(&outcome, args.sequences));
    config.persist_registry(&registry, outcome.new_labels)?;
    info!("Summary printed for '{}'.", outcome.structure.id());
    Ok(())
}

/// Human-readable report of a parsed structure.
pub fn summarize(outcome: &ParseOutcome, sequences: bool) -> String {
    let structure = &outcome.structure;
    let mut out = String::new();
    let _ = writeln!(out, "Structure: {}", structure.id());
    let _ = writeln!(out, "Models:    {}", structure.model_count());
    let records: usize = outcome.info.values().map(Vec::len).sum();
    let _ = writeln!(out, "Other records: {} ({} keyword(s))", records, outcome.info.len());
    if outcome.new_labels {
        let _ = writeln!(out, "New atom labels were learned from this file.");
    }
    for assembly in structure.assemblies() {
        summarize_assembly(&mut out, assembly, sequences);
    }
    out
}

fn summarize_assembly(out: &mut String, assembly: &Assembly, sequences: bool) {
    let _ = writeln!(out);
    let _ = writeln!(out, "Assembly {}", assembly.id);
    for (pid, polymer) in assembly.polymers() {
        let ligands = polymer
            .ligands()
            .and_then(|group| assembly.polymer(group))
            .map_or(0, |group| group.len());
        let _ = writeln!(
            out,
            "  Chain {:<2} {:<13} {:>5} monomer(s) {:>5} ligand(s)",
            polymer.id,
            polymer.molecule_type().to_string(),
            polymer.len(),
            ligands
        );
        if sequences {
            if let Some(sequence) = assembly.sequence(pid) {
                let _ = writeln!(out, "    {}", sequence);
            }
        }
    }

    let alternates: Vec<String> = assembly
        .monomer_ids(true)
        .into_iter()
        .filter(|&id| assembly.monomer(id).is_some_and(|m| m.has_alternate_states()))
        .filter_map(|id| {
            let monomer = assembly.monomer(id)?;
            let key = assembly.monomer_key(id).ok()?;
            let states: String = monomer.state_labels().collect();
            Some(format!("{} {} [{}]", key, monomer.mol_code, states))
        })
        .collect();
    if !alternates.is_empty() {
        let _ = writeln!(out, "  Alternate states:");
        for line in alternates {
            let _ = writeln!(out, "    {}", line);
        }
    }
    let atoms = assembly.get_atoms(true, false).count();
    let _ = writeln!(out, "  Atoms (active states): {}", atoms);
}
