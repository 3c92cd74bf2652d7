use super::read_structure;
use crate::cli::CheckArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::BatchProgress;
use ampal::core::io::pdb::{LabelRegistry, ParseOptions, WriteOptions, parse_str};
use ampal::core::models::container::Structure;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Atom counts keyed by (element, residue name).
type Composition = BTreeMap<(String, String), usize>;

pub fn run(args: CheckArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let mut registry = config.load_registry()?;
    let total = args.inputs.len();
    let progress = BatchProgress::new(total as u64, quiet);
    let mut failed = 0;
    let mut learned = false;

    for path in &args.inputs {
        progress.start(&path.display().to_string());
        let problems = match read_structure(path, &config.read, &mut registry) {
            Ok(outcome) => {
                learned |= outcome.new_labels;
                verify(&outcome.structure, &registry)
            }
            Err(e) => vec![e.to_string()],
        };
        if problems.is_empty() {
            progress.println(&format!("✓ {}", path.display()));
        } else {
            failed += 1;
            for problem in &problems {
                warn!("{}: {}", path.display(), problem);
                progress.println(&format!("✗ {}: {}", path.display(), problem));
            }
        }
        progress.advance();
    }
    progress.finish("Done");
    config.persist_registry(&registry, learned)?;

    info!("{} of {} file(s) passed the round-trip check.", total - failed, total);
    if failed > 0 {
        return Err(CliError::CheckFailed { failed, total });
    }
    Ok(())
}

/// Serializes the structure with every state, parses the output back and
/// compares. Returns a description of each discrepancy.
pub fn verify(structure: &Structure, registry: &LabelRegistry) -> Vec<String> {
    let options = WriteOptions {
        alt_states: true,
        strip_states: false,
        ligands: true,
        ..WriteOptions::default()
    };
    let first = structure.to_pdb(&options, registry);
    let mut scratch = registry.clone();
    let reparsed = match parse_str(&first, &ParseOptions::default().with_id(structure.id()), &mut scratch) {
        Ok(outcome) => outcome.structure,
        Err(e) => return vec![format!("serialized output does not parse: {}", e)],
    };

    let mut problems = Vec::new();
    if reparsed.model_count() != structure.model_count() {
        problems.push(format!(
            "model count changed from {} to {}",
            structure.model_count(),
            reparsed.model_count()
        ));
    }
    let (before, after) = (composition(structure), composition(&reparsed));
    let (count_before, count_after): (usize, usize) = (before.values().sum(), after.values().sum());
    if count_before != count_after {
        problems.push(format!("atom count changed from {} to {}", count_before, count_after));
    } else if before != after {
        problems.push("atom composition changed".to_string());
    }
    if reparsed.to_pdb(&options, &scratch) != first {
        problems.push("re-serialization is not idempotent".to_string());
    }
    problems
}

fn composition(structure: &Structure) -> Composition {
    let mut counts = Composition::new();
    for assembly in structure.assemblies() {
        for monomer in assembly.get_monomers(true) {
            for atom in monomer.get_atoms(true).filter(|a| !a.is_backfilled()) {
                *counts
                    .entry((atom.element.clone(), monomer.mol_code.clone()))
                    .or_insert(0) += 1;
            }
        }
    }
    counts
}
