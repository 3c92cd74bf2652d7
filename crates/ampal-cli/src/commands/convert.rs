use super::read_structure;
use crate::cli::ConvertArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use ampal::core::io::pdb::{LabelRegistry, PdbFile, WriteOptions};
use ampal::core::io::traits::StructureFile;
use ampal::core::models::container::Structure;
use tracing::{info, warn};

pub fn run(args: ConvertArgs, config: &AppConfig) -> Result<()> {
    let mut registry = config.load_registry()?;
    let outcome = read_structure(&args.input, &config.read, &mut registry)?;
    let structure = transform(outcome.structure, args.model, args.relabel)?;

    if args.fasta {
        let fasta = to_fasta(&structure);
        if fasta.is_empty() {
            warn!("'{}' has no protein or nucleic-acid chains; FASTA output is empty.", structure.id());
        }
        std::fs::write(&args.output, fasta)?;
    } else {
        write_pdb(&structure, &config.write, &registry, &args)?;
    }
    config.persist_registry(&registry, outcome.new_labels)?;

    println!("✓ Wrote {}", args.output.display());
    Ok(())
}

/// Applies model selection (1-based) and relabeling.
pub fn transform(structure: Structure, model: Option<usize>, relabel: bool) -> Result<Structure> {
    let mut structure = match model {
        Some(0) => {
            return Err(CliError::Argument("model numbers start at 1".to_string()));
        }
        Some(n) => {
            info!("Selecting model {} of {}.", n, structure.model_count());
            Structure::Assembly(structure.into_model(n - 1)?)
        }
        None => structure,
    };
    if relabel {
        for assembly in structure.assemblies_mut() {
            assembly.relabel_all()?;
        }
        info!("Relabeled chains, residues and atoms.");
    }
    Ok(structure)
}

/// FASTA records of every model, one after another.
pub fn to_fasta(structure: &Structure) -> String {
    structure.assemblies().into_iter().map(|a| a.fasta()).collect()
}

fn write_pdb(structure: &Structure, options: &WriteOptions, registry: &LabelRegistry, args: &ConvertArgs) -> Result<()> {
    info!("Writing PDB records to {:?}", &args.output);
    PdbFile::write_to_path(structure, options, registry, &args.output).map_err(|source| CliError::FileWriting {
        path: args.output.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::WriteFlags;
    use crate::commands::fixtures::{TWO_CHAINS, TWO_MODELS};
    use crate::config::{Overrides, PartialConfig};
    use ampal::core::io::pdb::{ParseOptions, parse_str};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn parse(text: &str) -> Structure {
        let mut registry = LabelRegistry::new();
        parse_str(text, &ParseOptions::default().with_id("demo"), &mut registry)
            .unwrap()
            .structure
    }

    fn convert_args(input: PathBuf, output: PathBuf, write: WriteFlags) -> ConvertArgs {
        ConvertArgs {
            input,
            output,
            write,
            relabel: false,
            model: None,
            fasta: false,
        }
    }

    #[test]
    fn selecting_a_model_yields_a_single_assembly() {
        let structure = transform(parse(TWO_MODELS), Some(2), false).unwrap();
        let assembly = structure.as_assembly().unwrap();
        assert_eq!(assembly.id, "demo_state_2");
        let x = assembly.get_atoms(true, false).next().unwrap().x();
        assert_eq!(x, 2.0);
    }

    #[test]
    fn model_zero_and_out_of_range_models_are_rejected() {
        assert!(matches!(
            transform(parse(TWO_MODELS), Some(0), false),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            transform(parse(TWO_MODELS), Some(3), false),
            Err(CliError::Model(_))
        ));
    }

    #[test]
    fn fasta_output_has_one_record_per_chain() {
        let fasta = to_fasta(&parse(TWO_CHAINS));
        assert_eq!(fasta, ">DEMO:A|PDBID|CHAIN|SEQUENCE\nAS\n>DEMO:B|PDBID|CHAIN|SEQUENCE\nG\n");
    }

    #[test]
    fn run_writes_pdb_honouring_flags() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("two.pdb");
        let output = dir.path().join("out.pdb");
        std::fs::write(&input, TWO_CHAINS).unwrap();

        let flags = WriteFlags {
            no_ligands: true,
            no_header: true,
            ..WriteFlags::default()
        };
        let overrides = Overrides {
            write: flags,
            ..Overrides::default()
        };
        let config = PartialConfig::default().resolve(&overrides).unwrap();
        run(convert_args(input, output.clone(), flags), &config).unwrap();

        let written = std::fs::read_to_string(output).unwrap();
        assert!(!written.contains("HEADER"));
        assert!(!written.contains("HOH"));
        assert!(written.contains(" CB  SER A   2"));
        assert!(written.trim_end().ends_with("END"));
    }
}
