pub mod check;
pub mod convert;
pub mod info;
pub mod labels;

use crate::error::{CliError, Result};
use ampal::core::io::pdb::{LabelRegistry, ParseOptions, ParseOutcome, PdbFile};
use ampal::core::io::traits::StructureFile;
use std::path::Path;
use tracing::info;

/// Reads one PDB file, naming the structure after the file stem.
pub(crate) fn read_structure(
    path: &Path,
    options: &ParseOptions,
    registry: &mut LabelRegistry,
) -> Result<ParseOutcome> {
    info!("Loading input structure from {:?}", path);
    let outcome = PdbFile::read_from_path(path, options, registry).map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Read '{}' with {} model(s).",
        outcome.structure.id(),
        outcome.structure.model_count()
    );
    Ok(outcome)
}
