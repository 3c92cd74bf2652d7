use super::read_structure;
use crate::cli::LabelsArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::BatchProgress;
use tracing::info;

pub fn run(args: LabelsArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let mut registry = config.load_registry()?;
    let known = registry.len();

    let progress = BatchProgress::new(args.inputs.len() as u64, quiet);
    for path in &args.inputs {
        progress.start(&path.display().to_string());
        read_structure(path, &config.read, &mut registry)?;
        progress.advance();
    }
    progress.finish("Done");

    registry.save(&args.save)?;
    info!("Registry written to {:?}", &args.save);
    println!(
        "✓ Wrote {} learned label(s) ({} new) to {}",
        registry.len(),
        registry.len() - known,
        args.save.display()
    );
    Ok(())
}
