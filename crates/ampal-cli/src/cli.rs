use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "AMPAL-RS Developers",
    version,
    about = "AMPAL CLI - Inspect, convert and verify macromolecular structures in PDB format.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Atom-label registry file, overriding `labels.registry` from the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub labels: Option<PathBuf>,

    /// Keep reading past END records
    #[arg(long, global = true)]
    pub ignore_end: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the chains, ligands and alternate states of a structure.
    Info(InfoArgs),
    /// Parse a structure and write it back out as PDB or FASTA.
    Convert(ConvertArgs),
    /// Verify that structures survive a parse and re-serialize cycle.
    Check(CheckArgs),
    /// Write the atom-label registry, extended with labels found in the given files.
    Labels(LabelsArgs),
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the input PDB file.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Also print the one-letter sequence of every chain.
    #[arg(short, long)]
    pub sequences: bool,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input PDB file.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub write: WriteFlags,

    /// Renumber chains, residues and atom serials before writing.
    #[arg(long)]
    pub relabel: bool,

    /// Write only one model (1-based) of a multi-model file.
    #[arg(short, long, value_name = "N")]
    pub model: Option<usize>,

    /// Write FASTA sequences instead of PDB records.
    #[arg(long)]
    pub fasta: bool,
}

/// Serializer switches that override the `[write]` section of the config file.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct WriteFlags {
    /// Write every alternate state instead of only the active one.
    #[arg(long, conflicts_with = "strip_states")]
    pub alt_states: bool,

    /// Write the active state with a blank alternate-location column.
    #[arg(long)]
    pub strip_states: bool,

    /// Leave out ligands and solvent.
    #[arg(long)]
    pub no_ligands: bool,

    /// Leave out the HEADER and EXPDTA records.
    #[arg(long)]
    pub no_header: bool,

    /// Leave out the closing END record.
    #[arg(long)]
    pub no_footer: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// One or more PDB files to verify.
    #[arg(required = true, num_args(1..), value_name = "PATH")]
    pub inputs: Vec<PathBuf>,
}

/// Arguments for the `labels` subcommand.
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Where to write the registry.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub save: PathBuf,

    /// PDB files whose atom labels should be learned first.
    #[arg(value_name = "PATH")]
    pub inputs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::parse_from(["ampal", "info", "in.pdb", "-vv", "--ignore-end"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.ignore_end);
        assert!(matches!(cli.command, Commands::Info(ref args) if args.input == PathBuf::from("in.pdb")));
    }

    #[test]
    fn convert_collects_write_flags() {
        let cli = Cli::parse_from([
            "ampal",
            "convert",
            "in.pdb",
            "-o",
            "out.pdb",
            "--alt-states",
            "--no-ligands",
            "--model",
            "2",
        ]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert!(args.write.alt_states);
        assert!(args.write.no_ligands);
        assert!(!args.write.no_header);
        assert_eq!(args.model, Some(2));
    }

    #[test]
    fn alt_states_conflicts_with_strip_states() {
        let result = Cli::try_parse_from([
            "ampal",
            "convert",
            "in.pdb",
            "-o",
            "out.pdb",
            "--alt-states",
            "--strip-states",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ampal", "-q", "-v", "check", "a.pdb"]).is_err());
    }
}
