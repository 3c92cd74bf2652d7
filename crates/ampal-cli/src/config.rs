use crate::cli::WriteFlags;
use crate::error::{CliError, Result};
use ampal::core::io::pdb::{LabelRegistry, ParseOptions, WriteOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Values used when neither the config file nor the command line sets an option.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub ignore_end: bool,
    pub ligands: bool,
    pub alt_states: bool,
    pub strip_states: bool,
    pub header: bool,
    pub footer: bool,
    pub save_learned_labels: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        let write = WriteOptions::default();
        Self {
            ignore_end: false,
            ligands: write.ligands,
            alt_states: write.alt_states,
            strip_states: write.strip_states,
            header: write.header,
            footer: write.footer,
            save_learned_labels: false,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialReadConfig {
    #[serde(rename = "ignore-end")]
    ignore_end: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWriteConfig {
    ligands: Option<bool>,
    #[serde(rename = "alt-states")]
    alt_states: Option<bool>,
    #[serde(rename = "strip-states")]
    strip_states: Option<bool>,
    header: Option<bool>,
    footer: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialLabelsConfig {
    registry: Option<PathBuf>,
    #[serde(rename = "save-learned")]
    save_learned: Option<bool>,
}

/// The config file as written; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    read: Option<PartialReadConfig>,
    write: Option<PartialWriteConfig>,
    labels: Option<PartialLabelsConfig>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ignore_end: bool,
    pub labels: Option<PathBuf>,
    pub write: WriteFlags,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub read: ParseOptions,
    pub write: WriteOptions,
    pub registry_path: Option<PathBuf>,
    pub save_learned_labels: bool,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("Invalid config file '{}': {}", path.display(), e)))
    }

    /// Reads the config file if one was given, otherwise starts empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve(self, overrides: &Overrides) -> Result<AppConfig> {
        self.resolve_with(overrides, &Defaults::default())
    }

    fn resolve_with(self, overrides: &Overrides, defaults: &Defaults) -> Result<AppConfig> {
        let read = self.read.unwrap_or_default();
        let write = self.write.unwrap_or_default();
        let labels = self.labels.unwrap_or_default();
        let flags = &overrides.write;

        let file_alt = write.alt_states.unwrap_or(defaults.alt_states);
        let file_strip = write.strip_states.unwrap_or(defaults.strip_states);
        let (alt_states, strip_states) = if flags.alt_states {
            (true, false)
        } else if flags.strip_states {
            (false, true)
        } else {
            (file_alt, file_strip)
        };
        if alt_states && strip_states {
            return Err(CliError::Config(
                "'write.alt-states' and 'write.strip-states' cannot both be enabled.".to_string(),
            ));
        }

        let write = WriteOptions {
            ligands: !flags.no_ligands && write.ligands.unwrap_or(defaults.ligands),
            alt_states,
            strip_states,
            header: !flags.no_header && write.header.unwrap_or(defaults.header),
            footer: !flags.no_footer && write.footer.unwrap_or(defaults.footer),
        };
        let read = ParseOptions::default()
            .with_ignore_end(overrides.ignore_end || read.ignore_end.unwrap_or(defaults.ignore_end));

        Ok(AppConfig {
            read,
            write,
            registry_path: overrides.labels.clone().or(labels.registry),
            save_learned_labels: labels.save_learned.unwrap_or(defaults.save_learned_labels),
        })
    }
}

impl AppConfig {
    /// The label registry named by the configuration, or the built-in one.
    ///
    /// A named registry that does not exist yet starts from the built-in layouts.
    pub fn load_registry(&self) -> Result<LabelRegistry> {
        match &self.registry_path {
            Some(path) if path.exists() => {
                let registry = LabelRegistry::load(path)?;
                info!("Loaded {} learned atom label(s) from {:?}", registry.len(), path);
                Ok(registry)
            }
            Some(path) => {
                debug!("Label registry {:?} does not exist yet; using built-in layouts.", path);
                Ok(LabelRegistry::new())
            }
            None => Ok(LabelRegistry::new()),
        }
    }

    /// Writes the registry back when labels were learned and saving is enabled.
    /// Returns `true` if the file was written.
    pub fn persist_registry(&self, registry: &LabelRegistry, new_labels: bool) -> Result<bool> {
        match &self.registry_path {
            Some(path) if new_labels && self.save_learned_labels => {
                registry.save(path)?;
                info!("Saved {} learned atom label(s) to {:?}", registry.len(), path);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
