use crate::core::io::pdb::labels::LabelRegistry;
use crate::core::models::container::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing structure file formats.
///
/// Implementors handle format-specific parsing and serialization; the path
/// helpers are shared.
pub trait StructureFile {
    /// Options controlling a read.
    type ReadOptions: Clone + Default;
    /// Options controlling a write.
    type WriteOptions: Default;
    /// The result of a successful read.
    type Outcome;
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `options` - Format-specific read options.
    /// * `registry` - Atom-label layouts, extended with labels found in the input.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(
        reader: &mut impl BufRead,
        options: &Self::ReadOptions,
        registry: &mut LabelRegistry,
    ) -> Result<Self::Outcome, Self::Error>;

    /// Writes a structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        structure: &Structure,
        options: &Self::WriteOptions,
        registry: &LabelRegistry,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Read options naming the structure after a file stem, unless the given
    /// options already carry an identifier.
    fn named_after(options: &Self::ReadOptions, stem: &str) -> Self::ReadOptions;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        options: &Self::ReadOptions,
        registry: &mut LabelRegistry,
    ) -> Result<Self::Outcome, Self::Error> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let options = Self::named_after(options, &stem);
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, &options, registry)
    }

    /// Writes a structure to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        structure: &Structure,
        options: &Self::WriteOptions,
        registry: &LabelRegistry,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, options, registry, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
