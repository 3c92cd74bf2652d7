use super::error::{PdbError, PdbParseErrorKind};

/// The shortest coordinate record the parser accepts: everything up to the z coordinate.
pub const MIN_ATOM_RECORD_LEN: usize = 54;

/// Record keywords the parser acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Atom,
    Hetatm,
    EndModel,
    End,
    /// Any other keyword; stored verbatim as an info record.
    Other,
}

impl RecordType {
    /// Classifies a line by its trimmed first six columns.
    pub fn of(line: &str) -> (RecordType, &str) {
        let head = match line.char_indices().nth(6) {
            Some((end, _)) => &line[..end],
            None => line,
        };
        let keyword = head.trim();
        let record = match keyword {
            "ATOM" => RecordType::Atom,
            "HETATM" => RecordType::Hetatm,
            "ENDMDL" => RecordType::EndModel,
            "END" => RecordType::End,
            _ => RecordType::Other,
        };
        (record, keyword)
    }
}

/// The fields of one ATOM or HETATM line, columns as in the PDB format.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// 1-based line number in the input.
    pub line: usize,
    pub hetero: bool,
    pub serial: i64,
    pub name: String,
    /// Columns 13-16 untrimmed, kept for the label registry.
    pub raw_name: String,
    pub alt_loc: Option<char>,
    pub res_name: String,
    pub chain_id: String,
    pub res_seq: i64,
    /// `' '` when blank.
    pub insertion_code: char,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub occupancy: f64,
    pub temp_factor: f64,
    pub element: String,
    pub charge: String,
}

/// Trimmed text of the half-open column range, empty past the end of the line.
///
/// Columns are byte offsets; callers check that the line is ASCII first.
pub(crate) fn columns(line: &str, start: usize, end: usize) -> &str {
    raw_columns(line, start, end).trim()
}

fn raw_columns(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("")
}

fn single(line: &str, index: usize) -> Option<char> {
    columns(line, index, index + 1).chars().next()
}

/// Parses the fixed columns of an ATOM or HETATM line.
///
/// Blank occupancy defaults to `1.0` and blank temperature factor to `0.0`.
///
/// # Errors
///
/// Returns [`PdbError::Parse`] for lines shorter than the z coordinate, for
/// lines with non-ASCII characters, for malformed numbers and for non-finite
/// coordinates.
pub fn parse_atom_record(line: &str, line_no: usize, hetero: bool) -> Result<AtomRecord, PdbError> {
    let fail = |kind: PdbParseErrorKind| PdbError::Parse {
        line: line_no,
        content: line.to_string(),
        kind,
    };

    if line.len() < MIN_ATOM_RECORD_LEN {
        return Err(fail(PdbParseErrorKind::LineTooShort { length: line.len() }));
    }
    if let Some(index) = line.chars().position(|c| !c.is_ascii()) {
        return Err(fail(PdbParseErrorKind::NonAscii { column: index + 1 }));
    }

    let int = |start, end, label: &'static str| {
        let value = columns(line, start, end);
        value.parse::<i64>().map_err(|_| {
            fail(PdbParseErrorKind::InvalidInt {
                columns: label,
                value: value.to_string(),
            })
        })
    };
    let float = |start, end, label: &'static str, default: Option<f64>| {
        let value = columns(line, start, end);
        if value.is_empty() {
            if let Some(default) = default {
                return Ok(default);
            }
        }
        value.parse::<f64>().map_err(|_| {
            fail(PdbParseErrorKind::InvalidFloat {
                columns: label,
                value: value.to_string(),
            })
        })
    };
    let coordinate = |start, end, label: &'static str| {
        let parsed = float(start, end, label, None)?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(fail(PdbParseErrorKind::NonFiniteCoordinate {
                columns: label,
                value: columns(line, start, end).to_string(),
            }))
        }
    };

    Ok(AtomRecord {
        line: line_no,
        hetero,
        serial: int(6, 11, "7-11")?,
        name: columns(line, 12, 16).to_string(),
        raw_name: raw_columns(line, 12, 16).to_string(),
        alt_loc: single(line, 16),
        res_name: columns(line, 17, 20).to_string(),
        chain_id: columns(line, 21, 22).to_string(),
        res_seq: int(22, 26, "23-26")?,
        insertion_code: single(line, 26).unwrap_or(' '),
        x: coordinate(30, 38, "31-38")?,
        y: coordinate(38, 46, "39-46")?,
        z: coordinate(46, 54, "47-54")?,
        occupancy: float(54, 60, "55-60", Some(1.0))?,
        temp_factor: float(60, 66, "61-66", Some(0.0))?,
        element: columns(line, 76, 78).to_string(),
        charge: columns(line, 78, 80).to_string(),
    })
}
