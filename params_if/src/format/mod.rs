//! # Format module
//!
//! This module is the boundary between resolved parameter lists and the native parameter file
//! formats of each autopilot. Writers implement `FormatAdapter`, readers implement `ParamReader`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod airframe;
mod csv_list;
mod qgc;
mod ulog;
mod xml;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::param::ParameterList;

pub use airframe::AirframeAdapter;
pub use csv_list::CsvAdapter;
pub use qgc::{QgcAdapter, QgcReader};
pub use ulog::UlogReader;
pub use xml::XmlReader;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Meal-level settings which affect how a parameter file is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealMetadata {
    /// Format specific frame identifier, passed through as written in the menu.
    pub frame_id: Option<String>,

    /// The meal targets software-in-the-loop simulation.
    pub sitl: bool,

    /// The meal targets hardware-in-the-loop simulation.
    pub hitl: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// PX4 (QGroundControl) tab separated parameter file
    Px4,

    /// Legacy PX4 airframe file, using `param set`
    Px4AfV1,

    /// PX4 airframe file, using `param set-default`
    Px4AfV2,

    /// Comma separated name/value list
    Csv,
}

/// Errors which can occur while reading a parameter file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read the parameter file: {0}")]
    Io(std::io::Error),

    #[error("Invalid syntax on line {line}: {reason}")]
    Syntax { line: u64, reason: String },

    #[error("The file contains no parameters")]
    Empty,

    #[error("Malformed record: {0}")]
    Csv(csv::Error),

    #[error("Malformed catalog: {0}")]
    Xml(roxmltree::Error),

    #[error("Could not recognise the parameter file format")]
    Unrecognised,

    #[error("Parameter file format is ambiguous, it can be read as any of {0:?}")]
    Ambiguous(Vec<&'static str>),
}

/// Errors which can occur while writing a parameter file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Cannot write a record: {0}")]
    Csv(csv::Error),

    #[error("Cannot flush the parameter file: {0}")]
    Io(std::io::Error),
}

/// Error returned when a format name is not recognised.
#[derive(Debug, Error)]
#[error("Unknown format {0}, expected one of px4, px4afv1, px4afv2, csv")]
pub struct UnknownFormat(String);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Writes a resolved parameter list in one autopilot format.
pub trait FormatAdapter {
    /// Name of the file a meal is written to.
    fn file_name(&self, meal_name: &str, meta: &MealMetadata) -> String;

    /// Serialise the parameter list, surrounded by the header and footer lines.
    fn serialise(
        &self,
        params: &ParameterList,
        header: &[String],
        footer: &[String],
        meta: &MealMetadata,
    ) -> Result<Vec<u8>, WriteError>;
}

/// Reads one parameter file format.
pub trait ParamReader {
    /// Short name of the format, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parse the file contents into a parameter list, carrying the component addressing of each
    /// parameter when the format has one.
    fn parse(&self, bytes: &[u8]) -> Result<ParameterList, ParseError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Format {
    /// All formats, in the order they are listed to the user.
    pub const ALL: [Format; 4] = [Format::Px4, Format::Px4AfV1, Format::Px4AfV2, Format::Csv];

    /// Name of the format, also used as the key of the header and footer staples.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Px4 => "px4",
            Format::Px4AfV1 => "px4afv1",
            Format::Px4AfV2 => "px4afv2",
            Format::Csv => "csv",
        }
    }

    /// Get the writer for this format.
    pub fn adapter(&self) -> Box<dyn FormatAdapter> {
        match self {
            Format::Px4 => Box::new(QgcAdapter),
            Format::Px4AfV1 => Box::new(AirframeAdapter::new(1)),
            Format::Px4AfV2 => Box::new(AirframeAdapter::new(2)),
            Format::Csv => Box::new(CsvAdapter),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Format::ALL
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
        {
            Some(f) => Ok(*f),
            None => Err(UnknownFormat(s.to_string())),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a parameter file of unknown format.
///
/// Every known reader is tried, exactly one of them must accept the contents.
pub fn parse_params(bytes: &[u8]) -> Result<ParameterList, ParseError> {
    let readers: [&dyn ParamReader; 3] = [&XmlReader, &QgcReader, &UlogReader];

    let mut accepted = Vec::new();
    let mut result = None;

    for reader in readers.iter() {
        match reader.parse(bytes) {
            Ok(list) => {
                accepted.push(reader.name());
                result = Some(list);
            }
            Err(e) => debug!("File is not of {} format: {}", reader.name(), e),
        }
    }

    match (accepted.len(), result) {
        (1, Some(list)) => Ok(list),
        (0, _) | (_, None) => Err(ParseError::Unrecognised),
        _ => Err(ParseError::Ambiguous(accepted)),
    }
}

/// Read a parameter file of unknown format from disk.
///
/// The file name is recorded as the list's `source_file`.
pub fn read_params<P: AsRef<Path>>(path: P) -> Result<ParameterList, ParseError> {
    let path = path.as_ref();
    debug!("Attempting to read parameter file {:?}", path);

    let bytes = std::fs::read(path).map_err(ParseError::Io)?;
    let mut list = parse_params(&bytes)?;

    list.source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    Ok(list)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Append each line followed by a newline.
fn push_lines(out: &mut Vec<u8>, lines: &[String]) {
    for line in lines {
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
}

/// Returns true if a field looks like a number rather than a parameter name.
fn is_numeric(field: &str) -> bool {
    field.trim().parse::<f64>().is_ok()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
