//! PX4 / QGroundControl tab separated parameter files
//!
//! Each line holds `vehicle-id  component-id  name  value  type`, lines starting with `#` are
//! comments.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{trace, warn};

use super::{is_numeric, push_lines, FormatAdapter, MealMetadata, ParamReader, ParseError,
    WriteError};
use crate::param::{ComponentId, ParamType, ParamValue, Parameter, ParameterList};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of fields in a parameter line.
const NUM_FIELDS: usize = 5;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Reader for QGroundControl parameter files.
pub struct QgcReader;

/// Writer for the `px4` format.
pub struct QgcAdapter;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ParamReader for QgcReader {
    fn name(&self) -> &'static str {
        "qgc"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParameterList, ParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_reader(bytes);

        let mut list = ParameterList::new();

        for record in reader.records() {
            let record = record.map_err(ParseError::Csv)?;
            trace!("Examining record: {:?}", record);

            // Skip empty lines
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }

            let param = parse_record(&record)?;

            if let Some(prev) = list.get(&param.name) {
                if prev.component != param.component {
                    warn!(
                        "Parameter {} is given for components {} and {}, keeping {}",
                        param.name, prev.component, param.component, param.component
                    );
                }
            }

            list.insert(param);
        }

        if list.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(list)
    }
}

impl FormatAdapter for QgcAdapter {
    fn file_name(&self, meal_name: &str, _meta: &MealMetadata) -> String {
        format!("{}.params", meal_name)
    }

    fn serialise(
        &self,
        params: &ParameterList,
        header: &[String],
        footer: &[String],
        _meta: &MealMetadata,
    ) -> Result<Vec<u8>, WriteError> {
        let mut out = Vec::new();
        push_lines(&mut out, header);

        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(out);

        for param in params {
            writer
                .write_record(&[
                    param.component.vid.to_string(),
                    param.component.cid.to_string(),
                    param.name.clone(),
                    param.pretty_value(),
                    param.effective_type().code().to_string(),
                ])
                .map_err(WriteError::Csv)?;
        }

        let mut out = writer.into_inner().map_err(|e| WriteError::Io(e.into_error()))?;
        push_lines(&mut out, footer);

        Ok(out)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_record(record: &StringRecord) -> Result<Parameter, ParseError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let syntax = |reason: String| ParseError::Syntax { line, reason };

    if record.len() != NUM_FIELDS {
        return Err(syntax(format!(
            "expected {} fields, found {}",
            NUM_FIELDS,
            record.len()
        )));
    }

    let vid: u8 = record[0]
        .parse()
        .map_err(|_| syntax(format!("invalid vehicle id {}", &record[0])))?;
    let cid: u8 = record[1]
        .parse()
        .map_err(|_| syntax(format!("invalid component id {}", &record[1])))?;

    let name = &record[2];
    if name.is_empty() || is_numeric(name) {
        return Err(syntax(format!("expected a parameter name, found {:?}", name)));
    }

    let param_type = record[4]
        .parse::<i32>()
        .ok()
        .and_then(ParamType::from_code)
        .ok_or_else(|| syntax(format!("unknown parameter type {}", &record[4])))?;

    let value = match param_type {
        ParamType::Int32 => record[3].parse::<i64>().map(ParamValue::Int).ok(),
        ParamType::Float => record[3].parse::<f64>().map(ParamValue::Float).ok(),
    }
    .ok_or_else(|| syntax(format!("invalid value {} for {}", &record[3], name)))?;

    let mut param = Parameter::typed(name, value, param_type);
    param.component = ComponentId { vid, cid };

    Ok(param)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_errors() {
        // Wrong number of fields
        assert!(matches!(
            QgcReader.parse(b"1\t1\tMC_ROLL_P\t6.5\n"),
            Err(ParseError::Syntax { .. })
        ));

        // Name must not be a number
        assert!(matches!(
            QgcReader.parse(b"1\t1\t2.0\t6.5\t9\n"),
            Err(ParseError::Syntax { .. })
        ));

        // Unknown type code
        assert!(matches!(
            QgcReader.parse(b"1\t1\tMC_ROLL_P\t6.5\t4\n"),
            Err(ParseError::Syntax { .. })
        ));

        // Only comments
        assert!(matches!(QgcReader.parse(b"# nothing here\n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_serialise() {
        let params: ParameterList = vec![
            Parameter::typed("MC_ROLL_P", ParamValue::Float(6.5), ParamType::Float),
            Parameter::typed("SYS_AUTOSTART", ParamValue::Int(4001), ParamType::Int32),
            Parameter::new("BAT_N_CELLS", ParamValue::Int(4)),
        ]
        .into_iter()
        .collect();

        let out = QgcAdapter
            .serialise(
                &params,
                &["# Generated".to_string()],
                &[],
                &MealMetadata::default(),
            )
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Generated\n\
             1\t1\tBAT_N_CELLS\t4\t6\n\
             1\t1\tMC_ROLL_P\t6.5\t9\n\
             1\t1\tSYS_AUTOSTART\t4001\t6\n"
        );

        assert_eq!(QgcAdapter.file_name("quad", &MealMetadata::default()), "quad.params");
    }
}
