//! Comma separated `name,value` parameter lists

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use csv::WriterBuilder;

use super::{push_lines, FormatAdapter, MealMetadata, WriteError};
use crate::param::ParameterList;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Writer for the `csv` format.
pub struct CsvAdapter;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl FormatAdapter for CsvAdapter {
    fn file_name(&self, meal_name: &str, _meta: &MealMetadata) -> String {
        format!("{}.csv", meal_name)
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

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
        for param in params {
            writer
                .write_record(&[param.name.as_str(), param.pretty_value().as_str()])
                .map_err(WriteError::Csv)?;
        }

        let mut out = writer.into_inner().map_err(|e| WriteError::Io(e.into_error()))?;
        push_lines(&mut out, footer);

        Ok(out)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::parse_params;
    use crate::param::{ParamValue, Parameter};

    #[test]
    fn test_serialise_reads_back() {
        let params: ParameterList = vec![
            Parameter::new("MC_ROLL_P", ParamValue::Float(6.5)),
            Parameter::new("BAT_N_CELLS", ParamValue::Int(4)),
        ]
        .into_iter()
        .collect();

        let out = CsvAdapter
            .serialise(&params, &[], &[], &MealMetadata::default())
            .unwrap();
        assert_eq!(String::from_utf8(out.clone()).unwrap(), "BAT_N_CELLS,4\nMC_ROLL_P,6.5\n");

        // The csv output is a valid ulog_params dump
        let read = parse_params(&out).unwrap();
        assert_eq!(read.get("MC_ROLL_P").unwrap().value, ParamValue::Float(6.5));
        assert_eq!(read.get("BAT_N_CELLS").unwrap().value, ParamValue::Int(4));
    }
}
