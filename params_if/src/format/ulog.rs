//! Reader for the output of the `ulog_params` tool
//!
//! Each line holds `name,value`. There is no type information, integers and floats are
//! distinguished by how the value is written.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use csv::{ReaderBuilder, Trim};

use super::{is_numeric, ParamReader, ParseError};
use crate::param::{ParamValue, Parameter, ParameterList};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Reader for `ulog_params` dumps.
pub struct UlogReader;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ParamReader for UlogReader {
    fn name(&self) -> &'static str {
        "ulog_params"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParameterList, ParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let mut list = ParameterList::new();

        for record in reader.records() {
            let record = record.map_err(ParseError::Csv)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(|f| f.is_empty()) {
                continue;
            }

            if record.len() != 2 {
                return Err(ParseError::Syntax {
                    line,
                    reason: format!("expected 2 fields, found {}", record.len()),
                });
            }

            let name = &record[0];
            if name.is_empty() || is_numeric(name) {
                return Err(ParseError::Syntax {
                    line,
                    reason: format!("expected a parameter name, found {:?}", name),
                });
            }

            let value = match record[1].parse::<i64>() {
                Ok(i) => ParamValue::Int(i),
                Err(_) => match record[1].parse::<f64>() {
                    Ok(f) => ParamValue::Float(f),
                    Err(_) => {
                        return Err(ParseError::Syntax {
                            line,
                            reason: format!("invalid value {} for {}", &record[1], name),
                        })
                    }
                },
            };

            list.insert(Parameter::new(name, value));
        }

        if list.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(list)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let list = UlogReader.parse(b"mc_roll_p, 6.5\nBAT_N_CELLS,4\n").unwrap();
        assert_eq!(list.get("MC_ROLL_P").unwrap().value, ParamValue::Float(6.5));
        assert_eq!(list.get("BAT_N_CELLS").unwrap().value, ParamValue::Int(4));
        assert_eq!(list.get("BAT_N_CELLS").unwrap().param_type, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            UlogReader.parse(b"MC_ROLL_P,6.5,9\n"),
            Err(ParseError::Syntax { .. })
        ));
        assert!(matches!(
            UlogReader.parse(b"1.0,6.5\n"),
            Err(ParseError::Syntax { .. })
        ));
        assert!(matches!(
            UlogReader.parse(b"MC_ROLL_P,fast\n"),
            Err(ParseError::Syntax { .. })
        ));
    }
}
