//! PX4 airframe files
//!
//! Airframe files are shell scripts run at boot which set each parameter with the `param`
//! command. Version 1 uses `param set`, version 2 uses `param set-default`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{push_lines, FormatAdapter, MealMetadata, WriteError};
use crate::param::ParameterList;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Writer for the `px4afv1` and `px4afv2` formats.
pub struct AirframeAdapter {
    version: u8,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl AirframeAdapter {
    /// Create a new airframe writer. Any version other than 1 is written as version 2.
    pub fn new(version: u8) -> Self {
        AirframeAdapter { version }
    }

    fn directive(&self) -> &'static str {
        match self.version {
            1 => "set",
            _ => "set-default",
        }
    }
}

impl FormatAdapter for AirframeAdapter {
    fn file_name(&self, meal_name: &str, meta: &MealMetadata) -> String {
        let frame_id = meta.frame_id.as_deref().unwrap_or("0");
        let mut name = format!("{}_{}", frame_id, meal_name);

        if meta.hitl {
            name.push_str(".hil");
        }

        name
    }

    fn serialise(
        &self,
        params: &ParameterList,
        header: &[String],
        footer: &[String],
        meta: &MealMetadata,
    ) -> Result<Vec<u8>, WriteError> {
        // SITL airframes are not nested in a conditional block
        let indentation = if meta.sitl { "" } else { "\t" };

        let mut out = Vec::new();
        push_lines(&mut out, header);

        let lines: Vec<String> = params
            .iter()
            .map(|p| {
                format!(
                    "{}param {} {} {}",
                    indentation,
                    self.directive(),
                    p.name,
                    p.pretty_value()
                )
            })
            .collect();
        push_lines(&mut out, &lines);

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
    use crate::param::{ParamValue, Parameter};

    #[test]
    fn test_serialise() {
        let params: ParameterList = vec![Parameter::new("MC_ROLL_P", ParamValue::Float(6.5))]
            .into_iter()
            .collect();

        let meta = MealMetadata {
            frame_id: Some("4001".into()),
            sitl: false,
            hitl: false,
        };
        let out = AirframeAdapter::new(2)
            .serialise(&params, &["#!/bin/sh".into()], &["fi".into()], &meta)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#!/bin/sh\n\tparam set-default MC_ROLL_P 6.5\nfi\n"
        );

        let meta = MealMetadata { sitl: true, ..meta };
        let out = AirframeAdapter::new(1).serialise(&params, &[], &[], &meta).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "param set MC_ROLL_P 6.5\n");
    }

    #[test]
    fn test_file_name() {
        let adapter = AirframeAdapter::new(1);
        let mut meta = MealMetadata {
            frame_id: Some("4001".into()),
            sitl: false,
            hitl: false,
        };
        assert_eq!(adapter.file_name("quad", &meta), "4001_quad");

        meta.hitl = true;
        assert_eq!(adapter.file_name("quad", &meta), "4001_quad.hil");

        assert_eq!(adapter.file_name("quad", &MealMetadata::default()), "0_quad");
    }
}
