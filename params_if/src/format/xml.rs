//! PX4 parameter catalog (`parameters.xml`)
//!
//! The catalog lists every parameter known to a firmware build with its type and default value.
//! Parameters are either nested in a `<group name="...">` element or given at the top level.
//! The group name is kept, upper cased, so that whole groups can be removed from a meal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use roxmltree::{Document, Node};

use super::{ParamReader, ParseError};
use crate::param::{ParamType, ParamValue, Parameter, ParameterList};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const GROUP_TAG: &str = "group";
const PARAMETER_TAG: &str = "parameter";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Reader for PX4 XML parameter catalogs.
pub struct XmlReader;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ParamReader for XmlReader {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParameterList, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Syntax {
            line: 0,
            reason: format!("catalog is not valid UTF-8: {}", e),
        })?;
        let doc = Document::parse(text).map_err(ParseError::Xml)?;

        let mut list = ParameterList::new();

        for node in doc.root_element().children().filter(Node::is_element) {
            if node.has_tag_name(GROUP_TAG) {
                let group = node.attribute("name").map(str::to_uppercase);

                for param_node in node.children().filter(|n| n.has_tag_name(PARAMETER_TAG)) {
                    let mut param = parse_parameter(&doc, &param_node)?;
                    param.group = group.clone();
                    trace!("Catalog parameter {} in group {:?}", param, param.group);
                    list.insert(param);
                }
            } else if node.has_tag_name(PARAMETER_TAG) {
                let param = parse_parameter(&doc, &node)?;
                trace!("Catalog parameter {}", param);
                list.insert(param);
            }
        }

        if list.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(list)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_parameter(doc: &Document, node: &Node) -> Result<Parameter, ParseError> {
    let line = u64::from(doc.text_pos_at(node.range().start).row);
    let syntax = |reason: String| ParseError::Syntax { line, reason };

    let name = node
        .attribute("name")
        .ok_or_else(|| syntax("parameter without a name".to_string()))?;

    let param_type = match node.attribute("type") {
        Some(t) if t.eq_ignore_ascii_case("INT32") => ParamType::Int32,
        Some(t) if t.eq_ignore_ascii_case("FLOAT") => ParamType::Float,
        other => {
            return Err(syntax(format!(
                "unknown parameter type {:?} for {}",
                other, name
            )))
        }
    };

    let default = node
        .attribute("default")
        .ok_or_else(|| syntax(format!("no default value for {}", name)))?
        .trim();

    let value = match default.parse::<i64>() {
        Ok(i) => ParamValue::Int(i),
        Err(_) => default
            .parse::<f64>()
            .map(ParamValue::Float)
            .map_err(|_| syntax(format!("invalid default {} for {}", default, name)))?,
    };

    Ok(Parameter::typed(name, value, param_type))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const CATALOG: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<parameters>
  <version>3</version>
  <group name="Camera trigger">
    <parameter default="0" name="TRIG_MODE" type="INT32">
      <short_desc>Camera trigger mode</short_desc>
    </parameter>
    <parameter default="40.0" name="TRIG_INTERVAL" type="FLOAT">
      <short_desc>Camera trigger interval</short_desc>
      <unit>ms</unit>
    </parameter>
  </group>
  <group name="Multicopter Attitude Control">
    <parameter default="6.5" name="MC_ROLL_P" type="FLOAT"/>
    <parameter default="6" name="MC_PITCH_P" type="FLOAT"/>
  </group>
  <parameter default="0" name="SYS_AUTOSTART" type="INT32"/>
</parameters>
"#;

    #[test]
    fn test_parse() {
        let list = XmlReader.parse(CATALOG.as_bytes()).unwrap();
        assert_eq!(list.len(), 5);

        let mode = list.get("TRIG_MODE").unwrap();
        assert_eq!(mode.value, ParamValue::Int(0));
        assert_eq!(mode.param_type, Some(ParamType::Int32));
        assert_eq!(mode.group.as_deref(), Some("CAMERA TRIGGER"));

        let interval = list.get("TRIG_INTERVAL").unwrap();
        assert_eq!(interval.value, ParamValue::Float(40.0));
        assert_eq!(interval.param_type, Some(ParamType::Float));

        // Integral defaults of float parameters are cast to the declared type
        let pitch = list.get("MC_PITCH_P").unwrap();
        assert_eq!(pitch.value, ParamValue::Float(6.0));
        assert_eq!(pitch.param_type, Some(ParamType::Float));
        assert_eq!(pitch.group.as_deref(), Some("MULTICOPTER ATTITUDE CONTROL"));

        let autostart = list.get("SYS_AUTOSTART").unwrap();
        assert_eq!(autostart.group, None);
        assert_eq!(autostart.param_type, Some(ParamType::Int32));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            XmlReader.parse(b"1\t1\tMC_ROLL_P\t6.5\t9\n"),
            Err(ParseError::Xml(_))
        ));
        assert!(matches!(
            XmlReader.parse(b"<parameters><version>3</version></parameters>"),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            XmlReader.parse(b"<parameters><parameter name=\"A\" default=\"1\" type=\"INT8\"/></parameters>"),
            Err(ParseError::Syntax { .. })
        ));
        assert!(matches!(
            XmlReader.parse(b"<parameters><parameter name=\"A\" type=\"FLOAT\"/></parameters>"),
            Err(ParseError::Syntax { .. })
        ));
    }
}
