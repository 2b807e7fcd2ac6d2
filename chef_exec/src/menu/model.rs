//! Document models of the menu YAML files

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::BTreeMap;

use params_if::ParamValue;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A dish document, as found in `custom_dishes/*.yaml` and the calibration and operator staples.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DishDoc {
    pub common: Option<RecipeDoc>,
    pub variants: Option<BTreeMap<String, DishDoc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeDoc {
    pub ingredients: Option<Vec<SubstanceDoc>>,
    pub allergens: Option<AllergensDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllergensDoc {
    pub substances: Option<Vec<SubstanceDoc>>,
    pub groups: Option<Vec<SubstanceDoc>>,
}

/// A header or footer staple document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoilerplateDoc {
    pub common: Option<Vec<String>>,
    pub formats: Option<BTreeMap<String, TextDoc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextDoc {
    pub common: Option<Vec<String>>,
    pub variants: Option<BTreeMap<String, TextDoc>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// One entry of an ingredient or allergen list.
///
/// Entries are either a bare name or a `[name, value, justification]` sequence, where the value
/// and justification may be omitted or null.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SubstanceDoc {
    Name(String),
    Single((String,)),
    Pair(String, Option<ParamValue>),
    Entry(String, Option<ParamValue>, Option<String>),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl SubstanceDoc {
    /// Split the entry into its name, value and justification.
    pub fn into_parts(self) -> (String, Option<ParamValue>, Option<String>) {
        match self {
            SubstanceDoc::Name(n) | SubstanceDoc::Single((n,)) => (n, None, None),
            SubstanceDoc::Pair(n, v) => (n, v, None),
            SubstanceDoc::Entry(n, v, j) => (n, v, j),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dish_doc() {
        let doc: DishDoc = util::params::from_str(
            r#"
common:
  ingredients:
    - [MC_ROLL_P, 6.5, "Tuned in flight @READONLY"]
    - [SYS_AUTOSTART, 4001]
    - [BAT_N_CELLS, ~, "Set by the operator"]
  allergens:
    substances:
      - SENS_EN_THERMAL
    groups:
      - [Camera trigger]
variants:
  tailsitter:
    common:
      ingredients:
        - [VT_TYPE, 0, ~]
"#,
        )
        .unwrap();

        let common = doc.common.unwrap();
        let parts: Vec<_> = common
            .ingredients
            .unwrap()
            .into_iter()
            .map(SubstanceDoc::into_parts)
            .collect();
        assert_eq!(
            parts[0],
            (
                "MC_ROLL_P".to_string(),
                Some(ParamValue::Float(6.5)),
                Some("Tuned in flight @READONLY".to_string())
            )
        );
        assert_eq!(
            parts[1],
            ("SYS_AUTOSTART".to_string(), Some(ParamValue::Int(4001)), None)
        );
        assert_eq!(parts[2].1, None);

        let allergens = common.allergens.unwrap();
        assert_eq!(allergens.substances.unwrap().len(), 1);
        assert_eq!(
            allergens.groups.unwrap().remove(0).into_parts().0,
            "Camera trigger"
        );
        assert!(doc.variants.unwrap().contains_key("tailsitter"));
    }

    #[test]
    fn test_dish_doc_unknown_field() {
        let result: Result<DishDoc, _> =
            util::params::from_str("common:\n  ingredient:\n    - [A, 1, ~]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_doc() {
        let doc: Option<BoilerplateDoc> = util::params::from_str("").unwrap();
        assert!(doc.is_none());
    }
}
