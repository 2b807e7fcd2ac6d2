//! Fixtures shared by the unit tests

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use params_if::{Matcher, ParamValue, Parameter, ParameterList};

use crate::dish::Ingredient;
use crate::meal::{DefaultsError, DefaultsLoader};
use crate::menu::{CUSTOM_DISHES_DIR, MEALS_FILE, STAPLE_DISHES_DIR};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// A manifest using every dish of the fixture menu.
pub const MENU_MEALS: &str = r#"
base:
  defaults: defaults.params
  battery: ~
  remove_calibration: true
racer:
  parent: base
  tuning: aggressive
  frame_id: 4001
sim:
  sitl: true
  add_new: true
  tuning: ~
"#;

const DEFAULTS: &str = "# Onboard parameters for Vehicle 1\n\
                        1\t1\tBAT_N_CELLS\t3\t6\n\
                        1\t1\tCAL_ACC0_XOFF\t0.01\t9\n\
                        1\t1\tCOM_FLTMODE1\t0\t6\n\
                        1\t1\tMC_PITCH_P\t6.5\t9\n\
                        1\t1\tMC_ROLL_P\t6.5\t9\n";

const BATTERY: &str = r#"
common:
  ingredients:
    - [BAT_N_CELLS, 4, "Fixed battery pack @READONLY"]
"#;

const TUNING: &str = r#"
common:
  ingredients:
    - [MC_ROLL_P, 7.0, ~]
variants:
  aggressive:
    common:
      ingredients:
        - [MC_ROLL_P, 8.0, "Racing tune"]
        - [MC_PITCH_P, 8.0, "Racing tune"]
"#;

const CALIBRATION: &str = r#"
common:
  ingredients:
    - ['CAL_ACC\d_.*']
"#;

const OPERATOR: &str = r#"
common:
  ingredients:
    - COM_FLTMODE1
"#;

const HEADER: &str = r##"
common:
  - "# Generated parameters"
formats:
  px4afv2:
    common:
      - "# px4 airframe"
"##;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// In-memory default parameter sets, keyed by path.
#[derive(Default)]
pub struct MapLoader {
    sets: HashMap<PathBuf, ParameterList>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<P: AsRef<Path>>(mut self, path: P, list: ParameterList) -> Self {
        self.sets.insert(path.as_ref().to_path_buf(), list);
        self
    }
}

impl DefaultsLoader for MapLoader {
    fn load(&self, path: &Path) -> Result<ParameterList, DefaultsError> {
        self.sets
            .get(path)
            .cloned()
            .ok_or_else(|| DefaultsError::NotFound(path.to_path_buf()))
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Write the fixture menu with the given manifest to a temporary directory.
pub fn write_menu(meals: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let custom = root.join(CUSTOM_DISHES_DIR);
    let staples = root.join(STAPLE_DISHES_DIR);
    fs::create_dir(&custom).unwrap();
    fs::create_dir(&staples).unwrap();

    fs::write(root.join(MEALS_FILE), meals).unwrap();
    fs::write(root.join("defaults.params"), DEFAULTS).unwrap();
    fs::write(custom.join("battery.yaml"), BATTERY).unwrap();
    fs::write(custom.join("tuning.yaml"), TUNING).unwrap();
    fs::write(staples.join("calibration.yaml"), CALIBRATION).unwrap();
    fs::write(staples.join("operator.yaml"), OPERATOR).unwrap();
    fs::write(staples.join("header.yaml"), HEADER).unwrap();

    dir
}

/// Build a list of untyped parameters.
pub fn list(entries: &[(&str, ParamValue)]) -> ParameterList {
    entries
        .iter()
        .map(|(name, value)| Parameter::new(name, *value))
        .collect()
}

pub fn ingredient(name: &str, value: Option<ParamValue>, justification: Option<&str>) -> Ingredient {
    Ingredient {
        key: Matcher::parse(name).unwrap(),
        value,
        justification: justification.map(String::from),
    }
}
