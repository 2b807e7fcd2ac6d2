//! # Build driver
//!
//! Resolves the requested meals and writes them out in one format. Every meal is attempted: a
//! failing meal is collected into the report and the remaining meals are still built.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use params_if::format::WriteError;
use params_if::Format;

use crate::meal::{MealError, MealResolver, ResolvedMeal};
use crate::menu::Menu;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// What to build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub format: Format,

    /// Build only this meal. When `None` every meal matching `sitl` is built.
    pub meal: Option<String>,

    /// Folder to write the meals to. A single meal is printed to stdout when not given.
    pub output_folder: Option<PathBuf>,

    /// When building every meal, build the SITL meals rather than the others.
    pub sitl: bool,
}

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files written, or names of the meals printed to stdout
    pub written: Vec<PathBuf>,

    pub failures: Vec<BuildError>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("An output folder is required to build every meal")]
    NoOutputFolder,

    #[error(transparent)]
    Meal(#[from] MealError),

    #[error("Meal {meal}: cannot serialise the parameters: {source}")]
    Serialise { meal: String, source: WriteError },

    #[error("Meal {meal}: cannot write {path:?}: {source}")]
    Io {
        meal: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the meals selected by `opts`.
///
/// Only a missing output folder aborts the build, every other error is attributed to a meal and
/// collected into the report.
pub fn build(
    menu: &Menu,
    resolver: &MealResolver,
    opts: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    let names: Vec<&str> = match opts.meal {
        Some(ref name) => vec![name.as_str()],
        None => {
            if opts.output_folder.is_none() {
                return Err(BuildError::NoOutputFolder);
            }
            menu.meals()
                .filter(|m| m.sitl == opts.sitl)
                .map(|m| m.name.as_str())
                .collect()
        }
    };

    info!("Building {} meals in format {}", names.len(), opts.format);

    let mut report = BuildReport::default();

    for (name, result) in resolve_meals(resolver, &names, opts.format) {
        let exported = result
            .map_err(BuildError::from)
            .and_then(|meal| export_meal(&meal, opts.format, opts.output_folder.as_deref()));

        match exported {
            Ok(path) => {
                info!("Meal {} built", name);
                report.written.push(path);
            }
            Err(e) => {
                debug!("Meal {} failed", name);
                report.failures.push(e);
            }
        }
    }

    Ok(report)
}

/// Resolve each of the named meals independently.
pub fn resolve_meals(
    resolver: &MealResolver,
    names: &[&str],
    format: Format,
) -> Vec<(String, Result<ResolvedMeal, MealError>)> {
    names
        .iter()
        .map(|name| (name.to_string(), resolver.resolve(name, format)))
        .collect()
}

/// Serialise a resolved meal and write it to its file in `folder`, or to stdout.
///
/// Returns the written path, or the meal's file name when printed to stdout.
pub fn export_meal(
    meal: &ResolvedMeal,
    format: Format,
    folder: Option<&Path>,
) -> Result<PathBuf, BuildError> {
    let adapter = format.adapter();

    let bytes = adapter
        .serialise(&meal.params, &meal.header, &meal.footer, &meal.metadata)
        .map_err(|source| BuildError::Serialise {
            meal: meal.name.clone(),
            source,
        })?;

    let file_name = PathBuf::from(adapter.file_name(&meal.name, &meal.metadata));

    let io_err = |path: &Path, source| BuildError::Io {
        meal: meal.name.clone(),
        path: path.to_path_buf(),
        source,
    };

    match folder {
        Some(folder) => {
            std::fs::create_dir_all(folder).map_err(|e| io_err(folder, e))?;
            let path = folder.join(&file_name);
            std::fs::write(&path, &bytes).map_err(|e| io_err(&path, e))?;
            Ok(path)
        }
        None => {
            let stdout = std::io::stdout();
            stdout
                .lock()
                .write_all(&bytes)
                .map_err(|e| io_err(&file_name, e))?;
            Ok(file_name)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::meal::FileDefaultsLoader;
    use crate::test_utils::{write_menu, MENU_MEALS};

    fn opts(format: Format, folder: Option<&Path>, sitl: bool) -> BuildOptions {
        BuildOptions {
            format,
            meal: None,
            output_folder: folder.map(Path::to_path_buf),
            sitl,
        }
    }

    #[test]
    fn test_build_all() {
        let menu_dir = write_menu(MENU_MEALS);
        let out_dir = tempfile::tempdir().unwrap();
        let menu = Menu::load(menu_dir.path()).unwrap();
        let resolver = MealResolver::new(&menu, &FileDefaultsLoader, None);

        let report = build(&menu, &resolver, &opts(Format::Px4, Some(out_dir.path()), false))
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.written.len(), 2);

        let base = std::fs::read_to_string(out_dir.path().join("base.params")).unwrap();
        assert_eq!(
            base,
            "# Generated parameters\n\
             1\t1\tBAT_N_CELLS\t4\t6\n\
             1\t1\tCOM_FLTMODE1\t0\t6\n\
             1\t1\tMC_PITCH_P\t6.5\t9\n\
             1\t1\tMC_ROLL_P\t6.5\t9\n"
        );

        let racer = std::fs::read_to_string(out_dir.path().join("racer.params")).unwrap();
        assert!(racer.contains("1\t1\tMC_ROLL_P\t8.0\t9\n"));
        assert!(racer.contains("1\t1\tMC_PITCH_P\t8.0\t9\n"));
        assert!(!racer.contains("CAL_ACC0_XOFF"));

        assert!(!out_dir.path().join("sim.params").exists());
    }

    #[test]
    fn test_build_sitl_airframes() {
        let menu_dir = write_menu(MENU_MEALS);
        let out_dir = tempfile::tempdir().unwrap();
        let menu = Menu::load(menu_dir.path()).unwrap();
        let resolver = MealResolver::new(&menu, &FileDefaultsLoader, None);

        let report = build(&menu, &resolver, &opts(Format::Px4AfV2, Some(out_dir.path()), true))
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.written, vec![out_dir.path().join("0_sim")]);

        let sim = std::fs::read_to_string(out_dir.path().join("0_sim")).unwrap();
        assert_eq!(
            sim,
            "# Generated parameters\n# px4 airframe\nparam set-default MC_ROLL_P 7\n"
        );
    }

    #[test]
    fn test_partial_failure() {
        let meals = format!("{}broken:\n  defaults: missing.params\n", MENU_MEALS);
        let menu_dir = write_menu(&meals);
        let out_dir = tempfile::tempdir().unwrap();
        let menu = Menu::load(menu_dir.path()).unwrap();
        let resolver = MealResolver::new(&menu, &FileDefaultsLoader, None);

        let report = build(&menu, &resolver, &opts(Format::Csv, Some(out_dir.path()), false))
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        match report.failures[0] {
            BuildError::Meal(ref e) => assert_eq!(e.meal(), "broken"),
            ref other => panic!("Expected a meal error, got {:?}", other),
        }

        // The other meals are still written
        assert!(out_dir.path().join("base.csv").exists());
        assert!(out_dir.path().join("racer.csv").exists());
    }

    #[test]
    fn test_no_output_folder() {
        let menu_dir = write_menu(MENU_MEALS);
        let menu = Menu::load(menu_dir.path()).unwrap();
        let resolver = MealResolver::new(&menu, &FileDefaultsLoader, None);

        assert!(matches!(
            build(&menu, &resolver, &opts(Format::Px4, None, false)),
            Err(BuildError::NoOutputFolder)
        ));
    }

    #[test]
    fn test_build_single_meal() {
        let menu_dir = write_menu(MENU_MEALS);
        let out_dir = tempfile::tempdir().unwrap();
        let menu = Menu::load(menu_dir.path()).unwrap();
        let resolver = MealResolver::new(&menu, &FileDefaultsLoader, None);

        // A single meal is built regardless of its sitl flag
        let mut options = opts(Format::Px4, Some(out_dir.path()), false);
        options.meal = Some("sim".into());

        let report = build(&menu, &resolver, &options).unwrap();
        assert_eq!(report.written, vec![out_dir.path().join("sim.params")]);
    }
}
