//! # Parameter Chef Executable
//!
//! Command line entry point, providing two commands:
//!
//! - `build`: resolve one or every meal of a menu and write the parameter files,
//! - `compare`: print the differences between two parameter files.
//!
//! The menu folder and the default parameter file are taken from the command line, falling back
//! on the `CHEF_MENU_PATH` and `CHEF_DEFAULTS` environment variables.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

// Internal
use chef_lib::{
    build::{build, BuildOptions},
    compare::{diff, render},
    config::MenuPaths,
    meal::{FileDefaultsLoader, MealResolver},
    menu::Menu,
};
use params_if::{format::read_params, Format};
use util::logger::{logger_init, LevelFilter};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Log file written in the working directory with `--debug`.
const DEBUG_LOG_FILE: &str = "chef.log";

// ------------------------------------------------------------------------------------------------
// CLI
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "chef_exec", about = "Build and compare autopilot parameter files")]
struct Cli {
    /// Show debug output and write it to chef.log.
    #[structopt(long)]
    debug: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Build the parameter files of the menu's meals.
    Build {
        /// Folder to write the parameter files to. Required unless a single meal is built.
        #[structopt(short = "o", long = "output_folder", parse(from_os_str))]
        output_folder: Option<PathBuf>,

        /// Build only this meal.
        #[structopt(short = "c", long = "configuration")]
        meal: Option<String>,

        /// Output format: px4, px4afv1, px4afv2 or csv.
        #[structopt(short = "f", long = "format", default_value = "px4")]
        format: Format,

        /// The menu folder.
        #[structopt(short = "i", long = "input_folder", parse(from_os_str))]
        input_folder: Option<PathBuf>,

        /// Default parameter file applied to every meal without its own defaults.
        #[structopt(short = "d", long = "default_parameters", parse(from_os_str))]
        default_parameters: Option<PathBuf>,

        /// When building every meal, build only the SITL meals.
        #[structopt(long)]
        sitl: bool,
    },

    /// Compare two parameter files.
    Compare {
        #[structopt(parse(from_os_str))]
        file_1: PathBuf,

        #[structopt(parse(from_os_str))]
        file_2: PathBuf,

        /// The menu folder, used to find the calibration and operator parameters.
        #[structopt(short = "i", long = "input_folder", parse(from_os_str))]
        input_folder: Option<PathBuf>,

        /// Don't compare calibration parameters.
        #[structopt(short = "s", long = "supress-calibration")]
        nocal: bool,

        /// Don't compare operator parameters.
        #[structopt(short = "u", long = "supress-operator")]
        noop: bool,

        /// Compare only this component ID.
        #[structopt(short = "c", long = "component")]
        component: Option<u8>,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::from_args();

    // ---- LOGGING ----

    let (level, log_file) = if cli.debug {
        (LevelFilter::Debug, Some(Path::new(DEBUG_LOG_FILE)))
    } else {
        (LevelFilter::Info, None)
    };
    logger_init(level, log_file).wrap_err("Failed to initialise logging")?;

    debug!("CLI arguments: {:?}", cli);

    match cli.cmd {
        Command::Build {
            output_folder,
            meal,
            format,
            input_folder,
            default_parameters,
            sitl,
        } => {
            let paths = MenuPaths::from_env(input_folder.as_deref(), default_parameters.as_deref())
                .wrap_err("Could not locate the menu")?;

            let opts = BuildOptions {
                format,
                meal,
                output_folder,
                sitl,
            };

            run_build(&paths, &opts)
        }
        Command::Compare {
            file_1,
            file_2,
            input_folder,
            nocal,
            noop,
            component,
        } => run_compare(&file_1, &file_2, input_folder.as_deref(), nocal, noop, component),
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn run_build(paths: &MenuPaths, opts: &BuildOptions) -> Result<()> {
    let menu = Menu::load(&paths.root).wrap_err("Failed to load the menu")?;
    let resolver = MealResolver::new(&menu, &FileDefaultsLoader, paths.default_params.as_deref());

    let report = build(&menu, &resolver, opts).wrap_err("Build failed")?;

    info!("{} meals built", report.written.len());

    if report.is_success() {
        Ok(())
    } else {
        for failure in &report.failures {
            error!("{}", failure);
        }
        Err(eyre!("{} meals failed to build", report.failures.len()))
    }
}

fn run_compare(
    file_1: &Path,
    file_2: &Path,
    input_folder: Option<&Path>,
    nocal: bool,
    noop: bool,
    component: Option<u8>,
) -> Result<()> {
    let list_1 = read_params(file_1).wrap_err_with(|| format!("Failed to read {:?}", file_1))?;
    let list_2 = read_params(file_2).wrap_err_with(|| format!("Failed to read {:?}", file_2))?;

    // The menu is only needed to exclude the staple parameters
    let exclude = if nocal || noop {
        let paths = MenuPaths::from_env(input_folder, None).wrap_err("Could not locate the menu")?;
        let menu = Menu::load(&paths.root).wrap_err("Failed to load the menu")?;
        menu.exclusions(nocal, noop)
            .wrap_err("Failed to resolve the staple dishes")?
    } else {
        Vec::new()
    };

    let mut result = diff(&list_1, &list_2, &exclude);
    if let Some(cid) = component {
        result = result.only_component(cid);
    }

    println!(
        "{}",
        render(
            &result,
            list_1.source_file.as_deref(),
            list_2.source_file.as_deref()
        )
    );

    Ok(())
}
