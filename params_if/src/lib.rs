//! # Parameter interface crate.
//!
//! Provides the parameter data model shared by every crate in the workspace, and the boundary to
//! the autopilot-specific parameter file formats.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters and flat parameter lists
pub mod param;

/// Exact-name or regular expression selection of parameters
pub mod matcher;

/// Autopilot parameter file readers and writers
pub mod format;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use format::{Format, FormatAdapter, MealMetadata};
pub use matcher::Matcher;
pub use param::{ComponentId, ParamError, ParamType, ParamValue, Parameter, ParameterList};
