//! Python bindings for the annotation pipeline.
//!
//! This module exposes the annotator to Python via PyO3. The host hands over plain
//! columns (paths and optional creation times) and receives the output columns back,
//! so no Python-side record store is required.
//!
//! # Modules
//!
//! - [`annotate`]: Batch annotation of path/creation-time columns
//! - [`time_bindings`]: Single-value helpers (filepath parsing, day phase lookup)
//! - [`conversions`]: chrono <-> `datetime.datetime`
//!
//! # Python API
//!
//! All functions are available in the `daystamp_rust` Python module after installation.

pub mod annotate;
pub mod conversions;
pub mod time_bindings;

pub use annotate::*;
pub use time_bindings::*;
