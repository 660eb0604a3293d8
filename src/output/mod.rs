//! Output module for reporting on the dataset
//!
//! This module handles:
//! - Scanning the dataset for statistics
//! - Printing them for the `stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, DatasetStatistics};
