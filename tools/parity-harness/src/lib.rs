//! Parity harness for comparing two spreadsheet-to-CSV extractors
//!
//! Runs an out-of-process subject implementation and the in-process calamine reader over
//! the same sheet for a number of timed rounds, checks that the last round's outputs are
//! byte-identical, and reports per-round and median timings.

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod runner;
pub mod types;

pub use adapter::{SheetAdapter, SheetRender};
pub use adapters::{NativeAdapter, SubprocessAdapter, create_adapters};
pub use config::{HarnessConfig, SubjectConfig};
pub use error::{Error, Result};
pub use output::write_json;
pub use report::write_report;
pub use runner::{ParityRunner, RunnerState};
pub use types::{DurationStatistics, RoundMeasurement, RunReport, Summary};
