//! PRN Analyser
//!
//! Reads a PJL / PCL XL print job and turns it into an annotated listing of
//! text lines, control codes, operators, attributes and embedded data, plus
//! per-tag usage statistics. Decoding itself lives in `prn-parser`; this
//! crate adds:
//!
//! - `config`: defaults, config file, environment and CLI layering
//! - `analyser`: the chunked read loop that drives the resumable decoder
//! - `report`: text table and JSON output

pub mod analyser;
pub mod config;
mod error;
pub mod report;

pub use analyser::{Analyser, Analysis};
pub use config::{AnalyserConfig, CliArgs, OutputFormat};
pub use error::{Error, Result};
pub use report::Report;
