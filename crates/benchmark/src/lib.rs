//! Benchmark suite for rkpack
//!
//! This crate provides:
//! - JSON instance parser with case-insensitive keys
//! - Synthetic instance generator
//! - OR-Library `thpack` importer
//! - Batch runner over instance folders with CSV/JSON reporting

mod dataset;
mod layout;
mod parser;
mod result;
mod runner;
mod synthetic;
mod thpack;

pub use dataset::{ContainerSpec, Dataset, DatasetInfo, DatasetItem};
pub use layout::LayoutReport;
pub use parser::{DatasetParser, ParseError};
pub use result::{
    escape_csv, mean, sample_std, BenchmarkResult, RunResult, SummaryRow, PER_RUN_HEADER,
    SUMMARY_HEADER,
};
pub use runner::{BenchmarkConfig, BenchmarkError, BenchmarkRunner};
pub use synthetic::{SyntheticConfig, SyntheticGenerator};
pub use thpack::{write_manifest, ManifestRow, ThpackParser, MANIFEST_HEADER};
