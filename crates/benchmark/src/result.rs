//! Benchmark result types and recording.

use rkpack_core::SolveResult;
use rkpack_d3::Placement;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Header of the per-run CSV.
pub const PER_RUN_HEADER: &str =
    "instance,variant,trial,seed,np,timeLimitSec,bestV,bestF,bestPlaced,timeSec,gens,evals";

/// Header of the summary CSV.
pub const SUMMARY_HEADER: &str =
    "instance,variant,trials,np,timeLimitSec,meanV,stdV,bestV,meanTimeSec,meanPlaced";

/// Result of a single trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Variant label
    pub variant: String,
    /// Trial index within its (instance, variant) group
    pub trial: usize,
    /// Seed used
    pub seed: u64,
    /// Requested population size
    pub np: usize,
    /// Time budget in seconds
    pub time_limit_secs: f64,
    /// Best volume utilization
    pub best_utilization: f64,
    /// Best fitness
    pub best_fitness: f64,
    /// Items placed by the best layout
    pub best_placed: usize,
    /// Wall-clock time in seconds
    pub time_secs: f64,
    /// Generations completed
    pub generations: u32,
    /// Decoder evaluations
    pub evaluations: u64,
    /// Stagnation restarts (JSON only; the CSV columns are fixed)
    #[serde(default)]
    pub restarts: u32,
}

impl RunResult {
    /// Creates a run result from a solver result.
    pub fn from_solve(
        instance: impl Into<String>,
        trial: usize,
        np: usize,
        time_limit_secs: f64,
        result: &SolveResult<Placement>,
    ) -> Self {
        Self {
            instance: instance.into(),
            variant: result.variant.label().to_string(),
            trial,
            seed: result.seed,
            np,
            time_limit_secs,
            best_utilization: result.best_utilization,
            best_fitness: result.best_fitness,
            best_placed: result.best_placed_count,
            time_secs: result.elapsed_seconds,
            generations: result.generation_count,
            evaluations: result.evaluation_count,
            restarts: result.restarts,
        }
    }

    /// Formats the run as a per-run CSV row.
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            escape_csv(&self.instance),
            escape_csv(&self.variant),
            self.trial,
            self.seed,
            self.np,
            self.time_limit_secs,
            self.best_utilization,
            self.best_fitness,
            self.best_placed,
            self.time_secs,
            self.generations,
            self.evaluations
        )
    }
}

/// Aggregate over the trials of one (instance, variant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub instance: String,
    pub variant: String,
    pub trials: usize,
    pub np: usize,
    pub time_limit_secs: f64,
    pub mean_utilization: f64,
    /// Sample standard deviation (0 for a single trial)
    pub std_utilization: f64,
    pub best_utilization: f64,
    pub mean_time_secs: f64,
    pub mean_placed: f64,
}

impl SummaryRow {
    fn from_runs(runs: &[&RunResult]) -> Option<Self> {
        let first = runs.first()?;
        let utilization: Vec<f64> = runs.iter().map(|r| r.best_utilization).collect();
        let times: Vec<f64> = runs.iter().map(|r| r.time_secs).collect();
        let placed: Vec<f64> = runs.iter().map(|r| r.best_placed as f64).collect();

        Some(Self {
            instance: first.instance.clone(),
            variant: first.variant.clone(),
            trials: runs.len(),
            np: first.np,
            time_limit_secs: first.time_limit_secs,
            mean_utilization: mean(&utilization),
            std_utilization: sample_std(&utilization),
            best_utilization: utilization.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_time_secs: mean(&times),
            mean_placed: mean(&placed),
        })
    }

    /// Formats the row as a summary CSV row.
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            escape_csv(&self.instance),
            escape_csv(&self.variant),
            self.trials,
            self.np,
            self.time_limit_secs,
            self.mean_utilization,
            self.std_utilization,
            self.best_utilization,
            self.mean_time_secs,
            self.mean_placed
        )
    }
}

/// Collection of benchmark results.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Individual run results
    pub runs: Vec<RunResult>,
}

impl BenchmarkResult {
    /// Creates an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a run result.
    pub fn add_run(&mut self, result: RunResult) {
        self.runs.push(result);
    }

    /// Returns true if no run was recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Groups runs by (instance, variant), ordered by instance then variant.
    pub fn summary(&self) -> Vec<SummaryRow> {
        let mut groups: BTreeMap<(&str, &str), Vec<&RunResult>> = BTreeMap::new();
        for run in &self.runs {
            groups
                .entry((run.instance.as_str(), run.variant.as_str()))
                .or_default()
                .push(run);
        }
        groups
            .values()
            .filter_map(|runs| SummaryRow::from_runs(runs))
            .collect()
    }

    /// Writes the per-run CSV.
    pub fn write_per_run_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", PER_RUN_HEADER)?;
        for run in &self.runs {
            writeln!(out, "{}", run.csv_row())?;
        }
        out.flush()
    }

    /// Writes the summary CSV.
    pub fn write_summary_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", SUMMARY_HEADER)?;
        for row in self.summary() {
            writeln!(out, "{}", row.csv_row())?;
        }
        out.flush()
    }

    /// Writes `per_run.csv` and `summary.csv` into a directory.
    pub fn save_csv(&self, dir: impl AsRef<Path>) -> io::Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.write_per_run_csv(BufWriter::new(File::create(dir.join("per_run.csv"))?))?;
        self.write_summary_csv(BufWriter::new(File::create(dir.join("summary.csv"))?))
    }

    /// Saves results to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Prints a summary table to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<100}", "");
        println!("BENCHMARK RESULTS");
        println!("{:=<100}", "");
        println!(
            "{:<24} {:<8} {:>7} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "Instance", "Variant", "Trials", "Mean V", "Std V", "Best V", "Time(s)", "Mean placed"
        );
        println!("{:-<100}", "");

        for row in self.summary() {
            println!(
                "{:<24} {:<8} {:>7} {:>10.6} {:>10.6} {:>10.6} {:>10.2} {:>12.1}",
                row.instance,
                row.variant,
                row.trials,
                row.mean_utilization,
                row.std_utilization,
                row.best_utilization,
                row.mean_time_secs,
                row.mean_placed
            );
        }
        println!("{:=<100}", "");
    }
}

/// Quotes a CSV field containing `,` or `"`, doubling inner quotes.
pub fn escape_csv(field: &str) -> Cow<'_, str> {
    if field.contains(',') || field.contains('"') {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Arithmetic mean (0 for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (0 for fewer than two values).
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
