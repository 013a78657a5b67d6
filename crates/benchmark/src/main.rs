//! rkpack benchmark CLI

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rkpack_benchmark::{
    write_manifest, BenchmarkConfig, BenchmarkRunner, DatasetParser, LayoutReport, ManifestRow,
    SyntheticConfig, ThpackParser,
};
use rkpack_core::{Config, Solver, Variant};
use rkpack_d3::Packer3D;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rkpack-bench")]
#[command(about = "Random-key DE for 3D container loading")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance
    Solve {
        /// Path to the JSON instance
        #[arg(short, long)]
        instance: PathBuf,

        /// Search variant
        #[arg(short, long, value_enum)]
        variant: Option<VariantArg>,

        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Population size
        #[arg(long)]
        np: Option<usize>,

        /// Generation cap
        #[arg(long)]
        max_generations: Option<u32>,

        /// Solver configuration file (JSON); flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the best layout to this JSON file
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Run every instance of a folder for several trials
    Batch {
        /// Folder of JSON instances
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for per_run.csv and summary.csv
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        /// Variants to run
        #[arg(short, long, value_enum, default_values_t = vec![VariantArg::A3])]
        variant: Vec<VariantArg>,

        /// Trials per instance and variant
        #[arg(long, default_value = "10")]
        trials: usize,

        /// Base seed; trial t uses seed + t
        #[arg(short, long, default_value = "1337")]
        seed: u64,

        /// Time limit per trial in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Population size
        #[arg(long)]
        np: Option<usize>,

        /// Generation cap per trial
        #[arg(long)]
        max_generations: Option<u32>,

        /// Solver configuration file (JSON); flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run trials in parallel
        #[arg(long)]
        parallel: bool,

        /// Also write all runs as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Generate synthetic instances
    Generate {
        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Number of instances
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Items per instance
        #[arg(short, long, default_value = "100")]
        items: usize,

        /// Target item volume over container volume
        #[arg(long, default_value = "1.2")]
        fill_ratio: f64,

        /// Container width
        #[arg(long, default_value = "100")]
        width: f64,

        /// Container height
        #[arg(long, default_value = "100")]
        height: f64,

        /// Container depth
        #[arg(long, default_value = "100")]
        depth: f64,

        /// Base seed; instance k uses seed + 1000 k
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Convert OR-Library thpack files into JSON instances
    ImportThpack {
        /// thpack files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory for the JSON instances
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Only convert the first N problems of each file
        #[arg(long)]
        limit_problems: Option<usize>,

        /// Also write manifest.csv into the output directory
        #[arg(long)]
        manifest: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// Decoder baseline with random sampling
    H0,
    /// Classic DE/rand/1/bin
    A1,
    /// Self-adaptive current-to-pbest DE
    A2,
    /// A2 with elite local search
    A3,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::H0 => Variant::H0,
            VariantArg::A1 => Variant::A1,
            VariantArg::A2 => Variant::A2,
            VariantArg::A3 => Variant::A3,
        }
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn apply_overrides(
    mut config: Config,
    time_limit: Option<f64>,
    np: Option<usize>,
    max_generations: Option<u32>,
) -> Config {
    if let Some(secs) = time_limit {
        config = config.with_time_limit(secs);
    }
    if let Some(np) = np {
        config = config.with_population_size(np);
    }
    if let Some(gens) = max_generations {
        config = config.with_max_generations(gens);
    }
    config
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            variant,
            seed,
            time_limit,
            np,
            max_generations,
            config,
            layout,
        } => {
            let dataset = DatasetParser::new()
                .parse_file(&instance)
                .with_context(|| format!("loading instance {}", instance.display()))?;

            let mut config = apply_overrides(
                load_config(config.as_deref())?,
                time_limit,
                np,
                max_generations,
            );
            if let Some(v) = variant {
                config = config.with_variant(v.into());
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }

            let problem = dataset.to_instance();
            let result = Packer3D::new(config)
                .solve(&problem)
                .with_context(|| format!("solving {}", dataset.name))?;

            println!("{}", result.summary(&dataset.name));

            let report = LayoutReport::from_solve(&dataset.name, &result);
            println!("Rotations: {}", report.rotation_summary());

            if let Some(path) = layout {
                report
                    .save_json(&path)
                    .with_context(|| format!("writing layout {}", path.display()))?;
                println!("Layout saved to: {}", path.display());
            }
        }

        Commands::Batch {
            dir,
            out,
            variant,
            trials,
            seed,
            time_limit,
            np,
            max_generations,
            config,
            parallel,
            json,
        } => {
            let files = DatasetParser::list_instance_files(&dir)
                .with_context(|| format!("listing {}", dir.display()))?;
            if files.is_empty() {
                println!("No *.json instances found in {}", dir.display());
                return Ok(());
            }

            let solver = apply_overrides(
                load_config(config.as_deref())?,
                time_limit,
                np,
                max_generations,
            );
            let bench = BenchmarkConfig::new()
                .with_variants(variant.into_iter().map(Into::into).collect())
                .with_trials(trials)
                .with_base_seed(seed)
                .with_solver_config(solver)
                .with_parallel(parallel);

            let results = BenchmarkRunner::new(bench).run_directory(&dir)?;

            results
                .save_csv(&out)
                .with_context(|| format!("writing CSV files to {}", out.display()))?;
            if let Some(path) = json {
                results.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }

            results.print_summary();
            let shown = fs::canonicalize(&out).unwrap_or(out);
            println!("Batch complete. Results written to: {}", shown.display());
        }

        Commands::Generate {
            out_dir,
            count,
            items,
            fill_ratio,
            width,
            height,
            depth,
            seed,
        } => {
            let datasets = SyntheticConfig::new()
                .with_count(count)
                .with_items(items)
                .with_fill_ratio(fill_ratio)
                .with_container(width, height, depth)
                .with_seed(seed)
                .generate()?;

            fs::create_dir_all(&out_dir)?;
            for dataset in &datasets {
                let path = out_dir.join(format!("{}.json", dataset.name));
                dataset
                    .save_json(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                log::debug!("{:?}", dataset.info());
            }
            println!("OK: wrote {} instances to {}", datasets.len(), out_dir.display());
        }

        Commands::ImportThpack {
            files,
            out_dir,
            limit_problems,
            manifest,
        } => {
            let parser = ThpackParser::new().with_limit(limit_problems);
            fs::create_dir_all(&out_dir)?;

            let mut rows = Vec::new();
            for file in &files {
                let datasets = parser
                    .parse_file(file)
                    .with_context(|| format!("importing {}", file.display()))?;
                for dataset in &datasets {
                    let path = out_dir.join(format!("{}.json", dataset.name));
                    dataset
                        .save_json(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    rows.push(ManifestRow::new(dataset, path));
                }
                println!("OK: {} -> {} instances", file.display(), datasets.len());
            }

            if manifest {
                let path = out_dir.join("manifest.csv");
                write_manifest(&rows, BufWriter::new(File::create(&path)?))
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("OK: wrote {}", path.display());
            }
        }
    }

    Ok(())
}
