//! Integration tests for rkpack-benchmark.

use approx::assert_relative_eq;
use rkpack_benchmark::{
    BenchmarkConfig, BenchmarkRunner, DatasetParser, LayoutReport, SyntheticConfig,
    ThpackParser, PER_RUN_HEADER, SUMMARY_HEADER,
};
use rkpack_core::{Config, Solver, Variant};
use rkpack_d3::Packer3D;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rkpack-bench-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn quick_bench(trials: usize) -> BenchmarkConfig {
    BenchmarkConfig::new()
        .with_variants(vec![Variant::A1, Variant::H0])
        .with_trials(trials)
        .with_base_seed(10)
        .with_show_progress(false)
        .with_solver_config(
            Config::default()
                .with_population_size(10)
                .with_time_limit(30.0)
                .with_max_generations(2),
        )
}

#[test]
fn test_generated_folder_round_trip() {
    let dir = scratch_dir("generate");
    let datasets = SyntheticConfig::new()
        .with_count(2)
        .with_items(8)
        .with_container(20.0, 20.0, 20.0)
        .generate()
        .unwrap();
    for dataset in &datasets {
        dataset.save_json(dir.join(format!("{}.json", dataset.name))).unwrap();
    }
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let files = DatasetParser::list_instance_files(&dir).unwrap();
    assert_eq!(files.len(), 2);

    let parsed = DatasetParser::new().parse_file(&files[0]).unwrap();
    assert_eq!(parsed.name, "syn_000");
    assert_eq!(parsed.container, datasets[0].container);
    assert_eq!(parsed.items.len(), 8);
    for (a, b) in parsed.items.iter().zip(&datasets[0].items) {
        assert_relative_eq!(a.width, b.width, epsilon = 1e-9);
        assert_relative_eq!(a.depth, b.depth, epsilon = 1e-9);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_files_sorted_case_insensitively() {
    let dir = scratch_dir("sort");
    let body = r#"{"container": {"W": 5, "H": 5, "D": 5}, "items": [{"w": 1, "h": 1, "d": 1}]}"#;
    for name in ["b.json", "A.json", "c.JSON"] {
        fs::write(dir.join(name), body).unwrap();
    }

    let names: Vec<String> = DatasetParser::list_instance_files(&dir)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["A.json", "b.json", "c.JSON"]);

    // Unnamed instances take their file stem.
    let dataset = DatasetParser::new().parse_file(dir.join("b.json")).unwrap();
    assert_eq!(dataset.name, "b");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_batch_writes_reports() {
    let dir = scratch_dir("batch");
    let instances = dir.join("instances");
    fs::create_dir_all(&instances).unwrap();
    for dataset in SyntheticConfig::new()
        .with_count(2)
        .with_items(6)
        .with_container(15.0, 15.0, 15.0)
        .generate()
        .unwrap()
    {
        dataset
            .save_json(instances.join(format!("{}.json", dataset.name)))
            .unwrap();
    }

    let results = BenchmarkRunner::new(quick_bench(2))
        .run_directory(&instances)
        .unwrap();
    assert_eq!(results.runs.len(), 2 * 2 * 2);

    let out = dir.join("results");
    results.save_csv(&out).unwrap();

    let per_run = fs::read_to_string(out.join("per_run.csv")).unwrap();
    let lines: Vec<&str> = per_run.lines().collect();
    assert_eq!(lines[0], PER_RUN_HEADER);
    assert_eq!(lines.len(), 9);
    assert!(lines[1].starts_with("syn_000,A1,0,10,10,30,"));
    assert!(lines[2].starts_with("syn_000,A1,1,11,10,30,"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], SUMMARY_HEADER);
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("syn_000,A1,2,10,30,"));
    assert!(lines[2].starts_with("syn_000,H0,2,10,30,"));
    assert!(lines[3].starts_with("syn_001,A1,"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_empty_folder_yields_no_runs() {
    let dir = scratch_dir("empty");
    let results = BenchmarkRunner::new(quick_bench(1)).run_directory(&dir).unwrap();
    assert!(results.is_empty());
    assert!(results.summary().is_empty());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_folder_is_an_error() {
    let dir = std::env::temp_dir().join("rkpack-bench-does-not-exist");
    assert!(DatasetParser::list_instance_files(&dir).is_err());
}

#[test]
fn test_thpack_import_round_trip() {
    let dir = scratch_dir("thpack");
    let source = dir.join("thpack9.txt");
    fs::write(
        &source,
        "1\n3 99\n30 20 10\n2\n1 6 0 4 0 3 1 4\n2 5 1 5 1 5 1 2\n",
    )
    .unwrap();

    let datasets = ThpackParser::new().parse_file(&source).unwrap();
    assert_eq!(datasets.len(), 1);
    let dataset = &datasets[0];
    assert_eq!(dataset.name, "thpack9_p003_seed99");
    let saved = dir.join(format!("{}.json", dataset.name));
    dataset.save_json(&saved).unwrap();

    let parsed = DatasetParser::new().parse_file(&saved).unwrap();
    assert_eq!(&parsed, dataset);
    assert_eq!(parsed.items[0].vert_ok, [false, true, false]);

    // Upright-only boxes keep their height vertical in the solved layout.
    let problem = parsed.to_instance();
    let config = Config::default()
        .with_variant(Variant::A2)
        .with_population_size(10)
        .with_time_limit(30.0)
        .with_max_generations(5);
    let result = Packer3D::new(config).solve(&problem).unwrap();
    for placement in &result.placements {
        if placement.item_id < 4 {
            assert_eq!(placement.height, 3.0);
        }
    }

    let report = LayoutReport::from_solve(&parsed.name, &result);
    assert_eq!(report.stats.count, result.best_placed_count);
    assert_eq!(
        report.stats.rotation_distribution.values().sum::<usize>(),
        result.placements.len()
    );

    fs::remove_dir_all(&dir).unwrap();
}
