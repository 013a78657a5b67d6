//! Importer for OR-Library `thpack` box files.
//!
//! A file holds `P` problems. Each problem is a header line `p [seed]`, the
//! container line `L W H`, the type count `n`, and `n` lines of eight
//! integers `type l vl w vw h vh q`, where each `v*` flag says whether the
//! preceding dimension may stand vertical. Blank lines are ignored.
//!
//! Length maps to width, the file's width to depth and height stays
//! vertical, for both the container and the boxes.

use crate::dataset::{ContainerSpec, Dataset, DatasetItem};
use crate::parser::ParseError;
use crate::result::escape_csv;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Header of the import manifest CSV.
pub const MANIFEST_HEADER: &str = "name,file,W,H,D,n_items";

/// One converted instance, as listed in the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    pub name: String,
    pub file: PathBuf,
    pub container: ContainerSpec,
    pub items: usize,
}

impl ManifestRow {
    /// Describes a dataset written to `file`.
    pub fn new(dataset: &Dataset, file: impl Into<PathBuf>) -> Self {
        Self {
            name: dataset.name.clone(),
            file: file.into(),
            container: dataset.container,
            items: dataset.total_items(),
        }
    }
}

/// Writes the manifest sorted by instance name.
pub fn write_manifest<W: Write>(rows: &[ManifestRow], mut out: W) -> io::Result<()> {
    let mut sorted: Vec<&ManifestRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    writeln!(out, "{}", MANIFEST_HEADER)?;
    for row in sorted {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            escape_csv(&row.name),
            escape_csv(&row.file.to_string_lossy()),
            row.container.width,
            row.container.height,
            row.container.depth,
            row.items
        )?;
    }
    out.flush()
}

/// Parser for `thpack` files.
#[derive(Debug, Default, Clone)]
pub struct ThpackParser {
    limit_problems: Option<usize>,
}

impl ThpackParser {
    /// Creates a parser that reads every problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after the first `limit` problems of each file.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit_problems = limit;
        self
    }

    /// Parses a file; instance names start with the file stem.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Dataset>, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "thpack".to_string());
        self.parse_str(&text, &stem)
    }

    /// Parses file contents, naming instances `{stem}_p{p:03}[_seed{seed}]`.
    pub fn parse_str(&self, text: &str, stem: &str) -> Result<Vec<Dataset>, ParseError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let count = match lines.next() {
            Some(line) => leading_int(line, "problem count")?,
            None => return Err(ParseError::InvalidFormat(format!("empty thpack file '{}'", stem))),
        };
        let count = usize::try_from(count)
            .map_err(|_| ParseError::InvalidFormat(format!("negative problem count {}", count)))?;

        let mut datasets = Vec::new();
        for _ in 0..count {
            if self.limit_problems.is_some_and(|limit| datasets.len() >= limit) {
                break;
            }
            datasets.push(parse_problem(&mut lines, stem)?);
        }
        log::debug!("parsed {} thpack problems from '{}'", datasets.len(), stem);
        Ok(datasets)
    }
}

fn parse_problem<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    stem: &str,
) -> Result<Dataset, ParseError> {
    let header = ints(next_line(lines, "problem header")?, "problem header")?;
    let (number, seed) = match header.as_slice() {
        [] => return Err(ParseError::InvalidFormat("blank problem header".to_string())),
        [p] => (*p, None),
        [p, seed, ..] => (*p, Some(*seed)),
    };

    let dims = ints(next_line(lines, "container line")?, "container line")?;
    let &[length, width, height] = dims.as_slice() else {
        return Err(ParseError::InvalidFormat(format!(
            "problem {}: container line needs 3 integers, got {:?}",
            number, dims
        )));
    };

    let types = leading_int(next_line(lines, "box type count")?, "box type count")?;
    let types = usize::try_from(types).map_err(|_| {
        ParseError::InvalidFormat(format!("problem {}: negative box type count", number))
    })?;

    let mut items = Vec::with_capacity(types);
    for _ in 0..types {
        let fields = ints(next_line(lines, "box type")?, "box type")?;
        let &[_, l, vl, w, vw, h, vh, q] = fields.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "problem {}: box type line needs 8 integers, got {}",
                number,
                fields.len()
            )));
        };
        // A type with no copies contributes nothing.
        if q <= 0 {
            continue;
        }
        items.push(
            DatasetItem::new(l as f64, h as f64, w as f64)
                .with_quantity(q as usize)
                .with_vert_ok([vl != 0, vh != 0, vw != 0]),
        );
    }

    let mut name = format!("{}_p{:03}", stem, number);
    if let Some(seed) = seed {
        name.push_str(&format!("_seed{}", seed));
    }

    Ok(Dataset {
        name,
        container: ContainerSpec::new(length as f64, height as f64, width as f64),
        items,
    })
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<&'a str, ParseError> {
    lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat(format!("unexpected end of file before {}", what)))
}

fn ints(line: &str, what: &str) -> Result<Vec<i64>, ParseError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<i64>().map_err(|_| {
                ParseError::InvalidFormat(format!("{}: '{}' is not an integer", what, tok))
            })
        })
        .collect()
}

fn leading_int(line: &str, what: &str) -> Result<i64, ParseError> {
    let first = line.split_whitespace().next().unwrap_or_default();
    first
        .parse()
        .map_err(|_| ParseError::InvalidFormat(format!("{}: '{}' is not an integer", what, first)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PROBLEMS: &str = "2
 1 2508405
587 233 220
3
1 108 0 76 0 30 1 40

2 110 0 43 1 25 1 33
3 92 1 81 1 55 1 39
 2
100 50 40
1
1 10 1 20 1 30 1 2
";

    #[test]
    fn test_parse_problems() {
        let datasets = ThpackParser::new().parse_str(TWO_PROBLEMS, "thpack1").unwrap();
        assert_eq!(datasets.len(), 2);

        let first = &datasets[0];
        assert_eq!(first.name, "thpack1_p001_seed2508405");
        assert_eq!(first.container, ContainerSpec::new(587.0, 220.0, 233.0));
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.total_items(), 40 + 33 + 39);

        let box1 = &first.items[0];
        assert_eq!((box1.width, box1.height, box1.depth), (108.0, 30.0, 76.0));
        // Flags follow (length, height, width).
        assert_eq!(box1.vert_ok, [false, true, false]);
        assert_eq!(first.items[1].vert_ok, [false, true, true]);
        assert_eq!(first.items[2].vert_ok, [true; 3]);

        assert_eq!(datasets[1].name, "thpack1_p002");
        assert_eq!(datasets[1].container, ContainerSpec::new(100.0, 40.0, 50.0));
    }

    #[test]
    fn test_limit_problems() {
        let datasets = ThpackParser::new()
            .with_limit(Some(1))
            .parse_str(TWO_PROBLEMS, "thpack1")
            .unwrap();
        assert_eq!(datasets.len(), 1);
    }

    #[test]
    fn test_zero_quantity_type_is_dropped() {
        let text = "1\n7\n10 10 10\n2\n1 2 1 2 1 2 1 0\n2 3 1 3 1 3 1 1\n";
        let datasets = ThpackParser::new().parse_str(text, "t").unwrap();
        assert_eq!(datasets[0].name, "t_p007");
        assert_eq!(datasets[0].items.len(), 1);
        assert_eq!(datasets[0].items[0].width, 3.0);
    }

    #[test]
    fn test_malformed_files() {
        let parser = ThpackParser::new();
        let bad = |text: &str| matches!(parser.parse_str(text, "t"), Err(ParseError::InvalidFormat(_)));

        assert!(bad(""));
        assert!(bad("1\n1\n10 10\n1\n1 2 1 2 1 2 1 1\n"));
        assert!(bad("1\n1\n10 10 10\n1\n1 2 1 2 1 2 1\n"));
        assert!(bad("1\n1\n10 10 10\n2\n1 2 1 2 1 2 1 1\n"));
        assert!(bad("1\n1\n10 x 10\n1\n1 2 1 2 1 2 1 1\n"));
    }

    #[test]
    fn test_manifest_sorted_by_name() {
        let datasets = ThpackParser::new().parse_str(TWO_PROBLEMS, "thpack1").unwrap();
        let rows = vec![
            ManifestRow::new(&datasets[1], "out/b.json"),
            ManifestRow::new(&datasets[0], "out/a.json"),
        ];

        let mut buf = Vec::new();
        write_manifest(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], MANIFEST_HEADER);
        assert_eq!(lines[1], "thpack1_p001_seed2508405,out/a.json,587,220,233,112");
        assert_eq!(lines[2], "thpack1_p002,out/b.json,100,40,50,2");
    }

    #[test]
    fn test_imported_instance_solves_upright() {
        let text = "1\n1\n20 20 10\n1\n1 8 0 6 0 4 1 3\n";
        let datasets = ThpackParser::new().parse_str(text, "t").unwrap();
        let instance = datasets[0].to_instance();
        assert_eq!(instance.len(), 3);
        assert!(instance.items().iter().all(|i| i.vert_ok() == [false, true, false]));
        assert!(instance.validate().is_ok());
    }
}
