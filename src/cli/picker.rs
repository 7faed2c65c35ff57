//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `imdb` and choose a CSV" UX
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::DEFAULT_CSV;
use crate::error::AppError;

/// Environment variable (also read from `.env`) naming the dataset CSV.
pub const CSV_ENV_VAR: &str = "IMDB_DASH_CSV";

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Resolve the dataset path: flag, then `IMDB_DASH_CSV`, then the default
/// file name in the working directory, then (if `interactive`) the picker.
pub fn resolve_csv_path(flag: Option<&Path>, interactive: bool) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return validate_csv_path(path);
    }

    dotenvy::dotenv().ok();
    if let Ok(value) = std::env::var(CSV_ENV_VAR) {
        let value = value.trim();
        if !value.is_empty() {
            debug!(path = value, "using CSV from {CSV_ENV_VAR}");
            return validate_csv_path(Path::new(value));
        }
    }

    let default = Path::new(DEFAULT_CSV);
    if default.is_file() {
        return validate_csv_path(default);
    }

    if interactive {
        return prompt_for_csv_path();
    }

    Err(AppError::new(
        2,
        format!("No CSV given and {DEFAULT_CSV} not found. Provide one with `--csv <file.csv>` or {CSV_ENV_VAR}."),
    ))
}

/// One line of picker input, interpreted against a list of `count` files.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Quit,
    /// Zero-based index into the listed files.
    Listed(usize),
    OutOfRange(usize),
    Typed(PathBuf),
}

fn parse_selection(line: &str, count: usize) -> Selection {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Selection::Quit;
    }
    match line.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Selection::Listed(n - 1),
        Ok(n) => Selection::OutOfRange(n),
        Err(_) => Selection::Typed(PathBuf::from(line)),
    }
}

/// List the discovered CSVs on stdout and read the choice from stdin.
///
/// A number picks from the list, anything else is taken as a path, and `q`
/// cancels.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Provide one with `imdb report --csv <file.csv>`.",
        ));
    }
    choose_csv(&files, io::stdin().lock(), io::stdout().lock())
}

/// Drive the picker over arbitrary input and output streams until a valid
/// CSV is chosen, the user quits, or input runs out.
fn choose_csv<R: BufRead, W: Write>(files: &[PathBuf], mut input: R, mut out: W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    let mut line = String::new();
    loop {
        write!(out, "Pick 1-{} or enter a path (q quits): ", files.len()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if read == 0 {
            return Err(AppError::new(2, "Input closed before a CSV was chosen."));
        }

        let attempt = match parse_selection(&line, files.len()) {
            Selection::Quit => return Err(AppError::new(2, "Canceled.")),
            Selection::Listed(idx) => validate_csv_path(&files[idx]),
            Selection::OutOfRange(n) => {
                writeln!(out, "No file numbered {n}.").map_err(write_err)?;
                continue;
            }
            Selection::Typed(path) => validate_csv_path(&path),
        };
        match attempt {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}). Use --csv to pass a CSV path.", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory, sorted by display path.
pub fn discover_csv_files() -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut pending = vec![(PathBuf::from("."), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if depth < DEFAULT_SEARCH_DEPTH && !should_skip_dir(&path) {
                    pending.push((path, depth + 1));
                }
            } else if file_type.is_file() && has_csv_extension(&path) {
                out.push(path);
            }
        }
    }

    out.sort_by_cached_key(|p| pretty_path(p));
    out
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
