//! Resolving a path to input files and running the inversion pipeline on each

use std::path::{Path, PathBuf};
use glob::{MatchOptions, Pattern};
use tracing::{info, warn};
use crate::error::{Error, Result};
use crate::pdf::{invert_document, load_document_file, save_document_file, InvertOptions};

/// File names treated as PDF inputs, matched case-insensitively
const PDF_GLOB: &str = "*.pdf";

/// What a user-supplied path turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Directory(PathBuf),
    File(PathBuf),
}

/// Outcome of processing one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Output path on success
    pub result: Result<PathBuf>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output(&self) -> Option<&Path> {
        self.result.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn error(&self) -> Option<&Error> {
        self.result.as_ref().err()
    }
}

/// Per-file outcomes of a directory run, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of eligible files found
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of files successfully inverted
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.processed()
    }

    /// True when the directory held no eligible PDF files
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Result of [`run`]
#[derive(Debug)]
pub enum RunOutcome {
    Single(FileOutcome),
    Batch(BatchReport),
}

/// Progress notifications emitted while running
#[derive(Debug)]
pub enum Progress<'a> {
    /// Eligible files found in a directory
    Discovered(usize),
    /// About to process this file
    Started(&'a Path),
    Finished(&'a FileOutcome),
}

fn pdf_pattern() -> Option<Pattern> {
    Pattern::new(PDF_GLOB).ok()
}

fn case_insensitive() -> MatchOptions {
    MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .zip(pdf_pattern())
        .is_some_and(|(name, pattern)| pattern.matches_with(&name, case_insensitive()))
}

/// Whether a directory entry name should be processed.
///
/// Accepts `*.pdf` (any case) that does not contain `<suffix>.pdf`, which marks
/// output from an earlier run.
pub fn is_eligible_input(file_name: &str, output_suffix: &str) -> bool {
    let is_pdf = pdf_pattern()
        .is_some_and(|pattern| pattern.matches_with(file_name, case_insensitive()));
    let marker = format!("{}.pdf", output_suffix).to_lowercase();

    is_pdf && !file_name.to_lowercase().contains(&marker)
}

/// Sibling path with `output_suffix` inserted before the extension.
///
/// `<dir>/<name>.pdf` becomes `<dir>/<name><suffix>.pdf`.
pub fn output_path_for(input: &Path, output_suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input.with_file_name(format!("{}{}.pdf", stem, output_suffix))
}

/// Classify a user-supplied path
pub fn resolve_target(path: &Path) -> Result<Target> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if metadata.is_dir() {
        Ok(Target::Directory(path.to_path_buf()))
    } else if metadata.is_file() && has_pdf_extension(path) {
        Ok(Target::File(path.to_path_buf()))
    } else {
        Err(Error::InvalidInput(path.to_path_buf()))
    }
}

/// The path to work on: the given one, or the current directory
pub fn default_target(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|e| {
            Error::Unexpected(format!("cannot determine current directory: {}", e))
        }),
    }
}

/// List eligible PDF files directly inside `dir`, sorted by path
pub fn collect_inputs(dir: &Path, output_suffix: &str) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        // Non UTF-8 names are matched lossily; the real path is kept
        let name = entry.file_name();
        if is_eligible_input(&name.to_string_lossy(), output_suffix) {
            inputs.push(entry.path());
        }
    }

    // Sort paths for consistent ordering
    inputs.sort();

    Ok(inputs)
}

/// Load, invert and write one file. Returns the output path.
pub fn invert_file(input: &Path, options: &InvertOptions) -> Result<PathBuf> {
    info!(input = %input.display(), "processing");

    let mut doc = load_document_file(input)?;
    let summary = invert_document(&mut doc, options)?;

    let output = output_path_for(input, &options.output_suffix);
    save_document_file(&mut doc, &output)?;

    info!(
        output = %output.display(),
        pages = summary.pages.len(),
        "wrote inverted PDF"
    );
    Ok(output)
}

/// Process each input in order; one file's failure does not stop the rest
pub fn invert_batch<F>(inputs: &[PathBuf], options: &InvertOptions, mut on_progress: F) -> BatchReport
where
    F: FnMut(Progress<'_>),
{
    let mut report = BatchReport::default();

    for input in inputs {
        let outcome = process_one(input, options, &mut on_progress);
        report.outcomes.push(outcome);
    }

    report
}

fn process_one<F>(input: &Path, options: &InvertOptions, on_progress: &mut F) -> FileOutcome
where
    F: FnMut(Progress<'_>),
{
    on_progress(Progress::Started(input));

    let result = invert_file(input, options);
    if let Err(e) = &result {
        warn!(input = %input.display(), error = %e, "failed to invert");
    }

    let outcome = FileOutcome {
        input: input.to_path_buf(),
        result,
    };
    on_progress(Progress::Finished(&outcome));
    outcome
}

/// Invert a single PDF file or every eligible PDF in a directory.
///
/// Errors only when `path` itself can't be used; per-file failures are
/// recorded in the returned outcome.
///
/// # Example
///
/// ```no_run
/// use pdf_invert::batch::{run, RunOutcome};
/// use pdf_invert::pdf::InvertOptions;
/// use std::path::Path;
///
/// match run(Path::new("papers"), &InvertOptions::default(), |_| {}).expect("Bad path") {
///     RunOutcome::Batch(report) => println!("{} of {} inverted", report.processed(), report.total()),
///     RunOutcome::Single(outcome) => println!("{:?}", outcome.output()),
/// }
/// ```
pub fn run<F>(path: &Path, options: &InvertOptions, mut on_progress: F) -> Result<RunOutcome>
where
    F: FnMut(Progress<'_>),
{
    match resolve_target(path)? {
        Target::Directory(dir) => {
            let inputs = collect_inputs(&dir, &options.output_suffix)?;
            on_progress(Progress::Discovered(inputs.len()));
            Ok(RunOutcome::Batch(invert_batch(&inputs, options, on_progress)))
        }
        Target::File(file) => Ok(RunOutcome::Single(process_one(&file, options, &mut on_progress))),
    }
}
