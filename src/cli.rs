//! Minimal CLI: check → (report | default instance)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use crate::descriptor::Descriptor;
use crate::empty::NewOptions;
use crate::expr;
use crate::registry::Signatures;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON documents against runtime type declarations, or print a type's default instance
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check every input document against the declared type
    Check(CheckSettings),
    /// print the declared type's empty instance as JSON
    Default(DefaultSettings),
}

/// Where the declared type comes from: an inline expression, or a name
/// looked up in a JSON signature file.
#[derive(Args, Debug, Clone)]
struct TypeSelection {
    /// inline type expression, e.g. 'Array[Integer]' or 'Map[String, Union[Integer, Nil]]'
    #[arg(long, value_name = "TYPE")]
    type_expr: Option<String>,

    /// JSON signature file mapping names to type expressions
    #[arg(long, requires = "name", conflicts_with = "type_expr")]
    signatures: Option<PathBuf>,

    /// signature to look up in the file given by --signatures
    #[arg(long, requires = "signatures", conflicts_with = "type_expr")]
    name: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckSettings {
    #[command(flatten)]
    type_selection: TypeSelection,

    #[command(flatten)]
    input_settings: InputSettings,

    /// suppress per-document lines and print only the summary
    #[arg(long, default_value_t = false)]
    summary_only: bool,

    /// print the whole report as JSON (for CI consumption)
    #[arg(long, default_value_t = false, conflicts_with = "summary_only")]
    json: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DefaultSettings {
    #[command(flatten)]
    type_selection: TypeSelection,

    /// build with this many elements instead of zero (sequences only)
    #[arg(long)]
    len: Option<usize>,

    /// JSON value cloned into each pre-filled slot; requires --len
    #[arg(long, value_name = "JSON")]
    fill: Option<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One parsed document, after pointer selection.
struct Document {
    /// 1-based source line for NDJSON inputs.
    line: Option<usize>,
    value: Value,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    outcomes: Vec<DocOutcome>,
}

#[derive(Debug, Serialize)]
struct DocOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    /// Kind of the checked node, for "expected X, got Y" lines.
    kind: &'static str,
    ok: bool,
}

/// Top-level shape of `check --json` output.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    expected: String,
    ok: usize,
    failed: usize,
    files: &'a [FileReport],
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSelection {
    fn resolve(&self) -> anyhow::Result<Descriptor> {
        match (&self.type_expr, &self.signatures, &self.name) {
            (Some(src), None, None) => expr::parse_type(src)
                .with_context(|| format!("invalid type expression `{src}`")),
            (None, Some(path), Some(name)) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read signature file {path:?}"))?;
                let sigs = Signatures::from_json(&source)
                    .with_context(|| format!("failed to parse signature file {path:?}"))?;
                sigs.get(name).cloned().ok_or_else(|| {
                    let known = sigs.names().collect::<Vec<_>>().join(", ");
                    anyhow!("no signature named `{name}` in {path:?} (have: {known})")
                })
            }
            _ => Err(anyhow!("give either --type-expr or --signatures with --name")),
        }
    }
}

impl InputSettings {
    fn load_documents(&self, path: &Path) -> anyhow::Result<Vec<Document>> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        let mut docs = Vec::new();
        if self.ndjson {
            for (ix, line) in source.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let json = serde_json::from_str::<serde_json::Value>(line)
                    .with_context(|| format!("{}:{}: invalid JSON", path.display(), ix + 1))?;
                docs.push(Document { line: Some(ix + 1), value: self.select(path, &json)? });
            }
        } else {
            let json = serde_json::from_str::<serde_json::Value>(&source)
                .with_context(|| format!("{}: invalid JSON", path.display()))?;
            docs.push(Document { line: None, value: self.select(path, &json)? });
        }
        Ok(docs)
    }

    /// Apply `--json-pointer`, if any. A pointer that selects nothing is a
    /// configuration error, not a type mismatch.
    fn select(&self, path: &Path, json: &serde_json::Value) -> anyhow::Result<Value> {
        let node = match self.json_pointer.as_ref() {
            Some(ptr) => json.pointer(ptr).ok_or_else(|| {
                anyhow!("{}: JSON pointer `{ptr}` selects nothing", path.display())
            })?,
            None => json,
        };
        Ok(Value::from(node))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                // 1) resolve the declared type and the input files
                let descriptor = target.type_selection.resolve()?;
                let paths = resolve_file_path_patterns(&target.input_settings.input)?;

                // 2) parse and check every document, files in parallel
                let reports = paths
                    .par_iter()
                    .map(|path| check_file(path, &target.input_settings, &descriptor))
                    .collect::<anyhow::Result<Vec<_>>>()?;

                // 3) per-document lines, then the summary; nonzero exit on any failure
                if target.json {
                    print_json_report(&descriptor, &reports)
                } else {
                    Ok(print_report(&descriptor, &reports, target.summary_only))
                }
            }
            Command::Default(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                // 1) resolve the declared type
                let descriptor = target.type_selection.resolve()?;

                // 2) build the instance; options pass through unvalidated
                let opts = NewOptions {
                    capacity: None,
                    len: target.len,
                    fill: target.fill.as_deref().map(parse_fill).transpose()?,
                };
                let built = descriptor
                    .empty_instance(&opts)
                    .with_context(|| format!("cannot build a default {}", descriptor.name()))?;

                // 3) render as JSON
                let rendered = serde_json::to_string_pretty(&built.to_json())?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)
                                .with_context(|| format!("failed to create directory {parent:?}"))?;
                        }
                    }
                    std::fs::write(out, &rendered)
                        .with_context(|| format!("failed to write {out:?}"))?;
                } else {
                    println!("{rendered}");
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_file(
    path: &Path,
    input: &InputSettings,
    descriptor: &Descriptor,
) -> anyhow::Result<FileReport> {
    let outcomes = input
        .load_documents(path)?
        .into_iter()
        .map(|doc| DocOutcome {
            line: doc.line,
            kind: doc.value.kind_name(),
            ok: descriptor.validate(&doc.value),
        })
        .collect();
    Ok(FileReport { path: path.to_path_buf(), outcomes })
}

fn count_outcomes(reports: &[FileReport]) -> (usize, usize) {
    let mut ok_count = 0usize;
    let mut fail_count = 0usize;
    for report in reports {
        for outcome in &report.outcomes {
            if outcome.ok {
                ok_count += 1;
            } else {
                fail_count += 1;
            }
        }
    }
    (ok_count, fail_count)
}

fn print_json_report(descriptor: &Descriptor, reports: &[FileReport]) -> anyhow::Result<ExitCode> {
    let (ok, failed) = count_outcomes(reports);
    let report = CheckReport { expected: descriptor.name(), ok, failed, files: reports };
    println!("{}", serde_json::to_string_pretty(&report)?);
    if failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_report(descriptor: &Descriptor, reports: &[FileReport], summary_only: bool) -> ExitCode {
    let mut ok_count = 0usize;
    let mut fail_count = 0usize;
    for report in reports {
        for outcome in &report.outcomes {
            let label = match outcome.line {
                Some(line) => format!("{}:{line}", report.path.display()),
                None => report.path.display().to_string(),
            };
            if outcome.ok {
                ok_count += 1;
                if !summary_only {
                    println!("{}   {label}", "ok".green());
                }
            } else {
                fail_count += 1;
                if !summary_only {
                    println!(
                        "{} {label}: {}",
                        "FAIL".red().bold(),
                        describe_mismatch(descriptor, outcome.kind),
                    );
                }
            }
        }
    }
    let total = ok_count + fail_count;
    let summary = format!(
        "checked {total} document{} across {} file{}: {ok_count} ok, {fail_count} failed",
        plural(total),
        reports.len(),
        plural(reports.len()),
    );
    if fail_count == 0 {
        println!("{} {summary}", "ok".green());
        ExitCode::SUCCESS
    } else {
        println!("{} {summary}", "FAIL".red().bold());
        ExitCode::FAILURE
    }
}

/// One failing line's explanation. When a container descriptor rejected
/// a value of the wrong kind, name the kind it wanted.
fn describe_mismatch(descriptor: &Descriptor, kind: &str) -> String {
    match descriptor.required_kind() {
        Some(required) if required.name() != kind => format!(
            "expected {} (a {}), got {kind}",
            descriptor.name(),
            required.name(),
        ),
        _ => format!("expected {}, got {kind}", descriptor.name()),
    }
}

fn parse_fill(src: &str) -> anyhow::Result<Value> {
    let json = serde_json::from_str::<serde_json::Value>(src)
        .with_context(|| format!("--fill is not valid JSON: `{src}`"))?;
    Ok(Value::from(&json))
}

/// Expand literal paths and glob patterns, keeping the order they were
/// given so reports read in input order.
fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            let entries = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern `{pattern}`"))?;
            for entry in entries {
                let path = entry.with_context(|| format!("failed to expand glob `{pattern}`"))?;
                if path.is_file() {
                    matched_any = true;
                    out.push(path);
                }
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            // Treat as a literal path; it must exist
            let path = Path::new(pattern);
            if !path.is_file() {
                return Err(anyhow!("no such input file: {pattern}"));
            }
            out.push(path.to_path_buf());
        }
    }

    Ok(out)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
