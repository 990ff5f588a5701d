//! Codecarve CLI - function extraction and abstraction for C, C++, and Java

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;

use codecarve_core::{
    explode, AbstractionMode, AbstractionPolicy, Deadline, ExplodeOptions, ExtractOptions,
    FunctionSummary, Language, ParsedFile,
};

#[derive(Parser)]
#[command(name = "codecarve")]
#[command(about = "Extract and abstract C, C++, and Java functions for clone matching")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List function definitions in a file or directory
    List {
        /// Path to a source file or directory
        path: PathBuf,

        /// Language override (C, C++, Java); default is per-file
        /// extension detection
        #[arg(long)]
        lang: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Drop functions whose subtree contains parse errors
        #[arg(long)]
        skip_error_nodes: bool,
    },
    /// Write one artifact per function into an exploded directory
    Explode {
        /// Source root to walk
        src: PathBuf,

        /// Output root for per-function artifacts
        out: PathBuf,

        /// Languages to extract (repeatable); default is all supported
        #[arg(long = "lang")]
        langs: Vec<String>,

        /// Per-file extraction timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Glob pattern for relative paths to include (repeatable)
        #[arg(long = "include")]
        include: Vec<String>,

        /// Glob pattern for relative paths to exclude (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },
    /// Print the abstracted token stream of every function in a file
    Abstract {
        /// Path to a source file
        path: PathBuf,

        /// Language override (C, C++, Java)
        #[arg(long)]
        lang: Option<String>,

        /// Function-name handling
        #[arg(long, default_value = "tag")]
        fname: Mode,

        /// Local-variable handling
        #[arg(long, default_value = "num")]
        lvar: Mode,

        /// Parameter handling
        #[arg(long, default_value = "num")]
        fparam: Mode,

        /// Label handling
        #[arg(long, default_value = "tag")]
        label: Mode,

        /// Field-access handling
        #[arg(long, default_value = "keep")]
        field: Mode,

        /// Type handling
        #[arg(long, default_value = "keep")]
        vtype: Mode,

        /// Literal handling
        #[arg(long, default_value = "keep")]
        literal: Mode,

        /// Called-function handling (known keeps standard/system names)
        #[arg(long, default_value = "keep")]
        fcall: Mode,

        /// Outer-scope symbol handling
        #[arg(long, default_value = "num")]
        gsym: Mode,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Keep the original text
    Keep,
    /// Collapse to the category tag
    Tag,
    /// Numbered placeholders per distinct name
    Num,
    /// Keep known standard/system names, tag the rest
    Known,
}

impl From<Mode> for AbstractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Keep => AbstractionMode::Keep,
            Mode::Tag => AbstractionMode::Tag,
            Mode::Num => AbstractionMode::Numbered,
            Mode::Known => AbstractionMode::KeepKnown,
        }
    }
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    functions: Vec<FunctionSummary>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::List {
            path,
            lang,
            format,
            skip_error_nodes,
        } => cmd_list(&path, lang.as_deref(), format, skip_error_nodes),
        Commands::Explode {
            src,
            out,
            langs,
            timeout_secs,
            include,
            exclude,
        } => cmd_explode(&src, &out, &langs, timeout_secs, include, exclude),
        Commands::Abstract {
            path,
            lang,
            fname,
            lvar,
            fparam,
            label,
            field,
            vtype,
            literal,
            fcall,
            gsym,
        } => {
            let policy = AbstractionPolicy {
                function_name: fname.into(),
                local_var: lvar.into(),
                parameter: fparam.into(),
                label: label.into(),
                field: field.into(),
                var_type: vtype.into(),
                literal: literal.into(),
                call: fcall.into(),
                global_symbol: gsym.into(),
            };
            cmd_abstract(&path, lang.as_deref(), &policy)
        }
    }
}

/// Resolve a file's language from the override or its extension.
fn resolve_language(path: &Path, lang: Option<Language>) -> anyhow::Result<Language> {
    match lang {
        Some(language) => Ok(language),
        None => Language::from_path(path)
            .with_context(|| format!("cannot detect language of {}", path.display())),
    }
}

/// Collect source files under a path, sorted for determinism.
///
/// With a language override only that language's extensions are walked;
/// otherwise every supported extension matches.
fn collect_source_files(path: &Path, lang: Option<Language>) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let selected = |p: &Path| match lang {
        Some(language) => Language::from_path(p) == Some(language),
        None => Language::from_path(p).is_some(),
    };

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| selected(p))
        .collect();
    files.sort();
    Ok(files)
}

fn cmd_list(
    path: &Path,
    lang: Option<&str>,
    format: OutputFormat,
    skip_error_nodes: bool,
) -> anyhow::Result<()> {
    let lang = lang.map(Language::from_name).transpose()?;
    let files = collect_source_files(path, lang)?;
    if files.is_empty() {
        bail!("no supported source files under {}", path.display());
    }

    let opts = ExtractOptions {
        keep_error_nodes: !skip_error_nodes,
        ..Default::default()
    };

    let mut reports: Vec<FileReport> = files
        .par_iter()
        .filter_map(|file| {
            let language = match resolve_language(file, lang) {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("warning: skipping {}: {e}", file.display());
                    return None;
                }
            };
            let result = std::fs::read(file)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| {
                    let parsed = ParsedFile::parse(bytes, language)?;
                    let records = parsed.functions(&opts)?;
                    Ok(records.iter().map(|r| r.summary()).collect::<Vec<_>>())
                });
            match result {
                Ok(functions) => Some(FileReport {
                    file: file.display().to_string(),
                    functions,
                }),
                Err(e) => {
                    eprintln!("warning: skipping {}: {e}", file.display());
                    None
                }
            }
        })
        .collect();
    reports.sort_by(|a, b| a.file.cmp(&b.file));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                for f in &report.functions {
                    println!(
                        "{}:{}-{} {}",
                        report.file,
                        f.start_line,
                        f.end_line,
                        f.fullname.as_deref().unwrap_or("<unnamed>")
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_explode(
    src: &Path,
    out: &Path,
    langs: &[String],
    timeout_secs: Option<u64>,
    include: Vec<String>,
    exclude: Vec<String>,
) -> anyhow::Result<()> {
    let mut opts = ExplodeOptions {
        timeout: timeout_secs.map(Duration::from_secs),
        include,
        exclude,
        ..Default::default()
    };
    if !langs.is_empty() {
        opts.langs = langs
            .iter()
            .map(|tag| Ok(Language::from_name(tag)?))
            .collect::<anyhow::Result<Vec<_>>>()?;
    }

    let summary = explode(src, out, &opts).context("explode failed")?;
    println!(
        "{} file(s) seen, {} exploded, {} skipped, {} function(s) written",
        summary.files_seen,
        summary.files_exploded,
        summary.files_skipped,
        summary.functions_written
    );
    if summary.files_skipped > 0 {
        eprintln!("Skipped {} file(s) due to extraction errors", summary.files_skipped);
    }
    Ok(())
}

fn cmd_abstract(
    path: &Path,
    lang: Option<&str>,
    policy: &AbstractionPolicy,
) -> anyhow::Result<()> {
    let lang = lang.map(Language::from_name).transpose()?;
    let language = resolve_language(path, lang)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = ParsedFile::parse(bytes, language)?;
    let records = parsed.functions(&ExtractOptions::default())?;

    for record in &records {
        let tokens = record.abstracted(policy, Deadline::none())?;
        println!(
            "== {} ({}:{}-{})",
            record.fullname().unwrap_or_else(|| "<unnamed>".to_string()),
            path.display(),
            record.start_line(),
            record.end_line()
        );
        println!("{}", tokens.join(" "));
    }
    Ok(())
}
