use aitype_core::{
    parse_program, type_check_block, CheckerConfig, CliOverrides, Diagnostic, DiagnosticRenderer,
    OutputFormat, Scope, CONFIG_FILE_NAME,
};
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// aitype - static type checker for AiScript syntax trees
#[derive(Parser, Debug, Clone)]
#[command(name = "aitype")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Syntax-tree JSON files to check
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to aitype.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Script source used to show diagnostic context (single input only)
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Diagnostic output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Print diagnostics without colors
    #[arg(long)]
    no_pretty: bool,

    /// Start from an empty scope instead of the standard library
    #[arg(long)]
    no_stdlib: bool,

    /// Write a default aitype.yaml to the current directory
    #[arg(long)]
    init: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Diagnostics found in one input file
struct FileReport {
    path: PathBuf,
    source: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    diagnostics: &'a [Diagnostic],
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default `warn` level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.init {
        init_project()?;
        return Ok(ExitCode::SUCCESS);
    }

    let (config, files) = load_config_and_files(&cli)?;
    if files.is_empty() {
        bail!("No input files specified. Use --help for usage information.");
    }
    if cli.source.is_some() && files.len() > 1 {
        bail!("--source can only be used with a single input file");
    }

    let root = config
        .root_scope()
        .context("Failed to build the root scope")?;
    info!("Checking {} file(s)", files.len());

    let reports = check_files(&files, cli.source.as_deref(), &root)?;
    let options = &config.compiler_options;
    match options.format {
        OutputFormat::Text => print_text_reports(&reports, options.pretty),
        OutputFormat::Json => print_json_reports(&reports)?,
    }

    let failed = reports.iter().any(|report| !report.diagnostics.is_empty());
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn init_project() -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }
    CheckerConfig::init_file(path).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!("Created {}", CONFIG_FILE_NAME);
    Ok(())
}

/// Load configuration from file (if any) and resolve input files
fn load_config_and_files(cli: &Cli) -> anyhow::Result<(CheckerConfig, Vec<PathBuf>)> {
    let mut config = if let Some(ref project_path) = cli.project {
        CheckerConfig::from_file(project_path)
            .with_context(|| format!("Failed to load config file {}", project_path.display()))?
    } else {
        let default_path = PathBuf::from(CONFIG_FILE_NAME);
        if default_path.exists() {
            CheckerConfig::from_file(&default_path)
                .with_context(|| format!("Failed to load {}", CONFIG_FILE_NAME))?
        } else {
            CheckerConfig::default()
        }
    };

    let overrides = CliOverrides {
        stdlib: cli.no_stdlib.then_some(false),
        pretty: cli.no_pretty.then_some(false),
        format: cli.format.map(OutputFormat::from),
    };
    config.merge(&overrides);

    let files = if !cli.files.is_empty() {
        cli.files.clone()
    } else {
        let base = cli
            .project
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        expand_globs(base, &config.include, &config.exclude)?
    };

    Ok((config, files))
}

/// Files under `base` matching any include pattern and no exclude pattern
fn expand_globs(base: &Path, include: &[String], exclude: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let exclude = exclude
        .iter()
        .map(|pattern| glob::Pattern::new(pattern))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid exclude pattern")?;

    let mut files = Vec::new();
    for pattern in include {
        let full = base.join(pattern);
        let entries = glob::glob(&full.to_string_lossy())
            .with_context(|| format!("Invalid include pattern '{}'", pattern))?;
        for entry in entries {
            let path = entry?;
            let relative = path.strip_prefix(base).unwrap_or(&path);
            if path.is_file() && !exclude.iter().any(|p| p.matches_path(relative)) {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    debug!("Resolved {} file(s) from include patterns", files.len());
    Ok(files)
}

/// Check every file in parallel; reports come back in input order
fn check_files(
    files: &[PathBuf],
    source_override: Option<&Path>,
    root: &Scope,
) -> anyhow::Result<Vec<FileReport>> {
    use rayon::prelude::*;

    files
        .par_iter()
        .map(|path| check_file(path, source_override, root))
        .collect()
}

fn check_file(path: &Path, source_override: Option<&Path>, root: &Scope) -> anyhow::Result<FileReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let nodes =
        parse_program(&json).with_context(|| format!("Failed to load {}", path.display()))?;

    let diagnostics = type_check_block(&nodes, root);
    debug!("{}: {} diagnostic(s)", path.display(), diagnostics.len());

    let source = match source_override {
        Some(source_path) => Some(
            std::fs::read_to_string(source_path)
                .with_context(|| format!("Failed to read {}", source_path.display()))?,
        ),
        None => source_path_for(path).and_then(|p| std::fs::read_to_string(p).ok()),
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        source,
        diagnostics,
    })
}

/// `script.is.json` pairs with `script.is`, when that file exists
fn source_path_for(path: &Path) -> Option<PathBuf> {
    let name = path.to_str()?.strip_suffix(".json")?;
    let candidate = PathBuf::from(name);
    candidate.is_file().then_some(candidate)
}

fn print_text_reports(reports: &[FileReport], pretty: bool) {
    let mut total = 0;
    let mut failed_files = 0;

    for report in reports {
        if report.diagnostics.is_empty() {
            continue;
        }
        total += report.diagnostics.len();
        failed_files += 1;

        let file_name = report.path.to_string_lossy();
        match &report.source {
            Some(source) => {
                let renderer = DiagnosticRenderer::new(source, pretty);
                for diagnostic in &report.diagnostics {
                    let (line, col) = renderer.position(diagnostic);
                    eprintln!("{}:{}:{}", file_name, line, col);
                    eprintln!("{}", renderer.render(diagnostic));
                }
            }
            None => {
                for diagnostic in &report.diagnostics {
                    eprintln!("{}: {}", file_name, diagnostic);
                }
            }
        }
    }

    if total > 0 {
        eprintln!("Found {} error(s) in {} file(s)", total, failed_files);
    }
}

fn print_json_reports(reports: &[FileReport]) -> anyhow::Result<()> {
    let json: Vec<JsonReport> = reports
        .iter()
        .map(|report| JsonReport {
            file: report.path.to_string_lossy().into_owned(),
            diagnostics: &report.diagnostics,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
