//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docgraft_ooxml::config::CONFIG_FILE;
use docgraft_ooxml::paragraph::{plain_text, runs};
use docgraft_ooxml::{
    Alignment, FormattingProfile, ListMarker, Settings, Slot, TransplantReport, Transplanter,
    WordDocument,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "docgraft")]
#[command(author, version, about = "Transplant formatting between Word documents", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy formatting from a source DOCX onto one or more targets
    Apply {
        /// Styled DOCX whose formatting is copied
        #[arg(short, long)]
        source: PathBuf,

        /// DOCX files to format
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Directory for the formatted documents
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Also bundle every formatted document into this zip file
        #[arg(long)]
        zip: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the formatting a DOCX carries
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Result of formatting one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    /// Target path as given
    pub target: String,
    /// Where the formatted document was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<TransplantReport>,
    /// Why this target failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetOutcome {
    fn failed(target: String, error: String) -> Self {
        Self {
            target,
            output: None,
            report: None,
            error: Some(error),
        }
    }

    /// Whether the target was formatted
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Formatting summary of one body paragraph
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphSummary {
    pub index: usize,
    pub text: String,
    pub alignment: Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<ListMarker>,
    pub runs: Vec<FormattingProfile>,
}

/// Header and footer sizes of one section
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub index: usize,
    pub header_paragraphs: usize,
    pub footer_paragraphs: usize,
}

/// What `inspect` reports about a document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub paragraphs: Vec<ParagraphSummary>,
    pub sections: Vec<SectionSummary>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            source,
            targets,
            output,
            zip,
            config,
            format,
        } => {
            let settings = load_settings(config.as_deref())?;
            let outcomes =
                apply_command(&source, &targets, &output, zip.as_deref(), &settings)?;
            print_outcomes(&outcomes, format)?;

            // Exit with error code if any target failed
            if outcomes.iter().any(|o| !o.is_ok()) {
                std::process::exit(1);
            }
        }
        Commands::Inspect { input, format } => {
            let summary = inspect_command(&input)?;
            print_summary(&input, &summary, format)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the apply command
///
/// Every target is processed independently; a target that cannot be read
/// or formatted is reported in its outcome and the rest carry on. Errors
/// are returned only for problems with the source or the output location.
pub fn apply_command(
    source: &Path,
    targets: &[PathBuf],
    output_dir: &Path,
    zip_path: Option<&Path>,
    settings: &Settings,
) -> Result<Vec<TargetOutcome>> {
    // Check input file exists
    if !source.exists() {
        anyhow::bail!("Source file not found: {}", source.display());
    }
    let source_doc = WordDocument::open(source)
        .with_context(|| format!("Failed to open source DOCX: {}", source.display()))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut outcomes = Vec::new();
    let mut loaded = Vec::new();
    for target in targets {
        let name = target.display().to_string();
        match WordDocument::open(target) {
            Ok(doc) => loaded.push((name, doc)),
            Err(e) => {
                warn!(file = %name, error = %e, "could not open target");
                outcomes.push(TargetOutcome::failed(name, format!("Failed to open DOCX: {}", e)));
            }
        }
    }

    let transplanter = Transplanter::new(settings.transplant.clone());
    let mut bundle = Vec::new();
    let mut used_names = HashSet::new();
    for (name, result) in transplanter.transplant_many(&source_doc, loaded) {
        let (doc, report) = match result {
            Ok(done) => done,
            Err(e) => {
                outcomes.push(TargetOutcome::failed(name, e.to_string()));
                continue;
            }
        };

        let file_name = unique_name(
            output_name(Path::new(&name), &settings.output.suffix),
            &mut used_names,
        );
        let bytes = match doc.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                outcomes.push(TargetOutcome::failed(name, format!("Failed to serialize: {}", e)));
                continue;
            }
        };

        let output_path = output_dir.join(&file_name);
        fs::write(&output_path, &bytes)
            .with_context(|| format!("Failed to write output: {}", output_path.display()))?;
        info!(file = %name, output = %output_path.display(), "formatted");

        bundle.push((file_name, bytes));
        outcomes.push(TargetOutcome {
            target: name,
            output: Some(output_path),
            report: Some(report),
            error: None,
        });
    }

    if let Some(zip_path) = zip_path {
        write_bundle(zip_path, &bundle)
            .with_context(|| format!("Failed to write zip bundle: {}", zip_path.display()))?;
    }

    Ok(outcomes)
}

/// Output file name for a target: `<stem><suffix>.docx`
pub fn output_name(target: &Path, suffix: &str) -> String {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}{}.docx", stem, suffix)
}

/// Claim `name`, or `<stem>-2.docx`, `<stem>-3.docx`... when it is taken
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let stem = name.strip_suffix(".docx").unwrap_or(&name);
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.docx", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn write_bundle(path: &Path, files: &[(String, Vec<u8>)]) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;
    Ok(())
}

fn print_outcomes(outcomes: &[TargetOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcomes)
                .context("Failed to serialize results to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for outcome in outcomes {
                match (&outcome.output, &outcome.report, &outcome.error) {
                    (Some(output), Some(report), _) => {
                        println!("✓ {} -> {}", outcome.target, output.display());
                        println!(
                            "  {} paragraph(s) formatted{}{}",
                            report.paragraphs_paired,
                            slot_note("header", report.header_paragraphs),
                            slot_note("footer", report.footer_paragraphs),
                        );
                        for diag in &report.diagnostics {
                            println!("  {}", diag);
                        }
                    }
                    (_, _, error) => {
                        println!(
                            "✗ {}: {}",
                            outcome.target,
                            error.as_deref().unwrap_or("unknown error")
                        );
                    }
                }
            }
            let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
            println!(
                "{} formatted, {} failed",
                outcomes.len() - failed,
                failed
            );
        }
    }
    Ok(())
}

fn slot_note(slot: &str, paragraphs: Option<usize>) -> String {
    match paragraphs {
        Some(n) => format!(", {} {} paragraph(s)", n, slot),
        None => String::new(),
    }
}

/// Execute the inspect command
pub fn inspect_command(input: &Path) -> Result<DocumentSummary> {
    // Check input file exists
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let doc = WordDocument::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;

    let paragraphs = doc
        .paragraphs()
        .into_iter()
        .enumerate()
        .map(|(index, p)| ParagraphSummary {
            index,
            text: plain_text(p),
            alignment: Alignment::of(p),
            list: ListMarker::extract(p),
            runs: runs(p).into_iter().map(FormattingProfile::extract).collect(),
        })
        .collect();

    let sections = doc
        .sections()
        .iter()
        .map(|section| SectionSummary {
            index: section.index,
            header_paragraphs: doc.slot_paragraphs(section, Slot::Header).len(),
            footer_paragraphs: doc.slot_paragraphs(section, Slot::Footer).len(),
        })
        .collect();

    Ok(DocumentSummary {
        paragraphs,
        sections,
    })
}

fn print_summary(input: &Path, summary: &DocumentSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary)
                .context("Failed to serialize summary to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", input.display());
            for p in &summary.paragraphs {
                let mut line = format!("  [{}] {:?}", p.index + 1, p.alignment);
                if let Some(marker) = &p.list {
                    line.push_str(&format!(
                        " list(num={}, level={})",
                        marker.numbering_id, marker.indent_level
                    ));
                }
                line.push_str(&format!(" {} run(s): {}", p.runs.len(), preview(&p.text)));
                println!("{}", line);
                for (i, run) in p.runs.iter().enumerate() {
                    println!("      run {}: {}", i + 1, describe(run));
                }
            }
            for s in &summary.sections {
                println!(
                    "  section {}: header {} paragraph(s), footer {} paragraph(s)",
                    s.index + 1,
                    s.header_paragraphs,
                    s.footer_paragraphs
                );
            }
        }
    }
    Ok(())
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        format!("{:?}", text)
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{:?}...", head)
    }
}

fn describe(profile: &FormattingProfile) -> String {
    let mut parts = Vec::new();
    if profile.bold {
        parts.push("bold".to_string());
    }
    if profile.italic {
        parts.push("italic".to_string());
    }
    if profile.underline {
        parts.push("underline".to_string());
    }
    if let Some(name) = &profile.font_name {
        parts.push(name.clone());
    }
    if let Some(size) = profile.font_size {
        parts.push(format!("{}pt", size));
    }
    if parts.is_empty() {
        "inherited".to_string()
    } else {
        parts.join(", ")
    }
}

/// Load settings from a config file or use defaults
fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => {
            let candidate = Path::new(CONFIG_FILE);
            if candidate.exists() {
                return Settings::load(candidate)
                    .with_context(|| format!("Failed to load config: {}", CONFIG_FILE));
            }
            Ok(Settings::default())
        }
    }
}
