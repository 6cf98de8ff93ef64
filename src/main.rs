//! wix-decompile CLI - rebuild WiX source from MSI, MSM and PCP files

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use wix_decompile::{DecompileOptions, Decompiler, Diagnostic, MsiFile, OutputKind, Severity};

#[derive(Parser)]
#[command(name = "wix-decompile")]
#[command(author, version, about = "Decompile installer databases into WiX source")]
struct Cli {
    /// MSI, MSM or PCP file to decompile
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON options file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output kind (inferred from the input extension by default)
    #[arg(short, long)]
    kind: Option<Kind>,

    /// Drop the user interface tables
    #[arg(long)]
    suppress_ui: bool,

    /// Skip tables that are not standard installer tables
    #[arg(long)]
    suppress_custom_tables: bool,

    /// Keep empty tables as EnsureTable elements
    #[arg(long)]
    keep_empty_tables: bool,

    /// Always write literal sequence numbers
    #[arg(long)]
    suppress_relative_sequencing: bool,

    /// Decompile a package as though it were a merge module
    #[arg(long)]
    treat_product_as_module: bool,

    /// Prefix for File/@Source paths
    #[arg(long)]
    base_source_path: Option<String>,

    /// Diagnostic format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Package,
    Module,
    PatchCreation,
}

impl From<Kind> for OutputKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Package => OutputKind::Package,
            Kind::Module => OutputKind::Module,
            Kind::PatchCreation => OutputKind::PatchCreation,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let options = build_options(&cli)?;
    let mut msi = MsiFile::open(&cli.input)
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;
    let db = msi.load().context("Failed to read database tables")?;

    let output = Decompiler::new(options).decompile(&db);
    print_diagnostics(&output.messages, cli.format)?;

    let Some(document) = output.document else {
        eprintln!("Decompilation failed");
        std::process::exit(1);
    };

    let xml = document.to_xml()?;
    match &cli.output {
        Some(path) => {
            fs::write(path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => print!("{}", xml),
    }

    Ok(())
}

/// Options file first, then command-line flags on top
fn build_options(cli: &Cli) -> Result<DecompileOptions> {
    let mut options = match &cli.config {
        Some(path) => DecompileOptions::load(path)?,
        None => DecompileOptions::default(),
    };

    options.output_kind = match cli.kind {
        Some(kind) => kind.into(),
        None if cli.config.is_some() => options.output_kind,
        None => OutputKind::from_path(&cli.input),
    };
    options.suppress_ui |= cli.suppress_ui;
    options.suppress_custom_tables |= cli.suppress_custom_tables;
    options.suppress_dropping_empty_tables |= cli.keep_empty_tables;
    options.suppress_relative_sequencing |= cli.suppress_relative_sequencing;
    options.treat_product_as_module |= cli.treat_product_as_module;
    if let Some(base) = &cli.base_source_path {
        options.base_source_path = base.clone();
    }

    Ok(options)
}

fn print_diagnostics(messages: &[Diagnostic], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            eprintln!("{}", serde_json::to_string_pretty(messages)?);
        }
        Format::Text => {
            for message in messages {
                eprintln!("{}", message);
            }
            let errors = messages.iter().filter(|m| m.severity == Severity::Error).count();
            let warnings = messages.iter().filter(|m| m.severity == Severity::Warning).count();
            if !messages.is_empty() {
                eprintln!("{} error(s), {} warning(s)", errors, warnings);
            }
        }
    }
    Ok(())
}
