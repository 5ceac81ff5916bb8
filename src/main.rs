//! templated-views CLI - render a template file or inline content

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use templated_views::{ConfigError, Data, FixSuggestion, RenderConfig, RenderError, Renderer, TemplateRef};

#[derive(Parser)]
#[command(name = "templated-views")]
#[command(about = "Render ${...} templates with JSON or YAML data")]
#[command(version)]
struct Cli {
    /// YAML config file (max_include_depth, strict_undefined, root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fail with exit code 1 instead of printing diagnostics as output
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template file
    Render {
        /// Path to the template
        file: PathBuf,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Render template content given on the command line
    Inline {
        /// Template content
        content: String,

        /// Name shown in diagnostics
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args)]
struct DataArgs {
    /// JSON (.json) or YAML data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// String binding KEY=VALUE (repeatable, overrides the data file)
    #[arg(short, long = "set", value_parser = parse_key_value)]
    set: Vec<(String, String)>,
}

fn main() {
    // Logs go to stderr so rendered output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = fix_suggestion(&e) {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::from_env()?,
    };
    let renderer = Renderer::from_config(&config);

    let (template, data_args) = match cli.command {
        Commands::Render { file, data } => (TemplateRef::Path(file), data),
        Commands::Inline { content, name, data } => {
            let template = match name {
                Some(name) => TemplateRef::inline(content).with_hint(name),
                None => TemplateRef::inline(content),
            };
            (template, data)
        }
    };
    let data = load_data(&data_args)?;

    if cli.strict {
        Ok(renderer.try_render_ref(&template, &data)?)
    } else {
        Ok(renderer.render_ref(&template, &data))
    }
}

fn load_data(args: &DataArgs) -> Result<Data> {
    let mut data = match &args.data {
        Some(path) => read_data_file(path)?,
        None => Data::new(),
    };
    for (key, value) in &args.set {
        data = data.with(key.as_str(), value.as_str());
    }
    Ok(data)
}

fn read_data_file(path: &Path) -> Result<Data> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    let data = if path.extension().is_some_and(|ext| ext == "json") {
        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Data::from_serialize(&value)?
    } else {
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        Data::from_serialize(&value)?
    };
    Ok(data)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn fix_suggestion(err: &anyhow::Error) -> Option<&str> {
    if let Some(e) = err.downcast_ref::<RenderError>() {
        return e.fix_suggestion();
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return e.fix_suggestion();
    }
    None
}
