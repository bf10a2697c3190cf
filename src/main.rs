use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use md2pdf::{Config, TypstRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "md2pdf")]
#[command(about = "Convert a Markdown document to a print-styled PDF")]
struct Cli {
    /// Input Markdown file (defaults to the configured document)
    input: Option<PathBuf>,

    /// Output PDF file (defaults to input name with .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to md2pdf.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the intermediate HTML document to this path
    #[arg(long)]
    html: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::load_or_default(Path::new("md2pdf.toml")),
    };

    // Determine input and output paths
    let (input, output) = match cli.input {
        Some(input) => {
            let output = cli
                .output
                .unwrap_or_else(|| input.with_extension("pdf"));
            (input, output)
        }
        None => (
            config.document.input.clone(),
            cli.output.unwrap_or_else(|| config.document.output.clone()),
        ),
    };

    if !input.exists() {
        println!("Error: {} not found", input.display());
        std::process::exit(1);
    }

    let renderer = TypstRenderer::new(config.fonts.clone());
    let success = md2pdf::markdown_file_to_pdf(
        &input,
        &output,
        cli.html.as_deref(),
        &config,
        &renderer,
    );
    std::process::exit(if success { 0 } else { 1 });
}
