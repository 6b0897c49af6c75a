use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svg_export::save::DirectorySaver;
use svg_export::{Document, ExportConfig, Exporter, Target};

#[derive(Parser)]
#[command(name = "svg-export")]
#[command(about = "Export SVG elements from HTML or SVG documents as SVG or PNG files")]
struct Cli {
    /// YAML file with attribute/style whitelists and capability flags
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// HTML or SVG file containing the element
    input: PathBuf,

    /// CSS selector of the element (first <svg> in the body when omitted)
    #[arg(short, long)]
    selector: Option<String>,
}

#[derive(Args)]
struct Output {
    /// Directory the file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File name (defaults to the element's title attribute, or "untitled")
    #[arg(short, long)]
    filename: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cleaned SVG markup
    Markup {
        #[command(flatten)]
        source: Source,
    },
    /// Print the cleaned markup as a data URI
    DataUri {
        #[command(flatten)]
        source: Source,
    },
    /// Save the element as an SVG file
    Svg {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        output: Output,
    },
    /// Rasterize the element and save it as a PNG file
    Png {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        output: Output,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svg_export=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = ExportConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Markup { source } => {
            let doc = load_document(&source.input)?;
            let exporter = Exporter::with_config(&config, Arc::new(DirectorySaver::new(".")));
            let markup = exporter.get_markup(&doc, Target::from(source.selector.as_deref()))?;
            println!("{markup}");
        }
        Commands::DataUri { source } => {
            let doc = load_document(&source.input)?;
            let exporter = Exporter::with_config(&config, Arc::new(DirectorySaver::new(".")));
            let uri = exporter.get_data_uri(&doc, Target::from(source.selector.as_deref()))?;
            println!("{uri}");
        }
        Commands::Svg { source, output } => {
            let doc = load_document(&source.input)?;
            let exporter = Exporter::with_config(
                &config,
                Arc::new(DirectorySaver::new(&output.output_dir)),
            );
            let outcome = exporter.export_as_vector(
                &doc,
                Target::from(source.selector.as_deref()),
                output.filename.as_deref(),
            )?;
            println!(
                "Wrote {} ({} bytes)",
                outcome.path.display(),
                outcome.bytes_written
            );
        }
        Commands::Png { source, output } => {
            let doc = load_document(&source.input)?;
            let exporter = Exporter::with_config(
                &config,
                Arc::new(DirectorySaver::new(&output.output_dir)),
            );
            exporter
                .export_as_raster(
                    &doc,
                    Target::from(source.selector.as_deref()),
                    output.filename.as_deref(),
                )?
                .wait()
                .await;
            println!("Rasterized into {}", output.output_dir.display());
        }
    }

    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Document::parse(&source))
}
