//! # Batch Image Pipeline - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Creazione della configurazione e avvio della pipeline scelta
//!
//! ## Sottocomandi:
//! - `fetch`: documento → download → ri-codifica per categoria
//! - `compress`: directory tree → compressione con mirroring
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-pipeline fetch images.docx --output images --format webp --quality 95
//! image-pipeline compress sourceImages --output compressedImages --verbose
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use batch_image_pipeline::{Config, HarvestPipeline, TargetFormat, TreeCompressor};

#[derive(Parser)]
#[command(name = "image-pipeline")]
#[command(about = "Batch image harvesting and recompression with a never-grow guarantee")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract image URLs from a document, download and re-encode them
    Fetch {
        /// Document with "category line + bracketed URL array" blocks (DOCX or text)
        document: PathBuf,

        /// Base output directory (one subdirectory per category)
        #[arg(short, long, default_value = "images")]
        output: PathBuf,

        /// Output image format
        #[arg(long, value_enum, default_value = "webp")]
        format: TargetFormat,

        /// Quality for lossy formats (1-100)
        #[arg(short, long, default_value_t = 95)]
        quality: u8,
    },

    /// Recompress a directory tree, mirroring its structure
    Compress {
        /// Directory containing the source files
        #[arg(default_value = "sourceImages")]
        source: PathBuf,

        /// Output root directory
        #[arg(short, long, default_value = "compressedImages")]
        output: PathBuf,

        /// Convert images to this format (omit to preserve original formats)
        #[arg(long, value_enum)]
        format: Option<TargetFormat>,

        /// Quality for lossy formats (1-100)
        #[arg(short, long, default_value_t = 85)]
        quality: u8,

        /// Files larger than this many bytes get the aggressive quality drop
        #[arg(short, long, default_value_t = 1_258_291)]
        threshold: u64,

        /// Quality reduction for files above the threshold
        #[arg(long, default_value_t = 20)]
        aggressive_drop: u8,

        /// Disable best-compression PNG encoding
        #[arg(long)]
        no_png_optimize: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Fetch {
            document,
            output,
            format,
            quality,
        } => {
            if !document.is_file() {
                return Err(anyhow::anyhow!(
                    "Document not found: {}",
                    document.display()
                ));
            }

            let config = Config {
                target_format: Some(format),
                quality,
                ..Default::default()
            };

            let pipeline = HarvestPipeline::new(config)?;
            let stats = pipeline.run(&document, &output).await?;
            info!("Done: {}", stats.format_summary());
        }

        Command::Compress {
            source,
            output,
            format,
            quality,
            threshold,
            aggressive_drop,
            no_png_optimize,
        } => {
            let config = Config {
                target_format: format,
                quality,
                size_threshold: threshold,
                aggressive_drop,
                png_optimize: !no_png_optimize,
            };

            let compressor = TreeCompressor::new(config)?;
            let stats = compressor.run(&source, &output).await?;
            info!("Done: {}", stats.format_summary());
        }
    }

    Ok(())
}
