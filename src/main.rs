//! # HEIC Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del converter
//! - Mapping dello stato del report sull'exit status del processo
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, quality, workers, resize, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Crea un oggetto Config con tutti i parametri (validato dal converter)
//! 4. Istanzia BatchConverter e avvia la conversione
//! 5. Exit 0 per run completate o abort utente, non-zero per errori di configurazione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! heic-converter /path/to/photos --quality 90 --workers 8 --resize 1920x1080
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use heic_converter::{
    config::parse_resize_spec, AutoConfirm, BatchConverter, Config, Confirmation, HeifCodec,
    RunStatus, StdinConfirmation,
};

#[derive(Parser)]
#[command(name = "heic-converter")]
#[command(about = "Convert HEIC/HEIF images to JPEG in parallel")]
struct Args {
    /// Directory containing HEIC/HEIF files to convert
    source_directory: PathBuf,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "50")]
    quality: u8,

    /// Number of parallel workers
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Output directory (default: ConvertedFiles inside the source directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Recurse into subdirectories, preserving the relative structure
    #[arg(short, long)]
    recursive: bool,

    /// Resize output to exact dimensions, e.g. 1920x1080
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    resize: Option<String>,

    /// Delete each original file after its conversion succeeded
    #[arg(long)]
    delete_originals: bool,

    /// Reuse an existing output directory instead of prompting to delete it
    #[arg(long)]
    keep_existing: bool,

    /// Assume yes for the destructive overwrite prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Output progress and status as JSON for programmatic use
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
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

    let resize = args.resize.as_deref().map(parse_resize_spec).transpose()?;

    let config = Config {
        quality: args.quality,
        workers: args.workers,
        output_path: args.output,
        recursive: args.recursive,
        resize,
        delete_originals: args.delete_originals,
        keep_existing: args.keep_existing,
        json_output: args.json,
    };

    let confirmation: Arc<dyn Confirmation> = if args.yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(StdinConfirmation)
    };

    let mut converter = BatchConverter::new(config, Arc::new(HeifCodec), confirmation)?;
    let report = converter.run(&args.source_directory).await?;

    // L'abort esplicito dell'utente esce con 0; una sorgente invalida no
    if report.status == RunStatus::InvalidTarget {
        std::process::exit(2);
    }

    Ok(())
}
