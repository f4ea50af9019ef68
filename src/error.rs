//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori della libreria image (encode JPEG, resize)
//! - `Decode`: Errori di decodifica HEIC/HEIF (file corrotti, varianti non supportate)
//! - `Encode`: Errori di encoding JPEG
//! - `NotADirectory`: La directory sorgente non esiste o non è una directory
//! - `DestinationCollision`: Due file sorgente mappati sullo stesso output
//! - `WorkerFault`: Fault inatteso dentro un worker (catturato dal pool)
//! - `Validation`: Errori di validazione input

use std::path::PathBuf;

/// Custom error types for HEIC conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HEIC decode error: {0}")]
    Decode(String),

    #[error("JPEG encode error: {0}")]
    Encode(String),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("destination collision: {} and {} both map to {}", first.display(), second.display(), dest.display())]
    DestinationCollision {
        first: PathBuf,
        second: PathBuf,
        dest: PathBuf,
    },

    #[error("Worker fault: {0}")]
    WorkerFault(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
