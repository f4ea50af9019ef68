//! # HEIC Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `codec`: Adapter per decode HEIC / encode JPEG (libheif + image)
//! - `file_manager`: Discovery file HEIC e operazioni sui timestamp
//! - `confirm`: Conferma interattiva per operazioni distruttive
//! - `converter`: Pipeline di conversione (orchestratore, pool, worker)
//! - `report`: Outcome per file e report finale aggregato
//! - `progress`: Progress bar e feedback visuale
//! - `json_output`: Eventi JSON strutturati per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use heic_converter::{BatchConverter, Config, HeifCodec, AutoConfirm};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut converter = BatchConverter::new(
//!     config,
//!     Arc::new(HeifCodec),
//!     Arc::new(AutoConfirm(true)),
//! )?;
//! let report = converter.run(std::path::Path::new("/photos")).await?;
//! println!("{}", report.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod confirm;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod progress;
pub mod report;

pub use codec::{DecodedImage, HeifCodec, ImageCodec};
pub use config::Config;
pub use confirm::{AutoConfirm, Confirmation, StdinConfirmation};
pub use converter::{BatchConverter, ConversionTask};
pub use error::ConvertError;
pub use report::{ConversionOutcome, ConversionReport, RunStatus};
