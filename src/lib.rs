//! # Batch Image Pipeline Library
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
//! - `document`: Lettura testo da documenti DOCX o plain text
//! - `extract`: Estrazione mappa categoria → URL dal testo
//! - `fetch`: Download HTTP in memoria con progress
//! - `encode`: Decisione di compressione "tieni il più piccolo"
//! - `file_manager`: Discovery file, scrittura atomica, copia con metadata
//! - `compress`: Orchestratore della pipeline su directory
//! - `harvest`: Orchestratore della pipeline documento → immagini
//! - `progress`: Progress tracking e statistiche
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use batch_image_pipeline::{Config, TreeCompressor};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let compressor = TreeCompressor::new(Config::default())?;
//! compressor
//!     .run("sourceImages".as_ref(), "compressedImages".as_ref())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod compress;
pub mod config;
pub mod document;
pub mod encode;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod file_manager;
pub mod harvest;
pub mod progress;

pub use compress::TreeCompressor;
pub use config::{Config, TargetFormat};
pub use encode::{CompressionOutcome, CompressionResult};
pub use error::PipelineError;
pub use extract::CategoryMap;
pub use harvest::HarvestPipeline;
