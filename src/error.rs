//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `PipelineError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - **Fatali** (abortiscono l'intera run): `Document`, `NoData`,
//!   `MissingSource`, `EmptyTree`, `Validation`
//! - **Per-item** (loggati, il batch continua): `Io`, `Image`, `Http`,
//!   `UnsupportedFormat`
//!
//! La distinzione fatale/per-item è decisa dal chiamante: gli orchestratori
//! propagano i primi con `?` e loggano i secondi proseguendo col file o URL
//! successivo.

/// Custom error types for the image pipelines
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document error: {0}")]
    Document(String),

    #[error("No image data was extracted from the document")]
    NoData,

    #[error("Unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Source directory not found: {0}")]
    MissingSource(String),

    #[error("No files found in source directory: {0}")]
    EmptyTree(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
