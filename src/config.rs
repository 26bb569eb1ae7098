//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di compressione
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `target_format`: Formato di output globale (webp/png, None = preserva)
//! - `quality`: Qualità per formati lossy (1-100, default: 85)
//! - `size_threshold`: Soglia in byte per compressione aggressiva (default: 1.2 MiB)
//! - `aggressive_drop`: Riduzione qualità per file sopra soglia (default: 20)
//! - `png_optimize`: Compressione massima per PNG lossless (default: true)
//!
//! ## Politica qualità a due livelli:
//! File sopra `size_threshold` vengono codificati a
//! `quality - aggressive_drop` (minimo 1); tutti gli altri a `quality`.
//!
//! ## Esempio:
//! ```rust
//! use batch_image_pipeline::Config;
//!
//! let config = Config {
//!     quality: 70,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global output format for both pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossy WebP (quality-controlled)
    Webp,
    /// Lossless PNG (optimize-controlled)
    Png,
}

/// Configuration for image compression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output format, or None to preserve each file's original format
    pub target_format: Option<TargetFormat>,
    /// Quality for lossy formats (1-100)
    pub quality: u8,
    /// Files larger than this many bytes get the aggressive quality drop
    pub size_threshold: u64,
    /// Quality reduction applied above the size threshold
    pub aggressive_drop: u8,
    /// Use best (slower) PNG compression instead of the default
    pub png_optimize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_format: None,
            quality: 85,
            // 1.2 MiB
            size_threshold: 1_258_291,
            aggressive_drop: 20,
            png_optimize: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.size_threshold == 0 {
            return Err(anyhow::anyhow!("Size threshold must be greater than 0"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
