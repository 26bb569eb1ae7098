//! # Harvest Pipeline Orchestrator Module
//!
//! Questo modulo orchestra la pipeline documento → download → compressione.
//!
//! ## Flusso di esecuzione:
//! 1. **Document reading**: estrae il testo dal documento di input
//! 2. **Extraction**: costruisce la mappa categoria → URL
//! 3. **Fetch**: scarica ogni URL in memoria, sequenzialmente
//! 4. **Encode**: ri-codifica con la decisione "tieni il più piccolo"
//! 5. **Write**: `<base_output_dir>/<categoria>/image_<n>.<ext>`
//!
//! ## Gestione errori:
//! - Documento mancante o nessuna categoria estratta: abort fatale
//! - Errore di rete / formato non supportato / decode fallito: loggato,
//!   si passa all'URL successivo
//!
//! La numerazione `image_<n>` parte da 1 e segue l'ordine degli URL nel
//! documento; l'estensione viene dal formato target globale, oppure dal
//! path dell'URL quando nessun target è configurato.

use crate::config::Config;
use crate::document;
use crate::encode::{self, CompressionOutcome, CompressionResult};
use crate::error::PipelineError;
use crate::extract;
use crate::fetch::Fetcher;
use crate::file_manager::FileManager;
use crate::progress::PipelineStats;
use anyhow::Result;
use std::path::Path;
use tracing::{error, info};

/// Sequential document-to-images pipeline.
pub struct HarvestPipeline {
    config: Config,
    fetcher: Fetcher,
}

impl HarvestPipeline {
    /// Create a new harvest pipeline instance
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new()?;
        Ok(Self { config, fetcher })
    }

    /// Run the pipeline: parse the document, then download and re-encode
    /// every URL of every category.
    pub async fn run(&self, document_path: &Path, base_output_dir: &Path) -> Result<PipelineStats> {
        info!("Reading document: {}", document_path.display());
        let text = document::read_document_text(document_path)?;
        let categories = extract::extract_categories(&text)?;

        tokio::fs::create_dir_all(base_output_dir).await?;

        let mut stats = PipelineStats::new();
        for entry in categories.iter() {
            let category_dir = base_output_dir.join(&entry.name);
            tokio::fs::create_dir_all(&category_dir).await?;
            info!(
                "Processing category '{}' with {} images",
                entry.name,
                entry.urls.len()
            );

            for (index, url) in entry.urls.iter().enumerate() {
                let n = index + 1;
                info!("Processing image {}/{} in '{}'", n, entry.urls.len(), entry.name);

                match self.process_url(url, &category_dir, n).await {
                    Ok(result) => match result.outcome {
                        CompressionOutcome::Compressed => {
                            stats.add_compressed(result.original_size, result.compressed_size)
                        }
                        CompressionOutcome::OriginalKept => {
                            stats.add_fallback(result.original_size)
                        }
                    },
                    Err(e) => {
                        stats.add_error();
                        error!("Failed to process image from {}: {}", url, e);
                    }
                }
            }
        }

        info!("=== Harvest Complete ===");
        info!("{}", stats.format_summary());
        Ok(stats)
    }

    /// Downloads one URL, runs the compression decision, writes
    /// `image_<n>.<ext>` into the category directory.
    async fn process_url(
        &self,
        url: &str,
        category_dir: &Path,
        n: usize,
    ) -> Result<CompressionResult, PipelineError> {
        let data = self.fetcher.fetch(url).await?;

        let format = encode::resolve_format(url_extension(url).as_deref(), &self.config)?;
        let decision = encode::compress_bytes(&data, format, &self.config)?;

        let dest = category_dir.join(format!("image_{}.{}", n, format.extension()));
        FileManager::write_atomic(&dest, &decision.bytes).await?;
        info!("Saved image to {}", dest.display());

        Ok(decision.result)
    }
}

/// Extension of the last path segment of a URL, without query or fragment.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetFormat;

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://a/b/photo.JPG"), Some("jpg".into()));
        assert_eq!(
            url_extension("https://a/b/pic.png?size=large#frag"),
            Some("png".into())
        );
        assert_eq!(url_extension("https://a/b/noext"), None);
        assert_eq!(url_extension("https://a/b/.hidden"), None);
    }

    #[test]
    fn test_destination_extension_follows_target() {
        let config = Config {
            target_format: Some(TargetFormat::Webp),
            ..Default::default()
        };
        let format = encode::resolve_format(url_extension("https://a/x.jpg").as_deref(), &config)
            .unwrap();
        assert_eq!(format.extension(), "webp");
    }

    #[test]
    fn test_unrecognized_url_extension_is_per_item_error() {
        let config = Config::default();
        assert!(matches!(
            encode::resolve_format(url_extension("https://a/x.svg").as_deref(), &config),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_run_aborts_on_missing_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let pipeline = HarvestPipeline::new(Config::default()).unwrap();

        let result = pipeline
            .run(
                &temp_dir.path().join("missing.docx"),
                &temp_dir.path().join("images"),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_aborts_on_empty_extraction() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let doc = temp_dir.path().join("links.txt");
        std::fs::write(&doc, "no category blocks here").unwrap();

        let pipeline = HarvestPipeline::new(Config::default()).unwrap();
        let result = pipeline.run(&doc, &temp_dir.path().join("images")).await;
        assert!(result.is_err());
    }
}
