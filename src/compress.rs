//! # Tree Compression Orchestrator Module
//!
//! Questo modulo orchestra la pipeline di compressione su directory.
//!
//! ## Flusso di esecuzione:
//! 1. **Planning**: enumera ogni file regolare sotto la source root e
//!    costruisce un `FileTask` con path di destinazione speculare
//! 2. **Dispatch**: immagini → encoder, file opachi → copia byte-per-byte
//! 3. **Progress tracking**: barra a conteggio file con esito per file
//! 4. **Statistics**: report finale con byte risparmiati
//!
//! ## Gestione errori:
//! - Source root mancante: abort fatale prima di qualsiasi processing
//! - Source root vuota: abort fatale con messaggio distinto
//! - Errori per singolo file (decode/encode/IO): loggati, il batch continua
//!
//! ## Path di destinazione:
//! `<output_root>/<relative_path>`, con estensione riscritta solo quando un
//! formato target globale è configurato (e solo per le immagini).
//!
//! Processing interamente sequenziale: ogni file viene completato prima del
//! successivo, nessuno stato condiviso tra task.

use crate::config::Config;
use crate::encode::{self, CompressionOutcome};
use crate::error::PipelineError;
use crate::file_manager::FileManager;
use crate::progress::{format_size, PipelineStats, ProgressManager};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Classification of one discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Recognized image extension, goes through the encoder
    Image,
    /// Anything else, copied byte-for-byte
    Opaque,
}

/// One unit of work: source file, mirrored destination, classification.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: FileKind,
}

/// Enumerates the source tree and plans one task per regular file.
///
/// The destination mirrors the relative path under `output_root`. Image
/// extensions are rewritten only when a global target format is set.
pub fn plan_tasks(
    source_root: &Path,
    output_root: &Path,
    config: &Config,
) -> Result<Vec<FileTask>, PipelineError> {
    if !source_root.is_dir() {
        return Err(PipelineError::MissingSource(
            source_root.display().to_string(),
        ));
    }

    let mut tasks = Vec::new();
    for source in FileManager::find_all_files(source_root) {
        let relative = source.strip_prefix(source_root).unwrap_or(&source);
        let kind = if FileManager::is_image(&source) {
            FileKind::Image
        } else {
            FileKind::Opaque
        };

        let dest = match (kind, config.target_format) {
            (FileKind::Image, Some(target)) => {
                let format: encode::OutputFormat = target.into();
                output_root.join(relative).with_extension(format.extension())
            }
            _ => output_root.join(relative),
        };

        tasks.push(FileTask {
            source,
            dest,
            kind,
        });
    }

    if tasks.is_empty() {
        return Err(PipelineError::EmptyTree(source_root.display().to_string()));
    }

    Ok(tasks)
}

/// Sequential tree compressor: walks, mirrors, compresses, copies.
pub struct TreeCompressor {
    config: Config,
}

impl TreeCompressor {
    /// Create a new tree compressor instance
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the compression pipeline over a source tree.
    pub async fn run(&self, source_root: &Path, output_root: &Path) -> Result<PipelineStats> {
        info!("Starting tree compression: {}", source_root.display());
        match self.config.target_format {
            Some(target) => info!("🎯 Mode: convert images to {:?} (quality: {})", target, self.config.quality),
            None => info!("🎯 Mode: preserve original formats (quality: {})", self.config.quality),
        }
        info!("📁 Output directory: {}", output_root.display());

        let tasks = plan_tasks(source_root, output_root, &self.config)?;
        info!("Found {} files to process", tasks.len());

        let progress = ProgressManager::new(tasks.len() as u64);
        let mut stats = PipelineStats::new();

        for task in &tasks {
            let name = task
                .source
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            match self.process_task(task, &mut stats).await {
                Ok(message) => progress.update(&message),
                Err(e) => {
                    stats.add_error();
                    error!("Failed to process '{}': {}", task.source.display(), e);
                    progress.update(&format!("❌ {}: error", name));
                }
            }
        }

        progress.finish(&stats.format_summary());
        self.print_final_stats(&stats);

        Ok(stats)
    }

    async fn process_task(
        &self,
        task: &FileTask,
        stats: &mut PipelineStats,
    ) -> Result<String, PipelineError> {
        let name = task
            .source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();

        match task.kind {
            FileKind::Image => {
                let result = encode::compress_file(&task.source, &task.dest, &self.config).await?;
                match result.outcome {
                    CompressionOutcome::Compressed => {
                        stats.add_compressed(result.original_size, result.compressed_size);
                        let saved = 100.0
                            * (result.original_size - result.compressed_size) as f64
                            / result.original_size.max(1) as f64;
                        Ok(format!("✅ {}: {:.1}% saved", name, saved))
                    }
                    CompressionOutcome::OriginalKept => {
                        stats.add_fallback(result.original_size);
                        Ok(format!("⏩ {}: kept original", name))
                    }
                }
            }
            FileKind::Opaque => {
                let bytes = FileManager::copy_preserving(&task.source, &task.dest).await?;
                stats.add_copied(bytes);
                info!(
                    "Copied file {} to {}",
                    task.source.display(),
                    task.dest.display()
                );
                Ok(format!("📄 {}: copied", name))
            }
        }
    }

    fn print_final_stats(&self, stats: &PipelineStats) {
        info!("=== Compression Complete ===");
        info!("Files processed: {}", stats.files_processed);
        info!("Files compressed: {}", stats.files_compressed);
        info!("Originals kept (bloat): {}", stats.files_fallback);
        info!("Files copied: {}", stats.files_copied);
        info!("Errors: {}", stats.errors);
        info!("Bytes saved: {}", format_size(stats.bytes_saved()));
        info!("Average reduction: {:.2}%", stats.overall_reduction_percent());
    }
}
