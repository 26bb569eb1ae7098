//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche dei batch.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Barra a conteggio file per la pipeline di compressione
//! - Barra scalata sui byte per i download (hint content-length)
//! - Tracking statistiche cumulative (compressi, fallback, copiati, errori)
//! - Report finale con byte risparmiati e percentuale di riduzione
//!
//! Il progress è puramente cosmetico: nessuna decisione della pipeline
//! dipende da questo modulo.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [======================>-----------------] 83/150 (55%) ✅ photo.jpg: 45.2% saved
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for batch processing
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new file-count progress bar
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Create a byte-scaled bar for a single download
    pub fn download_bar(total_bytes: u64) -> ProgressBar {
        let bar = ProgressBar::new(total_bytes);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();

        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        spinner
    }
}

/// Statistics tracker for a pipeline run
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub files_compressed: usize,
    pub files_fallback: usize,
    pub files_copied: usize,
    pub errors: usize,
    pub total_original_bytes: u64,
    pub total_output_bytes: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_compressed += 1;
        self.total_original_bytes += original_size;
        self.total_output_bytes += new_size;
    }

    /// Compression produced a larger file; the original bytes were kept.
    pub fn add_fallback(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_fallback += 1;
        self.total_original_bytes += original_size;
        self.total_output_bytes += original_size;
    }

    /// Non-image file copied verbatim.
    pub fn add_copied(&mut self, size: u64) {
        self.files_processed += 1;
        self.files_copied += 1;
        self.total_original_bytes += size;
        self.total_output_bytes += size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_original_bytes
            .saturating_sub(self.total_output_bytes)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_bytes > 0 {
            (self.bytes_saved() as f64 / self.total_original_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Compressed: {} | Kept original: {} | Copied: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_compressed,
            self.files_fallback,
            self.files_copied,
            self.errors,
            format_size(self.bytes_saved()),
            self.overall_reduction_percent()
        )
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
