//! # Encoder / Compression Decision Module
//!
//! Questo è il cuore di entrambe le pipeline: "converti, confronta, tieni
//! il più piccolo".
//!
//! ## Responsabilità:
//! - Decodifica bytes immagine in memoria (`image` crate)
//! - Risolve il formato di output (target esplicito o tabella estensione→formato)
//! - Applica la politica qualità a due livelli (soglia + aggressive drop)
//! - Ri-codifica e confronta le dimensioni: se il risultato non è più
//!   piccolo, restituisce i bytes originali invariati
//! - Scrive la destinazione via file temporaneo + rename atomico
//!
//! ## Invariante never-grow:
//! L'output non è mai più grande dell'input. Quando la compressione produce
//! un file più grande, la destinazione è byte-identica alla sorgente e viene
//! loggato solo un warning.
//!
//! ## Pipeline di decisione:
//! 1. Decode input
//! 2. Resolve formato output
//! 3. Calcola qualità dal confronto dimensione/soglia
//! 4. Encode in memoria
//! 5. Confronta: più piccolo → compressed-kept, altrimenti → original-kept
//!
//! La decisione è una funzione pura (bytes, config) → (bytes, esito),
//! separata dagli effetti su filesystem per essere testabile senza disco.
//!
//! ## Encoder per formato:
//! - JPEG: `image` con qualità esplicita
//! - PNG: `image` con compressione Best quando `png_optimize`
//! - WebP: binding libwebp (`webp` crate) per encoding lossy con qualità
//! - GIF/BMP/TIFF: encoder di default della `image` crate

use crate::config::{Config, TargetFormat};
use crate::error::PipelineError;
use crate::file_manager::FileManager;
use crate::progress::format_size;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageOutputFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Resolved output encoding for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// Fixed extension→format table (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Canonical output extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    /// Lossy formats take the quality setting; the rest ignore it.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg | Self::WebP)
    }
}

impl From<TargetFormat> for OutputFormat {
    fn from(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Webp => Self::WebP,
            TargetFormat::Png => Self::Png,
        }
    }
}

/// Outcome of one compression decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// The re-encoded bytes were smaller and were kept.
    Compressed,
    /// Compression bloated the file; the original bytes were kept.
    OriginalKept,
}

/// Sizes and outcome of one compression decision, used for logging only.
#[derive(Debug, Clone, Copy)]
pub struct CompressionResult {
    pub original_size: u64,
    pub compressed_size: u64,
    pub outcome: CompressionOutcome,
}

/// Winner bytes plus the result that describes them.
#[derive(Debug)]
pub struct CompressionDecision {
    pub bytes: Vec<u8>,
    pub result: CompressionResult,
}

/// Resolves the output format for a file extension.
///
/// An explicit target format overrides; otherwise the extension→format
/// table decides. An unsupported extension is a hard error for that file.
pub fn resolve_format(
    extension: Option<&str>,
    config: &Config,
) -> Result<OutputFormat, PipelineError> {
    if let Some(target) = config.target_format {
        return Ok(target.into());
    }

    let ext = extension.ok_or_else(|| PipelineError::UnsupportedFormat("<none>".to_string()))?;
    OutputFormat::from_extension(ext)
        .ok_or_else(|| PipelineError::UnsupportedFormat(ext.to_string()))
}

/// Two-tier adaptive quality: files above the threshold get the aggressive
/// drop, floored at 1.
pub fn effective_quality(original_size: u64, config: &Config) -> u8 {
    if original_size > config.size_threshold {
        config.quality.saturating_sub(config.aggressive_drop).max(1)
    } else {
        config.quality
    }
}

/// Pure compression decision: decode, re-encode, compare, keep the smaller.
///
/// Never-grow invariant: the returned bytes are never longer than `data`;
/// on `OriginalKept` they are byte-identical to `data`.
pub fn compress_bytes(
    data: &[u8],
    format: OutputFormat,
    config: &Config,
) -> Result<CompressionDecision, PipelineError> {
    let img = image::load_from_memory(data)?;

    let original_size = data.len() as u64;
    let quality = effective_quality(original_size, config);
    if format.is_lossy() && quality != config.quality {
        info!(
            "Applying aggressive quality={} for large file > {}KB",
            quality,
            config.size_threshold / 1024
        );
    }

    let encoded = encode_image(&img, format, quality, config.png_optimize)?;
    let compressed_size = encoded.len() as u64;

    if compressed_size < original_size {
        Ok(CompressionDecision {
            bytes: encoded,
            result: CompressionResult {
                original_size,
                compressed_size,
                outcome: CompressionOutcome::Compressed,
            },
        })
    } else {
        Ok(CompressionDecision {
            bytes: data.to_vec(),
            result: CompressionResult {
                original_size,
                compressed_size,
                outcome: CompressionOutcome::OriginalKept,
            },
        })
    }
}

/// Encodes a decoded image with the resolved format and settings.
fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
    png_optimize: bool,
) -> Result<Vec<u8>, PipelineError> {
    let mut buf: Vec<u8> = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            rgb.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(quality))?;
        }
        OutputFormat::Png => {
            if png_optimize {
                let encoder = PngEncoder::new_with_quality(
                    &mut buf,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
            } else {
                img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)?;
            }
        }
        OutputFormat::WebP => {
            let rgba = img.to_rgba8();
            let memory =
                webp::Encoder::from_rgba(&rgba, img.width(), img.height()).encode(quality as f32);
            buf = memory.to_vec();
        }
        OutputFormat::Gif => {
            let rgba = img.to_rgba8();
            rgba.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Gif)?;
        }
        OutputFormat::Bmp => {
            img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Bmp)?;
        }
        OutputFormat::Tiff => {
            img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Tiff)?;
        }
    }

    Ok(buf)
}

/// Compresses one file on disk and writes the winner to `dest`.
///
/// The destination is written through a `<dest>.tmp` file and an atomic
/// rename, so a successful run never leaves a partially-written
/// destination. When the original is kept, source timestamps are carried
/// over and a "skipped" warning is logged.
pub async fn compress_file(
    src: &Path,
    dest: &Path,
    config: &Config,
) -> Result<CompressionResult, PipelineError> {
    let data = tokio::fs::read(src).await?;
    let format = resolve_format(src.extension().and_then(|s| s.to_str()), config)?;
    let decision = compress_bytes(&data, format, config)?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    FileManager::write_atomic(dest, &decision.bytes).await?;

    match decision.result.outcome {
        CompressionOutcome::Compressed => {
            info!(
                "Compressed and saved: {} ({} → {})",
                dest.display(),
                format_size(decision.result.original_size),
                format_size(decision.result.compressed_size)
            );
        }
        CompressionOutcome::OriginalKept => {
            FileManager::copy_file_times(src, dest)?;
            warn!(
                "Skipped compression for '{}'; compressed size {} > original {}",
                src.display(),
                format_size(decision.result.compressed_size),
                format_size(decision.result.original_size)
            );
        }
    }

    Ok(decision.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn jpeg_bytes(img: &DynamicImage, quality: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(quality))
            .unwrap();
        buf
    }

    fn bmp_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Bmp)
            .unwrap();
        buf
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(OutputFormat::from_extension("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("Png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_extension("svg"), None);
    }

    #[test]
    fn test_resolve_format_target_overrides() {
        let config = Config {
            target_format: Some(TargetFormat::Webp),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(Some("png"), &config).unwrap(),
            OutputFormat::WebP
        );
    }

    #[test]
    fn test_resolve_format_unsupported_is_error() {
        let config = Config::default();
        assert!(matches!(
            resolve_format(Some("svg"), &config),
            Err(PipelineError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            resolve_format(None, &config),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_effective_quality_two_tiers() {
        let config = Config {
            quality: 85,
            size_threshold: 1024 * 1024,
            aggressive_drop: 20,
            ..Default::default()
        };

        // 500 KB file stays at base quality
        assert_eq!(effective_quality(500 * 1024, &config), 85);
        // 2 MB file gets the aggressive drop
        assert_eq!(effective_quality(2 * 1024 * 1024, &config), 65);
    }

    #[test]
    fn test_effective_quality_floors_at_one() {
        let config = Config {
            quality: 10,
            size_threshold: 100,
            aggressive_drop: 20,
            ..Default::default()
        };
        assert_eq!(effective_quality(200, &config), 1);
    }

    #[test]
    fn test_jpeg_recompression_shrinks() {
        let original = jpeg_bytes(&gradient(128, 128), 100);
        let config = Config::default();

        let decision = compress_bytes(&original, OutputFormat::Jpeg, &config).unwrap();

        assert_eq!(decision.result.outcome, CompressionOutcome::Compressed);
        assert!(decision.bytes.len() < original.len());
        assert!(image::load_from_memory(&decision.bytes).is_ok());
    }

    #[test]
    fn test_bloat_keeps_original_byte_identical() {
        // Re-encoding a BMP with the same encoder reproduces the same size,
        // which is not smaller, so the original must win.
        let original = bmp_bytes(&gradient(32, 32));
        let config = Config::default();

        let decision = compress_bytes(&original, OutputFormat::Bmp, &config).unwrap();

        assert_eq!(decision.result.outcome, CompressionOutcome::OriginalKept);
        assert_eq!(decision.bytes, original);
    }

    #[test]
    fn test_never_grow_invariant() {
        let config = Config::default();
        let inputs = vec![
            (jpeg_bytes(&gradient(1, 1), 50), OutputFormat::Jpeg),
            (jpeg_bytes(&gradient(64, 64), 100), OutputFormat::WebP),
            (bmp_bytes(&gradient(8, 8)), OutputFormat::Bmp),
        ];

        for (original, format) in inputs {
            let decision = compress_bytes(&original, format, &config).unwrap();
            assert!(decision.bytes.len() <= original.len());
            if decision.result.outcome == CompressionOutcome::OriginalKept {
                assert_eq!(decision.bytes, original);
            }
        }
    }

    #[test]
    fn test_webp_conversion_emits_riff() {
        let original = jpeg_bytes(&gradient(128, 128), 100);
        let config = Config {
            target_format: Some(TargetFormat::Webp),
            ..Default::default()
        };

        let format = resolve_format(Some("jpg"), &config).unwrap();
        let decision = compress_bytes(&original, format, &config).unwrap();

        assert_eq!(decision.result.outcome, CompressionOutcome::Compressed);
        assert_eq!(&decision.bytes[..4], b"RIFF");
        assert_eq!(&decision.bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let config = Config::default();
        assert!(matches!(
            compress_bytes(b"not an image at all", OutputFormat::Jpeg, &config),
            Err(PipelineError::Image(_))
        ));
    }

    #[tokio::test]
    async fn test_compress_file_writes_dest_and_cleans_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("photo.jpg");
        let dest = temp_dir.path().join("out").join("photo.jpg");

        std::fs::write(&src, jpeg_bytes(&gradient(128, 128), 100)).unwrap();

        let result = compress_file(&src, &dest, &Config::default()).await.unwrap();

        assert_eq!(result.outcome, CompressionOutcome::Compressed);
        let written = std::fs::metadata(&dest).unwrap().len();
        assert!(written < std::fs::metadata(&src).unwrap().len());
        assert_eq!(written, result.compressed_size);

        let tmp = temp_dir.path().join("out").join("photo.jpg.tmp");
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn test_compress_file_fallback_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("tiny.bmp");
        let dest = temp_dir.path().join("tiny_out.bmp");

        let original = bmp_bytes(&gradient(16, 16));
        std::fs::write(&src, &original).unwrap();

        let result = compress_file(&src, &dest, &Config::default()).await.unwrap();

        assert_eq!(result.outcome, CompressionOutcome::OriginalKept);
        assert_eq!(std::fs::read(&dest).unwrap(), original);
    }

    #[tokio::test]
    async fn test_compress_file_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("file.xyz");
        let dest = temp_dir.path().join("file_out.xyz");
        std::fs::write(&src, b"whatever").unwrap();

        assert!(matches!(
            compress_file(&src, &dest, &Config::default()).await,
            Err(PipelineError::UnsupportedFormat(_))
        ));
        assert!(!dest.exists());
    }
}
