//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di tutti i file regolari in una directory
//! - Classificazione immagine vs file opaco (estensione, case-insensitive)
//! - Scrittura atomica via file temporaneo `<dest>.tmp` + rename
//! - Copia byte-per-byte con preservazione dei timestamp
//!
//! ## Estensioni immagine riconosciute:
//! jpg, jpeg, png, bmp, gif, tiff, webp — tutto il resto è opaco e viene
//! copiato senza modifiche.
//!
//! ## Sicurezza operazioni:
//! - Nessuna destinazione parziale: i bytes passano sempre da un file
//!   temporaneo rinominato atomicamente sul path finale
//! - In caso di errore il file temporaneo viene rimosso esplicitamente

use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Recognized image extensions for classification.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find every regular file under a directory, recursively.
    pub fn find_all_files(root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// Check if a file is a recognized image (by extension, case-insensitive)
    pub fn is_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        } else {
            false
        }
    }

    /// The `<dest>.tmp` sibling used for atomic writes.
    pub fn temp_path(dest: &Path) -> PathBuf {
        let mut os = dest.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }

    /// Write bytes to `dest` through a temp file and an atomic rename.
    ///
    /// On failure the temp file is removed; a successful path never leaves
    /// a partially-written destination.
    pub async fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
        let tmp = Self::temp_path(dest);

        if let Err(e) = fs::write(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, dest).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        Ok(())
    }

    /// Copy a file byte-for-byte, preserving timestamps.
    pub async fn copy_preserving(src: &Path, dest: &Path) -> Result<u64, PipelineError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = fs::copy(src, dest).await?;
        Self::copy_file_times(src, dest)?;
        Ok(bytes)
    }

    /// Carry source modification/access times over to the destination.
    pub fn copy_file_times(src: &Path, dest: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(src)?;
        let mut times = std::fs::FileTimes::new();
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }

        let dest_file = std::fs::OpenOptions::new().write(true).open(dest)?;
        dest_file.set_times(times)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_classification() {
        assert!(FileManager::is_image(Path::new("a/photo.jpg")));
        assert!(FileManager::is_image(Path::new("a/PHOTO.JPEG")));
        assert!(FileManager::is_image(Path::new("a/scan.TIFF")));
        assert!(!FileManager::is_image(Path::new("a/notes.txt")));
        assert!(!FileManager::is_image(Path::new("a/no_extension")));
    }

    #[test]
    fn test_temp_path_keeps_full_name() {
        assert_eq!(
            FileManager::temp_path(Path::new("/out/photo.jpg")),
            PathBuf::from("/out/photo.jpg.tmp")
        );
    }

    #[test]
    fn test_find_all_files_recurses() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
        std::fs::write(temp_dir.path().join("top.txt"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("a/b/deep.png"), b"y").unwrap();

        let mut files = FileManager::find_all_files(temp_dir.path());
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files[1].ends_with("top.txt") || files[0].ends_with("top.txt"));
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("data.bin");

        FileManager::write_atomic(&dest, b"hello").await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
        assert!(!FileManager::temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_copy_preserving_keeps_bytes_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dest = temp_dir.path().join("sub/dest.txt");
        std::fs::write(&src, b"payload").unwrap();

        FileManager::copy_preserving(&src, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        let src_mtime = std::fs::metadata(&src).unwrap().modified().unwrap();
        let dest_mtime = std::fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dest_mtime);
    }
}
