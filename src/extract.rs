//! # Structured Extractor Module
//!
//! Questo modulo estrae la mappa categoria → lista di URL dal testo del
//! documento di input.
//!
//! ## Formato atteso:
//! ```text
//! CategoryName
//! [ "url1", "url2", ... ]
//! ```
//!
//! ## Responsabilità:
//! - Trova ogni pattern "riga categoria + blocco tra parentesi quadre"
//! - Estrae gli URL http/https tra virgolette (dritte o tipografiche)
//! - Scarta con warning le categorie senza URL estraibili
//! - Preserva l'ordine di inserimento della prima occorrenza
//!
//! Nessun parsing JSON rigoroso: solo regex tolleranti, per robustezza
//! contro virgolette tipografiche e testo non perfettamente formattato.
//! Una categoria duplicata sovrascrive la lista URL precedente mantenendo
//! la posizione della prima occorrenza (last occurrence wins).

use crate::error::PipelineError;
use regex::Regex;
use tracing::{info, warn};

/// One extracted category with its URLs in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub urls: Vec<String>,
}

/// Ordered mapping from category name to URL list.
///
/// Built once per run from the document text; immutable afterward.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryMap {
    fn insert(&mut self, name: &str, urls: Vec<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.urls = urls;
        } else {
            self.entries.push(CategoryEntry {
                name: name.to_string(),
                urls,
            });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.urls.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts categories and their image URLs from the document text.
///
/// Returns `PipelineError::NoData` when no category yields at least one
/// URL; the caller aborts the run in that case.
pub fn extract_categories(text: &str) -> Result<CategoryMap, PipelineError> {
    // A category line followed by an array block in square brackets.
    // (?s) lets the block span multiple lines.
    let block_re = Regex::new(r"(?ms)^(?P<category>[^\n]+?)[ \t]*\n\s*(?P<array>\[.*?\])")
        .map_err(|e| PipelineError::Validation(e.to_string()))?;
    // URLs enclosed in straight or typographic quotes.
    let url_re = Regex::new(r#"[“"](https?://[^"”]+)[”"]"#)
        .map_err(|e| PipelineError::Validation(e.to_string()))?;

    let mut map = CategoryMap::default();
    for captures in block_re.captures_iter(text) {
        let category = captures["category"].trim();
        let array_text = &captures["array"];

        let urls: Vec<String> = url_re
            .captures_iter(array_text)
            .map(|c| c[1].to_string())
            .collect();

        if urls.is_empty() {
            warn!("No URLs found for category '{}'", category);
        } else {
            info!("Extracted {} URLs for category '{}'", urls.len(), category);
            map.insert(category, urls);
        }
    }

    if map.is_empty() {
        return Err(PipelineError::NoData);
    }

    Ok(map)
}
