//! # Download Module
//!
//! Scarica una risorsa HTTP in un buffer in memoria, a chunk, con progress
//! bar scalata sui byte.
//!
//! ## Comportamento:
//! - Timeout fissi di connessione e lettura (10 secondi)
//! - Status non-success o errore di trasporto abortiscono solo quell'URL
//! - L'hint `Content-Length` serve solo a scalare la progress bar: la sua
//!   assenza non blocca il download (si usa uno spinner)
//!
//! Nessun retry e nessun download parallelo: ogni URL viene processato
//! dall'inizio alla fine prima del successivo.

use crate::error::PipelineError;
use crate::progress::ProgressManager;
use futures::StreamExt;
use std::time::Duration;
use tracing::debug;

/// Fixed connect/read timeout for every request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads URLs into in-memory byte buffers.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the fixed pipeline timeouts.
    pub fn new() -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(FETCH_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads a single URL into memory, streaming fixed-size chunks.
    ///
    /// Any transport error or non-success status is returned as an error;
    /// the caller logs it and moves on to the next URL.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let bar = match response.content_length() {
            Some(total) => ProgressManager::download_bar(total),
            None => ProgressManager::spinner("Downloading"),
        };

        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            bar.inc(chunk.len() as u64);
        }
        bar.finish_and_clear();

        debug!("Downloaded {} bytes from {}", buffer.len(), url);
        Ok(buffer)
    }
}
