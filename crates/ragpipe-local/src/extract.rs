//! Web page fetching and reduction to bounded plain text.

use futures_util::StreamExt;
use ragpipe_core::{Error, Result, TextExtractor};
use std::io::Cursor;
use std::time::Duration;

/// Per-source character bound; the truncation marker is appended on top.
pub const MAX_CONTENT_CHARS: usize = 15_000;
pub const TRUNCATION_MARKER: &str = "...[content truncated]";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
// Hard cap on bytes read from the response body before text extraction.
const MAX_FETCH_BYTES: usize = 2 * 1024 * 1024;
const TEXT_WIDTH: usize = 80;
// Some hosts serve bot-hostile pages to non-browser agents.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Convert HTML to readable plain text.
///
/// Intentionally "good enough" and deterministic, not a full
/// readability engine.
fn html_to_text(html: &str, width: usize) -> String {
    html2text::from_read(Cursor::new(html.as_bytes()), width).unwrap_or_else(|_| html.to_string())
}

/// Collapse layout artifacts: trim lines, split on double-space runs,
/// drop empties.
fn clean_text(s: &str) -> String {
    s.lines()
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to `max_chars` characters (not bytes), appending the marker
/// when anything was cut.
fn bound_chars(s: String, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => {
            let mut out = s[..byte_idx].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageExtractor {
    client: reqwest::Client,
}

impl PageExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TextExtractor for PageExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let resp = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, BROWSER_UA)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Extract(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Extract(format!("HTTP {status}")));
        }

        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Extract(e.to_string()))?;
            if bytes.len().saturating_add(chunk.len()) > MAX_FETCH_BYTES {
                let can_take = MAX_FETCH_BYTES.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&bytes);
        let text = clean_text(&html_to_text(&body, TEXT_WIDTH));
        Ok(bound_chars(text, MAX_CONTENT_CHARS))
    }
}
