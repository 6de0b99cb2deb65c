//! PDF text extraction, one [`Document`] per page

use bytes::Bytes;
use lopdf::Object;
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::types::document::{set_loc_field, SOURCE_KEY};
use crate::types::Document;

use super::fetcher::fetch_bytes;

/// Where a configured source lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// File on the local filesystem
    Local(PathBuf),
    /// http(s) URL, read into memory
    Remote(Url),
}

impl SourceLocation {
    /// URLs are remote, everything else is a local path
    pub fn classify(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::Local(PathBuf::from(location)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// A PDF ready to parse
#[derive(Debug, Clone)]
pub enum PdfSource {
    /// Read from disk at extraction time
    Path(PathBuf),
    /// Already in memory; `name` is recorded as the document source
    Bytes { name: String, data: Bytes },
}

impl PdfSource {
    /// Name recorded in each document's `source` metadata
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    async fn load(&self) -> Result<Bytes> {
        match self {
            Self::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            Self::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

/// File-level details read from the PDF structure
#[derive(Debug, Clone)]
struct PdfInfo {
    version: String,
    total_pages: usize,
    title: Option<String>,
    author: Option<String>,
}

/// Turns PDFs into per-page documents
pub struct Extractor {
    client: Client,
    timeout: Duration,
}

impl Extractor {
    /// Create an extractor; `timeout` bounds text extraction per file
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Extract every location, local files first and then URLs.
    ///
    /// A location that cannot be read, fetched or parsed is logged and
    /// contributes no documents.
    pub async fn extract_all(&self, locations: &[String]) -> Vec<Document> {
        let (remote, local): (Vec<_>, Vec<_>) = locations
            .iter()
            .map(|location| SourceLocation::classify(location))
            .partition(SourceLocation::is_remote);

        let mut documents = Vec::new();
        for location in local.into_iter().chain(remote) {
            let result = match self.resolve(location).await {
                Ok(source) => self.extract(&source).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(docs) => documents.extend(docs),
                Err(e) => tracing::error!("Skipping PDF: {}", e),
            }
        }

        tracing::info!("Extracted {} pages from {} sources", documents.len(), locations.len());
        documents
    }

    /// Turn a location into a parseable source, fetching URLs into memory
    pub async fn resolve(&self, location: SourceLocation) -> Result<PdfSource> {
        match location {
            SourceLocation::Local(path) => Ok(PdfSource::Path(path)),
            SourceLocation::Remote(url) => {
                let data = fetch_bytes(&self.client, url.as_str()).await?;
                Ok(PdfSource::Bytes {
                    name: url.to_string(),
                    data,
                })
            }
        }
    }

    /// Extract one PDF into one document per non-blank page
    pub async fn extract(&self, source: &PdfSource) -> Result<Vec<Document>> {
        let name = source.name();
        let data = source.load().await?;

        let pdf = lopdf::Document::load_mem(&data).map_err(|e| Error::pdf_parse(&name, e.to_string()))?;
        let info = read_info(&pdf);

        let pages = match self.extract_pages(&name, data).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("Falling back to structural text extraction: {}", e);
                fallback_pages(&pdf)
            }
        };

        let mut documents = Vec::with_capacity(pages.len());
        for (index, raw) in pages.iter().enumerate() {
            let page_number = index + 1;
            let content = clean_text(raw);
            if content.trim().is_empty() {
                tracing::debug!(source = %name, page = page_number, "Skipping blank page");
                continue;
            }

            let mut doc = Document::new(content)
                .with_metadata(SOURCE_KEY, name.as_str())
                .with_metadata("pdf.total_pages", info.total_pages)
                .with_metadata("pdf.version", info.version.as_str());
            if let Some(title) = &info.title {
                doc = doc.with_metadata("pdf.title", title.as_str());
            }
            if let Some(author) = &info.author {
                doc = doc.with_metadata("pdf.author", author.as_str());
            }
            set_loc_field(&mut doc.metadata, "page_number", Value::from(page_number));
            documents.push(doc);
        }

        if documents.is_empty() {
            tracing::warn!("No text found in {}", name);
        } else {
            tracing::info!("Extracted {} of {} pages from {}", documents.len(), info.total_pages, name);
        }
        Ok(documents)
    }

    /// Page texts from the layout-aware extractor, bounded by the timeout
    async fn extract_pages(&self, name: &str, data: Bytes) -> Result<Vec<String>> {
        let task = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&data));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(pages))) => Ok(pages),
            Ok(Ok(Err(e))) => Err(Error::pdf_parse(name, e.to_string())),
            Ok(Err(e)) => Err(Error::pdf_parse(name, format!("extraction aborted: {}", e))),
            Err(_) => Err(Error::pdf_parse(
                name,
                format!("extraction timed out after {:?}", self.timeout),
            )),
        }
    }
}

/// Page texts from lopdf's content-stream reader, in page order
fn fallback_pages(pdf: &lopdf::Document) -> Vec<String> {
    pdf.get_pages()
        .keys()
        .map(|&page| {
            pdf.extract_text(&[page]).unwrap_or_else(|e| {
                tracing::debug!(page, "No text on page: {}", e);
                String::new()
            })
        })
        .collect()
}

fn read_info(pdf: &lopdf::Document) -> PdfInfo {
    PdfInfo {
        version: pdf.version.clone(),
        total_pages: pdf.get_pages().len(),
        title: info_entry(pdf, b"Title"),
        author: info_entry(pdf, b"Author"),
    }
}

/// String entry from the trailer's Info dictionary
fn info_entry(pdf: &lopdf::Document, key: &[u8]) -> Option<String> {
    let info = match pdf.trailer.get(b"Info").ok()? {
        Object::Reference(id) => pdf.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let bytes = match info.get(key).ok()? {
        Object::String(bytes, _) => bytes,
        _ => return None,
    };

    let text = decode_pdf_string(bytes);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Decode a PDF text string (UTF-16BE with BOM, else byte-wise)
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Normalize extracted text: drop NULs, trim line ends, cap blank runs
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut newlines = 0usize;

    for line in raw.replace('\0', "").split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            newlines += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if newlines > 1 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        newlines = 1;
    }

    out
}
