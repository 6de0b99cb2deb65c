//! Document, chunk and stored-record types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata attached to documents and chunks.
///
/// Ordered so that serialized records are identical across runs.
pub type Metadata = BTreeMap<String, Value>;

/// Embedding vector produced by an embedding provider
pub type Embedding = Vec<f32>;

/// Metadata key holding the source location as configured
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding location details (page, character range)
pub const LOC_KEY: &str = "loc";
/// Metadata key holding the chunk's position within its parent document
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// A span of extracted text plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content
    pub content: String,
    /// Source metadata
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with empty metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Source location this document was extracted from
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// 1-based page number, if known
    pub fn page_number(&self) -> Option<u32> {
        loc_field(&self.metadata, "page_number")
            .and_then(Value::as_u64)
            .map(|p| p as u32)
    }
}

/// A bounded window of a [`Document`], the unit of embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Window text
    pub content: String,
    /// Parent metadata plus chunk position
    pub metadata: Metadata,
}

impl Chunk {
    /// Build a chunk from its parent document and character range
    pub fn from_parent(
        parent: &Document,
        content: String,
        chunk_index: usize,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        let mut metadata = parent.metadata.clone();
        metadata.insert(CHUNK_INDEX_KEY.to_string(), Value::from(chunk_index));
        set_loc_field(&mut metadata, "char_start", Value::from(char_start));
        set_loc_field(&mut metadata, "char_end", Value::from(char_end));

        Self { content, metadata }
    }

    /// Position within the parent document
    pub fn chunk_index(&self) -> Option<usize> {
        self.metadata
            .get(CHUNK_INDEX_KEY)
            .and_then(Value::as_u64)
            .map(|i| i as usize)
    }

    /// Source location of the parent document
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// Page number of the parent document
    pub fn page_number(&self) -> Option<u32> {
        loc_field(&self.metadata, "page_number")
            .and_then(Value::as_u64)
            .map(|p| p as u32)
    }

    /// Number of characters in the chunk
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A record as held by the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Store-assigned identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chunk text
    pub content: String,
    /// Chunk metadata
    pub metadata: Metadata,
    /// Embedding vector (absent on records read back from search)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Embedding,
}

impl StoredRecord {
    /// Pair a chunk with its embedding
    pub fn from_chunk(chunk: Chunk, embedding: Embedding) -> Self {
        Self {
            id: None,
            content: chunk.content,
            metadata: chunk.metadata,
            embedding,
        }
    }

    /// Source location of the record
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// Page number of the record
    pub fn page_number(&self) -> Option<u32> {
        loc_field(&self.metadata, "page_number")
            .and_then(Value::as_u64)
            .map(|p| p as u32)
    }
}

/// Read a field from the nested `loc` object
pub(crate) fn loc_field<'a>(metadata: &'a Metadata, field: &str) -> Option<&'a Value> {
    metadata.get(LOC_KEY).and_then(|loc| loc.get(field))
}

/// Write a field into the nested `loc` object, creating it if needed
pub(crate) fn set_loc_field(metadata: &mut Metadata, field: &str, value: Value) {
    let loc = metadata
        .entry(LOC_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if !loc.is_object() {
        *loc = Value::Object(Map::new());
    }
    if let Value::Object(map) = loc {
        map.insert(field.to_string(), value);
    }
}
