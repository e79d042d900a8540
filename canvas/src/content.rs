//! Content records and the load / save boundary.
//!
//! Each content kind is one JSON array of flat records. A record may carry a
//! builder page (`blocks` plus `canvasHeight`); every other field belongs to
//! the flat-field editor and is carried through untouched.
//!
//! Saving is read-modify-write over the whole array: re-fetch the
//! authoritative list, replace one record's `blocks` and `canvasHeight`, and
//! write the list back. Storage itself sits behind [`ContentStore`].

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::consts::{CANVAS_GROW_MARGIN, MIN_CANVAS_HEIGHT};
use crate::doc::{Block, ViewMode, lenient};

/// Errors from decoding or merging content records.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("unknown content type: {0}")]
    UnknownKind(String),
    #[error("no record with id {0}")]
    RecordNotFound(String),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from [`save_page`], generic over the store's own error type.
#[derive(Debug, thiserror::Error)]
pub enum SaveError<E: std::error::Error + 'static> {
    #[error("failed to fetch content: {0}")]
    Fetch(#[source] E),
    #[error("failed to store content: {0}")]
    Store(#[source] E),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// The content types the site serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Products,
    Research,
    Blogs,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Products, ContentKind::Research, ContentKind::Blogs];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Research => "research",
            Self::Blogs => "blogs",
        }
    }

    /// File name of the kind's JSON array.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "research" => Ok(Self::Research),
            "blogs" => Ok(Self::Blogs),
            other => Err(ContentError::UnknownKind(other.to_owned())),
        }
    }
}

/// A content record as the builder sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_blocks", skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
    #[serde(
        rename = "canvasHeight",
        default,
        deserialize_with = "lenient::number_or_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub canvas_height: Option<f64>,
    /// Every other field, preserved verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PageRecord {
    /// Decode one record from the raw array.
    pub fn from_value(value: &Value) -> Result<Self, ContentError> {
        Ok(Self::deserialize(value)?)
    }

    /// The record's `title`, if it has a string one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// The record's `slug`, if it has a string one.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.fields.get("slug").and_then(Value::as_str)
    }

    /// The record's blocks, empty when it has no builder page yet.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_deref().unwrap_or_default()
    }

    /// Canvas height to open the editor with: the stored height when
    /// present, otherwise enough room below the lowest block, never less
    /// than the minimum.
    #[must_use]
    pub fn initial_canvas_height(&self) -> f64 {
        if let Some(height) = self.canvas_height {
            return height;
        }
        self.blocks()
            .iter()
            .map(|b| b.rect(ViewMode::Desktop).bottom())
            .reduce(f64::max)
            .map_or(MIN_CANVAS_HEIGHT, |bottom| MIN_CANVAS_HEIGHT.max(bottom + CANVAS_GROW_MARGIN))
    }
}

/// What the builder writes back into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub blocks: Vec<Block>,
    #[serde(rename = "canvasHeight")]
    pub canvas_height: f64,
}

/// The record id as a string; numeric ids are accepted.
#[must_use]
pub fn record_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Find and decode the record with `id`.
pub fn find_page(items: &[Value], id: &str) -> Result<PageRecord, ContentError> {
    let item = items
        .iter()
        .find(|item| record_id(item).as_deref() == Some(id))
        .ok_or_else(|| ContentError::RecordNotFound(id.to_owned()))?;
    PageRecord::from_value(item)
}

/// Replace `blocks` and `canvasHeight` of the record with `id`, leaving every
/// other field and every other record as it was. Stored blocks that cannot
/// be decoded are appended after the snapshot's blocks. Nothing changes when
/// no record matches.
pub fn merge_page(items: &mut [Value], id: &str, snapshot: &PageSnapshot) -> Result<(), ContentError> {
    let record = items
        .iter_mut()
        .find(|item| record_id(item).as_deref() == Some(id))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ContentError::RecordNotFound(id.to_owned()))?;

    let mut blocks = Vec::with_capacity(snapshot.blocks.len());
    for block in &snapshot.blocks {
        blocks.push(serde_json::to_value(block)?);
    }
    let kept = undecodable_blocks(record.get("blocks"));
    if !kept.is_empty() {
        log::warn!("page {id}: keeping {} unreadable blocks as stored", kept.len());
    }
    blocks.extend(kept);
    record.insert("blocks".to_owned(), Value::Array(blocks));
    record.insert("canvasHeight".to_owned(), number_value(snapshot.canvas_height));
    Ok(())
}

/// Whole-number heights are written as JSON integers.
#[allow(clippy::cast_possible_truncation)]
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Storage for content arrays.
pub trait ContentStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The full array for `kind`.
    fn fetch(&self, kind: ContentKind) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send;

    /// Replace the full array for `kind`.
    fn store(&self, kind: ContentKind, items: &[Value]) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Save a builder page: re-fetch, merge this page, write everything back.
///
/// Last write wins. The caller's in-memory state is never touched, so a
/// failed save can simply be retried.
pub async fn save_page<S>(store: &S, kind: ContentKind, id: &str, snapshot: &PageSnapshot) -> Result<(), SaveError<S::Error>>
where
    S: ContentStore + Sync,
{
    let mut items = store.fetch(kind).await.map_err(SaveError::Fetch)?;
    merge_page(&mut items, id, snapshot)?;
    store.store(kind, &items).await.map_err(SaveError::Store)?;
    log::info!("saved page {kind}/{id} ({} blocks)", snapshot.blocks.len());
    Ok(())
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid record id: {other}"))),
    }
}

/// Blocks that fail to decode are skipped rather than failing the page.
fn lenient_blocks<'de, D>(deserializer: D) -> Result<Option<Vec<Block>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(raw) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let mut blocks = Vec::with_capacity(raw.len());
    for value in &raw {
        match decode_block(value) {
            Ok(block) => blocks.push(block),
            Err(e) => log::warn!("skipping unreadable block: {e}"),
        }
    }
    Ok(Some(blocks))
}

fn decode_block(value: &Value) -> Result<Block, serde_json::Error> {
    Block::deserialize(value)
}

/// Stored blocks the editor could not load. They never reach the editor, so
/// a save carries them over untouched.
fn undecodable_blocks(stored: Option<&Value>) -> Vec<Value> {
    let Some(Value::Array(raw)) = stored else {
        return Vec::new();
    };
    raw.iter().filter(|value| decode_block(value).is_err()).cloned().collect()
}
