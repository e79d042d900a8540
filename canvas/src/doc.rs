//! Document model: blocks, their styles, and the in-memory store.
//!
//! This module defines the data that describes a page layout (`Block`,
//! `BlockStyle`, `MobileStyle`), a sparse-update type for inspector edits
//! (`BlockPatch`), and the runtime store that owns the ordered block list for
//! one page (`DocStore`).
//!
//! Blocks flow into this layer from persisted JSON and from the input
//! engine. Decoding is lenient: a malformed numeric field falls back to a
//! default instead of failing the whole page, so a partially corrupt record
//! still opens in the editor.
//!
//! Gestures never write coordinates on every pointer-move. The store keeps a
//! single *transient* overlay (a drag offset or a live resize) that readers
//! see through [`DocStore::display_rect`], and folds it into the committed
//! geometry exactly once on release.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{
    DEFAULT_FONT_SIZE, FALLBACK_HEIGHT, FALLBACK_WIDTH, MEDIA_DEFAULT_HEIGHT, MEDIA_DEFAULT_WIDTH, MIN_BLOCK_SIZE,
    TEXT_DEFAULT_HEIGHT, TEXT_DEFAULT_WIDTH, TEXT_PLACEHOLDER,
};

/// Unique identifier for a block within a page.
pub type BlockId = String;

/// Shared tag linking blocks that move and stack together.
pub type GroupId = String;

/// The kind of a block. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Inline-formatted text.
    Text,
    /// Image referenced by URL.
    Image,
    /// Video referenced by URL.
    Video,
}

impl BlockKind {
    /// Whether the block's content is a media URL.
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }

    /// Width and height of a freshly added block of this kind.
    #[must_use]
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Text => (TEXT_DEFAULT_WIDTH, TEXT_DEFAULT_HEIGHT),
            Self::Image | Self::Video => (MEDIA_DEFAULT_WIDTH, MEDIA_DEFAULT_HEIGHT),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// How media fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Cover,
    Contain,
}

impl ObjectFit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
        }
    }
}

/// Which geometry the editor is showing and editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// `style` only.
    #[default]
    Desktop,
    /// `style` overridden by `mobileStyle`.
    Mobile,
}

/// Desktop geometry and appearance of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    /// Left edge in canvas pixels.
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub x: f64,
    /// Top edge in canvas pixels.
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub y: f64,
    /// Width; `None` when the stored value was missing or not a number.
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height; `None` when the stored value was missing or not a number.
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Paint order; higher values draw on top, ties keep array order.
    #[serde(default, deserialize_with = "lenient::integer_or_zero")]
    pub z_index: i64,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    /// Opacity in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// CSS box-shadow preset string.
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    /// CSS object-position focal point, e.g. `"top left"`.
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub object_position: Option<String>,
}

impl BlockStyle {
    /// Desktop rectangle, reading unusable dimensions as 200×100.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.width.unwrap_or(FALLBACK_WIDTH),
            self.height.unwrap_or(FALLBACK_HEIGHT),
        )
    }
}

/// Mobile override of a block's geometry. Absent fields fall back to the
/// desktop style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileStyle {
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number_or_none", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl MobileStyle {
    /// A fully specified override placing the block at `rect`.
    #[must_use]
    pub fn placed(rect: Rect, font_size: Option<f64>) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            font_size,
        }
    }
}

/// One placeable unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "lenient::id")]
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Markup for text blocks, a URL for media blocks.
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub style: BlockStyle,
    #[serde(
        rename = "mobileStyle",
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile_style: Option<MobileStyle>,
    #[serde(rename = "groupId", default, deserialize_with = "lenient::tag", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl Block {
    /// Build a new block with a fresh id, the kind's default size and the
    /// editor's default appearance.
    #[must_use]
    pub fn new(kind: BlockKind, origin: Point, z_index: i64) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: if kind == BlockKind::Text { TEXT_PLACEHOLDER.to_owned() } else { String::new() },
            style: BlockStyle {
                x: origin.x,
                y: origin.y,
                width: Some(width),
                height: Some(height),
                z_index,
                font_size: Some(DEFAULT_FONT_SIZE),
                color: Some("#000000".to_owned()),
                background_color: Some("transparent".to_owned()),
                border_radius: Some(0.0),
                opacity: Some(1.0),
                ..BlockStyle::default()
            },
            mobile_style: None,
            group_id: None,
        }
    }

    /// Desktop rectangle.
    #[must_use]
    pub fn desktop_rect(&self) -> Rect {
        self.style.rect()
    }

    /// Mobile rectangle: desktop geometry overridden field by field.
    #[must_use]
    pub fn mobile_rect(&self) -> Rect {
        let desktop = self.desktop_rect();
        let Some(m) = &self.mobile_style else {
            return desktop;
        };
        Rect::new(
            m.x.unwrap_or(desktop.x),
            m.y.unwrap_or(desktop.y),
            m.width.unwrap_or(desktop.width),
            m.height.unwrap_or(desktop.height),
        )
    }

    /// Committed rectangle in the given view.
    #[must_use]
    pub fn rect(&self, view: ViewMode) -> Rect {
        match view {
            ViewMode::Desktop => self.desktop_rect(),
            ViewMode::Mobile => self.mobile_rect(),
        }
    }

    /// Font size in the given view, falling back to desktop, then to 16.
    #[must_use]
    pub fn font_size(&self, view: ViewMode) -> f64 {
        let mobile = match view {
            ViewMode::Mobile => self.mobile_style.as_ref().and_then(|m| m.font_size),
            ViewMode::Desktop => None,
        };
        mobile.or(self.style.font_size).unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// The style as seen in `view`: desktop style with mobile overrides laid
    /// on top in mobile view.
    #[must_use]
    pub fn effective_style(&self, view: ViewMode) -> BlockStyle {
        let mut style = self.style.clone();
        if view == ViewMode::Mobile {
            if let Some(m) = &self.mobile_style {
                style.x = m.x.unwrap_or(style.x);
                style.y = m.y.unwrap_or(style.y);
                style.width = m.width.or(style.width);
                style.height = m.height.or(style.height);
                style.font_size = m.font_size.or(style.font_size);
            }
        }
        style
    }

    /// The mobile override, creating one seeded from the desktop geometry
    /// when absent.
    pub fn mobile_style_mut(&mut self) -> &mut MobileStyle {
        let seed = MobileStyle::placed(self.desktop_rect(), self.style.font_size);
        self.mobile_style.get_or_insert(seed)
    }

    /// Move the block's top-left corner in `view`.
    pub fn set_position(&mut self, view: ViewMode, x: f64, y: f64) {
        match view {
            ViewMode::Desktop => {
                self.style.x = x;
                self.style.y = y;
            }
            ViewMode::Mobile => {
                let m = self.mobile_style_mut();
                m.x = Some(x);
                m.y = Some(y);
            }
        }
    }

    /// Set the block's size in `view`, clamped to the minimum block size.
    pub fn set_size(&mut self, view: ViewMode, width: f64, height: f64) {
        let width = clamp_block_size(width);
        let height = clamp_block_size(height);
        match view {
            ViewMode::Desktop => {
                self.style.width = Some(width);
                self.style.height = Some(height);
            }
            ViewMode::Mobile => {
                let m = self.mobile_style_mut();
                m.width = Some(width);
                m.height = Some(height);
            }
        }
    }

    /// Merge a sparse patch. Geometry and font size land in the view's
    /// geometry; appearance fields have no mobile counterpart and always
    /// land in `style`.
    pub fn apply_patch(&mut self, patch: &BlockPatch, view: ViewMode) {
        match view {
            ViewMode::Desktop => {
                if let Some(x) = patch.x {
                    self.style.x = x;
                }
                if let Some(y) = patch.y {
                    self.style.y = y;
                }
                if let Some(w) = patch.width {
                    self.style.width = Some(clamp_block_size(w));
                }
                if let Some(h) = patch.height {
                    self.style.height = Some(clamp_block_size(h));
                }
                if let Some(size) = patch.font_size {
                    self.style.font_size = Some(size);
                }
            }
            ViewMode::Mobile => {
                if patch.x.is_some()
                    || patch.y.is_some()
                    || patch.width.is_some()
                    || patch.height.is_some()
                    || patch.font_size.is_some()
                {
                    let m = self.mobile_style_mut();
                    if let Some(x) = patch.x {
                        m.x = Some(x);
                    }
                    if let Some(y) = patch.y {
                        m.y = Some(y);
                    }
                    if let Some(w) = patch.width {
                        m.width = Some(clamp_block_size(w));
                    }
                    if let Some(h) = patch.height {
                        m.height = Some(clamp_block_size(h));
                    }
                    if let Some(size) = patch.font_size {
                        m.font_size = Some(size);
                    }
                }
            }
        }
        if let Some(z) = patch.z_index {
            self.style.z_index = z;
        }
        if let Some(color) = &patch.color {
            self.style.color = Some(color.clone());
        }
        if let Some(align) = patch.text_align {
            self.style.text_align = Some(align);
        }
        if let Some(bg) = &patch.background_color {
            self.style.background_color = Some(bg.clone());
        }
        if let Some(radius) = patch.border_radius {
            self.style.border_radius = Some(radius.max(0.0));
        }
        if let Some(opacity) = patch.opacity {
            self.style.opacity = Some(opacity.clamp(0.0, 1.0));
        }
        if let Some(shadow) = &patch.box_shadow {
            self.style.box_shadow = Some(shadow.clone());
        }
        if let Some(fit) = patch.object_fit {
            self.style.object_fit = Some(fit);
        }
        if let Some(position) = &patch.object_position {
            self.style.object_position = Some(position.clone());
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
    }
}

fn clamp_block_size(value: f64) -> f64 {
    if value.is_finite() { value.max(MIN_BLOCK_SIZE) } else { MIN_BLOCK_SIZE }
}

/// Sparse inspector edit for one block. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BlockPatch {
    /// Whether the patch moves or resizes the block.
    #[must_use]
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Uncommitted geometry overlay for the gesture in progress.
#[derive(Debug, Clone, PartialEq)]
enum Transient {
    /// Blocks being dragged. The lead block carries its own (snapped) delta;
    /// every other id follows the raw pointer delta.
    Offset { lead: BlockId, ids: Vec<BlockId>, lead_delta: Point, follower_delta: Point },
    /// One block being resized to a live size.
    Resize { id: BlockId, width: f64, height: f64 },
}

/// In-memory, ordered store of a page's blocks.
///
/// Array order is significant: it breaks `zIndex` ties when painting and is
/// preserved on save.
#[derive(Debug, Default)]
pub struct DocStore {
    blocks: Vec<Block>,
    transient: Option<Transient>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new(), transient: None }
    }

    /// Replace all blocks with a loaded page. Drops any transient state.
    pub fn load_snapshot(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.transient = None;
    }

    /// Append a block, or replace the block with the same id in place.
    pub fn insert(&mut self, block: Block) {
        match self.index_of(&block.id) {
            Some(i) => self.blocks[i] = block,
            None => self.blocks.push(block),
        }
    }

    /// Remove a block by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        let index = self.index_of(id)?;
        if self.transient_involves(id) {
            self.transient = None;
        }
        Some(self.blocks.remove(index))
    }

    /// Remove every block whose id is in `ids`, preserving the order of the rest.
    pub fn remove_many(&mut self, ids: &[BlockId]) -> Vec<Block> {
        if ids.iter().any(|id| self.transient_involves(id)) {
            self.transient = None;
        }
        let (removed, kept): (Vec<Block>, Vec<Block>) =
            std::mem::take(&mut self.blocks).into_iter().partition(|b| ids.contains(&b.id));
        self.blocks = kept;
        removed
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// All blocks in array order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Clone of all blocks in array order, for persisting.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `zIndex` for the next added block.
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        i64::try_from(self.blocks.len()).unwrap_or(i64::MAX - 1) + 1
    }

    /// Apply a sparse patch. Returns false if the block doesn't exist.
    pub fn apply_patch(&mut self, id: &str, patch: &BlockPatch, view: ViewMode) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        block.apply_patch(patch, view);
        true
    }

    /// Blocks in paint order: ascending `zIndex`, ties in array order.
    #[must_use]
    pub fn sorted_blocks(&self) -> Vec<&Block> {
        let mut sorted: Vec<&Block> = self.blocks.iter().collect();
        sorted.sort_by_key(|b| b.style.z_index);
        sorted
    }

    /// Tag (or untag, with `None`) every listed block. Returns how many changed.
    pub fn set_group(&mut self, ids: &[BlockId], group: Option<&GroupId>) -> usize {
        let mut changed = 0;
        for block in &mut self.blocks {
            if ids.contains(&block.id) && block.group_id.as_ref() != group {
                block.group_id = group.cloned();
                changed += 1;
            }
        }
        changed
    }

    /// Group membership derived from the blocks: group id to member ids in
    /// array order.
    #[must_use]
    pub fn groups(&self) -> BTreeMap<GroupId, Vec<BlockId>> {
        let mut groups: BTreeMap<GroupId, Vec<BlockId>> = BTreeMap::new();
        for block in &self.blocks {
            if let Some(group) = &block.group_id {
                groups.entry(group.clone()).or_default().push(block.id.clone());
            }
        }
        groups
    }

    /// Members of one group in array order.
    #[must_use]
    pub fn group_members(&self, group: &str) -> Vec<&Block> {
        self.blocks.iter().filter(|b| b.group_id.as_deref() == Some(group)).collect()
    }

    /// Lowest committed bottom edge in `view`, or `None` for an empty page.
    #[must_use]
    pub fn lowest_bottom(&self, view: ViewMode) -> Option<f64> {
        self.blocks.iter().map(|b| b.rect(view).bottom()).reduce(f64::max)
    }

    // --- Transient geometry ---

    /// Start a drag overlay: `lead` is the grabbed block, `ids` every block
    /// that moves with it (including `lead`).
    pub fn begin_offset(&mut self, lead: &str, ids: Vec<BlockId>) {
        self.transient = Some(Transient::Offset {
            lead: lead.to_owned(),
            ids,
            lead_delta: Point::new(0.0, 0.0),
            follower_delta: Point::new(0.0, 0.0),
        });
    }

    /// Update the live drag offsets. No-op without a drag overlay.
    pub fn set_offset(&mut self, lead_delta: Point, follower_delta: Point) {
        if let Some(Transient::Offset { lead_delta: lead, follower_delta: follower, .. }) = &mut self.transient {
            *lead = lead_delta;
            *follower = follower_delta;
        }
    }

    /// Start a resize overlay at the block's current size.
    pub fn begin_resize(&mut self, id: &str, width: f64, height: f64) {
        self.transient = Some(Transient::Resize { id: id.to_owned(), width, height });
    }

    /// Update the live size. No-op without a resize overlay.
    pub fn set_live_size(&mut self, new_width: f64, new_height: f64) {
        if let Some(Transient::Resize { width, height, .. }) = &mut self.transient {
            *width = clamp_block_size(new_width);
            *height = clamp_block_size(new_height);
        }
    }

    /// Whether a gesture overlay is active.
    #[must_use]
    pub fn has_transient(&self) -> bool {
        self.transient.is_some()
    }

    /// Drop the overlay without touching committed geometry.
    pub fn cancel_transient(&mut self) {
        self.transient = None;
    }

    /// Fold the overlay into the committed geometry of `view`, rounding to
    /// whole pixels. Returns the ids that were written.
    pub fn commit_transient(&mut self, view: ViewMode) -> Vec<BlockId> {
        let Some(transient) = self.transient.take() else {
            return Vec::new();
        };
        match transient {
            Transient::Offset { lead, ids, lead_delta, follower_delta } => {
                let mut written = Vec::new();
                for block in &mut self.blocks {
                    if !ids.contains(&block.id) {
                        continue;
                    }
                    let delta = if block.id == lead { lead_delta } else { follower_delta };
                    let moved = block.rect(view).translated(delta);
                    block.set_position(view, moved.x.round(), moved.y.round());
                    written.push(block.id.clone());
                }
                written
            }
            Transient::Resize { id, width, height } => {
                let Some(block) = self.get_mut(&id) else {
                    return Vec::new();
                };
                block.set_size(view, width.round(), height.round());
                vec![id]
            }
        }
    }

    /// Rectangle of a block as currently displayed: committed geometry in
    /// `view` plus any transient overlay.
    #[must_use]
    pub fn display_rect(&self, id: &str, view: ViewMode) -> Option<Rect> {
        let rect = self.get(id)?.rect(view);
        let shown = match &self.transient {
            Some(Transient::Offset { lead, ids, lead_delta, follower_delta }) if ids.iter().any(|i| i == id) => {
                let delta = if lead == id { *lead_delta } else { *follower_delta };
                rect.translated(delta)
            }
            Some(Transient::Resize { id: resized, width, height }) if resized == id => {
                Rect::new(rect.x, rect.y, *width, *height)
            }
            _ => rect,
        };
        Some(shown)
    }

    fn transient_involves(&self, id: &str) -> bool {
        match &self.transient {
            Some(Transient::Offset { ids, .. }) => ids.iter().any(|i| i == id),
            Some(Transient::Resize { id: resized, .. }) => resized == id,
            None => false,
        }
    }
}

/// Forgiving deserializers for hand-edited or partially corrupt records.
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A finite JSON number, or `None` for anything else.
    pub fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_f64().filter(|v| v.is_finite()))
    }

    /// A finite JSON number, or `0.0` for anything else.
    pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number_or_none(deserializer)?.unwrap_or(0.0))
    }

    /// A JSON number truncated to an integer, or `0` for anything else.
    #[allow(clippy::cast_possible_truncation)]
    pub fn integer_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_i64() {
            Some(i) => i,
            None => value.as_f64().filter(|v| v.is_finite()).map_or(0, |v| v.trunc() as i64),
        })
    }

    /// A number, or a string holding one; `None` otherwise.
    pub fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => None,
            },
            other => other.as_f64(),
        };
        Ok(parsed.filter(|v| v.is_finite()))
    }

    /// A string or number id. Anything else is an error: a block without a
    /// usable id cannot be addressed.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!("invalid block id: {other}"))),
        }
    }

    /// A string, or `""` for anything else.
    pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    /// A string or number tag; `None` otherwise.
    pub fn tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Any well-formed `T`, or `T::default()` when the value doesn't fit.
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(or_none(deserializer)?.unwrap_or_default())
    }

    /// Any well-formed `T`, or `None` when the value doesn't fit.
    pub fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(_) => None,
        })
    }
}
