use std::ops::Range;

use serde::Serialize;
use uuid::Uuid;

use crate::autostack::{self, Measure};
use crate::camera::{Camera, Point, Rect};
use crate::consts::{
    CANVAS_GROW_MARGIN, DESKTOP_CANVAS_WIDTH, MIN_BLOCK_SIZE, MIN_CANVAS_HEIGHT, MOBILE_CANVAS_WIDTH, SPAWN_OFFSET_Y,
    SPAWN_X,
};
use crate::content::{PageRecord, PageSnapshot};
use crate::doc::{Block, BlockId, BlockKind, BlockPatch, BlockStyle, DocStore, ViewMode};
use crate::hit::{Hit, hit_test};
use crate::input::{Button, InputState, Key, Modifiers, UiState};
use crate::markup::{Mark, Markup};
use crate::snap::{SnapLine, calculate_snap, snap_resize};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

const CURSOR_DEFAULT: &str = "default";
const CURSOR_MOVE: &str = "move";
const CURSOR_CANVAS_RESIZE: &str = "ns-resize";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Action {
    BlockCreated(Block),
    /// A block's committed state changed; carries the new state.
    BlockUpdated(Block),
    BlocksDeleted(Vec<BlockId>),
    /// Selection after the change, primary last.
    SelectionChanged(Vec<BlockId>),
    CanvasHeightChanged(f64),
    SetCursor(String),
    RenderNeeded,
    /// Open the host's rich-text editor for a text block.
    EditContentRequested { id: BlockId, content: String },
}

/// Core engine state: all editor logic that does not touch the DOM.
///
/// The wasm wrapper owns one of these and forwards browser events; tests
/// drive it directly.
#[derive(Debug)]
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub canvas_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            canvas_height: MIN_CANVAS_HEIGHT,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Open a content record in the editor.
    pub fn load(&mut self, record: &PageRecord) {
        self.load_snapshot(record.blocks().to_vec(), record.initial_canvas_height());
    }

    /// Replace the page wholesale. Selection and any gesture are dropped.
    pub fn load_snapshot(&mut self, blocks: Vec<Block>, canvas_height: f64) {
        self.doc.load_snapshot(blocks);
        self.canvas_height = canvas_height.max(MIN_CANVAS_HEIGHT);
        self.ui.selection.clear();
        self.ui.snap_lines.clear();
        self.input = InputState::Idle;
    }

    /// What a save writes back into the record.
    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot { blocks: self.doc.to_vec(), canvas_height: self.canvas_height }
    }

    // --- Block operations ---

    /// Add a block of `kind` just below the top of the visible region and
    /// make it the only selection.
    pub fn add_block(&mut self, kind: BlockKind) -> Vec<Action> {
        let y = (self.camera.visible_top() + SPAWN_OFFSET_Y).round();
        let block = Block::new(kind, Point::new(SPAWN_X, y), self.doc.next_z_index());
        log::debug!("add {:?} block {} at y={y}", kind, block.id);

        self.ui.selection.select(&block.id, false);
        self.doc.insert(block.clone());

        let mut actions = vec![Action::BlockCreated(block), self.selection_changed()];
        actions.extend(self.grow_to_fit());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Click-select. Non-additive replaces the selection, additive toggles.
    pub fn select(&mut self, id: &str, additive: bool) -> Vec<Action> {
        if !self.doc.contains(id) {
            return Vec::new();
        }
        self.ui.selection.select(id, additive);
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.ui.selection.clear();
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    /// Tag every selected block with one fresh group id. Needs at least two.
    pub fn group_selected(&mut self) -> Vec<Action> {
        if self.ui.selection.len() < 2 {
            return Vec::new();
        }
        let group = format!("group-{}", Uuid::new_v4());
        let ids = self.ui.selection.ids().to_vec();
        self.doc.set_group(&ids, Some(&group));
        log::info!("grouped {} blocks as {group}", ids.len());
        self.updated(&ids)
    }

    /// Clear the group tag of every selected block.
    pub fn ungroup_selected(&mut self) -> Vec<Action> {
        let ids = self.ui.selection.ids().to_vec();
        if self.doc.set_group(&ids, None) == 0 {
            return Vec::new();
        }
        log::info!("ungrouped {} blocks", ids.len());
        self.updated(&ids)
    }

    /// Remove every selected block and clear the selection.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        let ids = self.ui.selection.ids().to_vec();
        let removed: Vec<BlockId> = self.doc.remove_many(&ids).into_iter().map(|b| b.id).collect();
        self.ui.selection.clear();
        self.ui.snap_lines.clear();
        self.input = InputState::Idle;
        log::info!("deleted {} blocks", removed.len());
        vec![Action::BlocksDeleted(removed), self.selection_changed(), Action::RenderNeeded]
    }

    /// Apply an inspector edit to one block in the current view.
    pub fn update_block(&mut self, id: &str, patch: &BlockPatch) -> Vec<Action> {
        if !self.doc.apply_patch(id, patch, self.ui.view_mode) {
            return Vec::new();
        }
        let mut actions = self.updated(&[id.to_owned()]);
        if patch.touches_geometry() {
            actions.extend(self.grow_to_fit());
        }
        actions
    }

    /// Apply an inspector edit to the primary selected block.
    pub fn update_primary(&mut self, patch: &BlockPatch) -> Vec<Action> {
        let Some(id) = self.ui.selection.primary().cloned() else {
            return Vec::new();
        };
        self.update_block(&id, patch)
    }

    /// Replace a block's content (markup for text, URL for media).
    pub fn set_content(&mut self, id: &str, content: String) -> Vec<Action> {
        let Some(block) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        block.content = content;
        self.updated(&[id.to_owned()])
    }

    /// Toggle a formatting mark over a character range of a text block.
    pub fn format_text(&mut self, id: &str, range: Range<usize>, mark: Mark) -> Vec<Action> {
        let Some(block) = self.doc.get_mut(id).filter(|b| b.kind == BlockKind::Text) else {
            return Vec::new();
        };
        let mut markup = Markup::parse(&block.content);
        markup.toggle(range, mark);
        block.content = markup.to_html();
        self.updated(&[id.to_owned()])
    }

    /// Point a media block at a new source. Text blocks are left alone.
    pub fn replace_media(&mut self, id: &str, url: &str) -> Vec<Action> {
        if !self.doc.get(id).is_some_and(|b| b.kind.is_media()) {
            return Vec::new();
        }
        self.set_content(id, url.to_owned())
    }

    // --- View / camera ---

    /// Switch which geometry is shown and edited. Cancels any gesture.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> Vec<Action> {
        if self.ui.view_mode == mode {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.ui.view_mode = mode;
        if !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        self.camera.set_scale(scale);
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.camera.zoom_in();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.camera.zoom_out();
        vec![Action::RenderNeeded]
    }

    /// Track the scrolling container's offset, in screen pixels.
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.camera.scroll_top = scroll_top.max(0.0);
    }

    /// Set the canvas height, floored at the minimum.
    pub fn resize_canvas(&mut self, height: f64) -> Vec<Action> {
        let height = height.max(MIN_CANVAS_HEIGHT);
        if height == self.canvas_height {
            return Vec::new();
        }
        self.canvas_height = height;
        vec![Action::CanvasHeightChanged(height), Action::RenderNeeded]
    }

    /// Rewrite every block's mobile geometry as a single column.
    pub fn auto_stack<M: Measure + ?Sized>(&mut self, measure: &mut M) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        let plan = autostack::plan(self.doc.blocks(), measure);
        let height = plan.apply(&mut self.doc, self.canvas_height);
        log::info!("auto-stacked {} blocks, canvas height {height}", plan.placements.len());

        let ids: Vec<BlockId> = plan.placements.into_iter().map(|(id, _)| id).collect();
        actions.extend(self.updated(&ids));
        if height != self.canvas_height {
            self.canvas_height = height;
            actions.push(Action::CanvasHeightChanged(height));
        }
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        let pt = self.camera.screen_to_canvas(screen_pt);
        let view = self.ui.view_mode;

        let pressed = match hit_test(pt, &self.doc, &self.camera, &self.ui.selection, view, self.canvas_height) {
            Hit::Handle { id, handle } => {
                let Some(orig) = self.doc.display_rect(&id, view) else {
                    return actions;
                };
                self.ui.selection.promote(&id);
                self.doc.begin_resize(&id, orig.width, orig.height);
                self.input = InputState::ResizingBlock { id, handle, start: pt, orig };
                vec![Action::SetCursor(handle.cursor().to_owned())]
            }
            Hit::CanvasHeight => {
                self.input = InputState::ResizingCanvas { start_y: screen_pt.y, orig_height: self.canvas_height };
                vec![Action::SetCursor(CURSOR_CANVAS_RESIZE.to_owned())]
            }
            Hit::Body { id } => self.press_block(id, pt, modifiers),
            Hit::Canvas => {
                let mut cleared = Vec::new();
                if !modifiers.shift && !self.ui.selection.is_empty() {
                    self.ui.selection.clear();
                    cleared.push(self.selection_changed());
                }
                self.input = InputState::Selecting { start: pt, current: pt };
                cleared.push(Action::RenderNeeded);
                cleared
            }
        };
        actions.extend(pressed);
        actions
    }

    fn press_block(&mut self, id: BlockId, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.shift {
            self.ui.selection.select(&id, true);
        } else if self.ui.selection.contains(&id) {
            self.ui.selection.promote(&id);
        } else {
            self.ui.selection.select(&id, false);
        }
        let mut actions = vec![self.selection_changed(), Action::RenderNeeded];

        // Shift-click that toggled the block off: nothing to drag.
        if !self.ui.selection.contains(&id) {
            return actions;
        }
        let Some(orig) = self.doc.display_rect(&id, self.ui.view_mode) else {
            return actions;
        };
        self.doc.begin_offset(&id, self.ui.selection.ids().to_vec());
        self.input = InputState::DraggingBlocks { lead: id, start: pt, orig, moved: false };
        actions.push(Action::SetCursor(CURSOR_MOVE.to_owned()));
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let pt = self.camera.screen_to_canvas(screen_pt);
        let view = self.ui.view_mode;
        if self.input.is_idle() {
            return vec![Action::SetCursor(self.hover_cursor(pt).to_owned())];
        }

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Selecting { current, .. } => {
                *current = pt;
                vec![Action::RenderNeeded]
            }
            InputState::DraggingBlocks { lead, start, orig, moved } => {
                let delta = pt.delta_from(*start);
                if delta.x == 0.0 && delta.y == 0.0 && !*moved {
                    return Vec::new();
                }
                *moved = true;

                let moving = self.ui.selection.ids();
                let siblings = self
                    .doc
                    .blocks()
                    .iter()
                    .filter(|b| !moving.contains(&b.id))
                    .map(|b| (b.id.as_str(), b.rect(view)));
                let snap = calculate_snap(lead, orig.translated(delta), siblings);
                let snapped = snap.apply(orig.translated(delta));

                let lead_delta = Point::new(snapped.x - orig.x, snapped.y - orig.y);
                self.doc.set_offset(lead_delta, delta);
                self.ui.snap_lines = snap.lines;
                vec![Action::RenderNeeded]
            }
            InputState::ResizingBlock { id, handle, start, orig } => {
                let delta = pt.delta_from(*start);
                let width = if handle.resizes_width() { orig.width + delta.x } else { orig.width };
                let height = if handle.resizes_height() { orig.height + delta.y } else { orig.height };
                let candidate = Rect::new(orig.x, orig.y, width.max(MIN_BLOCK_SIZE), height.max(MIN_BLOCK_SIZE));

                let siblings = self.doc.blocks().iter().map(|b| (b.id.as_str(), b.rect(view)));
                let snap = snap_resize(id, candidate, siblings, handle.resizes_width(), handle.resizes_height());
                self.doc.set_live_size(snap.width, snap.height);
                self.ui.snap_lines = snap.lines;
                vec![Action::RenderNeeded]
            }
            InputState::ResizingCanvas { start_y, orig_height } => {
                let height = *orig_height + self.camera.screen_dist_to_canvas(screen_pt.y - *start_y);
                self.resize_canvas(height)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let view = self.ui.view_mode;
        self.ui.snap_lines.clear();

        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Selecting { start, .. } => {
                let marquee = Rect::from_corners(start, self.camera.screen_to_canvas(screen_pt));
                let hits: Vec<BlockId> = self
                    .doc
                    .blocks()
                    .iter()
                    .filter(|b| b.rect(view).intersects(&marquee))
                    .map(|b| b.id.clone())
                    .collect();
                if hits.is_empty() {
                    return vec![Action::RenderNeeded];
                }
                self.ui.selection.extend(hits);
                vec![self.selection_changed(), Action::RenderNeeded]
            }
            InputState::DraggingBlocks { moved: false, .. } => {
                self.doc.cancel_transient();
                vec![Action::SetCursor(CURSOR_DEFAULT.to_owned())]
            }
            InputState::DraggingBlocks { .. } | InputState::ResizingBlock { .. } => {
                let written = self.doc.commit_transient(view);
                log::debug!("committed gesture on {} blocks", written.len());
                let mut actions = self.updated(&written);
                actions.extend(self.grow_to_fit());
                actions.push(Action::SetCursor(CURSOR_DEFAULT.to_owned()));
                actions
            }
            InputState::ResizingCanvas { .. } => {
                log::debug!("canvas height set to {}", self.canvas_height);
                vec![Action::SetCursor(CURSOR_DEFAULT.to_owned())]
            }
        }
    }

    /// Double-click on a text block asks the host to open its editor.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        let pt = self.camera.screen_to_canvas(screen_pt);
        let view = self.ui.view_mode;
        let Hit::Body { id } = hit_test(pt, &self.doc, &self.camera, &self.ui.selection, view, self.canvas_height)
        else {
            return Vec::new();
        };
        match self.doc.get(&id) {
            Some(block) if block.kind == BlockKind::Text => {
                vec![Action::EditContentRequested { id, content: block.content.clone() }]
            }
            _ => Vec::new(),
        }
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" if !self.input.is_idle() => self.cancel_gesture(),
            "Escape" => self.clear_selection(),
            "g" | "G" if modifiers.command() && modifiers.shift => self.ungroup_selected(),
            "g" | "G" if modifiers.command() => self.group_selected(),
            _ => Vec::new(),
        }
    }

    /// Abandon the gesture in progress, discarding its live geometry.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => return actions,
            InputState::ResizingCanvas { orig_height, .. } if orig_height != self.canvas_height => {
                self.canvas_height = orig_height;
                actions.push(Action::CanvasHeightChanged(orig_height));
            }
            _ => {}
        }
        self.doc.cancel_transient();
        self.ui.snap_lines.clear();
        actions.push(Action::SetCursor(CURSOR_DEFAULT.to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// Selected ids, primary last.
    #[must_use]
    pub fn selection(&self) -> &[BlockId] {
        self.ui.selection.ids()
    }

    #[must_use]
    pub fn primary_block(&self) -> Option<&Block> {
        self.ui.selection.primary().and_then(|id| self.doc.get(id))
    }

    #[must_use]
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.doc.get(id)
    }

    /// The block's style as seen in the current view.
    #[must_use]
    pub fn effective_style(&self, id: &str) -> Option<BlockStyle> {
        self.doc.get(id).map(|b| b.effective_style(self.ui.view_mode))
    }

    /// Where a block is drawn right now, including any live gesture.
    #[must_use]
    pub fn display_rect(&self, id: &str) -> Option<Rect> {
        self.doc.display_rect(id, self.ui.view_mode)
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.ui.view_mode
    }

    #[must_use]
    pub fn canvas_width(&self) -> f64 {
        match self.ui.view_mode {
            ViewMode::Desktop => DESKTOP_CANVAS_WIDTH,
            ViewMode::Mobile => MOBILE_CANVAS_WIDTH,
        }
    }

    #[must_use]
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    #[must_use]
    pub fn snap_lines(&self) -> &[SnapLine] {
        &self.ui.snap_lines
    }

    #[must_use]
    pub fn marquee(&self) -> Option<Rect> {
        self.input.marquee()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    // --- Helpers ---

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged(self.ui.selection.ids().to_vec())
    }

    /// `BlockUpdated` for each id that still exists, then a redraw.
    fn updated(&self, ids: &[BlockId]) -> Vec<Action> {
        let mut actions: Vec<Action> =
            ids.iter().filter_map(|id| self.doc.get(id)).cloned().map(Action::BlockUpdated).collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Grow (never shrink) the canvas so the lowest block keeps a margin
    /// below it.
    fn grow_to_fit(&mut self) -> Option<Action> {
        let needed = self.doc.lowest_bottom(self.ui.view_mode)? + CANVAS_GROW_MARGIN;
        if needed <= self.canvas_height {
            return None;
        }
        self.canvas_height = needed;
        Some(Action::CanvasHeightChanged(needed))
    }

    fn hover_cursor(&self, pt: Point) -> &'static str {
        match hit_test(pt, &self.doc, &self.camera, &self.ui.selection, self.ui.view_mode, self.canvas_height) {
            Hit::Handle { handle, .. } => handle.cursor(),
            Hit::CanvasHeight => CURSOR_CANVAS_RESIZE,
            Hit::Body { .. } => CURSOR_MOVE,
            Hit::Canvas => CURSOR_DEFAULT,
        }
    }
}
