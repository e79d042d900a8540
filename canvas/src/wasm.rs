//! JavaScript bindings for the page builder.
//!
//! The host owns the DOM: it forwards pointer and key events with
//! canvas-element-relative coordinates and applies the returned actions.
//! Actions and views cross the boundary as JSON strings.

use std::fmt::Display;
use std::sync::Once;

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::camera::{Point, Rect};
use crate::content::PageRecord;
use crate::doc::{BlockId, BlockKind, BlockPatch, ViewMode};
use crate::dom::DomMeasure;
use crate::engine::{Action, EngineCore};
use crate::input::{Button, Key, Modifiers};
use crate::markup::Mark;
use crate::render::render_html;
use crate::snap::SnapLine;

static INIT: Once = Once::new();

fn init_runtime() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            log::debug!("keeping existing logger: {e}");
        }
    });
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

fn actions(actions: &[Action]) -> Result<String, JsValue> {
    to_json(actions)
}

/// Decode a lowercase enum tag such as `"text"` or `"mobile"`.
fn parse_tag<T: serde::de::DeserializeOwned>(tag: &str) -> Result<T, JsValue> {
    serde_json::from_value(Value::String(tag.to_owned())).map_err(js_err)
}

/// Editor state the host UI draws overlays and toolbars from.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorView<'a> {
    view_mode: ViewMode,
    scale: f64,
    canvas_width: f64,
    canvas_height: f64,
    selection: &'a [BlockId],
    snap_lines: &'a [SnapLine],
    marquee: Option<Rect>,
}

#[wasm_bindgen]
pub struct PageBuilder {
    core: EngineCore,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PageBuilder {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        init_runtime();
        Self { core: EngineCore::new() }
    }

    // --- Data ---

    /// Open a content record (its JSON text) in the editor.
    pub fn load(&mut self, record_json: &str) -> Result<(), JsValue> {
        let value: Value = serde_json::from_str(record_json).map_err(js_err)?;
        let record = PageRecord::from_value(&value).map_err(js_err)?;
        self.core.load(&record);
        log::info!("loaded page {} ({} blocks)", record.id, self.core.doc.len());
        Ok(())
    }

    /// `{blocks, canvasHeight}` to save back into the record.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        to_json(&self.core.snapshot())
    }

    #[wasm_bindgen(js_name = blocksJson)]
    pub fn blocks_json(&self) -> Result<String, JsValue> {
        to_json(self.core.doc.blocks())
    }

    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        to_json(&EditorView {
            view_mode: self.core.view_mode(),
            scale: self.core.camera().scale,
            canvas_width: self.core.canvas_width(),
            canvas_height: self.core.canvas_height(),
            selection: self.core.selection(),
            snap_lines: self.core.snap_lines(),
            marquee: self.core.marquee(),
        })
    }

    /// Where a block is drawn right now, as `{x, y, width, height}`.
    #[wasm_bindgen(js_name = displayRectJson)]
    pub fn display_rect_json(&self, id: &str) -> Result<String, JsValue> {
        to_json(&self.core.display_rect(id))
    }

    #[wasm_bindgen(js_name = effectiveStyleJson)]
    pub fn effective_style_json(&self, id: &str) -> Result<String, JsValue> {
        to_json(&self.core.effective_style(id))
    }

    /// Live-site HTML of the current page in the given view.
    #[wasm_bindgen(js_name = previewHtml)]
    pub fn preview_html(&self, view: &str) -> Result<String, JsValue> {
        Ok(render_html(self.core.doc.blocks(), parse_tag(view)?))
    }

    // --- Input events ---

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<String, JsValue> {
        actions(&self.core.on_pointer_down(Point::new(x, y), Button::from_dom(button), Modifiers::from_bits(modifiers)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers: u8) -> Result<String, JsValue> {
        actions(&self.core.on_pointer_move(Point::new(x, y), Modifiers::from_bits(modifiers)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16, modifiers: u8) -> Result<String, JsValue> {
        actions(&self.core.on_pointer_up(Point::new(x, y), Button::from_dom(button), Modifiers::from_bits(modifiers)))
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        actions(&self.core.on_double_click(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: String, modifiers: u8) -> Result<String, JsValue> {
        actions(&self.core.on_key_down(&Key(key), Modifiers::from_bits(modifiers)))
    }

    #[wasm_bindgen(js_name = setScrollTop)]
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.core.set_scroll_top(scroll_top);
    }

    // --- Block operations ---

    /// Add a `"text"`, `"image"` or `"video"` block.
    #[wasm_bindgen(js_name = addBlock)]
    pub fn add_block(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind: BlockKind = parse_tag(kind)?;
        actions(&self.core.add_block(kind))
    }

    pub fn select(&mut self, id: &str, additive: bool) -> Result<String, JsValue> {
        actions(&self.core.select(id, additive))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> Result<String, JsValue> {
        actions(&self.core.clear_selection())
    }

    pub fn group(&mut self) -> Result<String, JsValue> {
        actions(&self.core.group_selected())
    }

    pub fn ungroup(&mut self) -> Result<String, JsValue> {
        actions(&self.core.ungroup_selected())
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<String, JsValue> {
        actions(&self.core.delete_selected())
    }

    /// Apply a camelCase `BlockPatch` JSON to the primary selected block.
    #[wasm_bindgen(js_name = updatePrimary)]
    pub fn update_primary(&mut self, patch_json: &str) -> Result<String, JsValue> {
        let patch: BlockPatch = serde_json::from_str(patch_json).map_err(js_err)?;
        actions(&self.core.update_primary(&patch))
    }

    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, id: &str, content: String) -> Result<String, JsValue> {
        actions(&self.core.set_content(id, content))
    }

    /// Toggle `"bold"`, `"italic"` or `"underline"` over `start..end`.
    #[wasm_bindgen(js_name = formatText)]
    pub fn format_text(&mut self, id: &str, start: usize, end: usize, mark: &str) -> Result<String, JsValue> {
        let mark: Mark = mark.parse().map_err(js_err)?;
        actions(&self.core.format_text(id, start..end, mark))
    }

    #[wasm_bindgen(js_name = replaceMedia)]
    pub fn replace_media(&mut self, id: &str, url: &str) -> Result<String, JsValue> {
        actions(&self.core.replace_media(id, url))
    }

    // --- View ---

    /// Switch to `"desktop"` or `"mobile"` editing.
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&mut self, mode: &str) -> Result<String, JsValue> {
        let mode: ViewMode = parse_tag(mode)?;
        actions(&self.core.set_view_mode(mode))
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) -> Result<String, JsValue> {
        actions(&self.core.set_scale(scale))
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<String, JsValue> {
        actions(&self.core.zoom_in())
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<String, JsValue> {
        actions(&self.core.zoom_out())
    }

    #[wasm_bindgen(js_name = resizeCanvas)]
    pub fn resize_canvas(&mut self, height: f64) -> Result<String, JsValue> {
        actions(&self.core.resize_canvas(height))
    }

    /// Re-flow every block into the mobile column, measuring text in the DOM.
    #[wasm_bindgen(js_name = autoStack)]
    pub fn auto_stack(&mut self) -> Result<String, JsValue> {
        let mut measure = DomMeasure::new()?;
        actions(&self.core.auto_stack(&mut measure))
    }
}
