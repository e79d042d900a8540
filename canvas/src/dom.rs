//! Browser text measurement for auto-stack.
//!
//! Text blocks are laid out in an off-screen container at the mobile
//! content width with the block's mobile font size, and the rendered height
//! is read back. Media blocks never touch the DOM. The container is removed
//! when the measurer is dropped, whether or not planning finished.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::autostack::{EstimateMeasure, Measure, media_height, mobile_font_size};
use crate::consts::{MOBILE_CONTENT_WIDTH, TEXT_LINE_HEIGHT, TEXT_PADDING};
use crate::doc::{Block, BlockKind};
use crate::markup::Markup;

pub struct DomMeasure {
    document: Document,
    container: HtmlElement,
}

impl DomMeasure {
    /// Attach a hidden measuring container to the document body.
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let container: HtmlElement = document.create_element("div")?.dyn_into()?;
        let style = container.style();
        style.set_property("position", "fixed")?;
        style.set_property("left", "-10000px")?;
        style.set_property("top", "0")?;
        style.set_property("visibility", "hidden")?;
        style.set_property("width", &format!("{MOBILE_CONTENT_WIDTH}px"))?;
        body.append_child(&container)?;
        Ok(Self { document, container })
    }

    fn measure_text(&self, block: &Block) -> Result<f64, JsValue> {
        let wrapper: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        let style = wrapper.style();
        style.set_property("width", &format!("{MOBILE_CONTENT_WIDTH}px"))?;
        style.set_property("box-sizing", "border-box")?;
        style.set_property("padding", &format!("{TEXT_PADDING}px"))?;
        style.set_property("line-height", &TEXT_LINE_HEIGHT.to_string())?;
        style.set_property("font-size", &format!("{}px", mobile_font_size(block)))?;
        style.set_property("white-space", "pre-wrap")?;
        wrapper.set_inner_html(&Markup::parse(&block.content).to_html());

        self.container.append_child(&wrapper)?;
        let height = f64::from(wrapper.offset_height());
        wrapper.remove();
        Ok(height)
    }
}

impl Measure for DomMeasure {
    fn measure(&mut self, block: &Block) -> f64 {
        if block.kind != BlockKind::Text {
            return media_height(block);
        }
        match self.measure_text(block) {
            Ok(height) => height,
            Err(e) => {
                log::warn!("DOM measurement failed for {}, estimating: {e:?}", block.id);
                EstimateMeasure.measure(block)
            }
        }
    }
}

impl Drop for DomMeasure {
    fn drop(&mut self) {
        self.container.remove();
    }
}
