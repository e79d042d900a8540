//! Playback of a saved page on the live site.
//!
//! The editor canvas and the public page must agree pixel for pixel, so the
//! live renderer is a pure function of the saved blocks and the viewport
//! width: pick desktop or mobile geometry, paint in `zIndex` order, and size
//! the page to the lowest block.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::Rect;
use crate::consts::{
    DESKTOP_CANVAS_WIDTH, MOBILE_BREAKPOINT_PX, MOBILE_CANVAS_WIDTH, RENDER_BOTTOM_PADDING, TEXT_LINE_HEIGHT,
    TEXT_PADDING,
};
use crate::doc::{Block, BlockKind, BlockStyle, ViewMode};
use crate::markup::{Markup, escape_attr};

/// Geometry set for a viewport of the given CSS width.
#[must_use]
pub fn view_for_width(viewport_width: f64) -> ViewMode {
    if viewport_width < MOBILE_BREAKPOINT_PX { ViewMode::Mobile } else { ViewMode::Desktop }
}

/// One block positioned for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub block: &'a Block,
    pub rect: Rect,
    /// Style as seen in the rendered view.
    pub style: BlockStyle,
}

/// Blocks in paint order (ascending `zIndex`, ties in array order) with
/// their geometry in `view`.
#[must_use]
pub fn layout(blocks: &[Block], view: ViewMode) -> Vec<Placement<'_>> {
    let mut placements: Vec<Placement<'_>> = blocks
        .iter()
        .map(|block| Placement { block, rect: block.rect(view), style: block.effective_style(view) })
        .collect();
    placements.sort_by_key(|p| p.style.z_index);
    placements
}

/// Page height: the lowest block bottom plus bottom padding.
#[must_use]
pub fn content_height(blocks: &[Block], view: ViewMode) -> f64 {
    let bottom = blocks.iter().map(|b| b.rect(view).bottom()).fold(0.0, f64::max);
    bottom + RENDER_BOTTOM_PADDING
}

/// Render a page as a self-contained HTML fragment. An empty page renders
/// as an empty string.
#[must_use]
pub fn render_html(blocks: &[Block], view: ViewMode) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let max_width = match view {
        ViewMode::Desktop => DESKTOP_CANVAS_WIDTH,
        ViewMode::Mobile => MOBILE_CANVAS_WIDTH,
    };
    let mut html = format!(
        "<div class=\"page-canvas\" style=\"position:relative;width:100%;max-width:{max_width}px;height:{}px;margin:0 auto;overflow:hidden\">",
        content_height(blocks, view)
    );
    for placement in layout(blocks, view) {
        render_block(&mut html, &placement);
    }
    html.push_str("</div>");
    html
}

fn render_block(html: &mut String, placement: &Placement<'_>) {
    let Placement { block, rect, style } = placement;
    let mut css = format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};overflow:hidden",
        rect.x, rect.y, rect.width, rect.height, style.z_index
    );
    if let Some(bg) = &style.background_color {
        push_css(&mut css, "background-color", bg);
    }
    if let Some(radius) = style.border_radius {
        push_css(&mut css, "border-radius", &format!("{radius}px"));
    }
    if let Some(shadow) = &style.box_shadow {
        push_css(&mut css, "box-shadow", shadow);
    }
    if let Some(opacity) = style.opacity {
        push_css(&mut css, "opacity", &opacity.to_string());
    }

    html.push_str("<div class=\"page-block\" data-block-id=\"");
    html.push_str(&escape_attr(&block.id));
    html.push_str("\" style=\"");
    html.push_str(&escape_attr(&css));
    html.push_str("\">");

    match block.kind {
        BlockKind::Text => {
            let mut inner = format!(
                "width:100%;height:100%;box-sizing:border-box;padding:{TEXT_PADDING}px;line-height:{TEXT_LINE_HEIGHT};white-space:pre-wrap"
            );
            if let Some(size) = style.font_size {
                push_css(&mut inner, "font-size", &format!("{size}px"));
            }
            if let Some(color) = &style.color {
                push_css(&mut inner, "color", color);
            }
            if let Some(align) = style.text_align {
                push_css(&mut inner, "text-align", align.as_str());
            }
            html.push_str("<div style=\"");
            html.push_str(&escape_attr(&inner));
            html.push_str("\">");
            html.push_str(&Markup::parse(&block.content).to_html());
            html.push_str("</div>");
        }
        BlockKind::Image if !block.content.is_empty() => {
            let fit = style.object_fit.map_or("cover", |f| f.as_str());
            let position = style.object_position.as_deref().map_or("center", css_value);
            html.push_str("<img src=\"");
            html.push_str(&escape_attr(&block.content));
            html.push_str("\" alt=\"\" style=\"");
            html.push_str(&escape_attr(&format!(
                "width:100%;height:100%;object-fit:{fit};object-position:{position}"
            )));
            html.push_str("\">");
        }
        BlockKind::Video if !block.content.is_empty() => {
            html.push_str("<video src=\"");
            html.push_str(&escape_attr(&block.content));
            html.push_str("\" controls style=\"width:100%;height:100%;object-fit:cover\"></video>");
        }
        BlockKind::Image | BlockKind::Video => {}
    }
    html.push_str("</div>");
}

fn push_css(css: &mut String, property: &str, value: &str) {
    let value = css_value(value);
    if value.is_empty() {
        return;
    }
    css.push(';');
    css.push_str(property);
    css.push(':');
    css.push_str(value);
}

/// A stored style value cut down to a single declaration value: everything
/// from the first `;`, `{` or `}` on is dropped.
fn css_value(value: &str) -> &str {
    let end = value.find([';', '{', '}']).unwrap_or(value.len());
    value[..end].trim()
}
