//! One-shot responsive re-layout: turn a free-form desktop page into a
//! single mobile column.
//!
//! The planner reads only desktop geometry (plus font sizes), so running it
//! twice yields the same mobile layout. It never touches `style`; every
//! block's `mobileStyle` is overwritten.
//!
//! Steps:
//! 1. Measure each block's height at mobile width through [`Measure`].
//! 2. Cluster blocks by group; ungrouped blocks are singleton clusters.
//! 3. Split clusters into full-width *spanners* and column content, and
//!    bucket the content between consecutive spanners.
//! 4. Order each bucket column by column, top to bottom within a column.
//! 5. Stack everything from the top of the canvas.

#[cfg(test)]
#[path = "autostack_test.rs"]
mod autostack_test;

use crate::consts::{
    AVG_GLYPH_WIDTH_EM, CLUSTER_GAP, COLUMN_X_TOLERANCE, FALLBACK_MEASURED_HEIGHT, MEDIA_DEFAULT_HEIGHT,
    MEDIA_DEFAULT_WIDTH, MOBILE_CONTENT_WIDTH, MOBILE_LEFT_MARGIN, SPANNER_MIN_WIDTH, STACK_BOTTOM_MARGIN,
    STACK_GAP, STACK_TOP, TEXT_LINE_HEIGHT, TEXT_PADDING,
};
use crate::doc::{Block, BlockId, BlockKind, DocStore, MobileStyle, ViewMode};
use crate::markup::Markup;

/// Height source for a block laid out at mobile width.
pub trait Measure {
    /// Rendered height of `block` in a container [`MOBILE_CONTENT_WIDTH`]
    /// pixels wide. Non-positive results are replaced by a fallback.
    fn measure(&mut self, block: &Block) -> f64;
}

/// Font size used when measuring and placing a block on mobile.
#[must_use]
pub fn mobile_font_size(block: &Block) -> f64 {
    block.font_size(ViewMode::Mobile)
}

/// Height of a media block scaled to the mobile width, keeping its desktop
/// aspect ratio. Missing or zero dimensions read as 300×200.
#[must_use]
pub fn media_height(block: &Block) -> f64 {
    let width = block.style.width.filter(|w| *w != 0.0).unwrap_or(MEDIA_DEFAULT_WIDTH);
    let height = block.style.height.filter(|h| *h != 0.0).unwrap_or(MEDIA_DEFAULT_HEIGHT);
    height * (MOBILE_CONTENT_WIDTH / width)
}

/// Measurement without a layout engine: greedy word wrap over an average
/// glyph width. Used headless (CLI, server, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateMeasure;

impl Measure for EstimateMeasure {
    fn measure(&mut self, block: &Block) -> f64 {
        match block.kind {
            BlockKind::Image | BlockKind::Video => media_height(block).round(),
            BlockKind::Text => {
                let font_size = mobile_font_size(block);
                let text_width = MOBILE_CONTENT_WIDTH - 2.0 * TEXT_PADDING;
                let columns = (text_width / (font_size * AVG_GLYPH_WIDTH_EM)).floor().max(1.0);
                let lines: f64 = Markup::parse(&block.content)
                    .lines()
                    .iter()
                    .map(|line| wrapped_line_count(line, columns))
                    .sum();
                (lines * font_size * TEXT_LINE_HEIGHT + 2.0 * TEXT_PADDING).round()
            }
        }
    }
}

/// Number of visual lines a paragraph wraps to at `columns` characters.
#[allow(clippy::cast_precision_loss)]
fn wrapped_line_count(text: &str, columns: f64) -> f64 {
    let mut lines = 1.0;
    let mut used = 0.0;
    for word in text.split_whitespace() {
        let len = word.chars().count() as f64;
        let needed = if used > 0.0 { used + 1.0 + len } else { len };
        if needed <= columns {
            used = needed;
            continue;
        }
        if used > 0.0 {
            lines += 1.0;
        }
        // Words longer than a line break across several.
        let extra = ((len / columns).ceil() - 1.0).max(0.0);
        lines += extra;
        used = len - extra * columns;
    }
    lines
}

/// A unit that stays together: one group, or one ungrouped block.
#[derive(Debug, Clone)]
struct Cluster<'a> {
    members: Vec<&'a Block>,
    x: f64,
    y: f64,
    width: f64,
}

impl<'a> Cluster<'a> {
    fn new(mut members: Vec<&'a Block>) -> Self {
        members.sort_by(|a, b| a.style.y.total_cmp(&b.style.y));
        let x = members.iter().map(|b| b.style.x).fold(f64::INFINITY, f64::min);
        let y = members.iter().map(|b| b.style.y).fold(f64::INFINITY, f64::min);
        let width = members.iter().map(|b| b.desktop_rect().width).fold(f64::NEG_INFINITY, f64::max);
        Self { members, x, y, width }
    }

    fn is_spanner(&self) -> bool {
        self.width > SPANNER_MIN_WIDTH
    }
}

/// Computed mobile layout for a page.
#[derive(Debug, Clone, PartialEq)]
pub struct StackPlan {
    /// New `mobileStyle` per block, in stacking order.
    pub placements: Vec<(BlockId, MobileStyle)>,
    /// Canvas height needed to show the whole stack.
    pub required_height: f64,
}

impl StackPlan {
    /// Overwrite every placed block's `mobileStyle`. Returns the canvas
    /// height after growing it to fit, never shrinking it.
    pub fn apply(&self, doc: &mut DocStore, canvas_height: f64) -> f64 {
        for (id, style) in &self.placements {
            if let Some(block) = doc.get_mut(id) {
                block.mobile_style = Some(style.clone());
            }
        }
        self.required_height.max(canvas_height)
    }
}

/// Plan a mobile stack for `blocks`.
pub fn plan<M: Measure + ?Sized>(blocks: &[Block], measure: &mut M) -> StackPlan {
    let clusters = order_clusters(cluster_blocks(blocks));

    let mut cursor = STACK_TOP;
    let mut placements = Vec::with_capacity(blocks.len());
    for cluster in &clusters {
        for block in &cluster.members {
            let measured = measure.measure(block);
            let height = if measured.is_finite() && measured > 0.0 { measured } else { FALLBACK_MEASURED_HEIGHT };
            let style = MobileStyle {
                x: Some(MOBILE_LEFT_MARGIN),
                y: Some(cursor),
                width: Some(MOBILE_CONTENT_WIDTH),
                height: Some(height),
                font_size: Some(mobile_font_size(block)),
            };
            placements.push((block.id.clone(), style));
            cursor += height + STACK_GAP;
        }
        cursor += CLUSTER_GAP;
    }

    StackPlan { placements, required_height: cursor + STACK_BOTTOM_MARGIN }
}

/// Group blocks into clusters, in order of each cluster's first appearance.
fn cluster_blocks(blocks: &[Block]) -> Vec<Cluster<'_>> {
    let mut clusters = Vec::new();
    let mut seen_groups: Vec<&str> = Vec::new();
    for block in blocks {
        match &block.group_id {
            Some(group) => {
                if seen_groups.contains(&group.as_str()) {
                    continue;
                }
                seen_groups.push(group.as_str());
                let members = blocks.iter().filter(|b| b.group_id.as_ref() == Some(group)).collect();
                clusters.push(Cluster::new(members));
            }
            None => clusters.push(Cluster::new(vec![block])),
        }
    }
    clusters
}

/// Spanners in y order, each preceded by the bucket of content above it.
fn order_clusters(clusters: Vec<Cluster<'_>>) -> Vec<Cluster<'_>> {
    let (mut spanners, content): (Vec<Cluster<'_>>, Vec<Cluster<'_>>) =
        clusters.into_iter().partition(Cluster::is_spanner);
    spanners.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut buckets: Vec<Vec<Cluster<'_>>> = (0..=spanners.len()).map(|_| Vec::new()).collect();
    for cluster in content {
        let index = spanners.iter().position(|s| cluster.y < s.y).unwrap_or(spanners.len());
        buckets[index].push(cluster);
    }

    let mut ordered = Vec::new();
    let mut spanners = spanners.into_iter();
    for bucket in buckets {
        ordered.extend(order_columns(bucket));
        if let Some(spanner) = spanners.next() {
            ordered.push(spanner);
        }
    }
    ordered
}

/// Left-to-right columns, top-to-bottom within each. A cluster joins the
/// current column while its x stays within [`COLUMN_X_TOLERANCE`] of the
/// column's leftmost cluster.
fn order_columns(mut bucket: Vec<Cluster<'_>>) -> Vec<Cluster<'_>> {
    bucket.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut columns: Vec<Vec<Cluster<'_>>> = Vec::new();
    for cluster in bucket {
        match columns.last_mut() {
            Some(column) if column.first().is_some_and(|c| cluster.x - c.x <= COLUMN_X_TOLERANCE) => {
                column.push(cluster);
            }
            _ => columns.push(vec![cluster]),
        }
    }

    columns
        .into_iter()
        .flat_map(|mut column| {
            column.sort_by(|a, b| a.y.total_cmp(&b.y));
            column
        })
        .collect()
}
