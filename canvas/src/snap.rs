//! Alignment guides and snapping for blocks being moved or resized.
//!
//! Every rectangle exposes three points per axis: left / center / right and
//! top / middle / bottom. A moving block is compared against each sibling on
//! five canonical pairs per axis. Any pair within [`SNAP_THRESHOLD`] yields
//! a guide line; the closest pair per axis decides the snapped coordinate.
//!
//! Everything here is a pure function of its inputs and cheap enough to run
//! on every pointer-move.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use serde::Serialize;

use crate::camera::Rect;
use crate::consts::{GUIDE_PADDING, MIN_BLOCK_SIZE, SNAP_THRESHOLD};

/// Direction of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// A line of constant x; aligns horizontally adjacent edges.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

/// A transient alignment guide. `position` is the aligned coordinate;
/// `start`..`end` is its visible extent along the other axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapLine {
    pub orientation: Orientation,
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

/// Guides found for a candidate position plus the per-axis correction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapResult {
    pub lines: Vec<SnapLine>,
    /// Snapped left edge, when some x alignment is within threshold.
    pub x: Option<f64>,
    /// Snapped top edge, when some y alignment is within threshold.
    pub y: Option<f64>,
}

impl SnapResult {
    /// `rect` moved to the snapped coordinates.
    #[must_use]
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect { x: self.x.unwrap_or(rect.x), y: self.y.unwrap_or(rect.y), ..rect }
    }
}

/// Size after resize snapping, plus the guides to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSnap {
    pub lines: Vec<SnapLine>,
    pub width: f64,
    pub height: f64,
}

/// Which point of the active rectangle took part in a comparison. Decides
/// how the aligned target coordinate converts back into a left/top edge.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Start,
    Mid,
    End,
}

impl Anchor {
    fn offset(self, extent: f64) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Mid => extent / 2.0,
            Self::End => extent,
        }
    }
}

/// Start / mid / end of a rectangle along one axis.
fn points(start: f64, extent: f64) -> [f64; 3] {
    [start, start + extent / 2.0, start + extent]
}

/// The five canonical pairs: (active anchor, active index, target index).
const PAIRS: [(Anchor, usize, usize); 5] = [
    (Anchor::Start, 0, 0),
    (Anchor::Start, 0, 2),
    (Anchor::Mid, 1, 1),
    (Anchor::End, 2, 0),
    (Anchor::End, 2, 2),
];

/// Closest alignment found so far on one axis.
struct Best {
    dist: f64,
    edge: Option<f64>,
}

impl Best {
    fn new() -> Self {
        Self { dist: f64::INFINITY, edge: None }
    }
}

/// Compute guides and a snapped position for `active_id` at `rect`.
///
/// `siblings` is every block on the page with its rectangle in the current
/// view; the active block itself is skipped by id. Guides span both blocks'
/// extents on the perpendicular axis, padded by [`GUIDE_PADDING`].
#[must_use]
pub fn calculate_snap<'a, I>(active_id: &str, rect: Rect, siblings: I) -> SnapResult
where
    I: IntoIterator<Item = (&'a str, Rect)>,
{
    let active_x = points(rect.x, rect.width);
    let active_y = points(rect.y, rect.height);
    let mut lines = Vec::new();
    let mut best_x = Best::new();
    let mut best_y = Best::new();

    for (id, target) in siblings {
        if id == active_id {
            continue;
        }
        let target_x = points(target.x, target.width);
        let target_y = points(target.y, target.height);

        for (anchor, a, t) in PAIRS {
            let dist = (active_x[a] - target_x[t]).abs();
            if dist > SNAP_THRESHOLD {
                continue;
            }
            if dist < best_x.dist {
                best_x = Best { dist, edge: Some(target_x[t] - anchor.offset(rect.width)) };
            }
            lines.push(SnapLine {
                orientation: Orientation::Vertical,
                position: target_x[t],
                start: rect.top().min(target.top()) - GUIDE_PADDING,
                end: rect.bottom().max(target.bottom()) + GUIDE_PADDING,
            });
        }

        for (anchor, a, t) in PAIRS {
            let dist = (active_y[a] - target_y[t]).abs();
            if dist > SNAP_THRESHOLD {
                continue;
            }
            if dist < best_y.dist {
                best_y = Best { dist, edge: Some(target_y[t] - anchor.offset(rect.height)) };
            }
            lines.push(SnapLine {
                orientation: Orientation::Horizontal,
                position: target_y[t],
                start: rect.left().min(target.left()) - GUIDE_PADDING,
                end: rect.right().max(target.right()) + GUIDE_PADDING,
            });
        }
    }

    SnapResult { lines, x: best_x.edge, y: best_y.edge }
}

/// Snap the size of a block being resized from its top-left corner.
///
/// When the width changed, the right edge snaps to a vertical guide, or
/// failing that the horizontal center does (doubling the distance from the
/// left edge). Height works the same against bottom, then middle. The result
/// never drops below [`MIN_BLOCK_SIZE`].
#[must_use]
pub fn snap_resize<'a, I>(active_id: &str, rect: Rect, siblings: I, width_changed: bool, height_changed: bool) -> ResizeSnap
where
    I: IntoIterator<Item = (&'a str, Rect)>,
{
    let SnapResult { lines, .. } = calculate_snap(active_id, rect, siblings);
    let mut width = rect.width;
    let mut height = rect.height;

    if width_changed {
        if let Some(line) = find_line(&lines, Orientation::Vertical, rect.right()) {
            width = line - rect.x;
        } else if let Some(line) = find_line(&lines, Orientation::Vertical, rect.center()) {
            width = (line - rect.x) * 2.0;
        }
    }
    if height_changed {
        if let Some(line) = find_line(&lines, Orientation::Horizontal, rect.bottom()) {
            height = line - rect.y;
        } else if let Some(line) = find_line(&lines, Orientation::Horizontal, rect.middle()) {
            height = (line - rect.y) * 2.0;
        }
    }

    ResizeSnap { lines, width: width.max(MIN_BLOCK_SIZE), height: height.max(MIN_BLOCK_SIZE) }
}

/// Resize snapping is strict: an edge exactly at the threshold stays put.
fn find_line(lines: &[SnapLine], orientation: Orientation, near: f64) -> Option<f64> {
    lines
        .iter()
        .find(|l| l.orientation == orientation && (l.position - near).abs() < SNAP_THRESHOLD)
        .map(|l| l.position)
}
