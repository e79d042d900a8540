//! Pointer-down routing: which handle, block or surface is under the cursor.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{CANVAS_HANDLE_HEIGHT_PX, HANDLE_RADIUS_PX};
use crate::doc::{BlockId, DocStore, ViewMode};
use crate::selection::Selection;

/// Resize handle on a selected block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Right edge midpoint; width only.
    E,
    /// Bottom edge midpoint; height only.
    S,
    /// Bottom-right corner; both axes.
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 3] = [ResizeHandle::Se, ResizeHandle::E, ResizeHandle::S];

    #[must_use]
    pub fn resizes_width(self) -> bool {
        matches!(self, Self::E | Self::Se)
    }

    #[must_use]
    pub fn resizes_height(self) -> bool {
        matches!(self, Self::S | Self::Se)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::E => "ew-resize",
            Self::S => "ns-resize",
            Self::Se => "nwse-resize",
        }
    }
}

/// What a pointer-down landed on, in routing priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A resize handle of a selected block.
    Handle { id: BlockId, handle: ResizeHandle },
    /// The canvas-height drag strip along the bottom edge.
    CanvasHeight,
    /// The body of the topmost block under the pointer.
    Body { id: BlockId },
    /// Empty canvas.
    Canvas,
}

/// Route a canvas-space point.
///
/// Handles of selected blocks win over everything, so grabbing a handle
/// never starts a drag; a block body wins over empty canvas, so grabbing a
/// block never starts a marquee. Geometry is read as displayed in `view`.
#[must_use]
pub fn hit_test(
    pt: Point,
    doc: &DocStore,
    camera: &Camera,
    selection: &Selection,
    view: ViewMode,
    canvas_height: f64,
) -> Hit {
    let radius = camera.screen_dist_to_canvas(HANDLE_RADIUS_PX);
    for id in selection.ids().iter().rev() {
        let Some(rect) = doc.display_rect(id, view) else {
            continue;
        };
        for handle in ResizeHandle::ALL {
            let anchor = match handle {
                ResizeHandle::Se => Point::new(rect.right(), rect.bottom()),
                ResizeHandle::E => Point::new(rect.right(), rect.middle()),
                ResizeHandle::S => Point::new(rect.center(), rect.bottom()),
            };
            if (pt.x - anchor.x).abs() <= radius && (pt.y - anchor.y).abs() <= radius {
                return Hit::Handle { id: id.clone(), handle };
            }
        }
    }

    let strip = camera.screen_dist_to_canvas(CANVAS_HANDLE_HEIGHT_PX);
    if pt.y >= canvas_height - strip && pt.y <= canvas_height {
        return Hit::CanvasHeight;
    }

    for block in doc.sorted_blocks().into_iter().rev() {
        if doc.display_rect(&block.id, view).is_some_and(|r| r.contains(pt)) {
            return Hit::Body { id: block.id.clone() };
        }
    }

    Hit::Canvas
}
