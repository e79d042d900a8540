//! Input model: modifier keys, mouse buttons, view mode and the gesture state machine.
//!
//! `Modifiers`, `Button` and `Key` capture the operator's intent at the time
//! of an event. `UiState` is the editor state the host renders from but never
//! persists. `InputState` is the active gesture tracked between pointer-down
//! and pointer-up, carrying what is needed to compute live feedback and the
//! single commit on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Point, Rect};
use crate::doc::{BlockId, ViewMode};
use crate::hit::ResizeHandle;
use crate::selection::Selection;
use crate::snap::SnapLine;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Decode the host's packed modifier mask: 1 shift, 2 ctrl, 4 alt, 8 meta.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self { shift: bits & 1 != 0, ctrl: bits & 2 != 0, alt: bits & 4 != 0, meta: bits & 8 != 0 }
    }

    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"g"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Editor state visible to the host, never persisted.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Which geometry is shown and edited.
    pub view_mode: ViewMode,
    /// Selected blocks, last = primary.
    pub selection: Selection,
    /// Guides to draw for the gesture in progress.
    pub snap_lines: Vec<SnapLine>,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Marquee selection from an empty-canvas press.
    Selecting {
        /// Canvas-space corner where the press started.
        start: Point,
        /// Canvas-space corner under the pointer now.
        current: Point,
    },
    /// One or more selected blocks being moved.
    DraggingBlocks {
        /// The grabbed block; the only one that snaps.
        lead: BlockId,
        /// Canvas-space pointer position at the press.
        start: Point,
        /// Lead block's rectangle at the press.
        orig: Rect,
        /// Whether the pointer has moved since the press.
        moved: bool,
    },
    /// One block being resized from a handle.
    ResizingBlock {
        /// Id of the block being resized.
        id: BlockId,
        /// Which handle is being dragged.
        handle: ResizeHandle,
        /// Canvas-space pointer position at the press.
        start: Point,
        /// Block rectangle at the press.
        orig: Rect,
    },
    /// The bottom canvas handle being dragged.
    ResizingCanvas {
        /// Screen-space pointer y at the press.
        start_y: f64,
        /// Canvas height at the press.
        orig_height: f64,
    },
}

impl InputState {
    /// The live marquee rectangle, if a marquee is in progress.
    #[must_use]
    pub fn marquee(&self) -> Option<Rect> {
        match self {
            Self::Selecting { start, current } => Some(Rect::from_corners(*start, *current)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
