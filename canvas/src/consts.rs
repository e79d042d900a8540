//! Shared numeric constants for the canvas crate.

// ── Canvas surface ──────────────────────────────────────────────

/// Editable surface width in desktop view, in canvas pixels.
pub const DESKTOP_CANVAS_WIDTH: f64 = 1200.0;

/// Editable surface width in mobile view, in canvas pixels.
pub const MOBILE_CANVAS_WIDTH: f64 = 390.0;

/// Floor for the page's editable height.
pub const MIN_CANVAS_HEIGHT: f64 = 1200.0;

/// Room kept below the lowest block when the canvas auto-grows.
pub const CANVAS_GROW_MARGIN: f64 = 200.0;

/// Height of the bottom-edge drag strip that resizes the canvas, in screen pixels.
pub const CANVAS_HANDLE_HEIGHT_PX: f64 = 24.0;

/// Zoom limits and step for the editor view.
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 1.5;
pub const SCALE_STEP: f64 = 0.1;

// ── Blocks ──────────────────────────────────────────────────────

/// Smallest width or height a resize may produce.
pub const MIN_BLOCK_SIZE: f64 = 50.0;

/// Geometry assumed for a block whose stored width/height is unusable.
pub const FALLBACK_WIDTH: f64 = 200.0;
pub const FALLBACK_HEIGHT: f64 = 100.0;

/// Default size of a freshly added text block.
pub const TEXT_DEFAULT_WIDTH: f64 = 200.0;
pub const TEXT_DEFAULT_HEIGHT: f64 = 100.0;

/// Default size of a freshly added image or video block.
pub const MEDIA_DEFAULT_WIDTH: f64 = 300.0;
pub const MEDIA_DEFAULT_HEIGHT: f64 = 200.0;

/// New blocks spawn at this x, and this far below the visible top edge.
pub const SPAWN_X: f64 = 100.0;
pub const SPAWN_OFFSET_Y: f64 = 100.0;

/// Body text size when a block carries none.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Placeholder content for a new text block.
pub const TEXT_PLACEHOLDER: &str = "Double click to edit";

// ── Snapping ────────────────────────────────────────────────────

/// Maximum distance between two alignment points that still snaps.
pub const SNAP_THRESHOLD: f64 = 15.0;

/// Extra length drawn past both blocks at each end of a guide line.
pub const GUIDE_PADDING: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop around a resize handle's anchor point.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Auto-stack ──────────────────────────────────────────────────

/// Left margin of every stacked block in the mobile column.
pub const MOBILE_LEFT_MARGIN: f64 = 20.0;

/// Width of the mobile content column.
pub const MOBILE_CONTENT_WIDTH: f64 = 350.0;

/// First stacked block's y.
pub const STACK_TOP: f64 = 20.0;

/// Gap after every stacked block.
pub const STACK_GAP: f64 = 20.0;

/// Extra gap after every cluster.
pub const CLUSTER_GAP: f64 = 20.0;

/// Space kept below the stack when the canvas grows to fit it.
pub const STACK_BOTTOM_MARGIN: f64 = 100.0;

/// Clusters wider than this are full-width section dividers. Tunable.
pub const SPANNER_MIN_WIDTH: f64 = 600.0;

/// Clusters whose x differs by more than this sit in different columns. Tunable.
pub const COLUMN_X_TOLERANCE: f64 = 50.0;

/// Height used when a measurement comes back empty.
pub const FALLBACK_MEASURED_HEIGHT: f64 = 100.0;

/// Text layout assumptions shared by the measurers and the renderer.
pub const TEXT_LINE_HEIGHT: f64 = 1.5;
pub const TEXT_PADDING: f64 = 16.0;

/// Average glyph advance as a fraction of the font size, for estimates.
pub const AVG_GLYPH_WIDTH_EM: f64 = 0.5;

// ── Playback ────────────────────────────────────────────────────

/// Viewports narrower than this render mobile geometry.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

/// Padding under the lowest block on the live page.
pub const RENDER_BOTTOM_PADDING: f64 = 100.0;
