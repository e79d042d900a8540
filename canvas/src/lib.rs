//! Page builder engine for the studio's content pages.
//!
//! Editors compose a page by placing text, image and video blocks on a
//! fixed-width canvas, once for desktop and optionally again for mobile. This
//! crate owns everything between raw pointer events and the JSON that lands in
//! the content store: gesture handling, snapping, grouping, the mobile
//! auto-stack, and the renderer the live site uses to play a page back.
//!
//! The core is plain Rust and is shared by the browser editor (compiled to
//! WebAssembly, see `wasm`), the content server and the CLI. The host
//! JavaScript layer only wires DOM events to the engine and applies the
//! resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`]: gestures, block operations, actions |
//! | [`doc`] | Block model, lenient decoding and the in-memory store |
//! | [`camera`] | Points, rectangles and the zoom/scroll camera |
//! | [`selection`] | Ordered selection with a primary block |
//! | [`snap`] | Alignment guides and snapping for move and resize |
//! | [`hit`] | Pointer-down routing: handles, canvas strip, block bodies |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`autostack`] | Desktop-to-mobile single column planner |
//! | [`markup`] | Inline rich-text model for text block content |
//! | [`render`] | Live-site playback of a saved page |
//! | [`content`] | Content records and the load / save boundary |
//! | [`consts`] | Shared numeric constants (canvas sizes, thresholds, gaps) |

pub mod autostack;
pub mod camera;
pub mod consts;
pub mod content;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod markup;
pub mod render;
pub mod selection;
pub mod snap;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod wasm;
