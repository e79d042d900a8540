#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::autostack::EstimateMeasure;
use crate::content::{find_page, merge_page};
use crate::doc::MobileStyle;
use crate::hit::ResizeHandle;
use crate::snap::Orientation;

// =============================================================
// Helpers
// =============================================================

fn make_block(id: &str, x: f64, y: f64, w: f64, h: f64) -> Block {
    Block {
        id: id.to_owned(),
        kind: BlockKind::Text,
        content: String::new(),
        style: BlockStyle { x, y, width: Some(w), height: Some(h), z_index: 1, ..BlockStyle::default() },
        mobile_style: None,
        group_id: None,
    }
}

fn core_with(blocks: Vec<Block>) -> EngineCore {
    let mut core = EngineCore::new();
    core.load_snapshot(blocks, 1200.0);
    core
}

/// Three blocks in a row along the top: a, b, c.
fn row_of_three() -> EngineCore {
    core_with(vec![
        make_block("a", 0.0, 0.0, 100.0, 100.0),
        make_block("b", 200.0, 0.0, 100.0, 100.0),
        make_block("c", 400.0, 0.0, 100.0, 100.0),
    ])
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn shift_modifier() -> Modifiers {
    Modifiers { shift: true, ..Default::default() }
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn click(core: &mut EngineCore, x: f64, y: f64, modifiers: Modifiers) -> Vec<Action> {
    let mut actions = core.on_pointer_down(pt(x, y), Button::Primary, modifiers);
    actions.extend(core.on_pointer_up(pt(x, y), Button::Primary, modifiers));
    actions
}

fn drag(core: &mut EngineCore, from: Point, to: Point, modifiers: Modifiers) -> Vec<Action> {
    let mut actions = core.on_pointer_down(from, Button::Primary, modifiers);
    actions.extend(core.on_pointer_move(to, modifiers));
    actions.extend(core.on_pointer_up(to, Button::Primary, modifiers));
    actions
}

fn selected(core: &EngineCore) -> Vec<&str> {
    core.selection().iter().map(String::as_str).collect()
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

fn has_block_updated(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::BlockUpdated(_)))
}

fn created(actions: &[Action]) -> Block {
    actions
        .iter()
        .find_map(|a| match a {
            Action::BlockCreated(block) => Some(block.clone()),
            _ => None,
        })
        .unwrap()
}

// =============================================================
// EngineCore: construction and loading
// =============================================================

#[test]
fn core_new_defaults() {
    let core = EngineCore::new();
    assert!(core.selection().is_empty());
    assert_eq!(core.canvas_height(), 1200.0);
    assert_eq!(core.view_mode(), ViewMode::Desktop);
    assert_eq!(core.camera().scale, 1.0);
    assert!(core.input.is_idle());
}

#[test]
fn load_snapshot_floors_height_and_clears_selection() {
    let mut core = row_of_three();
    core.select("a", false);
    core.load_snapshot(vec![make_block("z", 0.0, 0.0, 100.0, 100.0)], 800.0);
    assert_eq!(core.canvas_height(), 1200.0);
    assert!(core.selection().is_empty());
    assert!(core.block("a").is_none());
}

#[test]
fn canvas_width_follows_view() {
    let mut core = EngineCore::new();
    assert_eq!(core.canvas_width(), 1200.0);
    core.set_view_mode(ViewMode::Mobile);
    assert_eq!(core.canvas_width(), 390.0);
}

// =============================================================
// Add block
// =============================================================

#[test]
fn add_text_then_image() {
    let mut core = EngineCore::new();
    let text = created(&core.add_block(BlockKind::Text));
    let image = created(&core.add_block(BlockKind::Image));

    assert_eq!(text.style.z_index, 1);
    assert_eq!(text.desktop_rect(), Rect::new(100.0, 100.0, 200.0, 100.0));
    assert_eq!(text.content, "Double click to edit");
    assert_eq!(text.style.color.as_deref(), Some("#000000"));
    assert_eq!(text.style.background_color.as_deref(), Some("transparent"));
    assert_eq!(text.style.opacity, Some(1.0));

    assert_eq!(image.style.z_index, 2);
    assert_eq!(image.desktop_rect(), Rect::new(100.0, 100.0, 300.0, 200.0));
    assert!(image.content.is_empty());

    assert_eq!(core.doc.len(), 2);
    assert_eq!(selected(&core), vec![image.id.as_str()]);
}

#[test]
fn add_block_spawns_below_visible_top_and_grows_canvas() {
    let mut core = EngineCore::new();
    core.set_scale(0.5);
    core.set_scroll_top(500.0);
    let actions = core.add_block(BlockKind::Text);
    let block = created(&actions);
    // 500 / 0.5 + 100
    assert_eq!(block.style.y, 1100.0);
    assert_eq!(block.style.x, 100.0);
    assert!(actions.contains(&Action::CanvasHeightChanged(1400.0)));
    assert_eq!(core.canvas_height(), 1400.0);
}

#[test]
fn add_block_rounds_spawn_y() {
    let mut core = EngineCore::new();
    core.set_scroll_top(250.4);
    let block = created(&core.add_block(BlockKind::Video));
    assert_eq!(block.style.y, 350.0);
}

// =============================================================
// Click selection
// =============================================================

#[test]
fn select_then_shift_click_then_click() {
    let mut core = row_of_three();

    click(&mut core, 50.0, 50.0, no_modifiers());
    assert_eq!(selected(&core), vec!["a"]);

    click(&mut core, 250.0, 50.0, shift_modifier());
    assert_eq!(selected(&core), vec!["a", "b"]);

    let actions = click(&mut core, 450.0, 50.0, no_modifiers());
    assert_eq!(selected(&core), vec!["c"]);
    assert!(actions.contains(&Action::SelectionChanged(vec!["c".to_owned()])));
}

#[test]
fn pressing_selected_block_keeps_multi_selection() {
    let mut core = row_of_three();
    click(&mut core, 50.0, 50.0, no_modifiers());
    click(&mut core, 250.0, 50.0, shift_modifier());

    click(&mut core, 50.0, 50.0, no_modifiers());
    assert_eq!(selected(&core), vec!["b", "a"]);
    assert_eq!(core.primary_block().unwrap().id, "a");
}

#[test]
fn shift_click_selected_block_deselects_without_drag() {
    let mut core = row_of_three();
    click(&mut core, 50.0, 50.0, no_modifiers());
    click(&mut core, 250.0, 50.0, shift_modifier());

    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, shift_modifier());
    assert_eq!(selected(&core), vec!["b"]);
    assert!(core.input.is_idle());
    assert!(!core.doc.has_transient());
}

#[test]
fn click_empty_canvas_clears_unless_shift() {
    let mut core = row_of_three();
    click(&mut core, 50.0, 50.0, no_modifiers());

    click(&mut core, 700.0, 600.0, shift_modifier());
    assert_eq!(selected(&core), vec!["a"]);

    let actions = click(&mut core, 700.0, 600.0, no_modifiers());
    assert!(core.selection().is_empty());
    assert!(actions.contains(&Action::SelectionChanged(Vec::new())));
}

#[test]
fn click_without_move_writes_nothing() {
    let mut core = row_of_three();
    let actions = click(&mut core, 50.0, 50.0, no_modifiers());
    assert!(!has_block_updated(&actions));
    assert!(!core.doc.has_transient());
    assert!(core.input.is_idle());
}

#[test]
fn topmost_block_wins_the_click() {
    let mut below = make_block("below", 0.0, 0.0, 200.0, 200.0);
    below.style.z_index = 1;
    let mut above = make_block("above", 50.0, 50.0, 100.0, 100.0);
    above.style.z_index = 5;
    let mut core = core_with(vec![above, below]);
    click(&mut core, 100.0, 100.0, no_modifiers());
    assert_eq!(selected(&core), vec!["above"]);
}

#[test]
fn non_primary_button_is_ignored() {
    let mut core = row_of_three();
    assert!(core.on_pointer_down(pt(50.0, 50.0), Button::Secondary, no_modifiers()).is_empty());
    assert!(core.on_pointer_down(pt(50.0, 50.0), Button::Middle, no_modifiers()).is_empty());
    assert!(core.selection().is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn pointer_math_divides_by_scale() {
    let mut core = row_of_three();
    core.set_scale(0.5);
    // Screen (125, 25) is canvas (250, 50), inside b.
    click(&mut core, 125.0, 25.0, no_modifiers());
    assert_eq!(selected(&core), vec!["b"]);
}

#[test]
fn select_unknown_id_is_noop() {
    let mut core = row_of_three();
    assert!(core.select("ghost", false).is_empty());
    assert!(core.selection().is_empty());
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn marquee_is_inclusive_and_additive() {
    let mut core = core_with(vec![
        make_block("a", 0.0, 0.0, 100.0, 100.0),
        make_block("b", 200.0, 0.0, 100.0, 100.0),
        make_block("c", 400.0, 400.0, 100.0, 100.0),
    ]);
    click(&mut core, 50.0, 50.0, no_modifiers());

    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, shift_modifier());
    core.on_pointer_move(pt(200.0, 100.0), shift_modifier());
    assert_eq!(core.marquee(), Some(Rect::new(150.0, 100.0, 50.0, 50.0)));

    // The marquee only touches b's bottom-left corner.
    core.on_pointer_up(pt(200.0, 100.0), Button::Primary, shift_modifier());
    assert_eq!(selected(&core), vec!["a", "b"]);
    assert!(core.marquee().is_none());
}

#[test]
fn marquee_without_shift_starts_fresh() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0), make_block("c", 400.0, 400.0, 100.0, 100.0)]);
    click(&mut core, 50.0, 50.0, no_modifiers());

    drag(&mut core, pt(350.0, 350.0), pt(450.0, 450.0), no_modifiers());
    assert_eq!(selected(&core), vec!["c"]);
}

#[test]
fn marquee_uses_current_view_geometry() {
    let mut a = make_block("a", 600.0, 600.0, 100.0, 100.0);
    a.mobile_style = Some(MobileStyle::placed(Rect::new(20.0, 20.0, 350.0, 100.0), None));
    let mut core = core_with(vec![a]);
    core.set_view_mode(ViewMode::Mobile);

    drag(&mut core, pt(0.0, 0.0), pt(30.0, 30.0), no_modifiers());
    assert_eq!(selected(&core), vec!["a"]);
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_snaps_left_edge_to_right_edge() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0), make_block("b", 300.0, 0.0, 100.0, 100.0)]);

    core.on_pointer_down(pt(350.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(158.0, 50.0), no_modifiers());

    // Raw position would be x = 108; b's left snaps onto a's right edge.
    assert_eq!(core.display_rect("b"), Some(Rect::new(100.0, 0.0, 100.0, 100.0)));
    assert!(core.snap_lines().iter().any(|l| l.orientation == Orientation::Vertical && l.position == 100.0));
    assert_eq!(core.block("b").unwrap().style.x, 300.0);

    let actions = core.on_pointer_up(pt(158.0, 50.0), Button::Primary, no_modifiers());
    let b = core.block("b").unwrap();
    assert_eq!((b.style.x, b.style.y), (100.0, 0.0));
    assert!(actions.contains(&Action::BlockUpdated(b.clone())));
    assert!(core.snap_lines().is_empty());
    assert!(!core.doc.has_transient());
}

#[test]
fn followers_move_by_raw_delta() {
    let mut core = core_with(vec![
        make_block("a", 0.0, 0.0, 100.0, 100.0),
        make_block("b", 300.0, 0.0, 100.0, 100.0),
        make_block("c", 600.0, 300.0, 100.0, 100.0),
    ]);
    click(&mut core, 650.0, 350.0, no_modifiers());

    drag(&mut core, pt(350.0, 50.0), pt(158.0, 50.0), shift_modifier());

    assert_eq!(selected(&core), vec!["c", "b"]);
    assert_eq!(core.block("b").unwrap().style.x, 100.0);
    let c = core.block("c").unwrap();
    assert_eq!((c.style.x, c.style.y), (408.0, 300.0));
}

#[test]
fn drag_commit_rounds_to_whole_pixels() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0)]);
    drag(&mut core, pt(50.0, 50.0), pt(80.4, 90.6), no_modifiers());
    let a = core.block("a").unwrap();
    assert_eq!((a.style.x, a.style.y), (30.0, 41.0));
}

#[test]
fn drag_near_bottom_grows_canvas() {
    let mut core = core_with(vec![make_block("a", 0.0, 900.0, 100.0, 100.0)]);
    let actions = drag(&mut core, pt(50.0, 950.0), pt(50.0, 1050.0), no_modifiers());
    assert_eq!(core.block("a").unwrap().style.y, 1000.0);
    assert_eq!(core.canvas_height(), 1300.0);
    assert!(actions.contains(&Action::CanvasHeightChanged(1300.0)));
}

#[test]
fn drag_in_mobile_view_writes_mobile_style() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0)]);
    core.set_view_mode(ViewMode::Mobile);
    drag(&mut core, pt(50.0, 50.0), pt(80.0, 50.0), no_modifiers());

    let a = core.block("a").unwrap();
    assert_eq!(a.style.x, 0.0);
    assert_eq!(a.mobile_rect(), Rect::new(30.0, 0.0, 100.0, 100.0));
}

#[test]
fn escape_cancels_drag() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0), make_block("b", 300.0, 0.0, 100.0, 100.0)]);
    core.on_pointer_down(pt(350.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(158.0, 50.0), no_modifiers());

    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(has_render_needed(&actions));
    assert!(core.input.is_idle());
    assert!(core.snap_lines().is_empty());
    assert_eq!(core.display_rect("b"), Some(Rect::new(300.0, 0.0, 100.0, 100.0)));

    assert!(core.on_pointer_up(pt(158.0, 50.0), Button::Primary, no_modifiers()).is_empty());
    assert_eq!(core.block("b").unwrap().style.x, 300.0);
    // The selection survives the cancel.
    assert_eq!(selected(&core), vec!["b"]);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_never_below_minimum() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0)]);
    click(&mut core, 50.0, 50.0, no_modifiers());

    let down = core.on_pointer_down(pt(100.0, 100.0), Button::Primary, no_modifiers());
    assert!(down.contains(&Action::SetCursor(ResizeHandle::Se.cursor().to_owned())));
    core.on_pointer_move(pt(10.0, 10.0), no_modifiers());
    assert_eq!(core.display_rect("a"), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));

    core.on_pointer_up(pt(10.0, 10.0), Button::Primary, no_modifiers());
    let a = core.block("a").unwrap();
    assert_eq!((a.style.width, a.style.height), (Some(50.0), Some(50.0)));
}

#[test]
fn east_handle_resizes_width_and_snaps() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0), make_block("b", 300.0, 0.0, 200.0, 100.0)]);
    click(&mut core, 50.0, 50.0, no_modifiers());

    core.on_pointer_down(pt(100.0, 50.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::ResizingBlock { handle: ResizeHandle::E, .. }));
    core.on_pointer_move(pt(288.0, 80.0), no_modifiers());
    core.on_pointer_up(pt(288.0, 80.0), Button::Primary, no_modifiers());

    let a = core.block("a").unwrap();
    assert_eq!(a.style.width, Some(300.0));
    assert_eq!(a.style.height, Some(100.0));
}

#[test]
fn handles_only_exist_on_selected_blocks() {
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0)]);
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::DraggingBlocks { .. }));
}

// =============================================================
// Canvas height
// =============================================================

#[test]
fn canvas_handle_drag_is_floored() {
    let mut core = row_of_three();
    let down = core.on_pointer_down(pt(600.0, 1190.0), Button::Primary, no_modifiers());
    assert!(down.contains(&Action::SetCursor("ns-resize".to_owned())));

    let actions = core.on_pointer_move(pt(600.0, 1490.0), no_modifiers());
    assert!(actions.contains(&Action::CanvasHeightChanged(1500.0)));

    core.on_pointer_move(pt(600.0, 500.0), no_modifiers());
    core.on_pointer_up(pt(600.0, 500.0), Button::Primary, no_modifiers());
    assert_eq!(core.canvas_height(), 1200.0);
}

#[test]
fn canvas_handle_drag_respects_scale() {
    let mut core = EngineCore::new();
    core.set_scale(0.5);
    // The strip is 24 screen px: canvas y 1152..1200, screen y 576..600.
    core.on_pointer_down(pt(300.0, 590.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::ResizingCanvas { .. }));
    core.on_pointer_move(pt(300.0, 690.0), no_modifiers());
    assert_eq!(core.canvas_height(), 1400.0);
}

#[test]
fn escape_restores_canvas_height() {
    let mut core = EngineCore::new();
    core.on_pointer_down(pt(600.0, 1190.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(600.0, 1490.0), no_modifiers());
    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(actions.contains(&Action::CanvasHeightChanged(1200.0)));
    assert_eq!(core.canvas_height(), 1200.0);
}

#[test]
fn view_switch_mid_canvas_resize_reports_restored_height() {
    let mut core = EngineCore::new();
    core.on_pointer_down(pt(600.0, 1190.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(600.0, 1490.0), no_modifiers());
    let actions = core.set_view_mode(ViewMode::Mobile);
    assert!(actions.contains(&Action::CanvasHeightChanged(1200.0)));
    assert_eq!(actions.iter().filter(|a| **a == Action::RenderNeeded).count(), 1);
    assert_eq!(core.canvas_height(), 1200.0);
}

#[test]
fn auto_stack_mid_canvas_resize_reports_restored_height() {
    let mut core = EngineCore::new();
    core.on_pointer_down(pt(600.0, 1190.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(600.0, 1490.0), no_modifiers());
    let actions = core.auto_stack(&mut EstimateMeasure);
    assert_eq!(actions.first(), Some(&Action::CanvasHeightChanged(1200.0)));
    assert_eq!(core.canvas_height(), 1200.0);
}

#[test]
fn pointer_down_mid_canvas_resize_reports_restored_height() {
    let mut core = EngineCore::new();
    core.on_pointer_down(pt(600.0, 1190.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(600.0, 1490.0), no_modifiers());
    let actions = core.on_pointer_down(pt(600.0, 300.0), Button::Primary, no_modifiers());
    assert_eq!(actions.first(), Some(&Action::CanvasHeightChanged(1200.0)));
    assert!(matches!(core.input, InputState::Selecting { .. }));
}

#[test]
fn resize_canvas_floors_and_skips_noop() {
    let mut core = EngineCore::new();
    assert!(core.resize_canvas(900.0).is_empty());
    assert_eq!(core.resize_canvas(1800.0), vec![Action::CanvasHeightChanged(1800.0), Action::RenderNeeded]);
    core.resize_canvas(f64::NAN);
    assert_eq!(core.canvas_height(), 1200.0);
}

// =============================================================
// Groups
// =============================================================

#[test]
fn group_needs_two_blocks() {
    let mut core = row_of_three();
    core.select("a", false);
    assert!(core.group_selected().is_empty());
    assert!(core.block("a").unwrap().group_id.is_none());
}

#[test]
fn group_tags_selection_and_regroup_overwrites() {
    let mut core = row_of_three();
    core.select("a", false);
    core.select("b", true);
    let actions = core.group_selected();
    assert!(has_block_updated(&actions));

    let first = core.block("a").unwrap().group_id.clone().unwrap();
    assert!(first.starts_with("group-"));
    assert_eq!(core.block("b").unwrap().group_id.as_ref(), Some(&first));
    assert!(core.block("c").unwrap().group_id.is_none());

    core.select("b", false);
    core.select("c", true);
    core.group_selected();
    let second = core.block("b").unwrap().group_id.clone().unwrap();
    assert_ne!(first, second);
    assert_eq!(core.block("c").unwrap().group_id.as_ref(), Some(&second));
    assert_eq!(core.block("a").unwrap().group_id.as_ref(), Some(&first));
}

#[test]
fn ungroup_clears_selected_tags() {
    let mut core = row_of_three();
    core.select("a", false);
    core.select("b", true);
    core.group_selected();

    core.select("a", false);
    core.ungroup_selected();
    assert!(core.block("a").unwrap().group_id.is_none());
    assert!(core.block("b").unwrap().group_id.is_some());

    assert!(core.ungroup_selected().is_empty());
}

#[test]
fn group_shortcuts() {
    let mut core = row_of_three();
    core.select("a", false);
    core.select("b", true);
    core.on_key_down(&key("g"), ctrl_modifier());
    assert!(core.block("a").unwrap().group_id.is_some());

    let meta_shift = Modifiers { meta: true, shift: true, ..Default::default() };
    core.on_key_down(&key("G"), meta_shift);
    assert!(core.block("a").unwrap().group_id.is_none());
    assert!(core.block("b").unwrap().group_id.is_none());

    // Plain "g" is just a letter.
    assert!(core.on_key_down(&key("g"), no_modifiers()).is_empty());
}

// =============================================================
// Delete / keyboard
// =============================================================

#[test]
fn delete_key_removes_selection() {
    let mut core = row_of_three();
    core.select("c", false);
    core.select("a", true);
    let actions = core.on_key_down(&key("Delete"), no_modifiers());

    assert!(actions.contains(&Action::BlocksDeleted(vec!["a".to_owned(), "c".to_owned()])));
    assert!(core.selection().is_empty());
    assert_eq!(core.doc.len(), 1);
    assert!(core.block("b").is_some());
}

#[test]
fn backspace_with_empty_selection_is_noop() {
    let mut core = row_of_three();
    assert!(core.on_key_down(&key("Backspace"), no_modifiers()).is_empty());
    assert_eq!(core.doc.len(), 3);
}

#[test]
fn escape_when_idle_clears_selection() {
    let mut core = row_of_three();
    core.select("a", false);
    core.on_key_down(&key("Escape"), no_modifiers());
    assert!(core.selection().is_empty());
    assert!(core.on_key_down(&key("Escape"), no_modifiers()).is_empty());
}

// =============================================================
// Inspector edits
// =============================================================

#[test]
fn update_primary_desktop_writes_style() {
    let mut core = row_of_three();
    core.select("a", false);
    let patch = BlockPatch { width: Some(240.0), color: Some("#ff0000".into()), ..BlockPatch::default() };
    let actions = core.update_primary(&patch);
    assert!(has_block_updated(&actions));

    let a = core.block("a").unwrap();
    assert_eq!(a.style.width, Some(240.0));
    assert_eq!(a.style.color.as_deref(), Some("#ff0000"));
    assert!(a.mobile_style.is_none());
}

#[test]
fn update_primary_mobile_writes_mobile_style() {
    let mut core = row_of_three();
    core.select("a", false);
    core.set_view_mode(ViewMode::Mobile);
    let patch = BlockPatch { x: Some(20.0), font_size: Some(14.0), color: Some("#ff0000".into()), ..BlockPatch::default() };
    core.update_primary(&patch);

    let a = core.block("a").unwrap();
    assert_eq!(a.style.x, 0.0);
    assert_eq!(a.style.font_size, None);
    assert_eq!(a.style.color.as_deref(), Some("#ff0000"));
    let mobile = a.mobile_style.as_ref().unwrap();
    assert_eq!(mobile.x, Some(20.0));
    assert_eq!(mobile.font_size, Some(14.0));
    assert_eq!(mobile.width, Some(100.0));

    let effective = core.effective_style("a").unwrap();
    assert_eq!(effective.x, 20.0);
    assert_eq!(effective.font_size, Some(14.0));
}

#[test]
fn update_primary_without_selection_is_noop() {
    let mut core = row_of_three();
    assert!(core.update_primary(&BlockPatch { x: Some(5.0), ..BlockPatch::default() }).is_empty());
}

#[test]
fn update_moving_block_down_grows_canvas() {
    let mut core = row_of_three();
    core.select("a", false);
    core.update_primary(&BlockPatch { y: Some(1500.0), ..BlockPatch::default() });
    assert_eq!(core.canvas_height(), 1800.0);
}

// =============================================================
// Content
// =============================================================

#[test]
fn format_text_toggles_bold() {
    let mut a = make_block("a", 0.0, 0.0, 100.0, 100.0);
    a.content = "Hello world".into();
    let mut core = core_with(vec![a]);

    core.format_text("a", 0..5, Mark::Bold);
    assert_eq!(core.block("a").unwrap().content, "<b>Hello</b> world");
    core.format_text("a", 0..5, Mark::Bold);
    assert_eq!(core.block("a").unwrap().content, "Hello world");
}

#[test]
fn media_source_only_for_media_blocks() {
    let mut image = make_block("img", 200.0, 0.0, 300.0, 200.0);
    image.kind = BlockKind::Image;
    let mut core = core_with(vec![make_block("a", 0.0, 0.0, 100.0, 100.0), image]);

    assert!(core.replace_media("a", "/x.png").is_empty());
    assert!(core.block("a").unwrap().content.is_empty());

    core.replace_media("img", "/media/photo.jpg");
    assert_eq!(core.block("img").unwrap().content, "/media/photo.jpg");
    assert!(core.format_text("img", 0..3, Mark::Italic).is_empty());
}

#[test]
fn double_click_text_requests_editor() {
    let mut a = make_block("a", 0.0, 0.0, 100.0, 100.0);
    a.content = "<i>hi</i>".into();
    let mut video = make_block("v", 200.0, 0.0, 100.0, 100.0);
    video.kind = BlockKind::Video;
    let mut core = core_with(vec![a, video]);

    let actions = core.on_double_click(pt(50.0, 50.0));
    assert_eq!(actions, vec![Action::EditContentRequested { id: "a".into(), content: "<i>hi</i>".into() }]);
    assert!(core.on_double_click(pt(250.0, 50.0)).is_empty());
    assert!(core.on_double_click(pt(700.0, 700.0)).is_empty());
}

#[test]
fn set_content_replaces_markup() {
    let mut core = row_of_three();
    core.set_content("b", "<u>new</u>".into());
    assert_eq!(core.block("b").unwrap().content, "<u>new</u>");
    assert!(core.set_content("ghost", String::new()).is_empty());
}

// =============================================================
// View / hover
// =============================================================

#[test]
fn switching_view_cancels_gesture() {
    let mut core = row_of_three();
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(90.0, 50.0), no_modifiers());

    core.set_view_mode(ViewMode::Mobile);
    assert!(core.input.is_idle());
    assert!(!core.doc.has_transient());
    assert!(core.set_view_mode(ViewMode::Mobile).is_empty());
}

#[test]
fn hover_sets_cursor() {
    let mut core = row_of_three();
    assert_eq!(core.on_pointer_move(pt(50.0, 50.0), no_modifiers()), vec![Action::SetCursor("move".into())]);
    assert_eq!(core.on_pointer_move(pt(700.0, 500.0), no_modifiers()), vec![Action::SetCursor("default".into())]);
    assert_eq!(core.on_pointer_move(pt(700.0, 1195.0), no_modifiers()), vec![Action::SetCursor("ns-resize".into())]);
}

#[test]
fn zoom_steps_are_clamped() {
    let mut core = EngineCore::new();
    for _ in 0..10 {
        core.zoom_in();
    }
    assert_eq!(core.camera().scale, 1.5);
    for _ in 0..20 {
        core.zoom_out();
    }
    assert_eq!(core.camera().scale, 0.5);
}

// =============================================================
// Auto-stack
// =============================================================

#[test]
fn auto_stack_rewrites_mobile_only() {
    let mut core = core_with(vec![
        make_block("hero", 0.0, 0.0, 1000.0, 200.0),
        make_block("left", 50.0, 300.0, 400.0, 100.0),
        make_block("right", 650.0, 300.0, 400.0, 100.0),
    ]);
    let desktop: Vec<BlockStyle> = core.doc.blocks().iter().map(|b| b.style.clone()).collect();

    let actions = core.auto_stack(&mut EstimateMeasure);
    assert_eq!(actions.iter().filter(|a| matches!(a, Action::BlockUpdated(_))).count(), 3);

    for (block, style) in core.doc.blocks().iter().zip(&desktop) {
        assert_eq!(&block.style, style);
        let mobile = block.mobile_style.as_ref().unwrap();
        assert_eq!(mobile.x, Some(20.0));
        assert_eq!(mobile.width, Some(350.0));
    }
    let y = |id: &str| core.block(id).unwrap().mobile_rect().y;
    assert!(y("hero") < y("left"));
    assert!(y("left") < y("right"));

    let before = core.snapshot();
    core.auto_stack(&mut EstimateMeasure);
    assert_eq!(core.snapshot(), before);
}

// =============================================================
// Save / reload
// =============================================================

#[test]
fn snapshot_survives_save_and_reload() {
    let mut core = EngineCore::new();
    core.add_block(BlockKind::Text);
    core.add_block(BlockKind::Image);
    core.add_block(BlockKind::Text);
    let ids = core.doc.blocks().iter().map(|b| b.id.clone()).collect::<Vec<_>>();
    core.select(&ids[0], false);
    core.select(&ids[1], true);
    core.group_selected();
    core.set_view_mode(ViewMode::Mobile);
    core.update_block(&ids[2], &BlockPatch { x: Some(20.0), width: Some(350.0), ..BlockPatch::default() });
    core.format_text(&ids[2], 0..6, Mark::Underline);
    core.resize_canvas(1650.0);

    let snapshot = core.snapshot();
    let mut items = vec![json!({"id": "home", "title": "Home", "slug": "home"})];
    merge_page(&mut items, "home", &snapshot).unwrap();

    let mut reopened = EngineCore::new();
    reopened.load(&find_page(&items, "home").unwrap());
    assert_eq!(reopened.snapshot(), snapshot);
    assert_eq!(items[0]["title"], "Home");
}

#[test]
fn actions_serialize_adjacently_tagged() {
    let actions = vec![
        Action::BlocksDeleted(vec!["a".into()]),
        Action::CanvasHeightChanged(1300.0),
        Action::SetCursor("move".into()),
        Action::RenderNeeded,
    ];
    let value = serde_json::to_value(&actions).unwrap();
    assert_eq!(
        value,
        json!([
            {"type": "blocksDeleted", "data": ["a"]},
            {"type": "canvasHeightChanged", "data": 1300.0},
            {"type": "setCursor", "data": "move"},
            {"type": "renderNeeded"}
        ])
    );
}
