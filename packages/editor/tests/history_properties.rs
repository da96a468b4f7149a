//! Property sweeps over seeded random editing sessions
//!
//! Each session applies a random mix of drops, edits, duplications,
//! deletions, moves and undo/redo, checking after every step that:
//! - the tree satisfies every structural invariant
//! - the incrementally patched canvas equals a full re-render
//! - undo restores the pre-mutation state exactly, and redo mirrors it

use pagecraft_editor::{
    DropTarget, EditorConfig, EditorContext, IdGenerator, NodeId, NodeKind, NoLayout, RenderEngine, RenderOptions,
    WidgetRegistry,
};
use pagecraft_schema::{ControlKind, ControlSpec};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::collections::HashSet;

const WIDGETS: [&str; 7] = ["heading", "text", "button", "image", "divider", "spacer", "video"];

fn editor(seed: u64) -> EditorContext {
    EditorContext::with_id_generator(
        WidgetRegistry::with_builtins().unwrap(),
        EditorConfig {
            history_limit: 0,
            ..EditorConfig::default()
        },
        IdGenerator::from_seed(format!("s{}", seed)),
    )
}

fn nodes_of(editor: &EditorContext, kind: fn(&NodeKind) -> bool) -> Vec<NodeId> {
    editor
        .tree()
        .walk()
        .into_iter()
        .filter(|node| kind(node.kind()))
        .map(|node| node.id().clone())
        .collect()
}

fn random_target(editor: &EditorContext, rng: &mut StdRng) -> DropTarget {
    let containers = nodes_of(editor, |kind| *kind == NodeKind::Container);
    let columns = nodes_of(editor, |kind| *kind == NodeKind::Column);
    match rng.gen_range(0..3) {
        1 if !containers.is_empty() => DropTarget::Container(containers.choose(rng).unwrap().clone()),
        2 if !columns.is_empty() => DropTarget::Column(columns.choose(rng).unwrap().clone()),
        _ => DropTarget::Canvas,
    }
}

/// A value the control accepts, or garbage now and then
fn random_value(editor: &EditorContext, node: &NodeId, rng: &mut StdRng) -> Option<(String, Value)> {
    let kind = editor.tree().node(node).ok()?.kind().clone();
    let schema = editor
        .registry()
        .schema_for(kind.layout_kind(), kind.type_id())
        .ok()?;
    let controls: Vec<_> = schema.controls().collect();
    let control = controls.choose(rng)?;

    let value = if rng.gen_bool(0.1) {
        json!({ "not": "valid" })
    } else {
        sample_value(control, rng)
    };
    Some((control.name.clone(), value))
}

fn sample_value(control: &ControlSpec, rng: &mut StdRng) -> Value {
    let n: u32 = rng.gen_range(0..1000);
    match control.kind {
        ControlKind::Slider => json!(rng.gen_range(-50.0..700.0)),
        ControlKind::Switcher => json!(rng.gen_bool(0.5)),
        ControlKind::Select | ControlKind::Choose => control
            .options()
            .and_then(|options| options.choose(rng))
            .map(|option| json!(option.value))
            .unwrap_or(Value::Null),
        ControlKind::Color => json!(format!("#{:06x}", rng.gen_range(0..0xff_ffff))),
        ControlKind::Url => json!(format!("https://example.com/{}", n)),
        ControlKind::Text | ControlKind::Textarea => json!(format!("text {}", n)),
        ControlKind::Media => json!(format!("https://example.com/{}.png", n)),
        ControlKind::Typography => json!({ "family": "Roboto", "size": n % 72 }),
        ControlKind::Dimensions => json!({ "top": n % 40, "right": 0, "bottom": 0, "left": 0, "unit": "px" }),
        ControlKind::TextShadow => json!({ "color": "#000000", "blur": n % 20, "horizontal": 0, "vertical": 0 }),
    }
}

fn assert_consistent(editor: &EditorContext) {
    editor.tree().validate().unwrap();

    let options = RenderOptions::editor(editor.config());
    let full = RenderEngine::new(editor.registry(), &options)
        .render_document(editor.tree())
        .unwrap();
    assert_eq!(editor.canvas(), &full);

    let ids: HashSet<_> = editor.tree().walk().into_iter().map(|node| node.id().clone()).collect();
    assert_eq!(ids.len(), editor.tree().len());
}

/// One random operation; undo/redo only when `with_history` is set
fn random_step(editor: &mut EditorContext, rng: &mut StdRng, with_history: bool) {
    let all = nodes_of(editor, |_| true);
    let roll = if with_history { rng.gen_range(0..10) } else { rng.gen_range(0..9) };
    match roll {
        0..=3 => {
            let type_id = WIDGETS.choose(rng).unwrap();
            let target = random_target(editor, rng);
            let _ = editor.place_widget(type_id, &target, rng.gen_range(-10.0..500.0), &NoLayout);
        }
        4 | 5 => {
            if let Some(node) = all.choose(rng) {
                if let Some((control, value)) = random_value(editor, node, rng) {
                    let _ = editor.update_setting(node, &control, &value);
                }
            }
        }
        6 => {
            if let Some(node) = all.choose(rng) {
                editor.duplicate(node).unwrap();
            }
        }
        7 => {
            if let Some(node) = all.choose(rng) {
                editor.delete(node).unwrap();
            }
        }
        8 => {
            let widgets = nodes_of(editor, NodeKind::is_widget);
            let columns = nodes_of(editor, |kind| *kind == NodeKind::Column);
            if let (Some(widget), Some(column)) = (widgets.choose(rng), columns.choose(rng)) {
                editor.move_node(widget, Some(column), rng.gen_range(0..4)).unwrap();
            }
        }
        _ => {
            if rng.gen_bool(0.5) {
                editor.undo().unwrap();
            } else {
                editor.redo().unwrap();
            }
        }
    }
}

#[test]
fn test_random_sessions_keep_invariants() {
    for seed in 0..24 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut editor = editor(seed);
        for _ in 0..60 {
            random_step(&mut editor, &mut rng, true);
            assert_consistent(&editor);
        }
    }
}

#[test]
fn test_undo_and_redo_walk_the_recorded_states() {
    for seed in 100..116 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut editor = editor(seed);

        // State after every recorded step, oldest first
        let mut states = vec![editor.export_json(false).unwrap()];
        for _ in 0..40 {
            let levels = editor.history().undo_levels();
            random_step(&mut editor, &mut rng, false);
            let state = editor.export_json(false).unwrap();
            if editor.history().undo_levels() > levels {
                states.push(state);
            } else {
                // Rejected or unchanged operations leave no trace
                assert_eq!(&state, states.last().unwrap());
            }
        }

        for expected in states.iter().rev().skip(1) {
            assert!(editor.undo().unwrap());
            assert_eq!(&editor.export_json(false).unwrap(), expected);
            assert_consistent(&editor);
        }
        assert!(!editor.undo().unwrap());

        for expected in states.iter().skip(1) {
            assert!(editor.redo().unwrap());
            assert_eq!(&editor.export_json(false).unwrap(), expected);
            assert_consistent(&editor);
        }
        assert!(!editor.redo().unwrap());
    }
}

#[test]
fn test_ids_stay_unique_across_undo() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut editor = editor(7);
    let mut seen = HashSet::new();

    for _ in 0..80 {
        random_step(&mut editor, &mut rng, true);
        for node in editor.tree().walk() {
            seen.insert(node.id().clone());
        }
    }

    // Every id ever shown was handed out once; new nodes never reuse one
    editor.place_widget("text", &DropTarget::Canvas, 0.0, &NoLayout).unwrap();
    let fresh: Vec<_> = editor
        .tree()
        .walk()
        .into_iter()
        .map(|node| node.id().clone())
        .filter(|id| !seen.contains(id))
        .collect();
    assert_eq!(fresh.len(), 3);
}
