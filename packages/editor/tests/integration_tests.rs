//! Integration tests for the editing engine: drop scenarios, deletion,
//! slider clamping and duplication, driven through `EditorContext`.

use pagecraft_editor::{
    Command, DropTarget, EditorConfig, EditorContext, ErrorKind, IdGenerator, NodeId, NodeKind, NoLayout, Tab,
    WidgetRegistry,
};
use serde_json::json;
use std::collections::HashMap;

fn editor() -> EditorContext {
    EditorContext::with_id_generator(
        WidgetRegistry::with_builtins().unwrap(),
        EditorConfig::default(),
        IdGenerator::from_seed("it"),
    )
}

fn drop_widget(editor: &mut EditorContext, type_id: &str, target: DropTarget) -> anyhow::Result<NodeId> {
    editor.drag_start(type_id)?;
    Ok(editor.drop(&target, 0.0, &NoLayout)?)
}

/// Drop `text` onto the empty canvas; returns (container, column, text)
fn scenario_a(editor: &mut EditorContext) -> anyhow::Result<(NodeId, NodeId, NodeId)> {
    let text = drop_widget(editor, "text", DropTarget::Canvas)?;
    let path = editor.tree().find_path(&text)?;
    Ok((path[0].clone(), path[1].clone(), text))
}

#[test]
fn scenario_a_drop_on_empty_canvas() -> anyhow::Result<()> {
    let mut editor = editor();
    let (container, column, text) = scenario_a(&mut editor)?;

    let tree = editor.tree();
    assert_eq!(tree.roots(), &[container.clone()]);
    assert_eq!(tree.node(&container)?.kind(), &NodeKind::Container);
    assert_eq!(tree.node(&container)?.children(), &[column.clone()]);
    assert_eq!(tree.node(&column)?.kind(), &NodeKind::Column);
    assert_eq!(tree.node(&column)?.children(), &[text.clone()]);
    assert_eq!(tree.node(&text)?.kind(), &NodeKind::widget("text"));

    let defaults = editor.registry().default_settings_for("text")?;
    assert_eq!(tree.node(&text)?.settings, defaults);
    assert!(tree.validate().is_ok());
    Ok(())
}

#[test]
fn scenario_b_drop_on_existing_container() -> anyhow::Result<()> {
    let mut editor = editor();
    let (container, column, text) = scenario_a(&mut editor)?;

    let button = drop_widget(&mut editor, "button", DropTarget::Container(container.clone()))?;

    let tree = editor.tree();
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.node(&container)?.children(), &[column.clone()]);
    assert_eq!(tree.node(&column)?.children(), &[text, button]);
    Ok(())
}

#[test]
fn scenario_c_delete_until_placeholder() -> anyhow::Result<()> {
    let mut editor = editor();
    let (container, column, text) = scenario_a(&mut editor)?;
    let button = drop_widget(&mut editor, "button", DropTarget::Container(container))?;

    editor.delete(&text)?;
    assert_eq!(editor.tree().node(&column)?.children(), &[button.clone()]);
    assert!(!editor.tree().shows_placeholder(&column));
    assert!(!editor.canvas().find(&column).unwrap().shows_placeholder());

    editor.delete(&button)?;
    assert!(editor.tree().node(&column)?.children().is_empty());
    assert!(editor.tree().shows_placeholder(&column));
    assert!(editor.canvas().find(&column).unwrap().shows_placeholder());
    assert!(editor.subtree_html(&column).unwrap().contains("Drag widget here"));

    // The placeholder is never a node
    assert_eq!(editor.tree().len(), 2);
    Ok(())
}

#[test]
fn scenario_d_slider_clamps_to_range() -> anyhow::Result<()> {
    let mut editor = editor();
    let spacer = drop_widget(&mut editor, "spacer", DropTarget::Canvas)?;

    assert!(editor.update_setting(&spacer, "space", &json!(10_000))?);
    assert_eq!(editor.tree().node(&spacer)?.settings["space"], json!(600));
    assert!(editor.subtree_html(&spacer).unwrap().contains("height: 600px;"));

    editor.update_setting(&spacer, "space", &json!(-5))?;
    assert_eq!(editor.tree().node(&spacer)?.settings["space"], json!(0));
    Ok(())
}

#[test]
fn scenario_e_duplicate_widget() -> anyhow::Result<()> {
    let mut editor = editor();
    let (_, column, text) = scenario_a(&mut editor)?;

    let clone = editor.duplicate(&text)?;
    assert_ne!(clone, text);
    assert_eq!(editor.tree().node(&column)?.children(), &[text.clone(), clone.clone()]);
    assert_eq!(
        editor.tree().node(&clone)?.settings,
        editor.tree().node(&text)?.settings
    );

    editor.update_setting(&clone, "content", &json!("Only the clone"))?;
    assert_ne!(editor.tree().node(&text)?.settings["content"], json!("Only the clone"));
    assert!(editor.subtree_html(&clone).unwrap().contains("Only the clone"));
    assert!(!editor.subtree_html(&text).unwrap().contains("Only the clone"));
    Ok(())
}

#[test]
fn test_duplicate_container_remaps_every_node() -> anyhow::Result<()> {
    let mut editor = editor();
    let (container, _, _) = scenario_a(&mut editor)?;

    let clone = editor.duplicate(&container)?;
    assert_eq!(editor.tree().roots(), &[container.clone(), clone.clone()]);

    let originals = editor.tree().descendants(&container);
    let copies = editor.tree().descendants(&clone);
    assert_eq!(originals.len(), copies.len());
    for id in &copies {
        assert!(!originals.contains(id));
    }

    // Canvas toolbar hooks point at the new ids
    let html = editor.subtree_html(&clone).unwrap();
    for id in &copies {
        assert!(html.contains(&format!("data-node-id=\"{}\"", id)));
    }
    Ok(())
}

#[test]
fn test_pointer_y_orders_top_level_containers() -> anyhow::Result<()> {
    let mut editor = editor();
    let first = drop_widget(&mut editor, "heading", DropTarget::Canvas)?;
    let second = drop_widget(&mut editor, "text", DropTarget::Canvas)?;
    let first_root = editor.tree().find_path(&first)?[0].clone();
    let second_root = editor.tree().find_path(&second)?[0].clone();
    assert_eq!(editor.tree().roots(), &[first_root.clone(), second_root.clone()]);

    let mut offsets = HashMap::new();
    offsets.insert(first_root.clone(), 0.0);
    offsets.insert(second_root.clone(), 200.0);

    editor.drag_start("button")?;
    let button = editor.drop(&DropTarget::Canvas, 150.0, &offsets)?;
    let button_root = editor.tree().find_path(&button)?[0].clone();

    assert_eq!(editor.tree().roots(), &[first_root, button_root, second_root]);
    assert_eq!(editor.canvas().roots()[1].node_id, editor.tree().roots()[1]);
    Ok(())
}

#[test]
fn test_unknown_payload_leaves_document_untouched() -> anyhow::Result<()> {
    let mut editor = editor();
    scenario_a(&mut editor)?;
    let before = editor.export_json(false)?;

    editor.drag_start("carousel")?;
    let err = editor.drop(&DropTarget::Canvas, 0.0, &NoLayout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(editor.export_json(false)?, before);
    assert_eq!(editor.history().undo_levels(), 1);
    Ok(())
}

#[test]
fn test_cancelled_drag_changes_nothing() -> anyhow::Result<()> {
    let mut editor = editor();
    editor.drag_start("text")?;
    editor.drag_over(DropTarget::Canvas);
    editor.drag_leave();
    assert!(editor.drag_end());

    assert!(editor.tree().is_empty());
    assert!(!editor.history().can_undo());
    Ok(())
}

#[test]
fn test_inspector_follows_conditions() -> anyhow::Result<()> {
    let mut editor = editor();
    let image = drop_widget(&mut editor, "image", DropTarget::Canvas)?;

    let panel = editor.select(&image)?;
    assert_eq!(panel.active_tab, Tab::Content);
    assert!(panel.field("caption").is_none());

    editor.update_setting(&image, "caption_source", &json!("custom"))?;
    editor.update_setting(&image, "caption", &json!("A caption"))?;
    let panel = editor.inspector()?.unwrap();
    assert_eq!(panel.field("caption").unwrap().current_value, json!("A caption"));
    assert!(editor.subtree_html(&image).unwrap().contains("A caption"));

    // Hiding the control keeps the stored value but stops applying it
    editor.update_setting(&image, "caption_source", &json!("none"))?;
    assert!(editor.inspector()?.unwrap().field("caption").is_none());
    assert_eq!(editor.tree().node(&image)?.settings["caption"], json!("A caption"));
    assert!(!editor.subtree_html(&image).unwrap().contains("A caption"));
    Ok(())
}

#[test]
fn test_dispatch_round_trip_through_json_commands() -> anyhow::Result<()> {
    let mut editor = editor();
    let commands = [
        json!({ "type": "drag_start", "payload": "heading" }),
        json!({ "type": "drop", "target": { "kind": "canvas" }, "pointer_y": 0.0 }),
    ];
    let mut created = None;
    for command in commands {
        let outcome = editor.dispatch(serde_json::from_value::<Command>(command)?);
        assert!(outcome.is_ok(), "{:?}", outcome.error);
        created = outcome.created.or(created);
    }
    let heading = created.unwrap();

    let outcome = editor.dispatch(serde_json::from_value(json!({
        "type": "update_setting",
        "node_id": heading.as_str(),
        "control": "header_size",
        "value": "h7"
    }))?);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Validation));
    assert!(editor.field_error(&heading, "header_size").is_some());

    let outcome = editor.dispatch(Command::Undo);
    assert!(outcome.changed);
    assert!(editor.tree().is_empty());
    assert_eq!(outcome.selection, None);

    let outcome = editor.dispatch(Command::Redo);
    assert!(outcome.changed);
    assert!(editor.tree().contains(&heading));
    Ok(())
}

#[test]
fn test_move_widget_into_nested_container() -> anyhow::Result<()> {
    let mut editor = editor();
    let (_, column, text) = scenario_a(&mut editor)?;
    let template = json!({
        "id": "nested",
        "kind": "container",
        "children": [{ "id": "nested-col", "kind": "column" }]
    });
    let nested = editor.insert_template(&template.to_string(), Some(&column), None)?[0].clone();
    let nested_column = editor.tree().node(&nested)?.children()[0].clone();

    editor.move_node(&text, Some(&nested_column), 0)?;
    assert_eq!(editor.tree().node(&text)?.parent(), Some(&nested_column));
    assert!(editor.tree().validate().is_ok());

    // A container cannot go inside its own column
    let err = editor.move_node(&nested, Some(&nested_column), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    Ok(())
}

#[test]
fn test_config_controls_history_bound_and_chrome() -> anyhow::Result<()> {
    let config = EditorConfig::from_json(r#"{ "historyLimit": 2, "placeholderLabel": "Drop here" }"#)?;
    let mut editor = EditorContext::with_id_generator(
        WidgetRegistry::with_builtins()?,
        config,
        IdGenerator::from_seed("cfg"),
    );

    let spacer = drop_widget(&mut editor, "spacer", DropTarget::Canvas)?;
    for space in [10, 20, 30, 40] {
        editor.update_setting(&spacer, "space", &json!(space))?;
    }
    assert_eq!(editor.history().undo_levels(), 2);

    let column = editor.tree().node(&spacer)?.parent().cloned().unwrap();
    editor.delete(&spacer)?;
    assert!(editor.subtree_html(&column).unwrap().contains("Drop here"));
    Ok(())
}
