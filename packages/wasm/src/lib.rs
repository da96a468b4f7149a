//! Browser bindings. Everything crosses the boundary as JSON strings; the
//! host page owns the DOM and feeds pointer events and measured offsets in.

use pagecraft_editor::{Command, DropTarget, EditorConfig, EditorContext, NodeId};
use pagecraft_export_html::{export_document, ExportOptions};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// An editor session
#[wasm_bindgen]
pub struct Editor {
    inner: EditorContext,
}

#[wasm_bindgen]
impl Editor {
    /// `config` is the contents of `pagecraft.config.json`, or empty for
    /// defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: &str) -> Result<Editor, JsValue> {
        Session::open(config).map(|session| Editor { inner: session.0 }).map_err(|e| JsValue::from_str(&e))
    }

    /// Canvas markup
    pub fn html(&self) -> String {
        self.inner.html()
    }

    #[wasm_bindgen(js_name = subtreeHtml)]
    pub fn subtree_html(&self, node_id: &str) -> Option<String> {
        self.inner.subtree_html(&NodeId::from(node_id))
    }

    /// Widget panel entries grouped by category
    #[wasm_bindgen(js_name = widgetPanel)]
    pub fn widget_panel(&self) -> String {
        widget_panel(&self.inner).to_string()
    }

    /// Inspector for the current selection, `null` when nothing is selected
    pub fn inspector(&self) -> Result<String, JsValue> {
        let panel = self.inner.inspector().map_err(|e| js_error("Inspector error", e))?;
        serde_json::to_string(&panel).map_err(|e| js_error("Serialization error", e))
    }

    /// Run a JSON command (`{"type": "update_setting", ...}`) and return
    /// the outcome as JSON
    pub fn dispatch(&mut self, command: &str) -> Result<String, JsValue> {
        let command: Command = serde_json::from_str(command).map_err(|e| js_error("Invalid command", e))?;
        outcome_json(&self.inner.dispatch(command))
    }

    /// Delegated click on canvas chrome. `null` for unknown actions.
    #[wasm_bindgen(js_name = handleAction)]
    pub fn handle_action(&mut self, action: &str, node_id: &str) -> Result<Option<String>, JsValue> {
        self.inner
            .handle_action(action, node_id)
            .map(|outcome| outcome_json(&outcome))
            .transpose()
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, payload: &str) -> Result<(), JsValue> {
        self.inner.drag_start(payload).map_err(|e| js_error("Drag error", e))
    }

    /// `target` is `{"kind": "column", "id": "…"}` or `{"kind": "canvas"}`
    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, target: &str) -> Result<(), JsValue> {
        let target: DropTarget = serde_json::from_str(target).map_err(|e| js_error("Invalid target", e))?;
        self.inner.drag_over(target);
        Ok(())
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.inner.drag_leave();
    }

    /// Returns true when the drag was cancelled
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) -> bool {
        self.inner.drag_end()
    }

    /// Resolve the drag. `offsets` maps node ids to measured top offsets.
    #[wasm_bindgen(js_name = drop)]
    pub fn drop_widget(&mut self, target: &str, pointer_y: f64, offsets: &str) -> Result<String, JsValue> {
        let target: DropTarget = serde_json::from_str(target).map_err(|e| js_error("Invalid target", e))?;
        let offsets = parse_offsets(offsets).map_err(|e| js_error("Invalid offsets", e))?;
        self.inner
            .drop(&target, pointer_y, &offsets)
            .map(|id| id.to_string())
            .map_err(|e| js_error("Drop error", e))
    }

    #[wasm_bindgen(js_name = updateSetting)]
    pub fn update_setting(&mut self, node_id: &str, control: &str, value: &str) -> Result<bool, JsValue> {
        let value: Value = serde_json::from_str(value).map_err(|e| js_error("Invalid value", e))?;
        self.inner
            .update_setting(&NodeId::from(node_id), control, &value)
            .map_err(|e| js_error("Update error", e))
    }

    pub fn select(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.inner
            .select(&NodeId::from(node_id))
            .map(|_| ())
            .map_err(|e| js_error("Select error", e))
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(|e| js_error("Undo error", e))
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(|e| js_error("Redo error", e))
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.history().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.history().can_redo()
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self, pretty: bool) -> Result<String, JsValue> {
        self.inner.export_json(pretty).map_err(|e| js_error("Export error", e))
    }

    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.inner.load_json(json).map_err(|e| js_error("Import error", e))
    }

    /// Standalone page as `{"html", "css", "js"}`
    #[wasm_bindgen(js_name = exportPage)]
    pub fn export_page(&self, title: &str) -> Result<String, JsValue> {
        export_page(&self.inner, title).map_err(|e| JsValue::from_str(&e))
    }
}

/// Editor setup without the JS boundary
struct Session(EditorContext);

impl Session {
    fn open(config: &str) -> Result<Session, String> {
        let config = if config.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config).map_err(|e| format!("Config error: {}", e))?
        };
        EditorContext::with_builtins(config)
            .map(Session)
            .map_err(|e| format!("Startup error: {}", e))
    }
}

fn outcome_json(outcome: &pagecraft_editor::CommandOutcome) -> Result<String, JsValue> {
    serde_json::to_string(outcome).map_err(|e| js_error("Serialization error", e))
}

fn parse_offsets(offsets: &str) -> Result<HashMap<NodeId, f64>, serde_json::Error> {
    if offsets.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(offsets)
}

fn widget_panel(editor: &EditorContext) -> Value {
    let categories: Vec<Value> = editor
        .registry()
        .categories()
        .into_iter()
        .map(|(category, definitions)| {
            let widgets: Vec<Value> = definitions
                .iter()
                .map(|definition| {
                    json!({
                        "typeId": definition.type_id,
                        "title": definition.title,
                        "icon": definition.icon,
                    })
                })
                .collect();
            json!({ "category": category, "widgets": widgets })
        })
        .collect();
    Value::Array(categories)
}

fn export_page(editor: &EditorContext, title: &str) -> Result<String, String> {
    let mut options = ExportOptions::default();
    if !title.is_empty() {
        options.title = title.to_string();
    }
    let bundle = export_document(editor, options).map_err(|e| format!("Export error: {}", e))?;
    serde_json::to_string(&bundle).map_err(|e| format!("Serialization error: {}", e))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_editor_round_trip() {
        let mut editor = Editor::new("").unwrap();
        editor.drag_start("heading").unwrap();
        let id = editor.drop_widget(r#"{ "kind": "canvas" }"#, 0.0, "").unwrap();
        assert!(editor.update_setting(&id, "title", r#""Welcome""#).unwrap());
        assert!(editor.html().contains("Welcome"));
        assert!(editor.undo().unwrap());
        assert!(!editor.html().contains("Welcome"));
    }
}
