use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagecraft_editor::{DropTarget, EditorConfig, EditorContext, IdGenerator, NoLayout, WidgetRegistry};
use serde_json::json;

const WIDGETS: [&str; 7] = ["heading", "text", "button", "image", "divider", "spacer", "video"];

fn page(sections: usize) -> EditorContext {
    let mut editor = EditorContext::with_id_generator(
        WidgetRegistry::with_builtins().unwrap(),
        EditorConfig::default(),
        IdGenerator::from_seed("bench"),
    );
    for _ in 0..sections {
        let first = editor.place_widget("heading", &DropTarget::Canvas, f64::MAX, &NoLayout).unwrap();
        let column = editor.tree().node(&first).unwrap().parent().cloned().unwrap();
        for type_id in WIDGETS {
            editor
                .place_widget(type_id, &DropTarget::Column(column.clone()), f64::MAX, &NoLayout)
                .unwrap();
        }
    }
    editor
}

fn render_full_document(c: &mut Criterion) {
    let mut editor = page(20);

    c.bench_function("render_full_document", |b| {
        b.iter(|| {
            editor.refresh_canvas().unwrap();
            black_box(editor.html())
        })
    });
}

fn update_single_setting(c: &mut Criterion) {
    let mut editor = page(20);
    let target = editor.tree().walk().last().map(|node| node.id().clone()).unwrap();
    let mut toggle = false;

    c.bench_function("update_single_setting", |b| {
        b.iter(|| {
            toggle = !toggle;
            let value = if toggle { json!(true) } else { json!(false) };
            editor.update_setting(black_box(&target), "controls", &value).unwrap()
        })
    });
}

fn export_preview(c: &mut Criterion) {
    let editor = page(20);

    c.bench_function("export_preview", |b| b.iter(|| black_box(editor.preview_html().unwrap())));
}

criterion_group!(benches, render_full_document, update_single_setting, export_preview);
criterion_main!(benches);
