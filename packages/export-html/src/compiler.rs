use pagecraft_editor::{EditorContext, EditorError, Fragment, FragmentBody, RenderEngine, RenderOptions};
use pagecraft_schema::markup::escape_html;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Render failed: {0}")]
    Render(#[from] EditorError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Options for HTML export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Document `<title>`
    pub title: String,
    /// Emit the layout stylesheet for containers and columns
    pub include_base_styles: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            title: "Pagecraft Page".to_string(),
            include_base_styles: true,
        }
    }
}

/// Files of an exported page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    /// `index.html`
    pub html: String,
    /// `styles.css`
    pub css: String,
    /// `main.js`
    pub js: String,
}

pub const STYLESHEET_NAME: &str = "styles.css";
pub const SCRIPT_NAME: &str = "main.js";

struct Context {
    options: ExportOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: ExportOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Export the editor's document as a standalone page
pub fn export_document(editor: &EditorContext, options: ExportOptions) -> Result<ExportBundle, ExportError> {
    let render_options = RenderOptions::preview(editor.config());
    let canvas = RenderEngine::new(editor.registry(), &render_options).render_document(editor.tree())?;

    let prefix = render_options.class_prefix.clone();
    let include_base_styles = options.include_base_styles;
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    compile_head(&mut ctx);

    ctx.add_line("<body>");
    ctx.indent();
    ctx.add_line(&format!("<main class=\"{}-page\">", prefix));
    ctx.indent();
    for fragment in canvas.roots() {
        compile_fragment(fragment, &mut ctx);
    }
    ctx.dedent();
    ctx.add_line("</main>");
    ctx.add_line(&format!("<script src=\"{}\"></script>", SCRIPT_NAME));
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    let css = if include_base_styles {
        base_styles(&prefix)
    } else {
        String::new()
    };
    let js = document_script(editor)?;

    info!(nodes = editor.tree().len(), "Exported page");
    Ok(ExportBundle {
        html: ctx.get_output(),
        css,
        js,
    })
}

fn compile_head(ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let title = escape_html(&ctx.options.title);
    ctx.add_line(&format!("<title>{}</title>", title));
    ctx.add_line(&format!("<link rel=\"stylesheet\" href=\"{}\">", STYLESHEET_NAME));

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_fragment(fragment: &Fragment, ctx: &mut Context) {
    match &fragment.body {
        FragmentBody::Leaf(html) => ctx.add_line(html),
        FragmentBody::Wrapper {
            open,
            children,
            placeholder: _,
            close,
        } => {
            ctx.add_line(open);
            ctx.indent();
            for child in children {
                compile_fragment(child, ctx);
            }
            ctx.dedent();
            ctx.add_line(close);
        }
    }
}

/// Layout rules the inline styles rely on. Chrome classes follow the
/// configured prefix; widget markup always uses `pc-`.
fn base_styles(prefix: &str) -> String {
    format!(
        r#"*, *::before, *::after {{ box-sizing: border-box; }}
body {{ margin: 0; }}
.{p}-container {{ position: relative; display: flex; }}
.{p}-column {{ position: relative; min-height: 1px; }}
.{p}-widget {{ position: relative; }}
.{p}-widget-container img {{ max-width: 100%; height: auto; }}
.pc-video {{ position: relative; }}
.pc-video-iframe {{ position: absolute; inset: 0; width: 100%; height: 100%; border: 0; }}
@media (max-width: 767px) {{
  .{p}-container {{ flex-direction: column; }}
  .{p}-column {{ width: 100% !important; }}
}}
"#,
        p = prefix
    )
}

/// The source document travels with the page so it can be reopened in
/// the editor
fn document_script(editor: &EditorContext) -> Result<String, ExportError> {
    let json = serde_json::to_string(&editor.export_nodes()?)?;
    // Keep "</script>" inside string data from closing the tag
    let json = json.replace("</", "<\\/");
    Ok(format!("window.pagecraftDocument = {};\n", json))
}
