//! Markup building helpers shared by widget render functions and the render
//! engine. Attribute and style order is insertion order, which keeps output
//! byte-identical across renders.

/// Ordered inline style declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleList {
    declarations: Vec<(String, String)>,
}

impl StyleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(existing) => existing.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
        self
    }

    pub fn set_opt(&mut self, property: &str, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(property, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Single element builder
#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    styles: StyleList,
    inner: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            classes: Vec::new(),
            styles: StyleList::new(),
            inner: String::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.attributes.push((name.to_string(), value.as_ref().to_string()));
        self
    }

    pub fn attr_if(self, condition: bool, name: &str, value: impl AsRef<str>) -> Self {
        if condition {
            self.attr(name, value)
        } else {
            self
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() {
            self.classes.push(class);
        }
        self
    }

    pub fn style(mut self, property: &str, value: impl Into<String>) -> Self {
        self.styles.set(property, value);
        self
    }

    pub fn styles(mut self, styles: &StyleList) -> Self {
        for (property, value) in styles.iter() {
            self.styles.set(property, value);
        }
        self
    }

    /// Escaped text content
    pub fn text(mut self, text: &str) -> Self {
        self.inner.push_str(&escape_html(text));
        self
    }

    /// Pre-rendered child markup
    pub fn html(mut self, html: &str) -> Self {
        self.inner.push_str(html);
        self
    }

    pub fn open(&self) -> String {
        let mut out = format!("<{}", self.name);
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_html(&self.classes.join(" "))));
        }
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        if !self.styles.is_empty() {
            out.push_str(&format!(" style=\"{}\"", escape_html(&self.styles.to_css())));
        }
        if is_self_closing(&self.name) {
            out.push_str(" />");
        } else {
            out.push('>');
        }
        out
    }

    pub fn close(&self) -> String {
        if is_self_closing(&self.name) {
            String::new()
        } else {
            format!("</{}>", self.name)
        }
    }

    pub fn build(self) -> String {
        if is_self_closing(&self.name) {
            return self.open();
        }
        format!("{}{}{}", self.open(), self.inner, self.close())
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "input" | "br" | "hr" | "meta" | "link" | "source" | "embed" | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_build() {
        let html = Tag::new("a")
            .class("btn")
            .class("")
            .attr("href", "/x?a=1&b=2")
            .style("color", "red")
            .style("padding", "")
            .text("Go <now>")
            .build();

        assert_eq!(
            html,
            "<a class=\"btn\" href=\"/x?a=1&amp;b=2\" style=\"color: red;\">Go &lt;now&gt;</a>"
        );
    }

    #[test]
    fn test_self_closing() {
        let html = Tag::new("img").attr("src", "a.png").build();
        assert_eq!(html, "<img src=\"a.png\" />");
    }

    #[test]
    fn test_style_list_overwrites_in_place() {
        let mut styles = StyleList::new();
        styles.set("color", "red").set("margin", "0").set("color", "blue");
        assert_eq!(styles.to_css(), "color: blue; margin: 0;");
    }
}
