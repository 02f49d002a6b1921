//! Minimal streaming XML writer for the Output XML hook (§6.3).
//!
//! DynamO's on-disk configuration format is XML, produced historically by a
//! macro-heavy stream writer (`magnet::xml::XmlStream`). Parsing that format
//! is out of scope (configuration round-trips through `toml`/`serde_json`
//! instead, §6.1); this is a write-only subset, just enough to emit the
//! legacy-compatible `Output XML` snapshot, grounded in the same
//! begin/end/attr/chardata shape the original's stream operator exposed.

use std::fmt::Write as _;

pub struct XmlWriter {
    buffer: String,
    stack: Vec<String>,
    indent: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        XmlWriter {
            buffer: String::from("<?xml version=\"1.0\"?>\n"),
            stack: Vec::new(),
            indent: 0,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buffer.push_str("  ");
        }
    }

    pub fn begin_element(&mut self, name: &str) -> &mut Self {
        self.write_indent();
        let _ = write!(self.buffer, "<{}", name);
        self.stack.push(name.to_string());
        self.indent += 1;
        self
    }

    pub fn attr(&mut self, name: &str, value: impl std::fmt::Display) -> &mut Self {
        let _ = write!(self.buffer, " {}=\"{}\"", name, escape(&value.to_string()));
        self
    }

    /// Closes the opening tag's attribute list without ending the element,
    /// so chardata or nested elements can follow.
    pub fn close_open_tag(&mut self) -> &mut Self {
        self.buffer.push_str(">\n");
        self
    }

    pub fn chardata(&mut self, text: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(&escape(text));
        self.buffer.push('\n');
        self
    }

    pub fn end_element(&mut self) -> &mut Self {
        self.indent -= 1;
        let name = self.stack.pop().expect("end_element without matching begin_element");
        self.write_indent();
        let _ = write!(self.buffer, "</{}>\n", name);
        self
    }

    /// Closes the current element as an empty tag (`<name attr="v"/>`)
    /// without requiring a matching `close_open_tag`/`end_element` pair.
    pub fn end_empty_element(&mut self) -> &mut Self {
        self.indent -= 1;
        self.stack.pop().expect("end_empty_element without matching begin_element");
        self.buffer.push_str("/>\n");
        self
    }

    pub fn finish(self) -> String {
        assert!(self.stack.is_empty(), "unclosed XML elements remain: {:?}", self.stack);
        self.buffer
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_attribute_only_empty_element() {
        let mut w = XmlWriter::new();
        w.begin_element("Range").attr("Type", "All").end_empty_element();
        let doc = w.finish();
        assert!(doc.contains(r#"<Range Type="All"/>"#));
    }

    #[test]
    fn writes_nested_elements_with_chardata() {
        let mut w = XmlWriter::new();
        w.begin_element("Particles")
            .close_open_tag()
            .begin_element("Particle")
            .attr("ID", 0)
            .close_open_tag()
            .chardata("0.0 0.0 0.0")
            .end_element()
            .end_element();
        let doc = w.finish();
        assert!(doc.contains("<Particles>"));
        assert!(doc.contains(r#"<Particle ID="0">"#));
        assert!(doc.contains("</Particles>"));
    }

    #[test]
    fn escapes_special_characters_in_attributes() {
        let mut w = XmlWriter::new();
        w.begin_element("Tag").attr("Name", "a<b&c").end_empty_element();
        let doc = w.finish();
        assert!(doc.contains("a&lt;b&amp;c"));
    }

    #[test]
    #[should_panic]
    fn finishing_with_unclosed_elements_panics() {
        let mut w = XmlWriter::new();
        w.begin_element("Open");
        w.finish();
    }
}
