//! Serialization of a [`RenderTree`] to an HTML fragment, an XHTML fragment
//! (for embedding in SVG), or plain text.
//!
//! Escaping follows the html5ever serializer so that a sanitizer
//! round-trip reproduces the same markup.

use super::style::Style;
use super::tree::{Cell, HAlign, Image, Node, Paragraph, RenderTree, Rule, Table};

/// Void element and entity flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Html,
    Xhtml,
}

impl RenderTree {
    /// HTML fragment suitable for pasting into an email client.
    pub fn to_html(&self) -> String {
        serialize(self, Flavor::Html)
    }

    /// Well-formed XML serialization of the same fragment.
    pub fn to_xhtml(&self) -> String {
        serialize(self, Flavor::Xhtml)
    }

    /// One line per non-empty paragraph, in document order.
    pub fn to_plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn serialize(tree: &RenderTree, flavor: Flavor) -> String {
    let mut writer = Writer {
        out: String::new(),
        flavor,
    };
    writer.table(&tree.root);
    writer.out
}

struct Writer {
    out: String,
    flavor: Flavor,
}

impl Writer {
    fn table(&mut self, table: &Table) {
        self.open("table", &table.style, table.align, None);
        self.out.push_str("<tbody>");
        for row in &table.rows {
            self.out.push_str("<tr>");
            for cell in &row.cells {
                self.cell(cell);
            }
            self.out.push_str("</tr>");
        }
        self.out.push_str("</tbody></table>");
    }

    fn cell(&mut self, cell: &Cell) {
        self.open("td", &cell.style, cell.align, cell.col_span);
        for node in &cell.content {
            match node {
                Node::Table(t) => self.table(t),
                Node::Paragraph(p) => self.paragraph(p),
                Node::Image(i) => self.image(i),
                Node::Rule(r) => self.rule(r),
            }
        }
        self.out.push_str("</td>");
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.open("p", &paragraph.style, None, None);
        self.text(&paragraph.text);
        self.out.push_str("</p>");
    }

    fn image(&mut self, image: &Image) {
        self.out.push_str("<img");
        self.attr("src", &image.src);
        self.attr("alt", &image.alt);
        if let Some(width) = image.width {
            self.attr("width", &width.to_string());
        }
        self.style_attr(&image.style);
        match self.flavor {
            Flavor::Html => self.out.push('>'),
            Flavor::Xhtml => self.out.push_str(" />"),
        }
    }

    fn rule(&mut self, rule: &Rule) {
        self.open("div", &rule.style, None, None);
        self.out.push_str("</div>");
    }

    fn open(&mut self, tag: &str, style: &Style, align: Option<HAlign>, col_span: Option<u32>) {
        self.out.push('<');
        self.out.push_str(tag);
        self.style_attr(style);
        if let Some(align) = align {
            self.attr("align", align.as_attr());
        }
        if let Some(span) = col_span {
            self.attr("colspan", &span.to_string());
        }
        self.out.push('>');
    }

    fn style_attr(&mut self, style: &Style) {
        if !style.is_empty() {
            self.attr("style", &style.to_css());
        }
    }

    fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        for c in value.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '"' => self.out.push_str("&quot;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '\u{a0}' => self.nbsp(),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '\u{a0}' => self.nbsp(),
                c => self.out.push(c),
            }
        }
    }

    fn nbsp(&mut self) {
        // XML has no predefined &nbsp; entity.
        match self.flavor {
            Flavor::Html => self.out.push_str("&nbsp;"),
            Flavor::Xhtml => self.out.push_str("&#160;"),
        }
    }
}
