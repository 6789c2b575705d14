//! Render tree node types: tables, rows and cells holding paragraphs, images
//! and rules. This is the layout primitive every output (HTML, plain text,
//! raster, vector) is derived from.

use super::style::{Property, Style};

/// Horizontal alignment, emitted as the `align` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl HAlign {
    pub fn as_attr(self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

/// Root of a rendered signature.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTree {
    pub root: Table,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub style: Style,
    pub align: Option<HAlign>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub style: Style,
    pub align: Option<HAlign>,
    pub col_span: Option<u32>,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Table(Table),
    Paragraph(Paragraph),
    Image(Image),
    Rule(Rule),
}

/// A line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    /// Explicit `width` attribute, when the image has a fixed size.
    pub width: Option<u32>,
    pub style: Style,
}

/// A horizontal divider drawn as a filled 1px block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub style: Style,
}

impl Table {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Largest number of columns any row occupies.
    pub fn column_count(&self) -> u32 {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.col_span.unwrap_or(1)).sum())
            .max()
            .unwrap_or(0)
    }
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }
}

impl Cell {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.content.push(node.into());
        self
    }
}

impl From<Table> for Node {
    fn from(t: Table) -> Self {
        Node::Table(t)
    }
}

impl From<Paragraph> for Node {
    fn from(p: Paragraph) -> Self {
        Node::Paragraph(p)
    }
}

impl From<Image> for Node {
    fn from(i: Image) -> Self {
        Node::Image(i)
    }
}

impl From<Rule> for Node {
    fn from(r: Rule) -> Self {
        Node::Rule(r)
    }
}

/// Anything in the tree that carries a style.
#[derive(Debug, Clone, Copy)]
pub enum Styled<'a> {
    Table(&'a Table),
    Cell(&'a Cell),
    Paragraph(&'a Paragraph),
    Image(&'a Image),
    Rule(&'a Rule),
}

impl<'a> Styled<'a> {
    pub fn style(&self) -> &'a Style {
        match self {
            Styled::Table(t) => &t.style,
            Styled::Cell(c) => &c.style,
            Styled::Paragraph(p) => &p.style,
            Styled::Image(i) => &i.style,
            Styled::Rule(r) => &r.style,
        }
    }
}

impl RenderTree {
    /// Depth-first walk over every styled element, root first.
    pub fn walk(&self) -> Vec<Styled<'_>> {
        let mut out = Vec::new();
        walk_table(&self.root, &mut out);
        out
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.walk().into_iter().filter_map(|s| match s {
            Styled::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.walk().into_iter().filter_map(|s| match s {
            Styled::Image(i) => Some(i),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.walk().into_iter().filter_map(|s| match s {
            Styled::Rule(r) => Some(r),
            _ => None,
        })
    }

    /// Whether any element carries a border declaration.
    pub fn has_border_declaration(&self) -> bool {
        self.walk()
            .iter()
            .any(|s| s.style().iter().any(|(p, _)| p.is_border()))
    }

    /// Whether any element declares `property`.
    pub fn declares(&self, property: Property) -> bool {
        self.walk().iter().any(|s| s.style().has(property))
    }
}

fn walk_table<'a>(table: &'a Table, out: &mut Vec<Styled<'a>>) {
    out.push(Styled::Table(table));
    for row in &table.rows {
        for cell in &row.cells {
            out.push(Styled::Cell(cell));
            for node in &cell.content {
                match node {
                    Node::Table(t) => walk_table(t, out),
                    Node::Paragraph(p) => out.push(Styled::Paragraph(p)),
                    Node::Image(i) => out.push(Styled::Image(i)),
                    Node::Rule(r) => out.push(Styled::Rule(r)),
                }
            }
        }
    }
}
