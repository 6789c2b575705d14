//! Table box layout.
//!
//! Turns a [`RenderTree`] into a flat display list of positioned fills,
//! frames, text runs and images. The model is the subset of CSS table layout
//! the renderer emits:
//!
//! ```text
//! table = border + spacing + (cell + spacing)* + border
//! cell  = children stacked vertically, aligned by align/text-align and
//!         vertical-align (default middle)
//! p     = one line, height 0 when empty
//! img   = width attr or natural size capped by max-width/max-height,
//!         plus margins and padding-right
//! div   = full cell width, fixed height
//! ```
//!
//! Text never wraps; a table is as wide as its widest row.

use super::font::{line_height, text_width};
use super::images::ImageSet;
use crate::model::{Color, DEFAULT_FONT_SIZE};
use crate::render::{Cell, HAlign, Image, Node, Paragraph, Property, RenderTree, Rule, Style, Table};

/// Fallback box for an image that could not be resolved.
const PLACEHOLDER_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One paint operation, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Fill {
        rect: Rect,
        color: [u8; 4],
    },
    Frame {
        rect: Rect,
        width: u32,
        color: [u8; 4],
    },
    Text {
        x: u32,
        y: u32,
        size: u32,
        bold: bool,
        color: [u8; 4],
        text: String,
    },
    Image {
        rect: Rect,
        src: String,
    },
}

/// A laid-out signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub items: Vec<Item>,
}

/// Lay out `tree`, sizing images from `images` where resolved.
pub fn layout(tree: &RenderTree, images: &ImageSet) -> Layout {
    let engine = Engine { images };
    let metrics = engine.measure_table(&tree.root);
    let (width, height) = metrics.size();
    let mut items = Vec::new();
    engine.place_table(&tree.root, 0, 0, width, &mut items);
    Layout {
        width,
        height,
        items,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Size {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Default)]
struct TableMetrics {
    spacing: u32,
    border: u32,
    columns: Vec<u32>,
    rows: Vec<u32>,
}

impl TableMetrics {
    fn size(&self) -> (u32, u32) {
        let extent = |tracks: &[u32]| {
            let gaps = u32::try_from(tracks.len()).unwrap_or(u32::MAX).saturating_add(1);
            tracks
                .iter()
                .fold(self.border.saturating_mul(2), |acc, t| acc.saturating_add(*t))
                .saturating_add(self.spacing.saturating_mul(gaps))
        };
        (extent(&self.columns), extent(&self.rows))
    }

    /// Width of a cell spanning `span` columns from `col`.
    fn span_width(&self, col: usize, span: usize) -> u32 {
        let end = (col + span).min(self.columns.len());
        let cols = self
            .columns
            .get(col..end)
            .map(|c| c.iter().fold(0u32, |acc, w| acc.saturating_add(*w)))
            .unwrap_or(0);
        let gaps = u32::try_from(span.saturating_sub(1)).unwrap_or(u32::MAX);
        cols.saturating_add(self.spacing.saturating_mul(gaps))
    }
}

struct Engine<'a> {
    images: &'a ImageSet,
}

impl Engine<'_> {
    fn measure_table(&self, table: &Table) -> TableMetrics {
        let spacing = match table.style.get(Property::BorderCollapse) {
            Some("separate") => table.style.px(Property::BorderSpacing).unwrap_or(0),
            _ => 0,
        };
        let border = if table.style.has(Property::BorderStyle) {
            table.style.px(Property::BorderWidth).unwrap_or(0)
        } else {
            0
        };

        let n_cols = table.column_count() as usize;
        let mut metrics = TableMetrics {
            spacing,
            border,
            columns: vec![0; n_cols],
            rows: Vec::with_capacity(table.rows.len()),
        };

        // Single-column cells first, then grow the last spanned column for
        // spanning cells that do not fit.
        let mut spanning = Vec::new();
        for row in &table.rows {
            let mut row_height = 0;
            let mut col = 0;
            for cell in &row.cells {
                let span = cell.col_span.unwrap_or(1).max(1) as usize;
                let size = self.measure_cell(cell);
                row_height = row_height.max(size.height);
                if span == 1 {
                    if let Some(w) = metrics.columns.get_mut(col) {
                        *w = (*w).max(size.width);
                    }
                } else {
                    spanning.push((col, span, size.width));
                }
                col += span;
            }
            metrics.rows.push(row_height);
        }

        for (col, span, needed) in spanning {
            let available = metrics.span_width(col, span);
            if needed > available {
                let last = (col + span).min(n_cols).saturating_sub(1);
                if let Some(w) = metrics.columns.get_mut(last) {
                    *w = w.saturating_add(needed - available);
                }
            }
        }

        metrics
    }

    fn measure_cell(&self, cell: &Cell) -> Size {
        cell.content.iter().fold(Size::default(), |acc, node| {
            let size = self.measure_node(node);
            Size {
                width: acc.width.max(size.width),
                height: acc.height.saturating_add(size.height),
            }
        })
    }

    fn measure_node(&self, node: &Node) -> Size {
        match node {
            Node::Table(t) => {
                let (width, height) = self.measure_table(t).size();
                Size { width, height }
            }
            Node::Paragraph(p) => {
                let (mt, mb) = vertical_margins(&p.style);
                let text = p.text.trim();
                if text.is_empty() {
                    return Size {
                        width: 0,
                        height: mt.saturating_add(mb),
                    };
                }
                let size = font_size(&p.style);
                Size {
                    width: text_width(text, size),
                    height: line_height(size).saturating_add(mt).saturating_add(mb),
                }
            }
            Node::Image(i) => {
                let (w, h) = self.image_size(i);
                let (mt, mb) = vertical_margins(&i.style);
                let (ml, mr) = horizontal_margins(&i.style);
                let padding = i.style.px(Property::PaddingRight).unwrap_or(0);
                Size {
                    width: ml.saturating_add(w).saturating_add(padding).saturating_add(mr),
                    height: mt.saturating_add(h).saturating_add(mb),
                }
            }
            Node::Rule(r) => {
                let (mt, mb) = vertical_margins(&r.style);
                Size {
                    width: 0,
                    height: mt
                        .saturating_add(r.style.px(Property::Height).unwrap_or(1))
                        .saturating_add(mb),
                }
            }
        }
    }

    /// Rendered image size, preserving the source aspect ratio.
    fn image_size(&self, image: &Image) -> (u32, u32) {
        let natural = self.images.dimensions(&image.src);

        if let Some(width) = image.width.or_else(|| image.style.px(Property::Width)) {
            let height = match natural {
                Some((nw, nh)) if nw > 0 => {
                    let scaled = (u64::from(width) * u64::from(nh) / u64::from(nw)).max(1);
                    u32::try_from(scaled).unwrap_or(u32::MAX)
                }
                _ => width,
            };
            return (width, height);
        }

        let max_w = image.style.px(Property::MaxWidth);
        let max_h = image.style.px(Property::MaxHeight);
        let (w, h) = natural.unwrap_or_else(|| {
            let side = max_w.into_iter().chain(max_h).min().unwrap_or(PLACEHOLDER_SIZE);
            (side, side)
        });
        fit_within(w, h, max_w.unwrap_or(u32::MAX), max_h.unwrap_or(u32::MAX))
    }

    fn place_table(&self, table: &Table, x: u32, y: u32, width: u32, items: &mut Vec<Item>) {
        let mut metrics = self.measure_table(table);
        let (natural, height) = metrics.size();
        if width > natural
            && let Some(last) = metrics.columns.last_mut()
        {
            *last = last.saturating_add(width - natural);
        }
        let width = width.max(natural);
        let rect = Rect {
            x,
            y,
            width,
            height,
        };

        if let Some(color) = color_of(&table.style, Property::BackgroundColor) {
            items.push(Item::Fill { rect, color });
        }
        if metrics.border > 0 {
            let color = color_of(&table.style, Property::BorderColor).unwrap_or([0, 0, 0, 255]);
            items.push(Item::Frame {
                rect,
                width: metrics.border,
                color,
            });
        }

        let inset = metrics.border.saturating_add(metrics.spacing);
        let mut cy = y.saturating_add(inset);
        for (row, &row_height) in table.rows.iter().zip(&metrics.rows) {
            let mut cx = x.saturating_add(inset);
            let mut col = 0;
            for cell in &row.cells {
                let span = cell.col_span.unwrap_or(1).max(1) as usize;
                let cell_width = metrics.span_width(col, span);
                let slot = Rect {
                    x: cx,
                    y: cy,
                    width: cell_width,
                    height: row_height,
                };
                self.place_cell(cell, slot, items);
                cx = cx.saturating_add(cell_width).saturating_add(metrics.spacing);
                col += span;
            }
            cy = cy.saturating_add(row_height).saturating_add(metrics.spacing);
        }
    }

    fn place_cell(&self, cell: &Cell, slot: Rect, items: &mut Vec<Item>) {
        if let Some(color) = color_of(&cell.style, Property::BackgroundColor) {
            items.push(Item::Fill { rect: slot, color });
        }

        let content = self.measure_cell(cell);
        let free = slot.height.saturating_sub(content.height);
        let mut y = slot.y.saturating_add(match cell.style.get(Property::VerticalAlign) {
            Some("top") => 0,
            Some("bottom") => free,
            _ => free / 2,
        });

        let cell_align = cell.align.or_else(|| text_align(&cell.style));

        for node in &cell.content {
            let size = self.measure_node(node);
            let node_align = match node {
                Node::Table(t) => t.align.or(cell_align),
                _ => cell_align,
            };
            let x = slot.x.saturating_add(offset(node_align, slot.width, size.width));
            match node {
                Node::Table(t) => {
                    let width = if t.style.get(Property::Width) == Some("100%") {
                        slot.width
                    } else {
                        size.width
                    };
                    self.place_table(t, x, y, width, items);
                }
                Node::Paragraph(p) => place_paragraph(p, x, y, items),
                Node::Image(i) => self.place_image(i, x, y, items),
                Node::Rule(r) => place_rule(r, slot.x, y, slot.width, items),
            }
            y = y.saturating_add(size.height);
        }
    }

    fn place_image(&self, image: &Image, x: u32, y: u32, items: &mut Vec<Item>) {
        let (width, height) = self.image_size(image);
        let (mt, _) = vertical_margins(&image.style);
        let (ml, _) = horizontal_margins(&image.style);
        items.push(Item::Image {
            rect: Rect {
                x: x.saturating_add(ml),
                y: y.saturating_add(mt),
                width,
                height,
            },
            src: image.src.clone(),
        });
    }
}

fn place_paragraph(paragraph: &Paragraph, x: u32, y: u32, items: &mut Vec<Item>) {
    let text = paragraph.text.trim();
    if text.is_empty() {
        return;
    }
    let (mt, _) = vertical_margins(&paragraph.style);
    items.push(Item::Text {
        x,
        y: y.saturating_add(mt),
        size: font_size(&paragraph.style),
        bold: is_bold(&paragraph.style),
        color: color_of(&paragraph.style, Property::Color).unwrap_or([0, 0, 0, 255]),
        text: text.to_string(),
    });
}

fn place_rule(rule: &Rule, x: u32, y: u32, width: u32, items: &mut Vec<Item>) {
    let (mt, _) = vertical_margins(&rule.style);
    let color = color_of(&rule.style, Property::BackgroundColor).unwrap_or([0, 0, 0, 255]);
    items.push(Item::Fill {
        rect: Rect {
            x,
            y: y.saturating_add(mt),
            width,
            height: rule.style.px(Property::Height).unwrap_or(1),
        },
        color,
    });
}

/// Scale `(w, h)` down to fit within `(max_w, max_h)`, keeping the ratio.
fn fit_within(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64);
    (
        ((w as f64 * scale).round() as u32).max(1),
        ((h as f64 * scale).round() as u32).max(1),
    )
}

fn offset(align: Option<HAlign>, available: u32, used: u32) -> u32 {
    let free = available.saturating_sub(used);
    match align {
        Some(HAlign::Center) => free / 2,
        Some(HAlign::Right) => free,
        _ => 0,
    }
}

fn text_align(style: &Style) -> Option<HAlign> {
    match style.get(Property::TextAlign)? {
        "center" => Some(HAlign::Center),
        "right" => Some(HAlign::Right),
        "left" => Some(HAlign::Left),
        _ => None,
    }
}

fn font_size(style: &Style) -> u32 {
    style.px(Property::FontSize).unwrap_or(DEFAULT_FONT_SIZE)
}

fn is_bold(style: &Style) -> bool {
    match style.get(Property::FontWeight) {
        Some("bold") | Some("bolder") => true,
        Some(weight) => weight.parse::<u32>().is_ok_and(|w| w >= 600),
        None => false,
    }
}

fn color_of(style: &Style, property: Property) -> Option<[u8; 4]> {
    style.get(property)?.parse::<Color>().ok().map(|c| c.rgba())
}

fn vertical_margins(style: &Style) -> (u32, u32) {
    (
        style.px(Property::MarginTop).unwrap_or(0),
        style.px(Property::MarginBottom).unwrap_or(0),
    )
}

fn horizontal_margins(style: &Style) -> (u32, u32) {
    (
        style.px(Property::MarginLeft).unwrap_or(0),
        style.px(Property::MarginRight).unwrap_or(0),
    )
}
