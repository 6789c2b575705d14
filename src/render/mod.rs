//! # Signature Renderer
//!
//! Projects a validated [`SignatureModel`] into a [`RenderTree`]: nested
//! tables with inline, longhand-only styles, the one layout primitive email
//! clients render consistently.
//!
//! ## Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐  outer table
//! │ ┌───────┐ ┌──────────────────────┐ ┌──┐               │  (background,
//! │ │ image │ │ Name (bold)          │ │ic│  icons right  │   border only
//! │ │       │ │ Title   (size − 2)   │ │ic│               │   when enabled)
//! │ │       │ │ Company (size − 2)   │ │ic│               │
//! │ └───────┘ │ ──────────────────── │ └──┘               │
//! │           │ phone / email / web  │                    │
//! │           └──────────────────────┘                    │
//! │ ┌───────────────────────────────────────┐ icons bottom │
//! │ │        ic  ic  ic  (start|center|end) │ colspan row  │
//! │ └───────────────────────────────────────┘              │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ```
//! use signet::model::SignatureModel;
//! use signet::render::render;
//!
//! let tree = render(&SignatureModel::named("Ada Lovelace"));
//! assert!(tree.to_html().contains("Ada Lovelace"));
//! ```

pub mod html;
mod style;
mod tree;

pub use style::{Property, Style, px};
pub use tree::{Cell, HAlign, Image, Node, Paragraph, RenderTree, Row, Rule, Styled, Table};

use crate::model::{Asset, IconAlignment, IconLayout, SignatureModel};

/// Bounding box for the primary image, in pixels.
pub const IMAGE_MAX_SIZE: u32 = 150;
/// Gap between the primary image and the text column.
pub const IMAGE_GAP: u32 = 10;
/// Icon width, in pixels.
pub const ICON_SIZE: u32 = 25;
/// Per-icon margin on the stacking axis.
pub const ICON_MARGIN: u32 = 4;
/// Spacing between the outer table's cells.
pub const CELL_SPACING: u32 = 8;
/// Vertical space around the divider.
pub const RULE_MARGIN: u32 = 4;
/// Divider color.
pub const RULE_COLOR: &str = "#000000";

/// Render a valid model. Pure and deterministic: the same model always
/// produces the same tree.
pub fn render(model: &SignatureModel) -> RenderTree {
    let mut main_row = Row::new();

    if let Some(image) = &model.image {
        main_row = main_row.cell(
            Cell::new(Style::new().with(Property::VerticalAlign, "top")).child(primary_image(image)),
        );
    }

    main_row = main_row.cell(
        Cell::new(Style::new().with(Property::VerticalAlign, "top")).child(details_table(model)),
    );

    let mut bottom_row = None;
    if !model.icons.is_empty() {
        match model.icon_layout {
            IconLayout::Right => {
                main_row = main_row.cell(icon_column(&model.icons));
            }
            IconLayout::Bottom(alignment) => {
                let span = main_row.cells.len() as u32;
                bottom_row = Some(Row::new().cell(icon_row(&model.icons, alignment, span)));
            }
        }
    }

    let mut root = Table::new(outer_style(model)).row(main_row);
    if let Some(row) = bottom_row {
        root = root.row(row);
    }

    RenderTree { root }
}

/// Outer container style. Background and border declarations are omitted
/// entirely when disabled, never set to a neutral value.
fn outer_style(model: &SignatureModel) -> Style {
    let mut style = Style::new()
        .with(Property::BorderCollapse, "separate")
        .with(Property::BorderSpacing, px(CELL_SPACING));

    if let Some(background) = &model.background {
        style.set(Property::BackgroundColor, background.as_str());
    }
    if let Some(border) = &model.border {
        style.set(Property::BorderWidth, px(border.width));
        style.set(Property::BorderStyle, "solid");
        style.set(Property::BorderColor, border.color.as_str());
    }

    style.with(Property::FontSize, px(model.font_size))
}

fn primary_image(asset: &Asset) -> Image {
    Image {
        src: asset.url.to_string(),
        alt: asset.alt_text.clone(),
        width: None,
        style: Style::new()
            .with(Property::Display, "block")
            .with(Property::Width, "auto")
            .with(Property::Height, "auto")
            .with(Property::MaxWidth, px(IMAGE_MAX_SIZE))
            .with(Property::MaxHeight, px(IMAGE_MAX_SIZE))
            .with(Property::PaddingRight, px(IMAGE_GAP)),
    }
}

fn details_table(model: &SignatureModel) -> Table {
    let secondary = model.secondary_font_size();

    let mut table = Table::new(
        Style::new()
            .with(Property::Width, "100%")
            .with(Property::BorderCollapse, "collapse"),
    )
    .row(text_row(
        &model.name,
        line_style(model.font_size).with(Property::FontWeight, "bold"),
    ))
    .row(text_row(
        &model.title,
        line_style(secondary).with(Property::FontWeight, "300"),
    ))
    .row(text_row(&model.company, line_style(secondary)));

    if model.has_contact_details() {
        table = table.row(Row::new().cell(Cell::default().child(divider())));
    }

    for line in [&model.phone, &model.email, &model.website] {
        if !line.is_empty() {
            table = table.row(text_row(line, line_style(model.font_size)));
        }
    }

    table
}

fn line_style(font_size: u32) -> Style {
    Style::new()
        .with(Property::MarginTop, "0")
        .with(Property::MarginBottom, "0")
        .with(Property::FontSize, px(font_size))
}

fn text_row(text: &str, style: Style) -> Row {
    Row::new().cell(Cell::default().child(Paragraph {
        text: text.to_string(),
        style,
    }))
}

fn divider() -> Rule {
    Rule {
        style: Style::new()
            .with(Property::Height, "1px")
            .with(Property::LineHeight, "1px")
            .with(Property::FontSize, "1px")
            .with(Property::BackgroundColor, RULE_COLOR)
            .with(Property::MarginTop, px(RULE_MARGIN))
            .with(Property::MarginBottom, px(RULE_MARGIN)),
    }
}

/// Icons stacked vertically in a trailing cell of the main row.
fn icon_column(icons: &[Asset]) -> Cell {
    let mut stack = Table::new(Style::new().with(Property::BorderCollapse, "collapse"));
    for icon in icons {
        let image = icon_image(icon, Property::MarginTop, Property::MarginBottom);
        stack = stack.row(Row::new().cell(Cell::default().child(image)));
    }
    Cell::new(Style::new().with(Property::VerticalAlign, "middle")).child(stack)
}

/// Icons in a single row spanning beneath the main cells.
fn icon_row(icons: &[Asset], alignment: IconAlignment, span: u32) -> Cell {
    let align = match alignment {
        IconAlignment::Start => HAlign::Left,
        IconAlignment::Center => HAlign::Center,
        IconAlignment::End => HAlign::Right,
    };

    let mut strip = Row::new();
    for icon in icons {
        let image = icon_image(icon, Property::MarginLeft, Property::MarginRight);
        strip = strip.cell(Cell::default().child(image));
    }

    let mut inner = Table::new(Style::new().with(Property::BorderCollapse, "collapse")).row(strip);
    inner.align = Some(align);

    Cell {
        style: Style::new().with(Property::TextAlign, align.as_attr()),
        align: Some(align),
        col_span: (span > 1).then_some(span),
        content: vec![Node::Table(inner)],
    }
}

fn icon_image(icon: &Asset, before: Property, after: Property) -> Image {
    Image {
        src: icon.url.to_string(),
        alt: icon.alt_text.clone(),
        width: Some(ICON_SIZE),
        style: Style::new()
            .with(Property::Display, "block")
            .with(Property::Width, px(ICON_SIZE))
            .with(before, px(ICON_MARGIN))
            .with(after, px(ICON_MARGIN)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Border, Color};
    use url::Url;

    fn icon(n: usize) -> Asset {
        Asset {
            url: Url::parse(&format!("https://x.test/{}.png", n)).unwrap(),
            alt_text: format!("icon {}", n),
        }
    }

    fn texts(tree: &RenderTree) -> Vec<String> {
        tree.paragraphs().map(|p| p.text.clone()).collect()
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut model = SignatureModel::named("Ada");
        model.icons = vec![icon(1), icon(2)];
        assert_eq!(render(&model), render(&model));
    }

    #[test]
    fn test_text_sizes_derive_from_font_size() {
        let mut model = SignatureModel::named("Ada");
        model.title = "Engineer".into();
        model.company = "Acme".into();
        model.phone = "555".into();
        model.font_size = 16;
        let tree = render(&model);

        let sizes: Vec<_> = tree
            .paragraphs()
            .map(|p| (p.text.as_str(), p.style.px(Property::FontSize).unwrap()))
            .collect();
        assert_eq!(
            sizes,
            vec![("Ada", 16), ("Engineer", 14), ("Acme", 14), ("555", 16)]
        );
        assert_eq!(tree.root.style.px(Property::FontSize), Some(16));
    }

    #[test]
    fn test_name_is_bold() {
        let tree = render(&SignatureModel::named("Ada"));
        let name = tree.paragraphs().next().unwrap();
        assert_eq!(name.style.get(Property::FontWeight), Some("bold"));
    }

    #[test]
    fn test_divider_only_with_contact_details() {
        let mut model = SignatureModel::named("Ada");
        assert_eq!(render(&model).rules().count(), 0);

        model.website = "https://ada.test".into();
        let tree = render(&model);
        assert_eq!(tree.rules().count(), 1);
        assert_eq!(texts(&tree).last().unwrap(), "https://ada.test");
    }

    #[test]
    fn test_empty_contact_rows_omitted() {
        let mut model = SignatureModel::named("Ada");
        model.email = "ada@x.test".into();
        let tree = render(&model);
        // name, title, company, email
        assert_eq!(texts(&tree), vec!["Ada", "", "", "ada@x.test"]);
    }

    #[test]
    fn test_no_border_when_disabled() {
        let mut model = SignatureModel::named("Ada");
        model.phone = "555".into();
        let tree = render(&model);
        assert!(!tree.has_border_declaration());
    }

    #[test]
    fn test_border_when_enabled() {
        let mut model = SignatureModel::named("Ada");
        model.border = Some(Border {
            color: "#ff0000".parse().unwrap(),
            width: 3,
        });
        let tree = render(&model);
        let style = &tree.root.style;
        assert_eq!(style.get(Property::BorderWidth), Some("3px"));
        assert_eq!(style.get(Property::BorderStyle), Some("solid"));
        assert_eq!(style.get(Property::BorderColor), Some("#ff0000"));
    }

    #[test]
    fn test_background_only_when_enabled() {
        let mut model = SignatureModel::named("Ada");
        assert!(!render(&model).root.style.has(Property::BackgroundColor));

        model.background = Some("#eeeeee".parse::<Color>().unwrap());
        assert_eq!(
            render(&model).root.style.get(Property::BackgroundColor),
            Some("#eeeeee")
        );
    }

    #[test]
    fn test_icons_right_share_main_row() {
        let mut model = SignatureModel::named("Ada");
        model.icons = vec![icon(1), icon(2), icon(3)];
        let tree = render(&model);

        assert_eq!(tree.root.rows.len(), 1);
        let cells = &tree.root.rows[0].cells;
        assert_eq!(cells.len(), 2);
        let Node::Table(stack) = &cells[1].content[0] else {
            panic!("expected icon stack table");
        };
        // One icon per row: a vertical stack.
        assert_eq!(stack.rows.len(), 3);
        let Node::Image(first) = &stack.rows[0].cells[0].content[0] else {
            panic!("expected icon image");
        };
        assert_eq!(first.style.get(Property::MarginTop), Some("4px"));
        assert!(!first.style.has(Property::MarginLeft));
    }

    #[test]
    fn test_icons_bottom_span_new_row() {
        let mut model = SignatureModel::named("Ada");
        model.image = Some(icon(0));
        model.icons = vec![icon(1), icon(2)];
        model.icon_layout = IconLayout::Bottom(IconAlignment::End);
        let tree = render(&model);

        assert_eq!(tree.root.rows.len(), 2);
        assert_eq!(tree.root.rows[0].cells.len(), 2);
        let cell = &tree.root.rows[1].cells[0];
        assert_eq!(cell.col_span, Some(2));
        assert_eq!(cell.align, Some(HAlign::Right));
        let Node::Table(strip) = &cell.content[0] else {
            panic!("expected icon strip table");
        };
        assert_eq!(strip.rows.len(), 1);
        assert_eq!(strip.rows[0].cells.len(), 2);
        let Node::Image(first) = &strip.rows[0].cells[0].content[0] else {
            panic!("expected icon image");
        };
        assert_eq!(first.style.get(Property::MarginLeft), Some("4px"));
        assert!(!first.style.has(Property::MarginTop));
    }

    #[test]
    fn test_bottom_row_without_image_has_no_span() {
        let mut model = SignatureModel::named("Ada");
        model.icons = vec![icon(1)];
        model.icon_layout = IconLayout::Bottom(IconAlignment::Start);
        let tree = render(&model);
        assert_eq!(tree.root.rows[1].cells[0].col_span, None);
        assert_eq!(tree.root.rows[1].cells[0].align, Some(HAlign::Left));
    }

    #[test]
    fn test_image_is_leftmost_and_capped() {
        let mut model = SignatureModel::named("Ada");
        model.image = Some(icon(9));
        let tree = render(&model);
        let Node::Image(image) = &tree.root.rows[0].cells[0].content[0] else {
            panic!("expected primary image first");
        };
        assert_eq!(image.src, "https://x.test/9.png");
        assert_eq!(image.style.get(Property::MaxWidth), Some("150px"));
        assert_eq!(image.style.get(Property::MaxHeight), Some("150px"));
    }

    #[test]
    fn test_no_icons_no_icon_cell() {
        let mut model = SignatureModel::named("Ada");
        model.icon_layout = IconLayout::Bottom(IconAlignment::Center);
        let tree = render(&model);
        assert_eq!(tree.root.rows.len(), 1);
        assert_eq!(tree.root.rows[0].cells.len(), 1);
        assert_eq!(tree.images().count(), 0);
    }
}
