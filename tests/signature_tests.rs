//! # Signature Pipeline Tests
//!
//! End-to-end checks of form → validation → model → render tree → output,
//! through the public API only.

use pretty_assertions::assert_eq;
use signet::export::{self, ExportFormat, ImageSet, StaticImageSource, resolve_images};
use signet::form::{AssetInput, Field, FieldError, FormController, SignatureForm, validate};
use signet::model::{IconAlignment, IconLayout};
use signet::render::{HAlign, Node, Property, RenderTree, render};
use signet::sanitize::survives_sanitization;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn jaden_drury() -> SignatureForm {
    SignatureForm {
        name: "Jaden Drury".into(),
        title: "Engineer".into(),
        company: "Acme".into(),
        phone: "555-0100".into(),
        email: String::new(),
        website: String::new(),
        image: vec![],
        icons: vec![AssetInput::new("https://x.test/i.png", "icon")],
        icon_position: "right".into(),
        include_background: false,
        include_border: false,
        font_size: "12".into(),
        ..Default::default()
    }
}

fn render_form(form: &SignatureForm) -> RenderTree {
    render(&form.to_model().expect("form should be valid"))
}

fn text_sizes(tree: &RenderTree) -> Vec<(String, u32)> {
    tree.paragraphs()
        .filter(|p| !p.text.is_empty())
        .map(|p| (p.text.clone(), p.style.px(Property::FontSize).unwrap()))
        .collect()
}

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_jaden_drury_end_to_end() {
    let form = jaden_drury();
    assert!(validate(&form).is_empty());

    let tree = render_form(&form);

    assert_eq!(
        text_sizes(&tree),
        vec![
            ("Jaden Drury".to_string(), 12),
            ("Engineer".to_string(), 10),
            ("Acme".to_string(), 10),
            ("555-0100".to_string(), 12),
        ]
    );

    let name = tree.paragraphs().next().unwrap();
    assert_eq!(name.style.get(Property::FontWeight), Some("bold"));
    assert_eq!(tree.rules().count(), 1);

    // Details cell plus exactly one trailing icon cell, all in one row.
    assert_eq!(tree.root.rows.len(), 1);
    assert_eq!(tree.root.rows[0].cells.len(), 2);
    assert_eq!(tree.images().count(), 1);

    assert!(!tree.has_border_declaration());
    assert!(!tree.root.style.has(Property::BackgroundColor));
}

#[test]
fn test_jaden_drury_outputs() {
    let tree = render_form(&jaden_drury());

    assert_eq!(tree.to_plain_text(), "Jaden Drury\nEngineer\nAcme\n555-0100");

    let html = tree.to_html();
    assert!(html.contains(r#"<img src="https://x.test/i.png" alt="icon" width="25""#));
    assert!(survives_sanitization(&html));
}

#[test]
fn test_render_is_deterministic() {
    let form = jaden_drury();
    assert_eq!(render_form(&form), render_form(&form));
    assert_eq!(render_form(&form).to_html(), render_form(&form).to_html());
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_missing_name_is_single_error() {
    let form = SignatureForm {
        name: String::new(),
        ..jaden_drury()
    };
    let errors = validate(&form);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("name"), Some(&FieldError::EmptyField));
}

#[test]
fn test_disabled_border_ignores_stored_values() {
    let form = SignatureForm {
        include_border: false,
        border_color: "not a color".into(),
        border_width: "wide".into(),
        ..jaden_drury()
    };
    assert!(validate(&form).is_empty());
    assert!(!render_form(&form).has_border_declaration());
}

#[test]
fn test_oversized_numbers_are_capped_before_export() {
    let form = SignatureForm {
        font_size: "4294967295".into(),
        include_border: true,
        border_color: "#000".into(),
        border_width: "3000000000".into(),
        ..jaden_drury()
    };
    assert!(validate(&form).is_empty());

    let model = form.to_model().unwrap();
    assert_eq!(model.font_size, 72);
    assert_eq!(model.border.as_ref().unwrap().width, 20);

    let tree = render(&model);
    assert!(export::export(&tree, ExportFormat::Svg, &ImageSet::new()).is_ok());
    assert!(export::export(&tree, ExportFormat::Png, &ImageSet::new()).is_ok());
}

#[test]
fn test_non_web_icon_url_is_rejected() {
    let form = SignatureForm {
        icons: vec![AssetInput::new("ftp://x.test/i.png", "icon")],
        ..jaden_drury()
    };
    assert_eq!(validate(&form).get("icons.0.url"), Some(&FieldError::InvalidUrl));

    // Markup carrying such a URL is reported as altered by the sanitizer.
    let html = render_form(&jaden_drury())
        .to_html()
        .replace("https://x.test/i.png", "ftp://x.test/i.png");
    assert!(!survives_sanitization(&html));
}

#[test]
fn test_svg_escapes_markup_in_alt_text() {
    let form = SignatureForm {
        icons: vec![AssetInput::new("https://x.test/i.png", "a<b")],
        ..jaden_drury()
    };
    let svg = String::from_utf8(
        export::export(&render_form(&form), ExportFormat::Svg, &ImageSet::new()).unwrap(),
    )
    .unwrap();
    assert!(svg.contains(r#"alt="a&lt;b""#));
    assert!(!svg.contains("a<b"));
}

#[test]
fn test_bottom_icons_get_spanning_row() {
    let form = SignatureForm {
        image: vec![AssetInput::new("https://x.test/me.png", "me")],
        icon_position: "bottom".into(),
        icon_alignment: "start".into(),
        ..jaden_drury()
    };
    let model = form.to_model().unwrap();
    assert_eq!(model.icon_layout, IconLayout::Bottom(IconAlignment::Start));

    let tree = render(&model);
    assert_eq!(tree.root.rows.len(), 2);
    let icons = &tree.root.rows[1].cells[0];
    assert_eq!(icons.col_span, Some(2));
    assert_eq!(icons.align, Some(HAlign::Left));
    assert!(matches!(icons.content[0], Node::Table(_)));
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[test]
fn test_controller_blur_clamps_without_error() {
    let mut controller = FormController::with_form(jaden_drury());

    controller.change(Field::FontSize, "").unwrap();
    controller.blur(Field::FontSize);
    assert_eq!(controller.form().font_size, "12");
    assert!(controller.errors().is_empty());

    controller.change(Field::FontSize, "4").unwrap();
    controller.blur(Field::FontSize);
    assert_eq!(controller.form().font_size, "10");
    assert!(controller.errors().is_empty());
    assert_eq!(controller.committed().unwrap().font_size, 10);
}

#[test]
fn test_controller_never_exports_invalid_candidate() {
    let mut controller = FormController::with_form(jaden_drury());
    assert!(controller.can_export());

    controller.change(Field::Name, "").unwrap();
    controller.blur(Field::Name);
    assert!(!controller.can_export());
    assert!(controller.committed().is_none());
    assert!(controller.visible_errors().contains("name"));
}

// ============================================================================
// EXPORTS
// ============================================================================

#[tokio::test]
async fn test_raster_exports_decode() {
    let tree = render_form(&jaden_drury());
    let source = StaticImageSource::new().with(
        "https://x.test/i.png",
        image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            50,
            50,
            image::Rgba([0, 128, 255, 255]),
        )),
    );
    let images = resolve_images(&tree, &source).await;
    assert_eq!(images.len(), 1);

    let png = export::export(&tree, ExportFormat::Png, &images).unwrap();
    let jpeg = export::export(&tree, ExportFormat::Jpeg, &images).unwrap();

    let png = image::load_from_memory(&png).unwrap();
    let jpeg = image::load_from_memory(&jpeg).unwrap();
    assert_eq!(
        (png.width(), png.height()),
        (jpeg.width(), jpeg.height())
    );
    assert!(png.width() > 25);
}

#[test]
fn test_svg_export_is_sized_document() {
    let tree = render_form(&jaden_drury());
    let svg = String::from_utf8(export::export(&tree, ExportFormat::Svg, &ImageSet::new()).unwrap())
        .unwrap();

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains("<foreignObject"));
    assert!(svg.contains("Jaden Drury"));
    assert!(svg.ends_with("</svg>"));
    // Void elements are self-closed inside the XML document.
    assert!(svg.contains("width=\"25\" style=\"display:block;width:25px;margin-top:4px;margin-bottom:4px\" />"));
}
