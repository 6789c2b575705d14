//! SVG export: the XHTML fragment wrapped in a `<foreignObject>`, sized to
//! the measured layout.

use super::layout::Layout;
use crate::render::RenderTree;

pub fn to_svg(tree: &RenderTree, layout: &Layout) -> String {
    let (w, h) = (layout.width, layout.height);
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<foreignObject x="0" y="0" width="100%" height="100%">"#,
            r#"<div xmlns="http://www.w3.org/1999/xhtml">{body}</div>"#,
            "</foreignObject></svg>"
        ),
        w = w,
        h = h,
        body = tree.to_xhtml()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ImageSet;
    use crate::export::layout::layout;
    use crate::model::SignatureModel;
    use crate::render::render;

    #[test]
    fn test_svg_wraps_xhtml() {
        let tree = render(&SignatureModel::named("Ada"));
        let layout = layout(&tree, &ImageSet::new());
        let svg = to_svg(&tree, &layout);

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="34" height="31""#));
        assert!(svg.contains(&tree.to_xhtml()));
        assert!(svg.ends_with("</div></foreignObject></svg>"));
    }
}
