//! Inline style declarations.
//!
//! Only longhand properties that common email clients keep can be expressed:
//! `Property` is a closed set, so shorthands such as `border` or `margin`
//! cannot end up in the output.

use std::fmt;

/// The CSS properties a render tree may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Width,
    Height,
    MaxWidth,
    MaxHeight,
    Display,
    VerticalAlign,
    TextAlign,
    FontSize,
    FontWeight,
    LineHeight,
    Color,
    BackgroundColor,
    BorderCollapse,
    BorderSpacing,
    BorderWidth,
    BorderStyle,
    BorderColor,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingRight,
    PaddingTop,
    PaddingBottom,
}

impl Property {
    pub fn as_css(self) -> &'static str {
        match self {
            Property::Width => "width",
            Property::Height => "height",
            Property::MaxWidth => "max-width",
            Property::MaxHeight => "max-height",
            Property::Display => "display",
            Property::VerticalAlign => "vertical-align",
            Property::TextAlign => "text-align",
            Property::FontSize => "font-size",
            Property::FontWeight => "font-weight",
            Property::LineHeight => "line-height",
            Property::Color => "color",
            Property::BackgroundColor => "background-color",
            Property::BorderCollapse => "border-collapse",
            Property::BorderSpacing => "border-spacing",
            Property::BorderWidth => "border-width",
            Property::BorderStyle => "border-style",
            Property::BorderColor => "border-color",
            Property::MarginTop => "margin-top",
            Property::MarginRight => "margin-right",
            Property::MarginBottom => "margin-bottom",
            Property::MarginLeft => "margin-left",
            Property::PaddingRight => "padding-right",
            Property::PaddingTop => "padding-top",
            Property::PaddingBottom => "padding-bottom",
        }
    }

    pub fn is_border(self) -> bool {
        matches!(
            self,
            Property::BorderWidth | Property::BorderStyle | Property::BorderColor
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

/// Pixel length, e.g. `px(12)` → `"12px"`.
pub fn px(n: u32) -> String {
    format!("{}px", n)
}

/// An ordered list of declarations. Setting a property twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(Property, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Style::set`].
    pub fn with(mut self, property: Property, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: Property, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((property, value)),
        }
    }

    pub fn get(&self, property: Property) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, property: Property) -> bool {
        self.get(property).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &str)> {
        self.declarations.iter().map(|(p, v)| (*p, v.as_str()))
    }

    /// Pixel value of a `NNpx` declaration.
    pub fn px(&self, property: Property) -> Option<u32> {
        self.get(property)?.strip_suffix("px")?.parse().ok()
    }

    /// Serialized declaration list: `font-size:12px;font-weight:bold`.
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}:{}", p.as_css(), v))
            .collect::<Vec<_>>()
            .join(";")
    }
}
