//! Email-client sanitizer check.
//!
//! Webmail clients run pasted HTML through an allow-list sanitizer. This
//! module approximates the strict end of that range with `ammonia`: table
//! markup, paragraphs, divs and images only, inline longhand styles only.
//! A signature that survives it unchanged will render the same after paste.

use ammonia::Builder;
use std::borrow::Cow;
use std::collections::HashSet;

/// Style properties an email client keeps.
const ALLOWED_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "max-width",
    "max-height",
    "display",
    "vertical-align",
    "text-align",
    "font-size",
    "font-weight",
    "line-height",
    "color",
    "background-color",
    "border-collapse",
    "border-spacing",
    "border-width",
    "border-style",
    "border-color",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

const FORBIDDEN_SUBSTRINGS: [&str; 5] = [
    "expression(",
    "javascript:",
    "url(",
    "@import",
    "-moz-binding",
];

fn build_sanitizer() -> Builder<'static> {
    let mut builder = Builder::default();

    builder.tags(HashSet::from([
        "table", "tbody", "tr", "td", "p", "div", "img",
    ]));
    builder.generic_attributes(HashSet::from(["style"]));
    builder.add_tag_attributes("table", &["align"]);
    builder.add_tag_attributes("td", &["align", "valign", "colspan"]);
    builder.add_tag_attributes("img", &["src", "alt", "width", "height"]);
    builder.url_schemes(HashSet::from(["http", "https", "data"]));

    builder.attribute_filter(|_element, attribute, value| {
        if attribute.eq_ignore_ascii_case("style") {
            filter_style(value).map(Cow::Owned)
        } else {
            Some(Cow::Borrowed(value))
        }
    });

    builder
}

/// Keep only allow-listed declarations, in order.
fn filter_style(value: &str) -> Option<String> {
    let kept: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty() && is_allowed_declaration(decl))
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(";"))
    }
}

fn is_allowed_declaration(decl: &str) -> bool {
    let lower = decl.to_ascii_lowercase();
    if FORBIDDEN_SUBSTRINGS.iter().any(|needle| lower.contains(needle)) {
        return false;
    }
    match lower.split_once(':') {
        Some((property, _)) => ALLOWED_PROPERTIES.contains(&property.trim()),
        None => false,
    }
}

/// Sanitize `html` the way a strict email client would.
pub fn sanitize(html: &str) -> String {
    build_sanitizer().clean(html).to_string()
}

/// Whether every element, attribute and inline style declaration in `html`
/// survives [`sanitize`].
pub fn survives_sanitization(html: &str) -> bool {
    let cleaned = sanitize(html);
    cleaned == html || fingerprint(&cleaned) == fingerprint(html)
}

/// An opening tag with its attributes, sorted by name, values decoded.
type TagPrint = (String, Vec<(String, String)>);

/// Opening tags in document order.
///
/// Serializers disagree on quoting and on which characters they escape in
/// attribute values, so values are compared after entity decoding.
fn fingerprint(html: &str) -> Vec<TagPrint> {
    let mut tags = Vec::new();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' || !chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
            continue;
        }
        let name = take_while(&mut chars, |c| !c.is_whitespace() && c != '/' && c != '>');
        let mut attrs = Vec::new();

        loop {
            while chars.next_if(|c| c.is_whitespace() || *c == '/').is_some() {}
            match chars.peek() {
                None => break,
                Some('>') => {
                    chars.next();
                    break;
                }
                Some(_) => {}
            }
            let attr = take_while(&mut chars, |c| {
                !c.is_whitespace() && c != '=' && c != '>' && c != '/'
            });
            let value = if chars.next_if_eq(&'=').is_some() {
                match chars.next_if(|c| *c == '"' || *c == '\'') {
                    Some(quote) => {
                        let v = take_while(&mut chars, |c| c != quote);
                        chars.next();
                        v
                    }
                    None => take_while(&mut chars, |c| !c.is_whitespace() && c != '>'),
                }
            } else {
                String::new()
            };
            attrs.push((attr.to_ascii_lowercase(), decode_entities(&value)));
        }

        attrs.sort();
        tags.push((name.to_ascii_lowercase(), attrs));
    }

    tags
}

fn take_while(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    keep: impl Fn(char) -> bool,
) -> String {
    let mut out = String::new();
    while let Some(c) = chars.next_if(|c| keep(*c)) {
        out.push(c);
    }
    out
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
