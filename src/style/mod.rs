//! Style Registrar - inline style setters and scoped rules.
//!
//! Inline setters write into the current element's style mapping:
//!
//! ```ignore
//! element("div", ".panel", || {
//!     width(320);          // width: 320px
//!     opacity(0.5);        // opacity: 0.5
//!     style("cursor", "pointer");
//! });
//! ```
//!
//! [`css_rule`] composes a selector from the open elements and queues a
//! stylesheet rule instead:
//!
//! ```ignore
//! element("div", ".card", || {
//!     css_rule(":hover", || background("#eee"));   // div.card:hover { background: #eee }
//! });
//! ```

mod sheet;

pub use sheet::{StyleRule, StyleSheet};

use crate::builder::with_context;
use crate::types::serialize_style;

/// Properties whose bare numbers are lengths in pixels.
pub const PX_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "top",
    "right",
    "bottom",
    "left",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-radius",
    "font-size",
];

/// A style value before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    Text(String),
    Number(f64),
}

impl CssValue {
    /// Serialize for `property`: numbers get `px` on box-model properties.
    pub fn to_css(&self, property: &str) -> String {
        match self {
            CssValue::Text(text) => text.clone(),
            CssValue::Number(n) if PX_PROPERTIES.contains(&property) => format!("{n}px"),
            CssValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Text(value.to_string())
    }
}

impl From<String> for CssValue {
    fn from(value: String) -> Self {
        CssValue::Text(value)
    }
}

macro_rules! number_css {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CssValue {
                fn from(value: $t) -> Self {
                    CssValue::Number(value as f64)
                }
            }
        )*
    };
}

number_css!(i32, i64, u16, u32, u64, usize, f32, f64);

/// Set a style property on the current element (or active rule).
///
/// # Panics
///
/// Outside of a build, or with no open element and no active rule.
pub fn style(property: &str, value: impl Into<CssValue>) {
    let value = value.into().to_css(property);
    with_context("style", |ctx| ctx.write_style("style", property, value));
}

/// Remove a style property; the mapping disappears once empty.
pub fn unset_style(property: &str) {
    with_context("unset_style", |ctx| ctx.remove_style("unset_style", property));
}

/// Queue a scoped rule for the open element chain.
///
/// A `suffix` starting with `:` attaches to the innermost selector, `&` is
/// replaced by it, and anything else selects descendants. Style writes inside
/// `f` go to the rule body. Rules with an empty body are dropped.
pub fn css_rule(suffix: &str, f: impl FnOnce()) {
    let selector = with_context("css_rule", |ctx| {
        ctx.begin_rule();
        compose_selector(&ctx.selector_chain(), suffix)
    });
    f();
    with_context("css_rule", |ctx| {
        let bag = ctx.end_rule();
        if !bag.is_empty() {
            ctx.queue_rule(StyleRule::new(selector, serialize_style(&bag)));
        }
    });
}

/// Join an ancestor chain and a rule suffix into one selector.
pub fn compose_selector(chain: &[String], suffix: &str) -> String {
    let base = chain.join(" ");
    let suffix = suffix.trim();
    if let Some(rest) = suffix.strip_prefix('&') {
        return format!("{base}{rest}");
    }
    match (base.is_empty(), suffix) {
        (true, _) => suffix.to_string(),
        (false, "") => base,
        (false, s) if s.starts_with(':') => format!("{base}{s}"),
        (false, s) => format!("{base} {s}"),
    }
}

macro_rules! style_setters {
    ($($name:ident => $property:literal),* $(,)?) => {
        $(
            #[doc = concat!("Set `", $property, "` on the current element.")]
            pub fn $name(value: impl Into<CssValue>) {
                style($property, value);
            }
        )*
    };
}

style_setters! {
    width => "width",
    height => "height",
    min_width => "min-width",
    min_height => "min-height",
    max_width => "max-width",
    max_height => "max-height",
    top => "top",
    right => "right",
    bottom => "bottom",
    left => "left",
    margin => "margin",
    margin_top => "margin-top",
    margin_bottom => "margin-bottom",
    padding => "padding",
    padding_left => "padding-left",
    padding_right => "padding-right",
    border => "border",
    border_radius => "border-radius",
    color => "color",
    background => "background",
    display => "display",
    position => "position",
    overflow => "overflow",
    opacity => "opacity",
    cursor => "cursor",
    font_size => "font-size",
    font_weight => "font-weight",
    line_height => "line-height",
    text_align => "text-align",
    z_index => "z-index",
}
