//! Props - attributes given up front to an element constructor.

use std::collections::BTreeMap;

use crate::events::{handler, Event, Handler};
use crate::style::CssValue;
use crate::types::{AttrValue, Attrs};

/// Attributes, inline styles and handlers for [`element_with`](super::element_with).
///
/// ```ignore
/// element_with("a", ".nav", Props::new().attr("href", "/inbox").on("click", track), || {
///     text("Inbox");
/// });
/// ```
#[derive(Clone, Default)]
pub struct Props {
    pub(crate) attrs: Attrs,
    pub(crate) handlers: BTreeMap<String, Handler>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.attrs.add_class(class);
        self
    }

    pub fn style(mut self, property: &str, value: impl Into<CssValue>) -> Self {
        let value = value.into().to_css(property);
        self.attrs.set_style(property, value);
        self
    }

    pub fn on<F>(mut self, event: &str, f: F) -> Self
    where
        F: Fn(&Event) -> anyhow::Result<()> + 'static,
    {
        self.handlers.insert(event.to_string(), handler(f));
        self
    }

    pub fn handler(mut self, event: &str, handler: Handler) -> Self {
        self.handlers.insert(event.to_string(), handler);
        self
    }
}
