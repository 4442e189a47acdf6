//! Attribute patching for an adopted element.

use super::PatchStats;
use crate::dom::{Dom, DomId};
use crate::types::Attrs;

/// Tags whose `value` attribute mirrors a live, user-editable property.
pub const FORM_CONTROLS: &[&str] = &["input", "textarea", "select"];

pub fn is_form_control(tag: &str) -> bool {
    FORM_CONTROLS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Bring the attributes of live `node` from `old` to `new`.
///
/// - new or changed values are set
/// - `src` is always re-set so animated/cache-busted resources restart
/// - `value` on a form control is left alone while it has focus; otherwise
///   both the live property and the attribute are compared against the
///   document, so a write skipped under focus lands once focus is gone
/// - values only present in `old` are removed
pub(crate) fn patch<D: Dom + ?Sized>(
    dom: &mut D,
    node: DomId,
    tag: &str,
    old: &Attrs,
    new: &Attrs,
    stats: &mut PatchStats,
) {
    let before = old.serialized();
    let after = new.serialized();
    let control = is_form_control(tag);

    for (name, value) in &after {
        if control && name == "value" {
            patch_value(dom, node, value, stats);
            continue;
        }
        if before.get(name) != Some(value) || name == "src" {
            dom.set_attribute(node, name, value);
            stats.attrs_set += 1;
        }
    }

    for name in before.keys() {
        if !after.contains_key(name) {
            dom.remove_attribute(node, name);
            stats.attrs_removed += 1;
        }
    }
}

fn patch_value<D: Dom + ?Sized>(dom: &mut D, node: DomId, value: &str, stats: &mut PatchStats) {
    let live_differs = dom.value(node).as_deref() != Some(value);
    let attr_differs = dom.attribute(node, "value").as_deref() != Some(value);

    if dom.is_focused(node) {
        if live_differs || attr_differs {
            stats.values_skipped += 1;
        }
        return;
    }
    if live_differs {
        dom.set_value(node, value);
        stats.values_forced += 1;
    }
    if attr_differs {
        dom.set_attribute(node, "value", value);
        stats.attrs_set += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Mutation};

    fn attrs(pairs: &[(&str, &str)]) -> Attrs {
        let mut a = Attrs::new();
        for (k, v) in pairs {
            a.set(*k, *v);
        }
        a
    }

    #[test]
    fn test_set_change_remove() {
        let mut dom = MemoryDom::new();
        let div = dom.create_element("div");
        dom.clear_mutations();
        let mut stats = PatchStats::default();

        patch(
            &mut dom,
            div,
            "div",
            &attrs(&[("title", "a"), ("lang", "en")]),
            &attrs(&[("title", "b"), ("role", "main")]),
            &mut stats,
        );

        assert_eq!(stats.attrs_set, 2);
        assert_eq!(stats.attrs_removed, 1);
        assert!(dom.mutations().contains(&Mutation::RemoveAttribute {
            node: div,
            name: "lang".to_string()
        }));
    }

    #[test]
    fn test_unchanged_is_silent() {
        let mut dom = MemoryDom::new();
        let div = dom.create_element("div");
        dom.clear_mutations();
        let mut stats = PatchStats::default();
        let same = attrs(&[("title", "a")]);
        patch(&mut dom, div, "div", &same, &same, &mut stats);
        assert!(dom.mutations().is_empty());
        assert!(stats.is_clean());
    }

    #[test]
    fn test_src_always_reset() {
        let mut dom = MemoryDom::new();
        let img = dom.create_element("img");
        dom.clear_mutations();
        let mut stats = PatchStats::default();
        let same = attrs(&[("src", "/spinner.gif")]);
        patch(&mut dom, img, "img", &same, &same, &mut stats);
        assert_eq!(dom.mutations().len(), 1);
    }

    #[test]
    fn test_focused_value_untouched() {
        let mut dom = MemoryDom::new();
        let input = dom.create_element("input");
        let body = dom.body();
        dom.append_child(body, input);
        dom.set_attribute(input, "value", "a");
        dom.focus(input);
        dom.type_value(input, "ab");
        dom.clear_mutations();

        let mut stats = PatchStats::default();
        patch(
            &mut dom,
            input,
            "input",
            &attrs(&[("value", "a")]),
            &attrs(&[("value", "b")]),
            &mut stats,
        );
        assert_eq!(dom.value(input).as_deref(), Some("ab"));
        assert!(dom.mutations().is_empty());
        assert_eq!(stats.values_skipped, 1);
    }

    #[test]
    fn test_blurred_value_forced() {
        let mut dom = MemoryDom::new();
        let input = dom.create_element("input");
        dom.set_attribute(input, "value", "a");
        dom.type_value(input, "drifted");
        dom.clear_mutations();

        let mut stats = PatchStats::default();
        let same = attrs(&[("value", "a")]);
        patch(&mut dom, input, "input", &same, &same, &mut stats);
        assert_eq!(dom.value(input).as_deref(), Some("a"));
        assert_eq!(stats.values_forced, 1);
        assert_eq!(stats.attrs_set, 0);
    }

    #[test]
    fn test_value_skipped_under_focus_lands_after_blur() {
        let mut dom = MemoryDom::new();
        let input = dom.create_element("input");
        let body = dom.body();
        dom.append_child(body, input);
        dom.set_attribute(input, "value", "a");
        dom.focus(input);

        let mut stats = PatchStats::default();
        let a = attrs(&[("value", "a")]);
        let b = attrs(&[("value", "b")]);
        patch(&mut dom, input, "input", &a, &b, &mut stats);
        assert_eq!(dom.attribute(input, "value").as_deref(), Some("a"));

        dom.blur();
        let mut stats = PatchStats::default();
        patch(&mut dom, input, "input", &b, &b, &mut stats);
        assert_eq!(dom.attribute(input, "value").as_deref(), Some("b"));
        assert_eq!(dom.value(input).as_deref(), Some("b"));
        assert_eq!(stats.attrs_set, 1);
    }
}
