//! Query selectors for the lookup helper.
//!
//! Supports compound selectors (`input`, `#name`, `.row`, `li.item.active`)
//! joined by the descendant combinator (`ul.menu li.active`).

use crate::selector::{is_name_char, Shorthand};

/// One compound part: optional tag plus shorthand tail.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    tail: Shorthand,
}

/// Parsed query selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySelector {
    parts: Vec<Compound>,
}

impl QuerySelector {
    /// Parse a query. Returns `None` for anything outside the supported subset.
    pub fn parse(selector: &str) -> Option<Self> {
        let parts = selector
            .split_whitespace()
            .map(parse_compound)
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(Self { parts })
    }

    /// Test an element against the selector.
    ///
    /// `ancestors` yields `(tag, id, class)` for each ancestor element, nearest
    /// first.
    pub fn matches<'a>(
        &self,
        element: ElementView<'a>,
        ancestors: impl Iterator<Item = ElementView<'a>>,
    ) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !compound_matches(last, &element) {
            return false;
        }
        let mut pending = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match pending.peek() {
                Some(part) if compound_matches(part, &ancestor) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }
}

/// Borrowed view of an element's identity for matching.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    pub tag: &'a str,
    pub id: Option<&'a str>,
    pub class: Option<&'a str>,
}

fn parse_compound(part: &str) -> Option<Compound> {
    let split = part.find(['#', '.']).unwrap_or(part.len());
    let (tag, tail) = part.split_at(split);
    if !tag.chars().all(is_name_char) {
        return None;
    }
    let tail = Shorthand::parse(tail).ok()?;
    let tag = (!tag.is_empty()).then(|| tag.to_ascii_lowercase());
    if tag.is_none() && tail == Shorthand::default() {
        return None;
    }
    Some(Compound { tag, tail })
}

fn compound_matches(part: &Compound, el: &ElementView<'_>) -> bool {
    if let Some(tag) = &part.tag {
        if !tag.eq_ignore_ascii_case(el.tag) {
            return false;
        }
    }
    if let Some(id) = &part.tail.id {
        if el.id != Some(id.as_str()) {
            return false;
        }
    }
    let classes = el.class.unwrap_or_default();
    part.tail
        .classes
        .iter()
        .all(|wanted| classes.split_whitespace().any(|c| c == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(tag: &'a str, id: Option<&'a str>, class: Option<&'a str>) -> ElementView<'a> {
        ElementView { tag, id, class }
    }

    #[test]
    fn test_compound_match() {
        let q = QuerySelector::parse("li.item.active").unwrap();
        assert!(q.matches(view("li", None, Some("active item")), std::iter::empty()));
        assert!(!q.matches(view("li", None, Some("item")), std::iter::empty()));
        assert!(!q.matches(view("div", None, Some("item active")), std::iter::empty()));
    }

    #[test]
    fn test_id_match() {
        let q = QuerySelector::parse("#name").unwrap();
        assert!(q.matches(view("input", Some("name"), None), std::iter::empty()));
        assert!(!q.matches(view("input", Some("other"), None), std::iter::empty()));
    }

    #[test]
    fn test_descendant_match() {
        let q = QuerySelector::parse("ul.menu li").unwrap();
        let ancestors = [view("div", None, None), view("ul", None, Some("menu"))];
        assert!(q.matches(view("li", None, None), ancestors.into_iter()));
        let ancestors = [view("ul", None, None)];
        assert!(!q.matches(view("li", None, None), ancestors.into_iter()));
    }

    #[test]
    fn test_unsupported() {
        assert!(QuerySelector::parse("").is_none());
        assert!(QuerySelector::parse("a > b").is_none());
        assert!(QuerySelector::parse("a[href]").is_none());
    }
}
