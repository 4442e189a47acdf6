//! Shorthand selectors (`#id.class.class2`).
//!
//! Element constructors accept a shorthand string that expands to `id` and
//! `class` attributes. The same grammar forms the id/class tail of a compound
//! query selector.

use crate::error::BuildError;

/// Parsed `#id.class` shorthand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shorthand {
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Shorthand {
    /// Parse a shorthand selector. An empty (or all-whitespace) string is valid
    /// and yields no attributes.
    pub fn parse(input: &str) -> Result<Self, BuildError> {
        let trimmed = input.trim();
        let mut out = Self::default();
        if trimmed.is_empty() {
            return Ok(out);
        }

        let fail = |reason| BuildError::Selector {
            selector: input.to_string(),
            reason,
        };

        let mut segments: Vec<(char, &str)> = Vec::new();
        let mut open: Option<(char, usize)> = None;
        for (i, c) in trimmed.char_indices() {
            if c == '#' || c == '.' {
                if let Some((sigil, start)) = open {
                    segments.push((sigil, &trimmed[start..i]));
                }
                open = Some((c, i + c.len_utf8()));
            } else if open.is_none() {
                return Err(fail("must start with `#` or `.`"));
            } else if !is_name_char(c) {
                return Err(fail("illegal character"));
            }
        }
        if let Some((sigil, start)) = open {
            segments.push((sigil, &trimmed[start..]));
        }

        for (sigil, name) in segments {
            if name.is_empty() {
                return Err(fail("empty segment"));
            }
            if sigil == '#' {
                if out.id.is_some() {
                    return Err(fail("more than one id"));
                }
                out.id = Some(name.to_string());
            } else {
                out.classes.push(name.to_string());
            }
        }
        Ok(out)
    }

    /// Render back to CSS form, id first.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(id) = &self.id {
            css.push('#');
            css.push_str(id);
        }
        for class in &self.classes {
            css.push('.');
            css.push_str(class);
        }
        css
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
