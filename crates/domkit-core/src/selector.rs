#![forbid(unsafe_code)]

//! Simple selector parsing for mount-target resolution.
//!
//! Only compound selectors without combinators are understood:
//! `tag`, `#id`, `.class`, and any concatenation such as `div.toast#main`.
//! `*` matches any tag. Anything else (spaces, `>`, attribute brackets)
//! fails to parse, and the caller treats it as "matches nothing".

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a compound selector. Returns `None` for unsupported syntax.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Self::default();
        let mut rest = input;

        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() {
            if tag != "*" && !is_ident(tag) {
                return None;
            }
            if tag != "*" {
                selector.tag = Some(tag.to_ascii_lowercase());
            }
        }
        rest = &rest[tag_end..];

        while let Some(sigil) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return None;
            }
            match sigil {
                '#' => {
                    if selector.id.is_some() {
                        return None;
                    }
                    selector.id = Some(name.to_string());
                }
                '.' => selector.classes.push(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }

        Some(selector)
    }

    /// Test the selector against a node's tag, id attribute, and classes.
    #[must_use]
    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        if self.tag.as_deref().is_some_and(|want| !want.eq_ignore_ascii_case(tag)) {
            return false;
        }
        if self.id.as_deref().is_some_and(|want| id != Some(want)) {
            return false;
        }
        self.classes.iter().all(|c| classes.contains(c))
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
