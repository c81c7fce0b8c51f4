/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! The small CSS selector subset the detectors need.
//!
//! Selectors are plain data so the detector tables can be `const`. A browser
//! host renders them with `Display` and hands them to `querySelector`; other
//! hosts evaluate them with [`Selector::matches`].

use crate::dom::PageElement;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Every element: `*`.
    Any,
    /// `video`
    Tag(&'static str),
    /// `.ad-container`
    Class(&'static str),
    /// `[class*="ad-"]`, or `button[class*="ad"]` with a tag.
    AttrContains {
        tag: Option<&'static str>,
        attr: &'static str,
        value: &'static str,
    },
    /// `.ancestor descendant`
    Descendant(&'static Selector, &'static Selector),
}

impl Selector {
    /// `[attr*="value"]` without a tag constraint.
    pub const fn attr_contains(attr: &'static str, value: &'static str) -> Self {
        Selector::AttrContains {
            tag: None,
            attr,
            value,
        }
    }

    /// `tag[attr*="value"]`.
    pub const fn tag_attr_contains(
        tag: &'static str,
        attr: &'static str,
        value: &'static str,
    ) -> Self {
        Selector::AttrContains {
            tag: Some(tag),
            attr,
            value,
        }
    }

    /// Whether `element` matches, using the same rules as the browser for
    /// this subset: tags compare case-insensitively, classes compare as whole
    /// tokens, attribute substrings are case-sensitive.
    pub fn matches<E: PageElement>(&self, element: &E) -> bool {
        match self {
            Selector::Any => true,
            Selector::Tag(tag) => element.tag_name().eq_ignore_ascii_case(tag),
            Selector::Class(class) => element.has_class(class),
            Selector::AttrContains { tag, attr, value } => {
                if let Some(tag) = tag {
                    if !element.tag_name().eq_ignore_ascii_case(tag) {
                        return false;
                    }
                }
                element
                    .attribute(attr)
                    .is_some_and(|actual| actual.contains(value))
            }
            Selector::Descendant(ancestor, target) => {
                if !target.matches(element) {
                    return false;
                }
                let mut current = element.parent();
                while let Some(node) = current {
                    if ancestor.matches(&node) {
                        return true;
                    }
                    current = node.parent();
                }
                false
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Any => write!(f, "*"),
            Selector::Tag(tag) => write!(f, "{tag}"),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::AttrContains { tag, attr, value } => {
                if let Some(tag) = tag {
                    write!(f, "{tag}")?;
                }
                write!(f, "[{attr}*=\"{value}\"]")
            }
            Selector::Descendant(ancestor, target) => write!(f, "{ancestor} {target}"),
        }
    }
}
