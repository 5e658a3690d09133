//! HTML output factory.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::RenderFactory;

/// Elements that take no closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

/// Renders evaluated content as escaped HTML strings.
///
/// Text runs go through entity escaping and attribute values through
/// double-quote escaping, so authored content cannot smuggle markup into
/// the output.
pub struct HtmlFactory;

impl RenderFactory for HtmlFactory {
    type Output = String;

    fn element(
        &self,
        tag: &str,
        attrs: &BTreeMap<String, String>,
        children: Vec<String>,
    ) -> String {
        let mut out = String::with_capacity(16 + children.iter().map(String::len).sum::<usize>());
        out.push('<');
        out.push_str(tag);
        for (name, value) in attrs {
            if value.is_empty() {
                write!(out, " {name}").ok();
            } else {
                write!(
                    out,
                    " {name}=\"{}\"",
                    html_escape::encode_double_quoted_attribute(value)
                )
                .ok();
            }
        }

        if VOID_TAGS.contains(&tag) {
            out.push_str(" />");
            return out;
        }

        out.push('>');
        for child in children {
            out.push_str(&child);
        }
        write!(out, "</{tag}>").ok();
        out
    }

    fn text(&self, value: &str) -> String {
        html_escape::encode_text(value).into_owned()
    }
}
