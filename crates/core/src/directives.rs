//! Admonition directives.
//!
//! Authors write directives in three forms:
//!
//! ```text
//! :::note[Optional Title]      container (block, with body)
//! body
//! :::
//!
//! ::caution[Heads up]          leaf (block, no body)
//!
//! See :tip[the syllabus].      text (inline)
//! ```
//!
//! markdown-rs does not parse directive syntax natively, so a line-level
//! rewriter converts all three forms into an internal `<cf-directive>` JSX
//! element before parsing. After lowering, [`apply_admonitions`] maps the
//! five recognized names onto styled elements; unrecognized names stay
//! directive nodes and render unclassed.

use std::fmt::Write as _;

use crate::code_fence::FenceTracker;
use crate::document::{DocNode, attrs};

/// Internal element name produced by the rewriter.
pub const DIRECTIVE_TAG: &str = "cf-directive";

/// Fixed name → CSS class table for the supported admonition kinds.
pub const ADMONITION_CLASSES: &[(&str, &str)] = &[
    ("note", "admonition admonition-note"),
    ("tip", "admonition admonition-tip"),
    ("danger", "admonition admonition-danger"),
    ("info", "admonition admonition-info"),
    ("caution", "admonition admonition-caution"),
];

/// Look up the CSS class for a directive name.
pub fn admonition_class(name: &str) -> Option<&'static str> {
    ADMONITION_CLASSES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, class)| *class)
}

/// Parsed opening of a block-form directive line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Lowercased directive name.
    pub name: String,
    /// Optional title captured from bracket syntax `[...]`.
    pub title: Option<String>,
    /// True for the leaf form (`::name`, no body).
    pub leaf: bool,
}

impl DirectiveOpening {
    fn to_open_tag(&self) -> String {
        let mut tag = format!("<{} name=\"{}\" form=\"block\"", DIRECTIVE_TAG, self.name);
        if let Some(title) = self.title.as_ref() {
            write!(tag, " title=\"{}\"", title.replace('"', "&quot;")).ok();
        }
        if self.leaf {
            tag.push_str(" />");
        } else {
            tag.push('>');
        }
        tag
    }
}

/// Parse a container opening line like `:::note[Title]`.
///
/// Any non-empty alphabetic name is accepted; unknown names are carried
/// through so the tree transform can pass them along unclassed.
pub fn parse_container_opening(line: &str) -> Option<DirectiveOpening> {
    let rest = line.trim_start().strip_prefix(":::")?;
    parse_directive_head(rest, false)
}

/// Parse a leaf line like `::caution[Heads up]`.
pub fn parse_leaf_directive(line: &str) -> Option<DirectiveOpening> {
    let trimmed = line.trim_start();
    if trimmed.starts_with(":::") {
        return None;
    }
    parse_directive_head(trimmed.strip_prefix("::")?, true)
}

/// Check if a line closes the innermost container (`:::`).
pub fn is_container_closer(line: &str) -> bool {
    line.trim() == ":::"
}

fn parse_directive_head(rest: &str, leaf: bool) -> Option<DirectiveOpening> {
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if name.is_empty() {
        return None;
    }

    let after_name = &rest[name.len()..];
    let (title, after_title) = match after_name.strip_prefix('[') {
        Some(bracketed) => {
            let end = bracketed.find(']')?;
            (Some(bracketed[..end].to_string()), &bracketed[end + 1..])
        }
        None => (None, after_name),
    };

    // Trailing content would be silently dropped; treat the line as plain text instead.
    if !after_title.trim().is_empty() {
        return None;
    }

    Some(DirectiveOpening {
        name: name.to_ascii_lowercase(),
        title,
        leaf,
    })
}

/// Rewrite all directive syntax in `input` to `<cf-directive>` elements.
///
/// Fence-aware: directive-shaped lines inside code blocks pass through
/// untouched. Unclosed containers are closed at end of input so the output
/// always parses. Returns the rewritten text and the number of directives
/// rewritten.
pub fn rewrite_directives(input: &str) -> (String, usize) {
    let mut fences = FenceTracker::new();
    let mut output = String::with_capacity(input.len() + 64);
    let mut count = 0usize;
    let mut open_stack: Vec<String> = Vec::new();

    for line in input.lines() {
        if fences.feed(line) || is_indented_code(line) {
            output.push_str(line);
            output.push('\n');
            continue;
        }

        if is_container_closer(line) && !open_stack.is_empty() {
            let indent = leading_ws(line);
            open_stack.pop();
            writeln!(output, "{indent}</{DIRECTIVE_TAG}>").ok();
            continue;
        }

        if let Some(opening) = parse_container_opening(line) {
            count += 1;
            let indent = leading_ws(line);
            writeln!(output, "{indent}{}", opening.to_open_tag()).ok();
            open_stack.push(opening.name);
            continue;
        }

        if let Some(leaf) = parse_leaf_directive(line) {
            count += 1;
            let indent = leading_ws(line);
            writeln!(output, "{indent}{}", leaf.to_open_tag()).ok();
            continue;
        }

        output.push_str(&rewrite_inline_directives(line, &mut count));
        output.push('\n');
    }

    while open_stack.pop().is_some() {
        writeln!(output, "</{DIRECTIVE_TAG}>").ok();
    }

    (output, count)
}

/// Rewrite text-form directives (`:name[content]`) within one line.
///
/// Skips backtick code spans. A colon preceded by an alphanumeric
/// character, a colon run, or a name without a bracketed body is left
/// literal (so `10:30`, `https://` and bare `:word` survive).
fn rewrite_inline_directives(line: &str, count: &mut usize) -> String {
    if !line.contains(':') {
        return line.to_string();
    }

    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'`' => {
                let run = count_run(bytes, i, b'`');
                match find_span_close(line, i + run, run) {
                    Some(close_end) => {
                        out.push_str(&line[i..close_end]);
                        i = close_end;
                    }
                    None => {
                        out.push_str(&line[i..i + run]);
                        i += run;
                    }
                }
            }
            b':' => {
                let boundary = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
                let run = count_run(bytes, i, b':');
                if boundary
                    && run == 1
                    && let Some((element, consumed)) = parse_inline_at(&line[i..])
                {
                    out.push_str(&element);
                    i += consumed;
                    *count += 1;
                } else {
                    out.push_str(&line[i..i + run]);
                    i += run;
                }
            }
            _ => {
                // Advance one whole UTF-8 character.
                let ch_len = line[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&line[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    out
}

/// Parse `:name[content]` at the start of `rest`. Returns the replacement
/// element and how many bytes of input it consumed.
fn parse_inline_at(rest: &str) -> Option<(String, usize)> {
    let after_colon = &rest[1..];
    let name: String = after_colon
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if name.is_empty() {
        return None;
    }

    let after_name = &after_colon[name.len()..];
    let body = after_name.strip_prefix('[')?;
    let end = body.find(']')?;
    let content = &body[..end];

    let element = format!(
        "<{tag} name=\"{name}\" form=\"inline\">{content}</{tag}>",
        tag = DIRECTIVE_TAG,
        name = name.to_ascii_lowercase(),
    );
    // 1 colon + name + '[' + content + ']'
    let consumed = 1 + name.len() + 1 + end + 1;
    Some((element, consumed))
}

fn count_run(bytes: &[u8], start: usize, byte: u8) -> usize {
    bytes[start..].iter().take_while(|b| **b == byte).count()
}

/// Find the end (exclusive) of a code span opened by a backtick run of
/// `run` characters. The closing run must be exactly equal in length per
/// CommonMark.
fn find_span_close(line: &str, from: usize, run: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let len = count_run(bytes, i, b'`');
            if len == run {
                return Some(i + len);
            }
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

fn is_indented_code(line: &str) -> bool {
    let mut col = 0;
    for c in line.chars() {
        match c {
            ' ' => col += 1,
            '\t' => return true,
            _ => break,
        }
        if col >= 4 {
            return true;
        }
    }
    false
}

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Rewrite recognized directive nodes into styled elements.
///
/// Single pass with no ordering dependency between siblings: text-form
/// directives become `span`, everything else `div`, with the class from
/// [`ADMONITION_CLASSES`]. A bracket title becomes a leading
/// `p.admonition-title` child. Unrecognized names are left as directive
/// nodes.
pub fn apply_admonitions(nodes: &mut Vec<DocNode>) {
    for node in nodes.iter_mut() {
        match node {
            DocNode::Element { children, .. } => apply_admonitions(children),
            DocNode::Text { .. } => {}
            DocNode::Directive {
                name,
                inline,
                title,
                children,
            } => {
                apply_admonitions(children);
                let Some(class) = admonition_class(name) else {
                    continue;
                };
                let tag = if *inline { "span" } else { "div" };
                let mut kids = Vec::with_capacity(children.len() + 1);
                if let Some(t) = title.take() {
                    kids.push(DocNode::element(
                        "p",
                        attrs([("class", "admonition-title")]),
                        vec![DocNode::text(t)],
                    ));
                }
                kids.append(children);
                *node = DocNode::element(tag, attrs([("class", class)]), kids);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_container() {
        let opening = parse_container_opening(":::note").unwrap();
        assert_eq!(opening.name, "note");
        assert!(opening.title.is_none());
        assert!(!opening.leaf);
    }

    #[test]
    fn parses_container_with_title() {
        let opening = parse_container_opening(":::caution[Be Careful]").unwrap();
        assert_eq!(opening.name, "caution");
        assert_eq!(opening.title.as_deref(), Some("Be Careful"));
    }

    #[test]
    fn container_name_is_lowercased() {
        let opening = parse_container_opening(":::NOTE").unwrap();
        assert_eq!(opening.name, "note");
    }

    #[test]
    fn trailing_junk_is_not_a_directive() {
        assert!(parse_container_opening(":::note extra words").is_none());
    }

    #[test]
    fn unknown_name_still_parses() {
        // Pass-through is decided later in the tree transform.
        let opening = parse_container_opening(":::spoiler").unwrap();
        assert_eq!(opening.name, "spoiler");
        assert!(admonition_class(&opening.name).is_none());
    }

    #[test]
    fn leaf_directive_parses() {
        let leaf = parse_leaf_directive("::info[Deadline moved]").unwrap();
        assert!(leaf.leaf);
        assert_eq!(leaf.name, "info");
        assert_eq!(leaf.title.as_deref(), Some("Deadline moved"));
    }

    #[test]
    fn closer_detected() {
        assert!(is_container_closer(":::"));
        assert!(is_container_closer("  :::  "));
        assert!(!is_container_closer(":::note"));
    }

    #[test]
    fn rewrites_container() {
        let (out, count) = rewrite_directives(":::note\nhello\n:::");
        assert_eq!(count, 1);
        assert!(out.contains("<cf-directive name=\"note\" form=\"block\">"));
        assert!(out.contains("</cf-directive>"));
    }

    #[test]
    fn rewrites_title_with_quote_escaping() {
        let (out, _) = rewrite_directives(":::note[He said \"hi\"]\nx\n:::");
        assert!(out.contains("title=\"He said &quot;hi&quot;\""));
    }

    #[test]
    fn code_fence_content_untouched() {
        let (out, count) = rewrite_directives("```\n:::note\n:::\n```");
        assert_eq!(count, 0);
        assert!(out.contains(":::note"));
    }

    #[test]
    fn indented_code_untouched() {
        let (out, count) = rewrite_directives("    :::note");
        assert_eq!(count, 0);
        assert!(out.contains("    :::note"));
    }

    #[test]
    fn unclosed_container_closed_at_eof() {
        let (out, count) = rewrite_directives(":::tip\ndangling");
        assert_eq!(count, 1);
        assert!(out.trim_end().ends_with("</cf-directive>"));
    }

    #[test]
    fn nested_containers() {
        let (out, count) = rewrite_directives(":::note\n:::tip\ninner\n:::\n:::");
        assert_eq!(count, 2);
        assert_eq!(out.matches("</cf-directive>").count(), 2);
    }

    #[test]
    fn stray_closer_passes_through() {
        let (out, count) = rewrite_directives("plain\n:::");
        assert_eq!(count, 0);
        assert!(out.contains(":::"));
    }

    #[test]
    fn inline_directive_rewritten() {
        let (out, count) = rewrite_directives("See :tip[the syllabus] first.");
        assert_eq!(count, 1);
        assert!(
            out.contains("<cf-directive name=\"tip\" form=\"inline\">the syllabus</cf-directive>")
        );
    }

    #[test]
    fn inline_skips_code_spans() {
        let (out, count) = rewrite_directives("use `:tip[x]` literally");
        assert_eq!(count, 0);
        assert!(out.contains("`:tip[x]`"));
    }

    #[test]
    fn inline_ignores_times_and_urls() {
        let (out, count) = rewrite_directives("at 10:30[ish] see https://example.com");
        assert_eq!(count, 0);
        assert!(out.contains("10:30[ish]"));
        assert!(out.contains("https://example.com"));
    }

    #[test]
    fn inline_without_bracket_is_literal() {
        let (out, count) = rewrite_directives("a :word alone");
        assert_eq!(count, 0);
        assert!(out.contains(":word"));
    }

    #[test]
    fn admonition_table_is_complete() {
        for name in ["note", "tip", "danger", "info", "caution"] {
            let class = admonition_class(name).unwrap();
            assert!(class.contains(name));
        }
        assert!(admonition_class("warning").is_none());
    }

    #[test]
    fn transform_classifies_known_directive() {
        let mut nodes = vec![DocNode::Directive {
            name: "danger".to_string(),
            inline: false,
            title: Some("Stop".to_string()),
            children: vec![DocNode::text("body")],
        }];
        apply_admonitions(&mut nodes);

        let DocNode::Element {
            tag,
            attrs,
            children,
        } = &nodes[0]
        else {
            panic!("expected element, got {:?}", nodes[0]);
        };
        assert_eq!(tag, "div");
        assert_eq!(
            attrs.get("class").map(String::as_str),
            Some("admonition admonition-danger")
        );
        assert_eq!(children.len(), 2, "title paragraph plus body");
    }

    #[test]
    fn transform_uses_span_for_inline() {
        let mut nodes = vec![DocNode::Directive {
            name: "tip".to_string(),
            inline: true,
            title: None,
            children: vec![DocNode::text("hint")],
        }];
        apply_admonitions(&mut nodes);
        assert!(matches!(&nodes[0], DocNode::Element { tag, .. } if tag == "span"));
    }

    #[test]
    fn transform_passes_unknown_through() {
        let mut nodes = vec![DocNode::Directive {
            name: "spoiler".to_string(),
            inline: false,
            title: None,
            children: vec![DocNode::text("hidden")],
        }];
        apply_admonitions(&mut nodes);
        assert!(matches!(&nodes[0], DocNode::Directive { name, .. } if name == "spoiler"));
    }

    #[test]
    fn transform_recurses_into_elements() {
        let mut nodes = vec![DocNode::plain(
            "blockquote",
            vec![DocNode::Directive {
                name: "note".to_string(),
                inline: false,
                title: None,
                children: Vec::new(),
            }],
        )];
        apply_admonitions(&mut nodes);
        let DocNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert!(matches!(&children[0], DocNode::Element { tag, .. } if tag == "div"));
    }
}
