//! Lowering from mdast to the render program.
//!
//! Walks the markdown-rs AST and emits [`DocNode`] trees. The internal
//! `<cf-directive>` elements produced by the rewriter come back here as
//! MDX JSX nodes and are lowered to [`DocNode::Directive`]; classification
//! happens afterwards in [`crate::directives::apply_admonitions`].

use std::collections::BTreeMap;

use markdown::mdast::{AlignKind, AttributeContent, AttributeValue, Node};

use crate::directives::DIRECTIVE_TAG;
use crate::document::{DocNode, attrs};

/// Lower a parsed root node into top-level document children.
pub fn lower_root(root: &Node) -> Vec<DocNode> {
    match root {
        Node::Root(r) => lower_children(&r.children),
        other => {
            let mut out = Vec::new();
            lower_node(other, &mut out);
            out
        }
    }
}

fn lower_children(nodes: &[Node]) -> Vec<DocNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        lower_node(node, &mut out);
    }
    out
}

fn lower_node(node: &Node, out: &mut Vec<DocNode>) {
    match node {
        Node::Root(root) => out.extend(lower_children(&root.children)),
        Node::Text(text) => out.push(DocNode::text(&text.value)),
        Node::Paragraph(para) => out.push(DocNode::plain("p", lower_children(&para.children))),
        Node::Heading(heading) => {
            let tag = format!("h{}", heading.depth);
            out.push(DocNode::plain(tag, lower_children(&heading.children)));
        }
        Node::Strong(strong) => out.push(DocNode::plain("strong", lower_children(&strong.children))),
        Node::Emphasis(em) => out.push(DocNode::plain("em", lower_children(&em.children))),
        Node::Delete(del) => out.push(DocNode::plain("del", lower_children(&del.children))),
        Node::InlineCode(code) => {
            out.push(DocNode::plain("code", vec![DocNode::text(&code.value)]));
        }
        Node::Code(code) => out.push(lower_code_block(code)),
        Node::Blockquote(quote) => {
            out.push(DocNode::plain("blockquote", lower_children(&quote.children)));
        }
        Node::List(list) => out.push(lower_list(list)),
        Node::ListItem(item) => out.push(lower_list_item(item)),
        Node::Link(link) => {
            let mut a = attrs([("href", link.url.as_str())]);
            if let Some(title) = &link.title {
                a.insert("title".to_string(), title.clone());
            }
            out.push(DocNode::element("a", a, lower_children(&link.children)));
        }
        Node::Image(img) => {
            let mut a = attrs([("src", img.url.as_str()), ("alt", img.alt.as_str())]);
            if let Some(title) = &img.title {
                a.insert("title".to_string(), title.clone());
            }
            out.push(DocNode::element("img", a, Vec::new()));
        }
        Node::ThematicBreak(_) => out.push(DocNode::plain("hr", Vec::new())),
        Node::Break(_) => out.push(DocNode::plain("br", Vec::new())),
        Node::Table(table) => out.push(lower_table(table)),
        // Rows and cells are handled by lower_table.
        Node::TableRow(_) | Node::TableCell(_) => {}
        Node::Html(html) => {
            // Raw HTML constructs are disabled at parse time; anything that
            // still surfaces here is demoted to escaped text.
            log::debug!("raw HTML lowered as text: {}", html.value);
            out.push(DocNode::text(&html.value));
        }
        Node::MdxJsxFlowElement(elem) => {
            lower_jsx(elem.name.as_deref(), &elem.attributes, &elem.children, false, out);
        }
        Node::MdxJsxTextElement(elem) => {
            lower_jsx(elem.name.as_deref(), &elem.attributes, &elem.children, true, out);
        }
        other => {
            log::warn!("unhandled markdown node skipped: {other:?}");
        }
    }
}

fn lower_code_block(code: &markdown::mdast::Code) -> DocNode {
    let mut code_attrs = BTreeMap::new();
    if let Some(lang) = &code.lang {
        code_attrs.insert("class".to_string(), format!("language-{lang}"));
    }
    DocNode::plain(
        "pre",
        vec![DocNode::element(
            "code",
            code_attrs,
            vec![DocNode::text(&code.value)],
        )],
    )
}

fn lower_list(list: &markdown::mdast::List) -> DocNode {
    let tag = if list.ordered { "ol" } else { "ul" };
    let mut list_attrs = BTreeMap::new();
    if let Some(start) = list.start.filter(|s| list.ordered && *s != 1) {
        list_attrs.insert("start".to_string(), start.to_string());
    }
    DocNode::element(tag, list_attrs, lower_children(&list.children))
}

fn lower_list_item(item: &markdown::mdast::ListItem) -> DocNode {
    let mut children = Vec::with_capacity(item.children.len() + 1);
    let mut li_attrs = BTreeMap::new();

    if let Some(checked) = item.checked {
        li_attrs.insert("class".to_string(), "task-list-item".to_string());
        let mut input_attrs = attrs([("type", "checkbox"), ("disabled", "")]);
        if checked {
            input_attrs.insert("checked".to_string(), String::new());
        }
        children.push(DocNode::element("input", input_attrs, Vec::new()));
    }

    children.extend(lower_children(&item.children));
    DocNode::element("li", li_attrs, children)
}

fn lower_table(table: &markdown::mdast::Table) -> DocNode {
    let mut sections = Vec::with_capacity(2);

    if let Some(Node::TableRow(head)) = table.children.first() {
        sections.push(DocNode::plain(
            "thead",
            vec![lower_table_row(head, true, &table.align)],
        ));
    }

    if table.children.len() > 1 {
        let body_rows = table
            .children
            .iter()
            .skip(1)
            .filter_map(|row| match row {
                Node::TableRow(r) => Some(lower_table_row(r, false, &table.align)),
                _ => None,
            })
            .collect();
        sections.push(DocNode::plain("tbody", body_rows));
    }

    DocNode::plain("table", sections)
}

fn lower_table_row(
    row: &markdown::mdast::TableRow,
    is_header: bool,
    aligns: &[AlignKind],
) -> DocNode {
    let tag = if is_header { "th" } else { "td" };
    let cells = row
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| match cell {
            Node::TableCell(c) => {
                let mut cell_attrs = BTreeMap::new();
                let align = match aligns.get(i) {
                    Some(AlignKind::Left) => Some("left"),
                    Some(AlignKind::Right) => Some("right"),
                    Some(AlignKind::Center) => Some("center"),
                    _ => None,
                };
                if let Some(align) = align {
                    cell_attrs.insert("align".to_string(), align.to_string());
                }
                Some(DocNode::element(tag, cell_attrs, lower_children(&c.children)))
            }
            _ => None,
        })
        .collect();
    DocNode::plain("tr", cells)
}

fn lower_jsx(
    name: Option<&str>,
    attributes: &[AttributeContent],
    children: &[Node],
    inline: bool,
    out: &mut Vec<DocNode>,
) {
    // Fragments (no name) are transparent.
    let Some(tag_name) = name else {
        out.extend(lower_children(children));
        return;
    };

    let literal_attrs = collect_literal_attrs(attributes);

    if tag_name == DIRECTIVE_TAG {
        let name = literal_attrs
            .get("name")
            .cloned()
            .unwrap_or_else(|| "note".to_string());
        let inline = inline || literal_attrs.get("form").is_some_and(|f| f == "inline");
        let title = literal_attrs
            .get("title")
            .map(|t| t.replace("&quot;", "\""));
        out.push(DocNode::Directive {
            name,
            inline,
            title,
            children: lower_children(children),
        });
        return;
    }

    out.push(DocNode::element(
        tag_name,
        literal_attrs,
        lower_children(children),
    ));
}

fn collect_literal_attrs(attributes: &[AttributeContent]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for attr in attributes {
        match attr {
            AttributeContent::Property(prop) => {
                let value = match &prop.value {
                    Some(AttributeValue::Literal(s)) => s.clone(),
                    Some(AttributeValue::Expression(expr)) => {
                        log::debug!("expression attribute dropped: {}", expr.value);
                        continue;
                    }
                    None => String::new(),
                };
                map.insert(prop.name.clone(), value);
            }
            AttributeContent::Expression(_) => {
                // Spread attributes carry no literal value to keep.
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse_options;

    fn lower(source: &str) -> Vec<DocNode> {
        let root = markdown::to_mdast(source, &parse_options()).expect("parse");
        lower_root(&root)
    }

    #[test]
    fn lowers_paragraph_with_strong() {
        let nodes = lower("Hello **world**");
        assert_eq!(
            nodes,
            vec![DocNode::plain(
                "p",
                vec![
                    DocNode::text("Hello "),
                    DocNode::plain("strong", vec![DocNode::text("world")]),
                ]
            )]
        );
    }

    #[test]
    fn lowers_heading_depth() {
        let nodes = lower("## Lesson plan");
        assert!(matches!(&nodes[0], DocNode::Element { tag, .. } if tag == "h2"));
    }

    #[test]
    fn lowers_fenced_code_with_language() {
        let nodes = lower("```rust\nfn main() {}\n```");
        let DocNode::Element { tag, children, .. } = &nodes[0] else {
            panic!("expected pre");
        };
        assert_eq!(tag, "pre");
        let DocNode::Element { tag, attrs, .. } = &children[0] else {
            panic!("expected code");
        };
        assert_eq!(tag, "code");
        assert_eq!(attrs.get("class").map(String::as_str), Some("language-rust"));
    }

    #[test]
    fn lowers_gfm_table_with_alignment() {
        let nodes = lower("| a | b |\n|:--|--:|\n| 1 | 2 |");
        let DocNode::Element { tag, children, .. } = &nodes[0] else {
            panic!("expected table");
        };
        assert_eq!(tag, "table");
        assert_eq!(children.len(), 2, "thead and tbody");
        let payload = serde_json::to_string(&nodes).unwrap();
        assert!(payload.contains(r#""align":"left""#));
        assert!(payload.contains(r#""align":"right""#));
    }

    #[test]
    fn lowers_gfm_strikethrough() {
        let nodes = lower("~~gone~~");
        let payload = serde_json::to_string(&nodes).unwrap();
        assert!(payload.contains(r#""tag":"del""#));
    }

    #[test]
    fn lowers_task_list_item() {
        let nodes = lower("- [x] done\n- [ ] todo");
        let payload = serde_json::to_string(&nodes).unwrap();
        assert!(payload.contains("task-list-item"));
        assert!(payload.contains("checkbox"));
    }

    #[test]
    fn lowers_directive_element_to_directive_node() {
        let nodes = lower("<cf-directive name=\"note\" form=\"block\">\nbody\n</cf-directive>");
        let DocNode::Directive { name, inline, .. } = &nodes[0] else {
            panic!("expected directive, got {:?}", nodes[0]);
        };
        assert_eq!(name, "note");
        assert!(!inline);
    }

    #[test]
    fn directive_title_unescapes_quotes() {
        let nodes = lower(
            "<cf-directive name=\"tip\" form=\"block\" title=\"say &quot;hi&quot;\">\nx\n</cf-directive>",
        );
        let DocNode::Directive { title, .. } = &nodes[0] else {
            panic!("expected directive");
        };
        assert_eq!(title.as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn ordered_list_start_preserved() {
        let nodes = lower("3. three\n4. four");
        let DocNode::Element { attrs, .. } = &nodes[0] else {
            panic!("expected list");
        };
        assert_eq!(attrs.get("start").map(String::as_str), Some("3"));
    }
}
