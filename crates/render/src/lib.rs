#![deny(missing_docs)]
//! # courseflow-render
//!
//! Evaluates compiled content payloads. A payload is not standalone
//! markup: it only becomes output when folded through a [`RenderFactory`],
//! which scopes what the evaluated content is able to produce. The
//! built-in [`HtmlFactory`] emits escaped HTML strings; a UI layer can
//! supply its own factory to build native view trees instead.

pub mod html;
pub mod view;

use std::collections::BTreeMap;

use courseflow_core::{DocNode, Document, PAYLOAD_VERSION};
use thiserror::Error;

pub use html::HtmlFactory;
pub use view::{ContentView, ViewState};

/// Errors from payload evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The payload is not a structurally valid document.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload was produced by a newer compiler.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u32),
}

/// Constructs output from evaluated content.
///
/// The factory is the capability boundary: evaluation can only ever call
/// these two methods, so a payload can produce nothing the factory does
/// not allow.
pub trait RenderFactory {
    /// What one evaluated node becomes.
    type Output;

    /// Build an element from its tag, attributes, and evaluated children.
    fn element(
        &self,
        tag: &str,
        attrs: &BTreeMap<String, String>,
        children: Vec<Self::Output>,
    ) -> Self::Output;

    /// Build a text run.
    fn text(&self, value: &str) -> Self::Output;
}

/// Evaluate a payload through a factory.
///
/// Returns one output per top-level document node.
pub fn evaluate<F: RenderFactory>(
    payload: &str,
    factory: &F,
) -> Result<Vec<F::Output>, EvalError> {
    let document = Document::from_payload(payload)?;
    if document.version != PAYLOAD_VERSION {
        return Err(EvalError::UnsupportedVersion(document.version));
    }
    Ok(document
        .children
        .iter()
        .map(|node| eval_node(node, factory))
        .collect())
}

fn eval_node<F: RenderFactory>(node: &DocNode, factory: &F) -> F::Output {
    match node {
        DocNode::Element {
            tag,
            attrs,
            children,
        } => {
            let kids = children.iter().map(|c| eval_node(c, factory)).collect();
            factory.element(tag, attrs, kids)
        }
        DocNode::Text { value } => factory.text(value),
        DocNode::Directive {
            name,
            inline,
            title,
            children,
        } => {
            // Unrecognized directives render as an unclassed wrapper; the
            // name is kept as a data attribute so styling can opt in later.
            let tag = if *inline { "span" } else { "div" };
            let attrs = BTreeMap::from([("data-directive".to_string(), name.clone())]);
            let mut kids = Vec::with_capacity(children.len() + 1);
            if let Some(title) = title {
                kids.push(factory.element(
                    "p",
                    &BTreeMap::new(),
                    vec![factory.text(title)],
                ));
            }
            kids.extend(children.iter().map(|c| eval_node(c, factory)));
            factory.element(tag, &attrs, kids)
        }
    }
}
