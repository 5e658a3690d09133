//! The compiled render program.
//!
//! Compilation lowers authored markup into this tree and serializes it as
//! JSON. The payload is not standalone markup: it only becomes UI content
//! when the evaluator folds it through an injected rendering factory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Payload format version embedded in every serialized document.
pub const PAYLOAD_VERSION: u32 = 1;

/// A complete compiled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Payload format version.
    #[serde(rename = "v")]
    pub version: u32,
    /// Top-level nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
}

/// One node of the render program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum DocNode {
    /// A renderable element with a fixed tag name.
    Element {
        /// Tag name handed to the rendering factory.
        tag: String,
        /// Attributes, sorted by name for stable serialization.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        /// Child nodes.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<DocNode>,
    },
    /// A text run.
    Text {
        /// The literal text.
        value: String,
    },
    /// A directive whose name was not in the admonition table.
    ///
    /// Recognized directives are rewritten into [`DocNode::Element`] at
    /// compile time; unrecognized ones pass through and render unclassed.
    Directive {
        /// The author-supplied directive name.
        name: String,
        /// True for text-form (`:name[...]`) directives.
        #[serde(default)]
        inline: bool,
        /// Optional bracket title from the opening line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Child nodes.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<DocNode>,
    },
}

impl Document {
    /// Create a document at the current payload version.
    pub fn new(children: Vec<DocNode>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            children,
        }
    }

    /// The minimal valid document (what empty source compiles to).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Serialize into the transport payload form.
    pub fn to_payload(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a transport payload.
    ///
    /// Version checking is the evaluator's job; this only requires
    /// structurally valid JSON.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl DocNode {
    /// Build an element node.
    pub fn element(
        tag: impl Into<String>,
        attrs: BTreeMap<String, String>,
        children: Vec<DocNode>,
    ) -> Self {
        DocNode::Element {
            tag: tag.into(),
            attrs,
            children,
        }
    }

    /// Build an element node without attributes.
    pub fn plain(tag: impl Into<String>, children: Vec<DocNode>) -> Self {
        Self::element(tag, BTreeMap::new(), children)
    }

    /// Build a text node.
    pub fn text(value: impl Into<String>) -> Self {
        DocNode::Text {
            value: value.into(),
        }
    }
}

/// Convenience for building an attribute map from literal pairs.
pub fn attrs<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
