//! Placeholder content for lessons that have nothing published yet.

use once_cell::sync::Lazy;

use crate::compiler::compile;

/// Authored form of the placeholder shown when no content row exists.
pub const COMING_SOON_SOURCE: &str = "_Coming soon..._";

static COMING_SOON_PAYLOAD: Lazy<String> = Lazy::new(|| {
    compile(COMING_SOON_SOURCE).map(|c| c.payload).unwrap_or_else(|err| {
        log::warn!("placeholder compilation failed, serving empty document: {err}");
        String::from(r#"{"v":1}"#)
    })
});

/// Compiled payload for the placeholder, built once on first use.
pub fn coming_soon_payload() -> &'static str {
    &COMING_SOON_PAYLOAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocNode, Document};

    #[test]
    fn placeholder_is_an_emphasized_paragraph() {
        let doc = Document::from_payload(coming_soon_payload()).unwrap();
        assert_eq!(
            doc.children,
            vec![DocNode::plain(
                "p",
                vec![DocNode::plain("em", vec![DocNode::text("Coming soon...")])]
            )]
        );
    }

    #[test]
    fn placeholder_payload_is_stable_across_calls() {
        assert_eq!(coming_soon_payload(), coming_soon_payload());
    }
}
