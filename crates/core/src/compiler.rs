//! The authored-markup compiler.
//!
//! `compile` takes raw authored text through the full pipeline: directive
//! rewriting, markdown parsing, lowering to the render program, admonition
//! classification, and payload serialization.

use markdown::message::{Message, Place};
use markdown::{Constructs, ParseOptions};

use crate::directives::{apply_admonitions, rewrite_directives};
use crate::document::Document;
use crate::error::{CompileError, SourceLocation};
use crate::lower::lower_root;

/// Output of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The serialized payload stored alongside the source.
    pub payload: String,
    /// The in-memory document the payload was serialized from.
    pub document: Document,
    /// Number of container and leaf directives rewritten in the source.
    pub directive_count: usize,
}

/// Parse options for authored lesson markup.
///
/// GFM extensions and MDX JSX are on; raw HTML is off so authored angle
/// brackets outside the JSX grammar surface as text rather than markup.
pub fn parse_options() -> ParseOptions {
    ParseOptions {
        constructs: Constructs {
            gfm_autolink_literal: true,
            gfm_footnote_definition: true,
            gfm_label_start_footnote: true,
            gfm_strikethrough: true,
            gfm_table: true,
            gfm_task_list_item: true,
            mdx_jsx_flow: true,
            mdx_jsx_text: true,
            html_flow: false,
            html_text: false,
            ..Constructs::default()
        },
        ..ParseOptions::default()
    }
}

/// Compile authored text into a render-program payload.
///
/// Empty (or whitespace-only) source is valid and compiles to the minimal
/// document.
pub fn compile(source: &str) -> Result<Compiled, CompileError> {
    if source.trim().is_empty() {
        let document = Document::empty();
        let payload = document.to_payload()?;
        return Ok(Compiled {
            payload,
            document,
            directive_count: 0,
        });
    }

    let (rewritten, directive_count) = rewrite_directives(source);
    let root = markdown::to_mdast(&rewritten, &parse_options()).map_err(parse_error)?;

    let mut children = lower_root(&root);
    apply_admonitions(&mut children);

    let document = Document::new(children);
    let payload = document.to_payload()?;
    Ok(Compiled {
        payload,
        document,
        directive_count,
    })
}

fn parse_error(message: Message) -> CompileError {
    let location = match message.place.as_deref() {
        Some(Place::Point(point)) => SourceLocation::new(point.line, point.column),
        Some(Place::Position(position)) => {
            SourceLocation::new(position.start.line, position.start.column)
        }
        None => SourceLocation::new(1, 1),
    };
    CompileError::Parse {
        message: message.reason,
        location,
    }
}
