#![deny(missing_docs)]
//! Courseflow core: directive rewriting, markdown compilation, and the
//! content codec shared by the storage and rendering layers.

/// Code fence tracking for the directive rewriter.
pub mod code_fence;
/// UTF-8 boundary between storage bytes and transport text.
pub mod codec;
/// The authored-markup compiler.
pub mod compiler;
/// Directive syntax, rewriting, and admonition classification.
pub mod directives;
/// The compiled render-program document.
pub mod document;
/// Core error types.
pub mod error;
/// Lowering from mdast to the render program.
pub mod lower;
/// Placeholder content for unpublished lessons.
pub mod placeholder;

pub use codec::{to_storage_bytes, to_transport_text};
pub use compiler::{Compiled, compile, parse_options};
pub use directives::{ADMONITION_CLASSES, DIRECTIVE_TAG, admonition_class, apply_admonitions};
pub use document::{DocNode, Document, PAYLOAD_VERSION, attrs};
pub use error::{CodecError, CompileError, SourceLocation};
pub use placeholder::{COMING_SOON_SOURCE, coming_soon_payload};

pub use code_fence::FenceTracker;
pub use directives::rewrite_directives;
