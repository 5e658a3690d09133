//! Transport/storage byte boundary.
//!
//! Content rows store `source` and `compiled` as byte sequences, while the
//! authoring RPC and the evaluator only speak text. Every read path crosses
//! through [`to_transport_text`] and every write path through
//! [`to_storage_bytes`]; no call site converts by hand. A single skipped
//! conversion silently corrupts non-ASCII content, which is why this lives
//! in one module instead of at each call site.

use crate::error::CodecError;

/// Convert persisted bytes into transport-safe text.
///
/// Fails with [`CodecError::InvalidUtf8`] when the stored bytes are not
/// valid UTF-8 (which indicates a write that bypassed [`to_storage_bytes`]).
pub fn to_transport_text(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| CodecError::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        })
}

/// Convert transport text into the persisted byte form.
pub fn to_storage_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ascii() {
        let text = "Hello **world**";
        assert_eq!(
            to_transport_text(&to_storage_bytes(text)).unwrap(),
            text
        );
    }

    #[test]
    fn round_trips_non_ascii() {
        for text in ["héllo wörld", "日本語のレッスン", "emoji 🎓 and ¿señal?"] {
            assert_eq!(
                to_transport_text(&to_storage_bytes(text)).unwrap(),
                text
            );
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = to_transport_text(&[0x48, 0x69, 0xFF, 0xFE]).unwrap_err();
        assert_eq!(err, CodecError::InvalidUtf8 { valid_up_to: 2 });
    }

    #[test]
    fn empty_round_trip() {
        assert_eq!(to_transport_text(&to_storage_bytes("")).unwrap(), "");
    }
}
