//! Code fence tracking for the directive rewriter.
//!
//! Directive lines inside fenced code blocks are literal text and must not
//! be rewritten, so the rewriter feeds every line through a [`FenceTracker`]
//! before looking at it.

/// Tracks fenced-code-block state across lines.
///
/// CommonMark rules: an opener is 3+ backticks or tildes with at most 3
/// columns of indentation; a closer uses the same marker, at least the
/// opener's run length, no info string.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceTracker {
    open: Option<Fence>,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    length: usize,
}

impl FenceTracker {
    /// Create a tracker positioned outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance over one line. Returns `true` when the line belongs to a
    /// fenced code block (including the fence markers themselves).
    pub fn feed(&mut self, line: &str) -> bool {
        let (indent, offset) = leading_whitespace(line);
        let rest = &line[offset..];

        match self.open {
            None => {
                if indent <= 3
                    && let Some(fence) = parse_fence_run(rest)
                {
                    self.open = Some(fence);
                    return true;
                }
                false
            }
            Some(open) => {
                if indent <= 3
                    && let Some(closer) = parse_fence_run(rest)
                    && closer.marker == open.marker
                    && closer.length >= open.length
                    && rest[closer.length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
        }
    }

    /// Whether the tracker is currently inside an open fence.
    pub fn inside(&self) -> bool {
        self.open.is_some()
    }
}

/// Returns (visual columns, byte offset) of leading whitespace, expanding
/// tabs to 4-column boundaries per CommonMark.
fn leading_whitespace(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4);
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn parse_fence_run(rest: &str) -> Option<Fence> {
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = rest.chars().take_while(|c| *c == marker).count();
    (length >= 3).then_some(Fence { marker, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(tracker: &mut FenceTracker, lines: &[&str]) -> Vec<bool> {
        lines.iter().map(|l| tracker.feed(l)).collect()
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        let mut t = FenceTracker::new();
        let skipped = feed_all(&mut t, &["```js", ":::note", "```", "after"]);
        assert_eq!(skipped, vec![true, true, true, false]);
        assert!(!t.inside());
    }

    #[test]
    fn tilde_fence_not_closed_by_backticks() {
        let mut t = FenceTracker::new();
        feed_all(&mut t, &["~~~", "```", "still code"]);
        assert!(t.inside());
        assert!(t.feed("~~~"));
        assert!(!t.inside());
    }

    #[test]
    fn longer_run_required_to_close() {
        let mut t = FenceTracker::new();
        feed_all(&mut t, &["````md", "```", "inner", "```"]);
        assert!(t.inside(), "3-backtick line cannot close a 4-backtick fence");
        t.feed("````");
        assert!(!t.inside());
    }

    #[test]
    fn closer_with_info_string_does_not_close() {
        let mut t = FenceTracker::new();
        feed_all(&mut t, &["```", "code", "```js"]);
        assert!(t.inside());
    }

    #[test]
    fn deeply_indented_run_is_not_a_fence() {
        let mut t = FenceTracker::new();
        assert!(!t.feed("    ```js"));
        assert!(!t.feed("\t```js"));
        assert!(!t.inside());
    }

    #[test]
    fn indented_closer_still_closes() {
        let mut t = FenceTracker::new();
        feed_all(&mut t, &["```", "code"]);
        assert!(t.feed("  ```"));
        assert!(!t.inside());
    }

    #[test]
    fn two_markers_do_not_open() {
        let mut t = FenceTracker::new();
        assert!(!t.feed("``"));
        assert!(!t.inside());
    }
}
