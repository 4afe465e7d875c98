//! Reply chunking.
//!
//! Long model answers are regrouped into a bounded number of chat
//! messages: text is split into logical lines (terminated by a line
//! break), fully blank lines are dropped, and the remaining lines are
//! grouped into batches of at most `max_lines_per_group`. This avoids
//! both one giant blob and one-message-per-line flooding of a
//! rate-limited channel.

/// Incremental chunker for streamed model output.
///
/// Text fragments are pushed as they arrive; complete groups are emitted
/// as soon as enough logical lines have accumulated, and [`finish`]
/// flushes whatever remains.
///
/// [`finish`]: StreamChunker::finish
#[derive(Debug)]
pub struct StreamChunker {
    max_lines_per_group: usize,
    partial: String,
    pending: Vec<String>,
}

impl StreamChunker {
    /// Creates a chunker emitting groups of at most `max_lines_per_group`
    /// logical lines. A limit of zero is treated as one.
    #[must_use]
    pub fn new(max_lines_per_group: usize) -> Self {
        Self {
            max_lines_per_group: max_lines_per_group.max(1),
            partial: String::new(),
            pending: Vec::new(),
        }
    }

    /// Feeds a text fragment, returning any groups completed by it.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        let mut groups = Vec::new();
        for piece in fragment.split_inclusive('\n') {
            self.partial.push_str(piece);
            if self.partial.ends_with('\n') {
                let line = std::mem::take(&mut self.partial);
                self.buffer_line(&line, &mut groups);
            }
        }
        groups
    }

    /// Flushes the trailing partial line and any buffered lines as a
    /// final group, if anything non-blank remains.
    #[must_use]
    pub fn finish(mut self) -> Option<String> {
        let partial = std::mem::take(&mut self.partial);
        if !partial.trim().is_empty() {
            self.pending.push(partial.trim_end().to_string());
        }
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.join("\n"))
        }
    }

    fn buffer_line(&mut self, line: &str, groups: &mut Vec<String>) {
        // Fully blank logical lines are dropped.
        if line.trim().is_empty() {
            return;
        }
        self.pending.push(line.trim_end().to_string());
        if self.pending.len() == self.max_lines_per_group {
            groups.push(std::mem::take(&mut self.pending).join("\n"));
        }
    }
}

/// Chunks a complete reply text into ordered, non-empty message groups.
///
/// Stateless per call; applies the same algorithm as [`StreamChunker`]
/// to the whole string.
#[must_use]
pub fn chunk(text: &str, max_lines_per_group: usize) -> Vec<String> {
    let mut chunker = StreamChunker::new(max_lines_per_group);
    let mut groups = chunker.push(text);
    if let Some(last) = chunker.finish() {
        groups.push(last);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_bounded_and_blank_free() {
        let groups = chunk("a\nb\n\nc\n", 2);
        assert_eq!(groups, vec!["a\nb", "c"]);
        for group in &groups {
            assert!(group.lines().count() <= 2);
            assert!(group.lines().all(|line| !line.trim().is_empty()));
        }
    }

    #[test]
    fn no_trailing_newline_still_emits() {
        let groups = chunk("only line", 3);
        assert_eq!(groups, vec!["only line"]);
    }

    #[test]
    fn all_blank_input_yields_nothing() {
        assert!(chunk("\n\n  \n", 2).is_empty());
        assert!(chunk("", 2).is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let groups = chunk("1\n2\n3\n4\n5\n", 2);
        assert_eq!(groups, vec!["1\n2", "3\n4", "5"]);
    }

    #[test]
    fn zero_group_size_behaves_as_one() {
        let groups = chunk("a\nb\n", 0);
        assert_eq!(groups, vec!["a", "b"]);
    }

    #[test]
    fn streaming_matches_whole_string() {
        let text = "alpha\nbeta\n\ngamma\ndelta";
        let whole = chunk(text, 2);

        let mut chunker = StreamChunker::new(2);
        let mut streamed = Vec::new();
        for fragment in ["al", "pha\nbe", "ta\n\ngam", "ma\ndelta"] {
            streamed.extend(chunker.push(fragment));
        }
        if let Some(last) = chunker.finish() {
            streamed.push(last);
        }

        assert_eq!(streamed, whole);
    }

    #[test]
    fn group_emitted_as_soon_as_complete() {
        let mut chunker = StreamChunker::new(2);
        assert!(chunker.push("a\n").is_empty());
        assert_eq!(chunker.push("b\nc\n"), vec!["a\nb".to_string()]);
        assert_eq!(chunker.finish(), Some("c".to_string()));
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let groups = chunk("a\r\nb\r\n", 2);
        assert_eq!(groups, vec!["a\nb"]);
    }
}
