//! Mention stripping.
//!
//! Inbound mention events carry the bot's own `<@...>` tag in the text;
//! it is noise for the model and is removed before processing.

/// Removes the first `<@...>` mention tag from `text` and trims the
/// surrounding whitespace.
#[must_use]
pub fn strip_mention(text: &str) -> String {
    if let Some(start) = text.find("<@")
        && let Some(end) = text[start..].find('>')
    {
        let mut stripped = String::with_capacity(text.len());
        stripped.push_str(&text[..start]);
        stripped.push_str(&text[start + end + 1..]);
        return stripped.trim().to_string();
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_mention_is_removed() {
        assert_eq!(
            strip_mention("<@U12345> what were sales last week?"),
            "what were sales last week?"
        );
    }

    #[test]
    fn mid_text_mention_is_removed() {
        assert_eq!(strip_mention("hey <@U12345> hello"), "hey  hello");
    }

    #[test]
    fn text_without_mention_is_trimmed_only() {
        assert_eq!(strip_mention("  plain question  "), "plain question");
    }

    #[test]
    fn unterminated_mention_is_left_alone() {
        assert_eq!(strip_mention("<@U123 oops"), "<@U123 oops");
    }
}
