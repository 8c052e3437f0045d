//! String helpers shared by the log parsers.

/// Whitespace stripped from both ends of commit messages.
const MESSAGE_PADDING: &[char] = &[' ', '\r', '\n', '\t'];

/// Trims spaces, carriage returns, newlines and tabs from both ends.
pub fn trim_message(message: &str) -> &str {
    message.trim_matches(MESSAGE_PADDING)
}

/// Removes exactly one trailing line terminator (`\r\n`, `\n` or `\r`).
pub fn trim_last_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

/// Truncates `text` to at most `max_chars` characters, marking the cut.
pub fn shortened(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
