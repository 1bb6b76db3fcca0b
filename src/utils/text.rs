const FENCE: &str = "```";

/// A reply is final once it carries a fenced block and does not end by asking something.
pub fn is_complete(reply: &str) -> bool {
    reply.contains(FENCE) && !reply.trim().ends_with('?')
}

/// Contents of the last fenced block, without the opening line's language tag.
///
/// Returns an empty string when the text has fewer than two fence markers.
pub fn extract_last_code_block(text: &str) -> &str {
    let Some(close) = text.rfind(FENCE) else {
        return "";
    };
    let Some(open) = text[..close].rfind(FENCE) else {
        return "";
    };

    let mut start = open + FENCE.len();
    if let Some(newline) = text[start..close].find('\n') {
        start += newline + 1;
    }
    &text[start..close]
}
