// Label wrapping for node/edge text. Lengths are counted in chars, not bytes.

/// Wrap `text` into lines of at most `max_line_length` chars.
///
/// Existing newlines are kept. Words are packed greedily; a single word longer
/// than the limit is hard-split into chunks of exactly `max_line_length`
/// (the last chunk may be shorter). A limit of 0 disables wrapping.
pub fn wrap(text: &str, max_line_length: usize) -> String {
    if max_line_length == 0 {
        return text.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;
        let mut produced = false;
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_line_length {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                lines.extend(hard_split(word, max_line_length));
                produced = true;
                continue;
            }
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_line_length {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_len = word_len;
            }
        }
        if current_len > 0 || !produced {
            lines.push(current);
        }
    }
    lines.join("\n")
}

fn hard_split(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

/// Cut `text` to `max_chars` chars, marking the cut with "...".
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept.trim_end())
}
