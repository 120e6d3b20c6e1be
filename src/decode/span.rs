/// First balanced `open ... close` span in `text`, ignoring brackets that
/// appear inside JSON string literals anywhere in the text, including before
/// the span starts.
///
/// Returns `None` when `open` never occurs outside a string or the first
/// occurrence is never closed.
pub fn first_balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            if depth == 0 {
                start = Some(offset);
            }
            depth += 1;
        } else if ch == close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                let begin = start?;
                return Some(&text[begin..offset + ch.len_utf8()]);
            }
        }
    }

    None
}
