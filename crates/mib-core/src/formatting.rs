//! Telegram HTML helpers: escaping, truncation, and length-bounded splitting.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[derive(Clone, Debug)]
struct OpenTag {
    name: String,
    open: String,
}

impl OpenTag {
    fn close(&self) -> String {
        format!("</{}>", self.name)
    }
}

#[derive(Clone, Copy, Debug)]
enum HtmlToken<'a> {
    Tag(&'a str),
    Text(&'a str),
}

enum TagAction {
    Open(String),
    Close(String),
    Other,
}

/// Split `html` into chunks of at most `limit` bytes.
///
/// Tags still open at a cut are closed at the end of the chunk and reopened at
/// the start of the next one. Cuts prefer line breaks and never land inside an
/// entity such as `&amp;`.
pub fn split_html_chunks(html: &str, limit: usize) -> Vec<String> {
    if html.len() <= limit {
        return vec![html.to_string()];
    }

    let mut out = Vec::new();
    let mut stack: Vec<OpenTag> = Vec::new();
    let mut chunk = String::new();
    let mut prefix_len = 0usize;

    for token in tokenize_html(html) {
        match token {
            HtmlToken::Tag(tag) => {
                let action = parse_tag(tag);
                let mut after = stack.clone();
                apply_tag(&mut after, &action, tag);
                if chunk.len() + tag.len() + close_len(&after) > limit && chunk.len() > prefix_len
                {
                    flush(&mut out, &mut chunk, &stack);
                    prefix_len = reopen(&mut chunk, &stack);
                }
                chunk.push_str(tag);
                stack = after;
            }
            HtmlToken::Text(mut text) => {
                while !text.is_empty() {
                    let room = limit.saturating_sub(chunk.len() + close_len(&stack));
                    if text.len() <= room {
                        chunk.push_str(text);
                        break;
                    }

                    let mut cut = cut_point(text, room);
                    if cut == 0 {
                        if chunk.len() > prefix_len {
                            flush(&mut out, &mut chunk, &stack);
                            prefix_len = reopen(&mut chunk, &stack);
                            continue;
                        }
                        // Limit too small for the open tags; take one char to make progress.
                        cut = text.chars().next().map(char::len_utf8).unwrap_or(text.len());
                    }

                    chunk.push_str(&text[..cut]);
                    text = &text[cut..];
                    flush(&mut out, &mut chunk, &stack);
                    prefix_len = reopen(&mut chunk, &stack);
                }
            }
        }
    }

    if chunk.len() > prefix_len {
        flush(&mut out, &mut chunk, &stack);
    }
    out
}

fn tokenize_html(mut s: &str) -> Vec<HtmlToken<'_>> {
    let mut out = Vec::new();
    while !s.is_empty() {
        let Some(start) = s.find('<') else {
            out.push(HtmlToken::Text(s));
            break;
        };
        if start > 0 {
            out.push(HtmlToken::Text(&s[..start]));
            s = &s[start..];
        }
        let Some(end) = s.find('>') else {
            out.push(HtmlToken::Text(s));
            break;
        };
        out.push(HtmlToken::Tag(&s[..=end]));
        s = &s[end + 1..];
    }
    out
}

fn parse_tag(tag: &str) -> TagAction {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();
    if inner.ends_with('/') {
        return TagAction::Other;
    }
    if let Some(rest) = inner.strip_prefix('/') {
        return TagAction::Close(rest.trim().to_ascii_lowercase());
    }
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.is_empty() {
        TagAction::Other
    } else {
        TagAction::Open(name.to_ascii_lowercase())
    }
}

fn apply_tag(stack: &mut Vec<OpenTag>, action: &TagAction, tag: &str) {
    match action {
        TagAction::Open(name) => stack.push(OpenTag {
            name: name.clone(),
            open: tag.to_string(),
        }),
        TagAction::Close(name) => {
            if let Some(pos) = stack.iter().rposition(|t| &t.name == name) {
                stack.truncate(pos);
            }
        }
        TagAction::Other => {}
    }
}

fn close_len(stack: &[OpenTag]) -> usize {
    stack.iter().map(|t| t.name.len() + 3).sum()
}

fn flush(out: &mut Vec<String>, chunk: &mut String, stack: &[OpenTag]) {
    for tag in stack.iter().rev() {
        chunk.push_str(&tag.close());
    }
    out.push(std::mem::take(chunk));
}

fn reopen(chunk: &mut String, stack: &[OpenTag]) -> usize {
    for tag in stack {
        chunk.push_str(&tag.open);
    }
    chunk.len()
}

/// Largest cut within `room` bytes: after the last newline if any, never inside
/// a multi-byte char or an HTML entity.
fn cut_point(text: &str, room: usize) -> usize {
    let mut cut = room.min(text.len());
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let head = &text[..cut];
    if let Some(nl) = head.rfind('\n') {
        if nl > 0 {
            return nl + 1;
        }
    }
    if let Some(amp) = head.rfind('&') {
        if !head[amp..].contains(';') {
            cut = amp;
        }
    }
    cut
}
