//! Sentence-aligned chunking of documents before they go to the model.

/// Upper bound, in characters, that a chunk aims for.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 800;

/// Split `text` into sentences.
///
/// A sentence ends at a `.` followed by at least one whitespace character
/// and then an ASCII uppercase letter. The period stays with its sentence;
/// the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '.' {
            continue;
        }

        let end = i + c.len_utf8();
        let mut next_start = end;
        let mut saw_whitespace = false;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                next_start = j;
                break;
            }
            saw_whitespace = true;
            chars.next();
            next_start = j + w.len_utf8();
        }

        let starts_upper = text[next_start..]
            .chars()
            .next()
            .is_some_and(|n| n.is_ascii_uppercase());
        if saw_whitespace && starts_upper {
            sentences.push(&text[start..end]);
            start = next_start;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Greedily pack sentences into chunks of at most `max_len` characters.
///
/// Sentences are joined with a single space. A sentence longer than
/// `max_len` becomes a chunk of its own and is never cut. The result is
/// never empty: blank input yields a single empty chunk.
pub fn split_into_chunks(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let len = sentence.chars().count();

        if current.is_empty() {
            current.push_str(sentence);
            current_len = len;
        } else if current_len + 1 + len <= max_len {
            current.push(' ');
            current.push_str(sentence);
            current_len += 1 + len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}
