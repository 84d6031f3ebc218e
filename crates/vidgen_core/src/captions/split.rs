//! Script sentence splitting.

const TERMINATORS: [char; 7] = ['.', '!', '?', '…', '。', '！', '？'];

/// Closing marks that stay with the sentence they end.
const CLOSERS: [char; 4] = ['"', '\'', '”', '’'];

/// Split a narration script into sentences.
///
/// Terminal punctuation runs stay attached (`"Wait?!"`), a `.` between two
/// digits is not a boundary, newlines always are. Brackets become spaces,
/// inner whitespace is collapsed, and pieces without any alphanumeric
/// character are dropped.
pub fn split_sentences(script: &str) -> Vec<String> {
    let chars: Vec<char> = script
        .chars()
        .map(|c| if matches!(c, '[' | ']' | '(' | ')' | '{' | '}') { ' ' } else { c })
        .collect();

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' || c == '\r' {
            flush(&mut current, &mut sentences);
            i += 1;
            continue;
        }

        current.push(c);

        if TERMINATORS.contains(&c) && !is_decimal_point(&chars, i) {
            while i + 1 < chars.len()
                && (TERMINATORS.contains(&chars[i + 1]) || CLOSERS.contains(&chars[i + 1]))
            {
                i += 1;
                current.push(chars[i]);
            }
            flush(&mut current, &mut sentences);
        }

        i += 1;
    }
    flush(&mut current, &mut sentences);

    sentences
}

fn is_decimal_point(chars: &[char], i: usize) -> bool {
    chars[i] == '.'
        && i > 0
        && chars[i - 1].is_ascii_digit()
        && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}

fn flush(current: &mut String, sentences: &mut Vec<String>) {
    let piece = current.split_whitespace().collect::<Vec<_>>().join(" ");
    current.clear();
    if piece.chars().any(char::is_alphanumeric) {
        sentences.push(piece);
    }
}
