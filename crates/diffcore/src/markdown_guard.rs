//! Stage 1 of the inline diff pipeline: hides `**bold**` and `*italic*` runs
//! behind opaque single-token placeholders before tokenization, so the
//! word-anchor and LCS stages never split an emphasis marker away from the
//! text it wraps.
//!
//! Placeholders are private-use-area characters, which `is_whitespace` never
//! matches, so the tokenizer treats each one as a single word regardless of
//! what's inside.

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Replace every `**…**` or `*…*` run in `text` with a placeholder token,
/// returning the guarded text plus the list of hidden runs (in placeholder
/// index order) needed to restore them.
pub fn guard_markdown(text: &str) -> (String, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut hidden = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if let Some(end) = find_emphasis_end(&chars, i) {
            let run: String = chars[i..=end].iter().collect();
            let idx = hidden.len();
            hidden.push(run);
            out.push(PLACEHOLDER_OPEN);
            out.push_str(&idx.to_string());
            out.push(PLACEHOLDER_CLOSE);
            i = end + 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    (out, hidden)
}

/// If an emphasis run starts at `start`, return the index of its closing
/// delimiter's last character. Tries `**…**` before `*…*` so bold is never
/// mistaken for two adjacent italics.
fn find_emphasis_end(chars: &[char], start: usize) -> Option<usize> {
    if chars[start] != '*' {
        return None;
    }

    let is_bold = start + 1 < chars.len() && chars[start + 1] == '*';
    let marker_len = if is_bold { 2 } else { 1 };
    let content_start = start + marker_len;
    if content_start >= chars.len() {
        return None;
    }

    let mut j = content_start;
    while j + marker_len <= chars.len() {
        let closes = if is_bold {
            chars[j] == '*' && chars[j + 1] == '*'
        } else {
            chars[j] == '*'
        };
        if closes && j > content_start {
            return Some(j + marker_len - 1);
        }
        j += 1;
    }
    None
}

/// Restore every placeholder in `text` to the run it hid.
pub fn restore_markdown(text: &str, hidden: &[String]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == PLACEHOLDER_OPEN {
            let mut j = i + 1;
            let mut digits = String::new();
            while j < chars.len() && chars[j] != PLACEHOLDER_CLOSE {
                digits.push(chars[j]);
                j += 1;
            }
            if j < chars.len() {
                if let Ok(idx) = digits.parse::<usize>() {
                    if let Some(run) = hidden.get(idx) {
                        out.push_str(run);
                        i = j + 1;
                        continue;
                    }
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// True iff `s` contains a guard placeholder (used by callers deciding
/// whether restoration is needed at all).
pub fn contains_placeholder(s: &str) -> bool {
    s.contains(PLACEHOLDER_OPEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_bold_run() {
        let (guarded, hidden) = guard_markdown("say **hello world** now");
        assert_eq!(hidden, vec!["**hello world**"]);
        assert!(contains_placeholder(&guarded));
        assert_eq!(restore_markdown(&guarded, &hidden), "say **hello world** now");
    }

    #[test]
    fn guards_italic_run() {
        let (guarded, hidden) = guard_markdown("say *hello* now");
        assert_eq!(hidden, vec!["*hello*"]);
        assert_eq!(restore_markdown(&guarded, &hidden), "say *hello* now");
    }

    #[test]
    fn prefers_bold_over_double_italic() {
        let (_guarded, hidden) = guard_markdown("**bold** text");
        assert_eq!(hidden, vec!["**bold**"]);
    }

    #[test]
    fn unterminated_marker_is_left_alone() {
        let (guarded, hidden) = guard_markdown("a * lonely star");
        assert!(hidden.is_empty());
        assert_eq!(guarded, "a * lonely star");
    }

    #[test]
    fn round_trips_multiple_runs() {
        let text = "**one** and *two* and **three**";
        let (guarded, hidden) = guard_markdown(text);
        assert_eq!(hidden.len(), 3);
        assert_eq!(restore_markdown(&guarded, &hidden), text);
    }

    #[test]
    fn plain_text_is_unaffected() {
        let (guarded, hidden) = guard_markdown("nothing fancy here");
        assert!(hidden.is_empty());
        assert_eq!(guarded, "nothing fancy here");
    }
}
