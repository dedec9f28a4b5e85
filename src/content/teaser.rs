use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_TEASER_LENGTH: usize = 200;

const ELLIPSIS: char = '…';

/// Plain text excerpt of a post for list cards.
///
/// The heading on the first non-blank line is skipped, emphasis and link markup are
/// removed and whitespace is collapsed. Text longer than `max_len` characters is cut at
/// exactly `max_len` and gets an ellipsis.
pub fn extract_teaser(markdown: &str, max_len: usize) -> String {
    lazy_static! {
        static ref BOLD_STAR: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
        static ref ITALIC_STAR: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
        static ref BOLD_UNDERSCORE: Regex = Regex::new(r"__([^_]+)__").unwrap();
        static ref ITALIC_UNDERSCORE: Regex = Regex::new(r"_([^_]+)_").unwrap();
        static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
        static ref HEADING_MARK: Regex = Regex::new(r"(?m)^#+\s*").unwrap();
        static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    }

    let lines: Vec<&str> = markdown.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    let body_start = match lines.first() {
        Some(first) if first.starts_with('#') => 1,
        _ => 0,
    };
    let body = lines[body_start..].join(" ");

    let text = BOLD_STAR.replace_all(&body, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = HEADING_MARK.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_len).collect();
    let mut teaser = cut.trim().to_string();
    teaser.push(ELLIPSIS);
    teaser
}
