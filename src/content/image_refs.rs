use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const IMAGES_DIR: &str = "chart_images";

pub const IMAGE_STYLE: &str = "max-width: 100%; height: auto; margin: 20px 0; display: block; \
border-radius: 8px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);";

/// `fossil fuel.png` on its own line becomes `![fossil fuel.png](chart_images/fossil fuel.png)`.
/// Any line with something besides the file name is returned as `None`.
pub fn rewrite_image_line(line: &str) -> Option<String> {
    lazy_static! {
        static ref IMAGE_LINE_REGEX: Regex = Regex::new(
            r"(?i)^[A-Za-z0-9_\s-]+\.(png|jpg|jpeg|gif)$"
        ).unwrap();
    }

    let trimmed = line.trim();
    if IMAGE_LINE_REGEX.is_match(trimmed) {
        Some(format!("![{}]({}/{})", trimmed, IMAGES_DIR, trimmed))
    } else {
        None
    }
}

pub fn normalize_image_refs(md_post: &str) -> String {
    md_post.split('\n')
        .map(|line| rewrite_image_line(line).unwrap_or_else(|| line.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Gives every `<img>` without a `max-width` the default presentation style.
/// Running it twice gives the same result as running it once.
pub fn style_images(html: &str) -> String {
    lazy_static! {
        static ref IMG_REGEX: Regex = Regex::new(r#"(?i)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();
        static ref ATTR_REGEX: Regex = Regex::new(
            r#"(?P<name>[^\s"'<>/=]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>[^\s"'=<>`]+)))?"#
        ).unwrap();
    }

    IMG_REGEX.replace_all(html, |cap: &Captures| {
        let tag = &cap[0];
        let attrs = &tag[4..];

        let style = ATTR_REGEX.captures_iter(attrs)
            .find(|attr| attr["name"].eq_ignore_ascii_case("style"));
        if let Some(attr) = style {
            let current = ["dq", "sq", "uq"].iter()
                .find_map(|group| attr.name(group))
                .map(|m| m.as_str())
                .unwrap_or("");
            if current.to_ascii_lowercase().contains("max-width") {
                return tag.to_string();
            }
            let Some(span) = attr.get(0) else {
                return tag.to_string();
            };
            let merged = merge_style(current);
            let quote = if merged.contains('"') { '\'' } else { '"' };
            return format!("{}style={}{}{}{}",
                           &tag[..4 + span.start()], quote, merged, quote, &tag[4 + span.end()..]);
        }

        let (body, close) = match tag.strip_suffix("/>") {
            Some(body) => (body, " />"),
            None => (&tag[..tag.len() - 1], ">"),
        };
        format!(r#"{} style="{}"{}"#, body.trim_end(), IMAGE_STYLE, close)
    }).to_string()
}

fn merge_style(current: &str) -> String {
    let current = current.trim().trim_end_matches(';');
    if current.is_empty() {
        IMAGE_STYLE.to_string()
    } else {
        format!("{}; {}", current, IMAGE_STYLE)
    }
}
