use std::fmt;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::markdown_engine::MarkdownEngine;
use crate::content::render_markdown;
use crate::error::Result;
use crate::manifest::ManifestEntry;

/// A post loaded from one markdown file.
///
/// `html` is only ever produced by [`Post::render`], from `raw_markdown`.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub html: String,
    pub raw_markdown: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// What a list card needs to know about a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub teaser: String,
}

impl Post {
    pub fn render(entry: &ManifestEntry, raw_markdown: String, engine: &dyn MarkdownEngine) -> Result<Post> {
        let slug = slug_from_filename(&entry.filename);
        let title = title_or_fallback(&raw_markdown, &slug);
        let html = render_markdown(&raw_markdown, engine)?;

        Ok(Post {
            slug,
            title,
            html,
            raw_markdown,
            created_at: entry.created_at.clone(),
            updated_at: entry.updated_at.clone(),
        })
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "slug={}, created={}, updated={}\ntitle={}",
               self.slug,
               self.created_at.as_deref().unwrap_or("-"),
               self.updated_at.as_deref().unwrap_or("-"),
               self.title,
        )
    }
}

/// `the-speed-to-fly.md` and `notes.MD` lose their extension, nothing else changes.
pub fn slug_from_filename(filename: &str) -> String {
    let len = filename.len();
    if len >= 3 && filename.is_char_boundary(len - 3) && filename[len - 3..].eq_ignore_ascii_case(".md") {
        filename[..len - 3].to_string()
    } else {
        filename.to_string()
    }
}

/// `the-speed-to-fly` -> `The Speed To Fly`
pub fn slug_to_title(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut title = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if word_start && is_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        word_start = !is_word;
    }
    title
}

/// Text of the first line starting with `# `, taken verbatim.
pub fn parse_title(markdown: &str) -> Option<String> {
    lazy_static! {
        static ref TITLE_REGEX: Regex = Regex::new(r"(?m)^# (?P<title>.+)$").unwrap();
    }

    TITLE_REGEX.captures(markdown)
        .and_then(|cap| cap.name("title"))
        .map(|title| title.as_str().trim_end_matches('\r').to_string())
}

pub fn title_or_fallback(markdown: &str, slug: &str) -> String {
    match parse_title(markdown) {
        Some(title) if !title.trim().is_empty() => title,
        _ => slug_to_title(slug),
    }
}
