use lazy_static::lazy_static;
use markdown::{CompileOptions, Options, ParseOptions};
use regex::{Captures, Regex};

use crate::error::{BlogError, Result};

/// Markdown to HTML conversion, injected into the post pipeline.
pub trait MarkdownEngine: Send + Sync {
    fn to_html(&self, markdown: &str) -> Result<String>;
}

/// GitHub flavored markdown, with line breaks inside paragraphs and list items kept as `<br />`.
pub struct GfmEngine {
    pub allow_html: bool,
    pub hard_breaks: bool,
}

impl GfmEngine {
    pub fn new() -> Self {
        GfmEngine {
            allow_html: true,
            hard_breaks: true,
        }
    }

    fn options(&self) -> Options {
        Options {
            parse: ParseOptions::gfm(),
            compile: CompileOptions {
                allow_dangerous_html: self.allow_html,
                ..CompileOptions::gfm()
            },
        }
    }
}

impl Default for GfmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine for GfmEngine {
    fn to_html(&self, markdown: &str) -> Result<String> {
        let html = match markdown::to_html_with_options(markdown, &self.options()) {
            Ok(x) => x,
            Err(e) => return Err(BlogError::Markdown(e.reason)),
        };

        if self.hard_breaks {
            Ok(break_paragraph_lines(&html))
        } else {
            Ok(html)
        }
    }
}

fn break_paragraph_lines(html: &str) -> String {
    lazy_static! {
        static ref PARAGRAPH_REGEX: Regex = Regex::new(r"(?s)<p>(.*?)</p>").unwrap();
        // Tight list items carry their text without a <p>. The inline run ends at the
        // item end or at the first nested block.
        static ref LIST_ITEM_REGEX: Regex = Regex::new(
            r"(?s)<li>(.*?)(</li>|<(?:ul|ol|p|pre|blockquote|table|div|hr|h[1-6])\b)"
        ).unwrap();
    }

    let html = LIST_ITEM_REGEX.replace_all(html, |cap: &Captures| {
        let run = &cap[1];
        let text = run.trim_end_matches(['\r', '\n']);
        format!("<li>{}{}{}", hard_breaks(text), &run[text.len()..], &cap[2])
    });

    PARAGRAPH_REGEX.replace_all(&html, |cap: &Captures| {
        format!("<p>{}</p>", hard_breaks(&cap[1]))
    }).to_string()
}

fn hard_breaks(text: &str) -> String {
    lazy_static! {
        static ref NEWLINE_REGEX: Regex = Regex::new(r"(?:<br />)?\r?\n").unwrap();
    }
    NEWLINE_REGEX.replace_all(text, "<br />\n").to_string()
}
