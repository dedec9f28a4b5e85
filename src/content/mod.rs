pub mod image_refs;
pub mod markdown_engine;
pub mod teaser;

use crate::content::image_refs::{normalize_image_refs, style_images};
use crate::content::markdown_engine::MarkdownEngine;
use crate::error::Result;

/// The one path from post markdown to post HTML: bare image names are rewritten,
/// the engine converts, then images get their default style.
pub fn render_markdown(md_text: &str, engine: &dyn MarkdownEngine) -> Result<String> {
    let buf = normalize_image_refs(md_text);
    let html = engine.to_html(&buf)?;
    Ok(style_images(&html))
}
