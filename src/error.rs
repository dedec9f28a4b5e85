use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlogError>;

#[derive(Error, Debug)]
pub enum BlogError {
    /// The manifest could not be fetched or parsed. Fatal for the page.
    #[error("manifest.json not found: {0}")]
    ManifestNotFound(String),

    #[error("Error fetching {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The chart dataset could not be fetched or parsed. Fatal for the page.
    #[error("Error loading chart data: {0}")]
    ChartData(String),

    /// A rendering collaborator (markdown or chart engine) is missing.
    #[error("Error: {0} is not available")]
    CollaboratorUnavailable(&'static str),

    #[error("Error rendering markdown: {0}")]
    Markdown(String),

    #[error("Error parsing template {name}: {reason}")]
    Template { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BlogError {
    pub fn fetch(url: impl ToString, reason: impl ToString) -> Self {
        BlogError::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
