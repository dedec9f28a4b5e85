use std::sync::Arc;

use spdlog::{debug, info, warn};
use tokio::task::JoinSet;
use url::Url;

use crate::content::markdown_engine::MarkdownEngine;
use crate::content::teaser::extract_teaser;
use crate::error::{BlogError, Result};
use crate::fetch::{FetchRequest, Fetcher};
use crate::manifest::{fetch_manifest, ManifestEntry};
use crate::post::{slug_from_filename, title_or_fallback, Post, PostSummary};

/// Loads posts listed in the manifest under `base`.
///
/// A missing manifest fails the whole load. A post that cannot be fetched or rendered is
/// logged and left out.
pub struct PostLoader<F: Fetcher> {
    fetcher: Arc<F>,
    base: Url,
    engine: Arc<dyn MarkdownEngine>,
    teaser_length: usize,
}

impl<F: Fetcher> PostLoader<F> {
    pub fn new(fetcher: Arc<F>, base: Url, engine: Arc<dyn MarkdownEngine>, teaser_length: usize) -> Self {
        PostLoader {
            fetcher,
            base,
            engine,
            teaser_length,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn manifest(&self) -> Result<Vec<ManifestEntry>> {
        fetch_manifest(self.fetcher.as_ref(), &self.base).await
    }

    /// Cards for the landing page, newest first.
    pub async fn summaries(&self) -> Result<Vec<PostSummary>> {
        let entries = self.manifest().await?;
        let bodies = self.fetch_all(&entries).await;

        let summaries: Vec<PostSummary> = entries.iter()
            .zip(bodies)
            .filter_map(|(entry, body)| body.map(|markdown| self.summarize(entry, &markdown)))
            .collect();

        info!("Loaded {} of {} post previews", summaries.len(), entries.len());
        Ok(summaries)
    }

    /// Every post fully rendered, newest first.
    pub async fn posts(&self) -> Result<Vec<Post>> {
        let entries = self.manifest().await?;
        let bodies = self.fetch_all(&entries).await;

        let mut posts = Vec::with_capacity(entries.len());
        for (entry, body) in entries.iter().zip(bodies) {
            let Some(markdown) = body else {
                continue;
            };
            match Post::render(entry, markdown, self.engine.as_ref()) {
                Ok(post) => posts.push(post),
                Err(e) => warn!("Skipping post {}: {}", entry.filename, e),
            }
        }

        info!("Loaded {} of {} posts", posts.len(), entries.len());
        Ok(posts)
    }

    /// The post stored as `<slug>.md`, if it can be fetched and rendered.
    pub async fn single(&self, slug: &str) -> Option<Post> {
        if slug.is_empty() || slug.contains(['/', '\\', '#', '?', '%']) {
            warn!("Rejecting post slug {:?}", slug);
            return None;
        }

        let entry = ManifestEntry::from_filename(&format!("{}.md", slug));
        let markdown = match self.fetch_markdown(&entry.filename).await {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!("Error loading post {}: {}", slug, e);
                return None;
            }
        };

        match Post::render(&entry, markdown, self.engine.as_ref()) {
            Ok(post) => Some(post),
            Err(e) => {
                warn!("Error rendering post {}: {}", slug, e);
                None
            }
        }
    }

    fn summarize(&self, entry: &ManifestEntry, markdown: &str) -> PostSummary {
        let slug = slug_from_filename(&entry.filename);
        PostSummary {
            title: title_or_fallback(markdown, &slug),
            teaser: extract_teaser(markdown, self.teaser_length),
            slug,
            created_at: entry.created_at.clone(),
            updated_at: entry.updated_at.clone(),
        }
    }

    async fn fetch_markdown(&self, filename: &str) -> Result<String> {
        let url = self.base.join(filename).map_err(|e| BlogError::fetch(filename, e))?;
        self.fetcher.fetch(FetchRequest::no_store(url)).await
    }

    /// Issues every fetch at once and waits for all of them. Slot `i` holds the body of
    /// `entries[i]`, whatever order the fetches finish in; failed fetches leave `None`.
    async fn fetch_all(&self, entries: &[ManifestEntry]) -> Vec<Option<String>> {
        let mut set = JoinSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let url = self.base.join(&entry.filename);
            let filename = entry.filename.clone();
            set.spawn(async move {
                let res = match url {
                    Ok(url) => fetcher.fetch(FetchRequest::no_store(url)).await,
                    Err(e) => Err(BlogError::fetch(filename, e)),
                };
                (index, res)
            });
        }

        let mut slots: Vec<Option<String>> = vec![None; entries.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(body))) => {
                    debug!("Fetched {}", entries[index].filename);
                    slots[index] = Some(body);
                }
                Ok((index, Err(e))) => warn!("Skipping post {}: {}", entries[index].filename, e),
                Err(e) => warn!("Post fetch task failed: {}", e),
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::content::markdown_engine::GfmEngine;
    use crate::content::teaser::DEFAULT_TEASER_LENGTH;
    use crate::test_data::{MemoryFetcher, MANIFEST_DATA, POST_FOSSIL_FUELS, POST_SPEED_TO_FLY};

    use super::*;

    fn loader(fetcher: MemoryFetcher) -> PostLoader<MemoryFetcher> {
        let base = fetcher.base_url();
        PostLoader::new(Arc::new(fetcher), base, Arc::new(GfmEngine::new()), DEFAULT_TEASER_LENGTH)
    }

    fn site_fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with("manifest.json", MANIFEST_DATA)
            .with("the-speed-to-fly.md", POST_SPEED_TO_FLY)
            .with("fossil-fuels.md", POST_FOSSIL_FUELS)
            .with("old-post.md", "No heading here, just *words*.")
    }

    #[tokio::test]
    async fn test_summaries_skip_missing_posts() {
        let loader = loader(site_fetcher());
        let summaries = loader.summaries().await.unwrap();

        let slugs: Vec<&str> = summaries.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, ["the-speed-to-fly", "fossil-fuels", "old-post"]);

        assert_eq!(summaries[0].title, "The speed to fly");
        assert_eq!(summaries[0].created_at.as_deref(), Some("2026-02-02T03:44:38Z"));
        assert_eq!(summaries[0].updated_at.as_deref(), Some("2026-02-05T10:00:00Z"));
        assert_eq!(summaries[2].title, "Old Post");
        assert_eq!(summaries[2].teaser, "No heading here, just words.");
    }

    #[tokio::test]
    async fn test_order_follows_manifest_not_completion() {
        let fetcher = site_fetcher()
            .with_delay("the-speed-to-fly.md", Duration::from_millis(60))
            .with_delay("fossil-fuels.md", Duration::from_millis(30));
        let loader = loader(fetcher);

        let posts = loader.posts().await.unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["the-speed-to-fly", "fossil-fuels", "old-post"]);
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let fetcher = site_fetcher()
            .with_delay("the-speed-to-fly.md", Duration::from_millis(40))
            .with_delay("fossil-fuels.md", Duration::from_millis(40))
            .with_delay("old-post.md", Duration::from_millis(40));
        let loader = loader(fetcher);

        let summaries = loader.summaries().await.unwrap();
        assert_eq!(summaries.len(), 3);
        assert!(loader.fetcher.max_in_flight() >= 3);
    }

    #[tokio::test]
    async fn test_posts_are_rendered() {
        let loader = loader(site_fetcher());
        let posts = loader.posts().await.unwrap();
        assert_eq!(posts[1].title, "Fossil fuels");
        assert!(posts[1].html.contains("<h1>Fossil fuels</h1>"));
        assert!(posts[0].html.contains("chart_images/polar-curve.png"));
    }

    #[tokio::test]
    async fn test_every_post_requested_without_cache() {
        let loader = loader(site_fetcher());
        loader.posts().await.unwrap();
        assert!(loader.fetcher.requested_no_store("the-speed-to-fly.md"));
        assert!(loader.fetcher.requested_no_store("draft.md"));
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let loader = loader(MemoryFetcher::new().with("the-speed-to-fly.md", POST_SPEED_TO_FLY));
        assert!(matches!(loader.summaries().await, Err(BlogError::ManifestNotFound(_))));
        assert!(matches!(loader.posts().await, Err(BlogError::ManifestNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_manifest() {
        let loader = loader(MemoryFetcher::new().with("manifest.json", r#"{"files": []}"#));
        assert!(loader.summaries().await.unwrap().is_empty());
        assert!(loader.posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single() {
        let loader = loader(site_fetcher());
        let post = loader.single("fossil-fuels").await.unwrap();
        assert_eq!(post.slug, "fossil-fuels");
        assert_eq!(post.title, "Fossil fuels");

        assert!(loader.single("draft").await.is_none());
        assert!(loader.single("../manifest").await.is_none());
        assert!(loader.single("").await.is_none());
        assert!(loader.single("manifest.json#").await.is_none());
        assert!(loader.single("manifest.json?").await.is_none());
        assert!(loader.single("fossil-fuels.md%23").await.is_none());
    }
}
