use std::path::Path;
use std::sync::Arc;

use spdlog::{error, info};

use crate::chart::{ChartLoader, DATA_FILE};
use crate::config::Config;
use crate::content::markdown_engine::{GfmEngine, MarkdownEngine};
use crate::error::{BlogError, Result};
use crate::fetch::{FsFetcher, Fetcher};
use crate::post_loader::PostLoader;
use crate::view::chart_renderer::{ChartEngine, ChartRenderer, PlotlyEngine};
use crate::view::feed_renderer::FeedRenderer;
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::{ErrorRenderer, SiteInfo};

pub const POSTS_DIR: &str = "post_markdown";

const MANIFEST_MISSING: &str = "manifest.json not found. Please create post_markdown/manifest.json \
with a list of markdown files, or run `riverblog manifest`.";
const POSTS_FAILED: &str = "Failed to load posts. Please check the log for details.";
const CHART_FAILED: &str = "Error loading chart data. Please check the log for details.";
const CHART_UNAVAILABLE: &str = "Error: the chart library is not configured.";

pub struct Renderers {
    pub list: ListRenderer,
    pub post: PostRenderer,
    pub feed: FeedRenderer,
    pub chart: ChartRenderer,
    pub error: ErrorRenderer,
}

impl Renderers {
    pub fn new(tpl_dir: Option<&Path>) -> Result<Renderers> {
        Ok(Renderers {
            list: ListRenderer::new(tpl_dir)?,
            post: PostRenderer::new(tpl_dir)?,
            feed: FeedRenderer::new(tpl_dir)?,
            chart: ChartRenderer::new(tpl_dir)?,
            error: ErrorRenderer::new(tpl_dir)?,
        })
    }
}

/// Every page of the blog, with its collaborators resolved up front.
///
/// Page methods never fail: problems that stop a page are rendered as an error banner.
pub struct Site<F: Fetcher> {
    pub info: SiteInfo,
    posts: PostLoader<F>,
    chart: ChartLoader<F>,
    chart_engine: Option<Arc<dyn ChartEngine>>,
    renderers: Renderers,
}

impl Site<FsFetcher> {
    pub fn from_config(config: &Config) -> Result<Site<FsFetcher>> {
        let fetcher = Arc::new(FsFetcher::new(&config.paths.site_dir)?);
        let posts_url = fetcher.dir_url(POSTS_DIR)?;
        let data_url = fetcher.dir_url("")?
            .join(DATA_FILE)
            .map_err(|e| BlogError::Config(e.to_string()))?;
        info!("Serving posts from {}", posts_url);

        let engine: Arc<dyn MarkdownEngine> = Arc::new(GfmEngine {
            allow_html: config.defaults.allow_html,
            hard_breaks: true,
        });

        let chart_engine: Option<Arc<dyn ChartEngine>> = match config.chart.script_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Some(Arc::new(PlotlyEngine::new(url.trim()))),
            _ => {
                info!("No chart script configured. The chart page is disabled");
                None
            }
        };

        let info = SiteInfo {
            name: config.site.name.clone(),
            base_path: config.site.base_path.clone(),
            post_page: config.defaults.post_page.clone(),
        };

        let renderers = Renderers::new(config.paths.template_dir.as_deref())?;
        let posts = PostLoader::new(fetcher.clone(), posts_url, engine, config.defaults.teaser_length);
        let chart = ChartLoader::new(fetcher, data_url);

        Ok(Site::new(info, posts, chart, chart_engine, renderers))
    }
}

impl<F: Fetcher> Site<F> {
    pub fn new(info: SiteInfo,
               posts: PostLoader<F>,
               chart: ChartLoader<F>,
               chart_engine: Option<Arc<dyn ChartEngine>>,
               renderers: Renderers) -> Self {
        Site {
            info,
            posts,
            chart,
            chart_engine,
            renderers,
        }
    }

    pub async fn list_page(&self) -> String {
        match self.posts.summaries().await {
            Ok(summaries) => self.renderers.list.render(&self.info, &summaries),
            Err(e) => self.fatal(&e, Self::load_message(&e)),
        }
    }

    pub async fn full_page(&self) -> String {
        match self.posts.posts().await {
            Ok(posts) => self.renderers.feed.render(&self.info, &posts),
            Err(e) => self.fatal(&e, Self::load_message(&e)),
        }
    }

    pub async fn post_page(&self, slug: &str) -> String {
        let post = self.posts.single(slug).await;
        match self.renderers.post.render(&self.info, post.as_ref()) {
            Ok(page) => page,
            Err(e) => self.fatal(&e, POSTS_FAILED),
        }
    }

    pub async fn chart_page(&self) -> String {
        let Some(engine) = self.chart_engine.as_deref() else {
            return self.fatal(&BlogError::CollaboratorUnavailable("chart library"), CHART_UNAVAILABLE);
        };

        let spec = match self.chart.load().await {
            Ok(spec) => spec,
            Err(e) => return self.fatal(&e, CHART_FAILED),
        };

        match self.renderers.chart.render(&self.info, engine, &spec) {
            Ok(page) => page,
            Err(e) => self.fatal(&e, CHART_FAILED),
        }
    }

    fn load_message(e: &BlogError) -> &'static str {
        match e {
            BlogError::ManifestNotFound(_) => MANIFEST_MISSING,
            _ => POSTS_FAILED,
        }
    }

    fn fatal(&self, e: &BlogError, message: &str) -> String {
        error!("{}", e);
        self.renderers.error.render(&self.info, message)
    }
}
