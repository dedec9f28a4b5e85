use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use url::Url;

use crate::error::{BlogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Default,
    NoStore,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub cache: CachePolicy,
}

impl FetchRequest {
    pub fn new(url: Url) -> Self {
        FetchRequest {
            url,
            cache: CachePolicy::Default,
        }
    }

    /// Request that bypasses every cache on the way: `NoStore` plus a `t=<unix millis>`
    /// query parameter, replacing any `t` already present.
    pub fn no_store(url: Url) -> Self {
        let stamp = Utc::now().timestamp_millis().to_string();
        FetchRequest {
            url: with_query_param(url, "t", &stamp),
            cache: CachePolicy::NoStore,
        }
    }
}

fn with_query_param(mut url: Url, key: &str, value: &str) -> Url {
    let kept: Vec<(String, String)> = url.query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(key, value);
    url
}

/// Transport used to retrieve manifests, posts and chart data.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output=Result<String>> + Send;
}

/// Serves `file://` URLs that resolve inside `root`.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: &Path) -> io::Result<FsFetcher> {
        let root = root.canonicalize().map_err(|e| {
            io::Error::new(e.kind(), format!("Error opening site directory {}: {}", root.display(), e))
        })?;
        Ok(FsFetcher { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory URL of `sub_dir` below the root, with a trailing slash so joins stay inside it.
    pub fn dir_url(&self, sub_dir: &str) -> Result<Url> {
        let dir = self.root.join(sub_dir);
        Url::from_directory_path(&dir)
            .map_err(|_| BlogError::Config(format!("Invalid directory {}", dir.display())))
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output=Result<String>> + Send {
        let root = self.root.clone();
        async move {
            let url = request.url;
            if url.scheme() != "file" {
                return Err(BlogError::fetch(&url, format!("unsupported scheme {}", url.scheme())));
            }

            let path = url.to_file_path()
                .map_err(|_| BlogError::fetch(&url, "not a local path"))?;
            if !path.starts_with(&root) {
                return Err(BlogError::fetch(&url, "access forbidden"));
            }

            tokio::fs::read_to_string(&path).await
                .map_err(|e| BlogError::fetch(&url, e))
        }
    }
}
