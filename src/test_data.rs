use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::error::{BlogError, Result};
use crate::fetch::{CachePolicy, FetchRequest, Fetcher};

pub const MANIFEST_DATA: &str = r#"{
  "files": [
    "old-post.md",
    {
      "filename": "the-speed-to-fly.md",
      "created_at": "2026-02-02T03:44:38Z",
      "updated_at": "2026-02-05T10:00:00Z"
    },
    {
      "filename": "fossil-fuels.md",
      "created_at": "2025-11-20T08:00:00Z",
      "updated_at": "2025-11-20T08:00:00Z"
    },
    { "filename": "draft.md" }
  ]
}"#;

pub const POST_SPEED_TO_FLY: &str = "# The speed to fly

Flying **faster** between thermals pays off when the next climb is strong.
The [MacCready](https://en.wikipedia.org/wiki/MacCready_theory) setting tells you how much.

polar-curve.png

## Sink rate

A glider sinks faster the faster it flies.
";

pub const POST_FOSSIL_FUELS: &str = "# Fossil fuels

Share of energy by source, 1965 to 2023.

fossil fuel.png
";

pub const CHART_DATA: &str = r#"{
  "title": "Energy use by source",
  "xAxisLabel": "Year",
  "yAxisLabel": "TWh",
  "years": [2000, 2010, 2020],
  "series": [
    { "name": "Coal", "data": [25000, 40000, 43000] },
    { "name": "Oil", "data": [42000, 47000, 49000] },
    { "name": "Gas", "data": [25000, 32000, 39000] },
    { "name": "Solar", "data": [1, 30, 850] }
  ]
}"#;

/// In-memory site, keyed by the last path segment of the requested URL.
pub struct MemoryFetcher {
    files: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<FetchRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        MemoryFetcher {
            files: HashMap::new(),
            delays: HashMap::new(),
            requests: Mutex::new(vec![]),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, name: &str, body: &str) -> Self {
        self.files.insert(name.to_string(), body.to_string());
        self
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn base_url(&self) -> Url {
        Url::parse("memory://site/post_markdown/").unwrap()
    }

    pub fn site_url(&self) -> Url {
        Url::parse("memory://site/").unwrap()
    }

    pub fn requested_no_store(&self, name: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|r| {
            Self::key(&r.url) == name
                && r.cache == CachePolicy::NoStore
                && r.url.query_pairs().any(|(k, _)| k == "t")
        })
    }

    /// Highest number of fetches that were pending at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn key(url: &Url) -> String {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output=Result<String>> + Send {
        let key = Self::key(&request.url);
        let body = self.files.get(&key).cloned();
        let delay = self.delays.get(&key).copied();
        let url = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        async move {
            let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(pending, Ordering::SeqCst);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            body.ok_or_else(|| BlogError::fetch(url, "404 Not Found"))
        }
    }
}
