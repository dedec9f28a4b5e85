use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::content::teaser::DEFAULT_TEASER_LENGTH;

#[derive(Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub site_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct Defaults {
    #[serde(default = "default_teaser_length")]
    pub teaser_length: usize,
    #[serde(default = "default_post_page")]
    pub post_page: String,
    #[serde(default = "default_true")]
    pub allow_html: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            teaser_length: DEFAULT_TEASER_LENGTH,
            post_page: default_post_page(),
            allow_html: true,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct Chart {
    pub script_url: Option<String>,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub chart: Chart,
    pub server: Server,
    pub log: Option<Log>,
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_teaser_length() -> usize {
    DEFAULT_TEASER_LENGTH
}

fn default_post_page() -> String {
    "post.html".to_string()
}

fn default_true() -> bool {
    true
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy()))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        site_dir: parse_path(cfg.paths.site_dir),
        template_dir: cfg.paths.template_dir.map(parse_path),
        public_dir: cfg.paths.public_dir.map(parse_path),
    };
    if let Some(log) = cfg.log.as_mut() {
        log.location = log.location.take().map(parse_path);
    }
    if !cfg.site.base_path.starts_with('/') {
        cfg.site.base_path.insert(0, '/');
    }
    if !cfg.site.base_path.ends_with('/') {
        cfg.site.base_path.push('/');
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };
    parse_config(&cfg_content)
}

impl Config {
    /// Static assets: `public_dir` if set, otherwise `<site_dir>/public`.
    pub fn public_dir(&self) -> PathBuf {
        self.paths.public_dir.clone()
            .unwrap_or_else(|| self.paths.site_dir.join("public"))
    }
}
