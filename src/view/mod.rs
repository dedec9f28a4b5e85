use std::fs;
use std::path::Path;

use ramhorns::Template;
use serde::Serialize;
use spdlog::info;

use crate::error::{BlogError, Result};

pub mod chart_renderer;
pub mod feed_renderer;
pub mod list_renderer;
pub mod post_renderer;

const LIST_TPL: &str = include_str!("../../res/template/list.tpl");
const VIEW_TPL: &str = include_str!("../../res/template/view.tpl");
const FULL_TPL: &str = include_str!("../../res/template/full.tpl");
const CHART_TPL: &str = include_str!("../../res/template/chart.tpl");
const ERROR_TPL: &str = include_str!("../../res/template/error.tpl");

/// Default stylesheet, written to the public directory by `riverblog init`.
pub const STYLE_CSS: &str = include_str!("../../res/public/style.css");

/// Built-in templates, each replaceable by a file of the same name in the template directory.
pub const TEMPLATES: [(&str, &str); 5] = [
    ("list.tpl", LIST_TPL),
    ("view.tpl", VIEW_TPL),
    ("full.tpl", FULL_TPL),
    ("chart.tpl", CHART_TPL),
    ("error.tpl", ERROR_TPL),
];

/// Site wide values every page shows.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub name: String,
    pub base_path: String,
    pub post_page: String,
}

impl SiteInfo {
    /// `/post.html?slug=the-speed-to-fly`
    pub fn post_link(&self, slug: &str) -> String {
        let query = serde_urlencoded::to_string([("slug", slug)]).unwrap_or_default();
        format!("{}{}?{}", self.base_path, self.post_page, query)
    }
}

pub fn read_template(tpl_dir: Option<&Path>, file_name: &str) -> Result<String> {
    let builtin = TEMPLATES.iter()
        .find(|(name, _)| *name == file_name)
        .map(|(_, src)| *src);

    if let Some(dir) = tpl_dir {
        let path = dir.join(file_name);
        if path.exists() {
            info!("Using template {}", path.display());
            return Ok(fs::read_to_string(path)?);
        }
    }

    builtin.map(str::to_string).ok_or_else(|| BlogError::Template {
        name: file_name.to_string(),
        reason: "unknown template".to_string(),
    })
}

pub fn parse_template(tpl_dir: Option<&Path>, file_name: &str) -> Result<Template<'static>> {
    let src = read_template(tpl_dir, file_name)?;
    Template::new(src).map_err(|e| BlogError::Template {
        name: file_name.to_string(),
        reason: e.to_string(),
    })
}

/// JSON that can sit inside a `<script>` element.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| BlogError::Template { name: "script".to_string(), reason: e.to_string() })?;
    Ok(json.replace("</", "<\\/"))
}

#[derive(ramhorns::Content)]
struct ErrorPage<'a> {
    site_name: &'a str,
    base_path: &'a str,
    message: &'a str,
}

/// The banner shown when a page cannot be built at all. The message is escaped.
pub struct ErrorRenderer {
    template: Template<'static>,
}

impl ErrorRenderer {
    pub fn new(tpl_dir: Option<&Path>) -> Result<ErrorRenderer> {
        Ok(ErrorRenderer {
            template: parse_template(tpl_dir, "error.tpl")?,
        })
    }

    pub fn render(&self, site: &SiteInfo, message: &str) -> String {
        self.template.render(&ErrorPage {
            site_name: &site.name,
            base_path: &site.base_path,
            message,
        })
    }
}

#[cfg(test)]
pub(crate) fn test_site() -> SiteInfo {
    SiteInfo {
        name: "South River Blog".to_string(),
        base_path: "/".to_string(),
        post_page: "post.html".to_string(),
    }
}
