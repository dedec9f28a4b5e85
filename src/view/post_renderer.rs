use std::path::Path;

use ramhorns::Template;

use crate::error::Result;
use crate::post::Post;
use crate::view::{parse_template, script_json, SiteInfo};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_name: &'a str,
    base_path: &'a str,
    page_title: String,
    found: bool,
    canonical_url: String,
    canonical_json: String,
    post_content: &'a str,
}

pub struct PostRenderer {
    pub template: Template<'static>,
}

impl PostRenderer {
    pub fn new(tpl_dir: Option<&Path>) -> Result<PostRenderer> {
        Ok(PostRenderer {
            template: parse_template(tpl_dir, "view.tpl")?,
        })
    }

    /// Page for one post, titled `<post title> — <site name>`. The page also moves the
    /// address bar to the canonical `post.html?slug=` form of the link.
    pub fn render(&self, site: &SiteInfo, post: Option<&Post>) -> Result<String> {
        let Some(post) = post else {
            return Ok(self.template.render(&ViewItem {
                site_name: &site.name,
                base_path: &site.base_path,
                page_title: site.name.clone(),
                found: false,
                canonical_url: String::new(),
                canonical_json: String::new(),
                post_content: "",
            }));
        };

        let canonical_url = site.post_link(&post.slug);
        let canonical_json = script_json(&canonical_url)?;
        Ok(self.template.render(&ViewItem {
            site_name: &site.name,
            base_path: &site.base_path,
            page_title: format!("{} — {}", post.title, site.name),
            found: true,
            canonical_url,
            canonical_json,
            post_content: &post.html,
        }))
    }
}
