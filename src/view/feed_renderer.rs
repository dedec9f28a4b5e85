use std::path::Path;

use ramhorns::Template;

use crate::error::Result;
use crate::post::Post;
use crate::view::{parse_template, SiteInfo};

#[derive(ramhorns::Content)]
struct FullPage<'a> {
    site_name: &'a str,
    base_path: &'a str,
    has_posts: bool,
    posts: Vec<FullItem<'a>>,
}

#[derive(ramhorns::Content)]
struct FullItem<'a> {
    index: usize,
    title: &'a str,
    post_content: &'a str,
}

/// Every post inline, one `<article>` each, in the order given.
pub struct FeedRenderer {
    pub template: Template<'static>,
}

impl FeedRenderer {
    pub fn new(tpl_dir: Option<&Path>) -> Result<FeedRenderer> {
        Ok(FeedRenderer {
            template: parse_template(tpl_dir, "full.tpl")?,
        })
    }

    pub fn render(&self, site: &SiteInfo, posts: &[Post]) -> String {
        let items: Vec<FullItem> = posts.iter()
            .enumerate()
            .map(|(index, post)| FullItem {
                index,
                title: &post.title,
                post_content: &post.html,
            })
            .collect();

        self.template.render(&FullPage {
            site_name: &site.name,
            base_path: &site.base_path,
            has_posts: !items.is_empty(),
            posts: items,
        })
    }
}
