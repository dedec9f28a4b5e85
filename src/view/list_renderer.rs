use std::path::Path;

use ramhorns::Template;

use crate::error::Result;
use crate::post::PostSummary;
use crate::text_utils::format_date_range;
use crate::view::{parse_template, SiteInfo};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site_name: &'a str,
    base_path: &'a str,
    has_posts: bool,
    post_list: Vec<PostItem>,
}

#[derive(ramhorns::Content)]
struct PostItem {
    link: String,
    title: String,
    dates: String,
    teaser: String,
    has_teaser: bool,
}

pub struct ListRenderer {
    pub template: Template<'static>,
}

impl ListRenderer {
    pub fn new(tpl_dir: Option<&Path>) -> Result<ListRenderer> {
        Ok(ListRenderer {
            template: parse_template(tpl_dir, "list.tpl")?,
        })
    }

    pub fn render(&self, site: &SiteInfo, summaries: &[PostSummary]) -> String {
        let post_list: Vec<PostItem> = summaries.iter()
            .map(|summary| PostItem {
                link: site.post_link(&summary.slug),
                title: summary.title.clone(),
                dates: format_date_range(summary.created_at.as_deref(), summary.updated_at.as_deref()),
                teaser: summary.teaser.clone(),
                has_teaser: !summary.teaser.is_empty(),
            })
            .collect();

        self.template.render(&ListPage {
            site_name: &site.name,
            base_path: &site.base_path,
            has_posts: !post_list.is_empty(),
            post_list,
        })
    }
}
