use std::path::Path;

use ramhorns::Template;

use crate::chart::ChartSpec;
use crate::error::Result;
use crate::view::{parse_template, script_json, SiteInfo};

pub const CHART_CONTAINER_ID: &str = "chart";

/// Charting library driven from the page.
pub trait ChartEngine: Send + Sync {
    /// Script the page has to load before the chart can be drawn.
    fn script_url(&self) -> &str;

    /// Script statement that draws `spec` into the element `container_id`.
    fn render_call(&self, container_id: &str, spec: &ChartSpec) -> Result<String>;
}

pub struct PlotlyEngine {
    script_url: String,
}

impl PlotlyEngine {
    pub fn new(script_url: &str) -> Self {
        PlotlyEngine {
            script_url: script_url.to_string(),
        }
    }
}

impl ChartEngine for PlotlyEngine {
    fn script_url(&self) -> &str {
        &self.script_url
    }

    fn render_call(&self, container_id: &str, spec: &ChartSpec) -> Result<String> {
        Ok(format!("Plotly.newPlot({}, {}, {}, {});",
                   script_json(container_id)?,
                   script_json(&spec.data)?,
                   script_json(&spec.layout)?,
                   script_json(&spec.config)?,
        ))
    }
}

#[derive(ramhorns::Content)]
struct ChartPage<'a> {
    site_name: &'a str,
    base_path: &'a str,
    page_title: String,
    script_url: &'a str,
    container_id: &'a str,
    chart_call: String,
}

pub struct ChartRenderer {
    pub template: Template<'static>,
}

impl ChartRenderer {
    pub fn new(tpl_dir: Option<&Path>) -> Result<ChartRenderer> {
        Ok(ChartRenderer {
            template: parse_template(tpl_dir, "chart.tpl")?,
        })
    }

    pub fn render(&self, site: &SiteInfo, engine: &dyn ChartEngine, spec: &ChartSpec) -> Result<String> {
        let chart_call = engine.render_call(CHART_CONTAINER_ID, spec)?;
        let page_title = if spec.layout.title.text.is_empty() {
            site.name.clone()
        } else {
            format!("{} — {}", spec.layout.title.text, site.name)
        };

        Ok(self.template.render(&ChartPage {
            site_name: &site.name,
            base_path: &site.base_path,
            page_title,
            script_url: engine.script_url(),
            container_id: CHART_CONTAINER_ID,
            chart_call,
        }))
    }
}
