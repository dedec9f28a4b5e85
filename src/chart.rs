use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spdlog::{error, info};
use url::Url;

use crate::error::{BlogError, Result};
use crate::fetch::{FetchRequest, Fetcher};

pub const DATA_FILE: &str = "data.json";

pub const SERIES_COLORS: [&str; 3] = [
    "rgb(102, 126, 234)",
    "rgb(118, 75, 162)",
    "rgb(255, 99, 132)",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub years: Vec<f64>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Everything the chart engine needs to draw: traces, layout and display options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<ChartTrace>,
    pub layout: ChartLayout,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub line: Line,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub titlefont: Font,
    pub tickfont: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub bgcolor: &'static str,
    pub bordercolor: &'static str,
    pub borderwidth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub hovermode: &'static str,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub legend: Legend,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub displaylogo: bool,
    pub mode_bar_buttons_to_remove: Vec<&'static str>,
}

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

fn axis(title: &str) -> Axis {
    Axis {
        title: title.to_string(),
        titlefont: Font { size: 14, color: Some("#666") },
        tickfont: Font { size: 12, color: None },
    }
}

impl ChartSpec {
    pub fn from_dataset(dataset: &ChartDataset) -> ChartSpec {
        let data = dataset.series.iter()
            .enumerate()
            .map(|(index, series)| {
                let color = series_color(index);
                ChartTrace {
                    x: dataset.years.clone(),
                    y: series.data.clone(),
                    kind: "scatter",
                    mode: "lines+markers",
                    name: series.name.clone(),
                    line: Line { color, width: 3 },
                    marker: Marker { size: 10, color },
                }
            })
            .collect();

        let layout = ChartLayout {
            title: Title {
                text: dataset.title.clone(),
                font: Font { size: 24, color: Some("#333") },
            },
            xaxis: axis(&dataset.x_axis_label),
            yaxis: axis(&dataset.y_axis_label),
            hovermode: "closest",
            plot_bgcolor: "white",
            paper_bgcolor: "white",
            legend: Legend {
                x: 0.7,
                y: 0.95,
                bgcolor: "rgba(255, 255, 255, 0.8)",
                bordercolor: "#ddd",
                borderwidth: 1,
            },
            margin: Margin { l: 60, r: 40, t: 60, b: 50 },
        };

        let config = ChartConfig {
            responsive: true,
            display_mode_bar: true,
            displaylogo: false,
            mode_bar_buttons_to_remove: vec!["pan2d", "lasso2d"],
        };

        ChartSpec { data, layout, config }
    }
}

pub fn parse_dataset(json: &str) -> Result<ChartDataset> {
    serde_json::from_str(json).map_err(|e| BlogError::ChartData(e.to_string()))
}

pub struct ChartLoader<F: Fetcher> {
    fetcher: Arc<F>,
    data_url: Url,
}

impl<F: Fetcher> ChartLoader<F> {
    pub fn new(fetcher: Arc<F>, data_url: Url) -> Self {
        ChartLoader { fetcher, data_url }
    }

    pub async fn load(&self) -> Result<ChartSpec> {
        let body = self.fetcher.fetch(FetchRequest::new(self.data_url.clone())).await
            .map_err(|e| {
                error!("Error loading chart data: {}", e);
                BlogError::ChartData(e.to_string())
            })?;

        let dataset = parse_dataset(&body).inspect_err(|e| error!("{}", e))?;
        info!("Chart '{}' with {} series", dataset.title, dataset.series.len());
        Ok(ChartSpec::from_dataset(&dataset))
    }
}
