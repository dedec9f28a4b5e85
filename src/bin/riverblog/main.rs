use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use spdlog::{info, warn};

use riverblog::config::Config;
use riverblog::logger::configure_logger;
use riverblog::manifest::update_manifest;
use riverblog::server::server_run;
use riverblog::site::{Site, POSTS_DIR};

use crate::config::open_config;
use crate::config_data::write_sample;

mod config;
mod config_data;

const CFG_FILE_NAME: &str = "riverblog.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs the blog server (default)
    Serve,
    /// Prints one page to the stdout
    Render {
        page: Page,
        /// Post to show when rendering a single post
        #[arg(short, long, default_value = "")]
        slug: String,
    },
    /// Regenerates post_markdown/manifest.json from the markdown files in the site directory
    Manifest,
    /// Writes a sample configuration and stylesheet
    Init {
        /// Directory where the configuration is written
        #[arg(short, long, default_value = ".")]
        out_dir: String,
    },
}

#[derive(Clone, Debug, ValueEnum)]
enum Page {
    /// Card list of every post
    List,
    /// One post, selected with --slug
    Single,
    /// Every post rendered inline
    Full,
    /// The chart page
    Chart,
}

impl Display for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Page::List => "list",
            Page::Single => "single",
            Page::Full => "full",
            Page::Chart => "chart",
        };
        write!(f, "{}", name)
    }
}

fn load_config(config_path: Option<String>) -> Result<Config> {
    let config = open_config(config_path.map(PathBuf::from))
        .map_err(anyhow::Error::msg)
        .context("Please run riverblog --help")?;

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    Ok(config)
}

async fn render(config: &Config, page: Page, slug: &str) -> Result<()> {
    let site = Site::from_config(config)?;
    info!("Rendering {} page", page);

    let html = match page {
        Page::List => site.list_page().await,
        Page::Single => site.post_page(slug).await,
        Page::Full => site.full_page().await,
        Page::Chart => site.chart_page().await,
    };
    println!("{}", html);
    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve) {
        Command::Init { out_dir } => write_sample(&PathBuf::from(out_dir)),
        Command::Manifest => {
            let config = load_config(args.config_path)?;
            let posts_dir = config.paths.site_dir.join(POSTS_DIR);
            let count = update_manifest(&posts_dir)
                .with_context(|| format!("Error updating manifest in {}", posts_dir.display()))?;
            println!("Manifest updated with {} posts", count);
            Ok(())
        }
        Command::Render { page, slug } => {
            let config = load_config(args.config_path)?;
            render(&config, page, &slug).await
        }
        Command::Serve => {
            let config = load_config(args.config_path)?;
            info!("Starting riverblog =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            info!("Listening on {}:{}", config.server.address, config.server.port);
            Ok(server_run(config).await?)
        }
    }
}
