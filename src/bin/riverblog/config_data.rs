use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use riverblog::view::STYLE_CSS;

use crate::CFG_FILE_NAME;

const CONFIG_SAMPLE: &str = r#"[site]
name = "South River Blog"
base_path = "/"

# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
# site_dir holds post_markdown/, chart_images/ and data.json
[paths]
site_dir = "site"
public_dir = "public"
# template_dir = "template"

[defaults]
teaser_length = 200
post_page = "post.html"
allow_html = true

# Leave empty to disable the chart page
[chart]
script_url = "https://cdn.plot.ly/plotly-2.35.2.min.js"

[server]
address = "0.0.0.0"
port = 8001

[log]
level = "Info"
log_to_console = true
"#;

/// Writes `riverblog.toml` and `public/style.css` into `out_dir`. Existing files are kept.
pub(crate) fn write_sample(out_dir: &Path) -> Result<()> {
    let public_dir = out_dir.join("public");
    fs::create_dir_all(&public_dir)
        .with_context(|| format!("Error creating {}", public_dir.display()))?;

    write_new(&out_dir.join(CFG_FILE_NAME), CONFIG_SAMPLE)?;
    write_new(&public_dir.join("style.css"), STYLE_CSS)?;
    Ok(())
}

fn write_new(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("Keeping existing {}", path.display());
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Error writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
