use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::info;

use crate::config::Config;
use crate::content::image_refs::IMAGES_DIR;
use crate::fetch::FsFetcher;
use crate::query_string::QueryString;
use crate::site::Site;

struct AppState {
    site: Site<FsFetcher>,
    public_dir: PathBuf,
    images_dir: PathBuf,
}

type State = web::types::State<Arc<AppState>>;

fn html(page: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

fn get_slug(req: &HttpRequest) -> String {
    req.uri().query()
        .map(|query_str| QueryString::from(query_str).get_slug().to_string())
        .unwrap_or_default()
}

fn open_file(dir: &Path, file_name: &str) -> Result<NamedFile, web::Error> {
    if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }
    Ok(NamedFile::open(dir.join(file_name))?)
}

#[web::get("/")]
async fn index(state: State) -> web::HttpResponse {
    html(state.site.list_page().await)
}

#[web::get("/all")]
async fn all_posts(state: State) -> web::HttpResponse {
    html(state.site.full_page().await)
}

#[web::get("/chart")]
async fn chart(state: State) -> web::HttpResponse {
    html(state.site.chart_page().await)
}

async fn post(req: HttpRequest, state: State) -> web::HttpResponse {
    let slug = get_slug(&req);
    html(state.site.post_page(&slug).await)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: State) -> Result<NamedFile, web::Error> {
    open_file(&state.public_dir, &path.into_inner())
}

#[web::get("/chart_images/{file_name}")]
async fn image_files(path: web::types::Path<String>, state: State) -> Result<NamedFile, web::Error> {
    open_file(&state.images_dir, &path.into_inner())
}

/// `/blog/` -> `/blog`. The root maps to an empty scope.
fn scope_prefix(base_path: &str) -> String {
    base_path.trim_end_matches('/').to_string()
}

/// Every page and static route, mounted below `base_path`.
fn routes(cfg: &mut web::ServiceConfig, base_path: &str, post_page: &str) {
    cfg.service(
        web::scope(scope_prefix(base_path))
            .service(index)
            .service(all_posts)
            .service(chart)
            .service(web::resource(format!("/{}", post_page)).route(web::get().to(post)))
            .service(public_files)
            .service(image_files)
    );
}

fn app_state(config: &Config) -> io::Result<Arc<AppState>> {
    let site = Site::from_config(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let public_dir = config.public_dir();
    let images_dir = config.paths.site_dir.join(IMAGES_DIR);
    info!("Static files from {} and {}", public_dir.display(), images_dir.display());

    Ok(Arc::new(AppState {
        site,
        public_dir,
        images_dir,
    }))
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let app_state = app_state(&config)?;
    let base_path = config.site.base_path.clone();
    let post_page = config.defaults.post_page.clone();
    info!("Site at {} with posts at {}{}", base_path, base_path, post_page);

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;

    web::HttpServer::new(move || {
        let base_path = base_path.clone();
        let post_page = post_page.clone();
        web::App::new()
            .state(app_state.clone())
            .configure(move |cfg| routes(cfg, &base_path, &post_page))
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ntex::http::StatusCode;
    use ntex::web::test;

    use crate::config::parse_config;
    use crate::test_data::POST_FOSSIL_FUELS;

    use super::*;

    fn site_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("riverblog-server-{}-{}", name, std::process::id()));
        fs::create_dir_all(dir.join("post_markdown")).unwrap();
        fs::create_dir_all(dir.join("public")).unwrap();
        fs::create_dir_all(dir.join(IMAGES_DIR)).unwrap();
        fs::write(dir.join("post_markdown").join("manifest.json"), r#"{"files": ["fossil-fuels.md"]}"#).unwrap();
        fs::write(dir.join("post_markdown").join("fossil-fuels.md"), POST_FOSSIL_FUELS).unwrap();
        fs::write(dir.join("public").join("style.css"), "body {}").unwrap();
        fs::write(dir.join(IMAGES_DIR).join("polar-curve.png"), [0x89u8, b'P', b'N', b'G']).unwrap();
        dir
    }

    fn config(dir: &Path, base_path: &str) -> Config {
        parse_config(&format!(r#"
[site]
name = "South River Blog"
base_path = "{}"

[paths]
site_dir = '{}'

[server]
address = "127.0.0.1"
port = 8001
"#, base_path, dir.display())).unwrap()
    }

    async fn get(cfg: &Config, uri: &str) -> (StatusCode, String) {
        let state = app_state(cfg).unwrap();
        let base_path = cfg.site.base_path.clone();
        let post_page = cfg.defaults.post_page.clone();
        let app = test::init_service(
            web::App::new()
                .state(state)
                .configure(move |c| routes(c, &base_path, &post_page))
        ).await;

        let resp = test::call_service(&app, test::TestRequest::with_uri(uri).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[test]
    fn test_scope_prefix() {
        assert_eq!(scope_prefix("/"), "");
        assert_eq!(scope_prefix("/blog/"), "/blog");
    }

    #[ntex::test]
    async fn test_routes_below_base_path() {
        let dir = site_dir("scoped");
        let cfg = config(&dir, "/blog");

        let (status, body) = get(&cfg, "/blog/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/blog/post.html?slug=fossil-fuels"));
        assert!(body.contains("/blog/public/style.css"));

        let (status, body) = get(&cfg, "/blog/post.html?slug=fossil-fuels").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Fossil fuels</h1>"));

        assert_eq!(get(&cfg, "/blog/all").await.0, StatusCode::OK);
        assert_eq!(get(&cfg, "/blog/chart").await.0, StatusCode::OK);
        assert_eq!(get(&cfg, "/blog/public/style.css").await.0, StatusCode::OK);
        assert_eq!(get(&cfg, "/blog/chart_images/polar-curve.png").await.0, StatusCode::OK);

        assert_eq!(get(&cfg, "/all").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(&cfg, "/public/style.css").await.0, StatusCode::NOT_FOUND);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[ntex::test]
    async fn test_routes_at_root() {
        let dir = site_dir("root");
        let cfg = config(&dir, "/");

        let (status, body) = get(&cfg, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/post.html?slug=fossil-fuels"));
        assert_eq!(get(&cfg, "/chart_images/polar-curve.png").await.0, StatusCode::OK);
        assert_ne!(get(&cfg, "/public/..%2Fpost_markdown%2Fmanifest.json").await.0, StatusCode::OK);

        fs::remove_dir_all(&dir).unwrap();
    }
}
