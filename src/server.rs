use std::io;
use std::sync::Arc;

use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::config::Config;
use crate::content::repository::DirRepository;
use crate::content::resolver::ContentResolver;
use crate::language::{parse_language, Language};
use crate::pages::*;
use crate::sitemap::Sitemap;

struct AppState {
    resolver: ContentResolver<DirRepository>,
    config: Config,
}

type State = web::types::State<Arc<AppState>>;

fn respond(page: &str, outcome: io::Result<PageOutcome>) -> web::HttpResponse {
    match outcome {
        Ok(PageOutcome::Html(body)) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Ok(PageOutcome::Redirect(location)) => web::HttpResponse::TemporaryRedirect()
            .header("Location", location)
            .content_type("text/html; charset=utf-8")
            .finish(),
        Ok(PageOutcome::NotFound) => not_found(),
        Err(e) => {
            error!("Error rendering {}: {}", page, e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering {}: {}", page, e))
        }
    }
}

fn not_found() -> web::HttpResponse {
    web::HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body("Page not found")
}

/// Language of an unprefixed route, `?lang=en` included
fn request_language(req: &HttpRequest) -> Language {
    match req.uri().query() {
        Some(query) => parse_language(&format!("{}?{}", req.path(), query), None),
        None => parse_language(req.path(), None),
    }
}

/// `None` when the segment is not a language we serve
fn route_language(req: &HttpRequest, code: &str) -> Option<Language> {
    Language::from_code(code)?;
    Some(parse_language(req.path(), Some(code)))
}

fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

fn home(state: &AppState, lang: Language) -> web::HttpResponse {
    let paths = &state.config.paths;
    respond("home", render_home(&state.resolver, &paths.template_dir, &state.config.site.name, lang))
}

fn blog(state: &AppState, lang: Language) -> web::HttpResponse {
    let paths = &state.config.paths;
    respond("blog", render_blog(&state.resolver, &paths.template_dir, &state.config.site.name, lang))
}

fn post(state: &AppState, slug: &str, lang: Language) -> web::HttpResponse {
    let paths = &state.config.paths;
    respond(slug, render_post(&state.resolver, &paths.template_dir, &state.config.site.name, slug, lang))
}

fn tags(state: &AppState, lang: Language) -> web::HttpResponse {
    let paths = &state.config.paths;
    respond("tags", render_tag_list(&state.resolver, &paths.template_dir, &state.config.site.name, lang))
}

fn tag(state: &AppState, tag: &str, lang: Language) -> web::HttpResponse {
    let paths = &state.config.paths;
    let tag = decode_segment(tag);
    respond(&tag, render_tag(&state.resolver, &paths.template_dir, &state.config.site.name, &tag, lang))
}

// Begin: Redirect region --------
#[web::get("/en/")]
async fn en_with_slash() -> web::HttpResponse {
    web::HttpResponse::MovedPermanently()
        .header("Location", "/en")
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

#[web::get("/sitemap.xml")]
async fn sitemap(state: State) -> web::HttpResponse {
    let sitemap = Sitemap::build(&state.resolver, &state.config.site.url);
    match sitemap.render() {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/xml")
            .body(xml),
        Err(e) => {
            error!("Error rendering sitemap: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering sitemap: {}", e))
        }
    }
}

#[web::get("/images/{file}")]
async fn images(path: web::types::Path<String>, state: State) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join("images").join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/")]
async fn index(req: HttpRequest, state: State) -> web::HttpResponse {
    home(&state, request_language(&req))
}

#[web::get("/blog")]
async fn blog_list(req: HttpRequest, state: State) -> web::HttpResponse {
    blog(&state, request_language(&req))
}

#[web::get("/blog/{slug}")]
async fn view(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    post(&state, &path.into_inner(), request_language(&req))
}

#[web::get("/tags")]
async fn tag_list(req: HttpRequest, state: State) -> web::HttpResponse {
    tags(&state, request_language(&req))
}

#[web::get("/tags/{tag}")]
async fn tag_posts(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    tag(&state, &path.into_inner(), request_language(&req))
}

#[web::get("/{lang}")]
async fn lang_index(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    match route_language(&req, &path) {
        Some(lang) => home(&state, lang),
        None => not_found(),
    }
}

#[web::get("/{lang}/blog")]
async fn lang_blog_list(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    match route_language(&req, &path) {
        Some(lang) => blog(&state, lang),
        None => not_found(),
    }
}

#[web::get("/{lang}/blog/{slug}")]
async fn lang_view(req: HttpRequest, path: web::types::Path<(String, String)>, state: State) -> web::HttpResponse {
    let (lang, slug) = path.into_inner();
    match route_language(&req, &lang) {
        Some(lang) => post(&state, &slug, lang),
        None => not_found(),
    }
}

#[web::get("/{lang}/tags")]
async fn lang_tag_list(req: HttpRequest, path: web::types::Path<String>, state: State) -> web::HttpResponse {
    match route_language(&req, &path) {
        Some(lang) => tags(&state, lang),
        None => not_found(),
    }
}

#[web::get("/{lang}/tags/{tag}")]
async fn lang_tag_posts(req: HttpRequest, path: web::types::Path<(String, String)>, state: State) -> web::HttpResponse {
    let (lang, tag_name) = path.into_inner();
    match route_language(&req, &lang) {
        Some(lang) => tag(&state, &tag_name, lang),
        None => not_found(),
    }
}

// Fixed routes first: `/{lang}` would match them otherwise
fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(en_with_slash)
        .service(sitemap)
        .service(images)
        .service(index)
        .service(blog_list)
        .service(view)
        .service(tag_list)
        .service(tag_posts)
        .service(lang_index)
        .service(lang_blog_list)
        .service(lang_view)
        .service(lang_tag_list)
        .service(lang_tag_posts);
}

impl AppState {
    fn new(config: Config) -> Self {
        let repo = DirRepository::new(&config.paths.content_dir);
        AppState {
            resolver: ContentResolver::new(repo),
            config,
        }
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState::new(config));

    let repo = app_state.resolver.repository();
    info!("Serving content from {}", repo.root_dir().display());
    match repo.list_slugs() {
        Ok(slugs) => info!("Found {} posts", slugs.len()),
        Err(e) => error!("Error listing posts in {}: {}", repo.meta_dir().display(), e),
    }

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(routes)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use ntex::http::StatusCode;
    use ntex::web::test::{call_service, init_service, read_body, TestRequest};
    use tempfile::TempDir;

    use crate::config::parse_config;
    use crate::content::repository::tests::{sample_repo, write_file};
    use crate::pages::{INDEX_TPL, LIST_TPL, POST_TPL, TAGS_TPL};
    use crate::tags::index_builder::generate_tag_indexes;

    use super::*;

    const CONFIG: &str = r##"
[site]
name = "VibeBlog"
url = "https://vibeblog.app"

[paths]
content_dir = "content"
template_dir = "template"
public_dir = "public"

[server]
address = "127.0.0.1"
port = 8001
"##;

    struct TestSite {
        _content: TempDir,
        _templates: TempDir,
        state: Arc<AppState>,
    }

    fn test_site() -> TestSite {
        let (content, repo) = sample_repo();
        write_file(&repo.meta_dir().join("symbols.json"),
                   r#"{"title": "符號", "date": "2025-02-01", "tags": ["CI/CD", "100%", "C#"], "tagsEn": ["CI/CD", "100%", "Csharp"]}"#);
        generate_tag_indexes(&repo).unwrap();

        let templates = TempDir::new().unwrap();
        write_file(&templates.path().join(INDEX_TPL), "{{lang}}:home");
        write_file(&templates.path().join(LIST_TPL),
                   "{{lang}}:{{#has_tag}}{{{tag}}}:{{/has_tag}}{{#post_list}}{{slug}},{{/post_list}}");
        write_file(&templates.path().join(POST_TPL), "{{lang}}:{{title}}");
        write_file(&templates.path().join(TAGS_TPL), "{{lang}}:{{#tag_list}}{{tag}},{{/tag_list}}");

        let mut config = parse_config(CONFIG).unwrap();
        config.paths.content_dir = content.path().to_path_buf();
        config.paths.template_dir = templates.path().to_path_buf();

        TestSite {
            _content: content,
            _templates: templates,
            state: Arc::new(AppState::new(config)),
        }
    }

    async fn get(site: &TestSite, uri: &str) -> (StatusCode, Option<String>, Option<String>, String) {
        let app = init_service(web::App::new().state(site.state.clone()).configure(routes)).await;
        let resp = call_service(&app, TestRequest::with_uri(uri).to_request()).await;

        let status = resp.status();
        let header = |name: &str| resp.headers().get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let location = header("location");
        let content_type = header("content-type");
        let body = read_body(resp).await;
        (status, location, content_type, String::from_utf8_lossy(&body).to_string())
    }

    #[ntex::test]
    async fn test_en_slash_redirect() {
        let site = test_site();
        let (status, location, _, _) = get(&site, "/en/").await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(location.as_deref(), Some("/en"));

        let (status, _, _, body) = get(&site, "/en").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "en:home");
    }

    #[ntex::test]
    async fn test_sitemap_is_xml() {
        let site = test_site();
        let (status, _, content_type, body) = get(&site, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/xml"));
        assert!(body.contains("<loc>https://vibeblog.app/en/blog/vibe-coding</loc>"));
    }

    #[ntex::test]
    async fn test_language_selection() {
        let site = test_site();
        let (_, _, _, body) = get(&site, "/blog").await;
        assert_eq!(body, "zh:vibe-coding,symbols,installing-mcp-servers,");
        let (_, _, _, body) = get(&site, "/blog?lang=en").await;
        assert!(body.starts_with("en:"));
        let (_, _, _, body) = get(&site, "/en/blog/vibe-coding").await;
        assert_eq!(body, "en:Vibe coding notes");
        let (_, _, _, body) = get(&site, "/zh/tags").await;
        assert!(body.starts_with("zh:"));
    }

    #[ntex::test]
    async fn test_not_found() {
        let site = test_site();
        for uri in ["/fr", "/fr/blog", "/fr/tags/MCP", "/blog/missing", "/tags/Rust"] {
            let (status, _, _, _) = get(&site, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[ntex::test]
    async fn test_encoded_tags() {
        let site = test_site();
        let (status, _, _, body) = get(&site, "/tags/CI%2FCD").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "zh:CI/CD:symbols,");

        let (status, _, _, body) = get(&site, "/en/tags/100%25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "en:100%:symbols,");

        let (status, _, _, body) = get(&site, "/tags/C%23").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "zh:C#:symbols,");
    }

    #[ntex::test]
    async fn test_tag_translation_redirect() {
        let site = test_site();
        let (status, location, _, _) = get(&site, "/en/tags/C%23").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/en/tags/Csharp"));

        let (status, location, _, _) = get(&site, "/tags/AI%20Development").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/tags/AI%E9%96%8B%E7%99%BC"));
    }
}
