use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use configs::{AdminConfig, MalformedPolicy};
use service::auth::AccessGate;
use service::file::article_store::FileArticleStore;
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, auth::ServerState};

struct TestApp {
    router: Router,
    dir: PathBuf,
}

impl TestApp {
    async fn new() -> anyhow::Result<Self> {
        let dir = std::env::temp_dir().join(format!("blog_flow_{}", Uuid::new_v4()));
        let store = FileArticleStore::new(&dir, MalformedPolicy::Skip).await?;
        let gate = AccessGate::from_config(&AdminConfig::default())?;
        let router = routes::build_router(ServerState { articles: store, gate: Arc::new(gate) });
        Ok(Self { router, dir })
    }

    async fn send(&self, req: Request<Body>) -> anyhow::Result<Response<Body>> {
        Ok(self.router.clone().oneshot(req).await?)
    }

    async fn login(&self) -> anyhow::Result<String> {
        let resp = self.send(post_form("/admin/login", "username=admin&password=password", None)?).await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("session="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing session cookie"))
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.dir).await;
    }
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    Ok(req.body(Body::from(body.to_string()))?)
}

fn get(uri: &str, cookie: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    Ok(req.body(Body::empty())?)
}

async fn json(resp: Response<Body>) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn text(resp: Response<Body>) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn operator_creates_edits_and_deletes_an_article() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.login().await?;

    // create
    let resp = app
        .send(post_form("/admin/add", "title=Test+Article&content=Test+content&date=2026-02-25", Some(&cookie))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(app.dir.join("test_article_2026-02-25.md").exists());

    // public read renders markdown
    let resp = app.send(get("/article/test_article_2026-02-25.md", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let article = json(resp).await?;
    assert_eq!(article["title"], "Test Article");
    assert_eq!(article["date"], "2026-02-25");
    assert!(article["content"].as_str().unwrap_or_default().contains("Test content"));
    assert!(article["content"].as_str().unwrap_or_default().starts_with("<p>"));

    // edit form carries the raw source
    let resp = app.send(get("/admin/edit/test_article_2026-02-25.md", Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await?["content"], "Test content");

    // overwrite in place
    let resp = app
        .send(post_form(
            "/admin/edit/test_article_2026-02-25.md",
            "title=Renamed&content=%2A%2Anew%2A%2A+body&date=2026-03-01",
            Some(&cookie),
        )?)
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app.send(get("/admin/dashboard", Some(&cookie))?).await?;
    let list = json(resp).await?;
    let list = list.as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["filename"], "test_article_2026-02-25.md");
    assert_eq!(list[0]["title"], "Renamed");
    assert_eq!(list[0]["content"], "**new** body");

    let resp = app.send(get("/article/test_article_2026-02-25.md", None)?).await?;
    let article = json(resp).await?;
    assert!(article["content"].as_str().unwrap_or_default().contains("<strong>new</strong>"));

    // delete
    let resp = app.send(post_form("/admin/delete/test_article_2026-02-25.md", "", Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(!app.dir.join("test_article_2026-02-25.md").exists());

    let resp = app.send(get("/article/test_article_2026-02-25.md", None)?).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(text(resp).await?, "Article not found");

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn home_lists_newest_first() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.login().await?;

    for body in [
        "title=January&content=a&date=2026-01-01",
        "title=February&content=b&date=2026-02-25",
    ] {
        let resp = app.send(post_form("/admin/add", body, Some(&cookie))?).await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let resp = app.send(get("/", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = json(resp).await?;
    assert_eq!(list[0]["title"], "February");
    assert_eq!(list[1]["title"], "January");
    // the index carries raw content
    assert_eq!(list[1]["content"], "a");

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn unknown_articles_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.login().await?;

    let resp = app.send(get("/article/missing.md", None)?).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.send(get("/admin/edit/missing.md", Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .send(post_form("/admin/edit/missing.md", "title=X&content=y&date=2026-01-01", Some(&cookie))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!app.dir.join("missing.md").exists());

    // deleting an unknown article is not an error
    let resp = app.send(post_form("/admin/delete/missing.md", "", Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn rejected_saves_map_to_client_errors() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.login().await?;

    let body = "title=Twice&content=first&date=2026-01-01";
    let resp = app.send(post_form("/admin/add", body, Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = app.send(post_form("/admin/add", body, Some(&cookie))?).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json(resp).await?["error"], "Conflict");

    let resp = app
        .send(post_form("/admin/add", "title=a%2Fb&content=x&date=2026-01-01", Some(&cookie))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn malformed_article_can_be_repaired_through_edit() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let cookie = app.login().await?;
    tokio::fs::write(app.dir.join("broken.md"), "# title only").await?;

    // skipped from the index, error on direct read
    let list = json(app.send(get("/", None)?).await?).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
    let resp = app.send(get("/article/broken.md", None)?).await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app
        .send(post_form("/admin/edit/broken.md", "title=Fixed&content=ok&date=2026-01-01", Some(&cookie))?)
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let article = json(app.send(get("/article/broken.md", None)?).await?).await?;
    assert_eq!(article["title"], "Fixed");

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let resp = app.send(get("/health", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await?["status"], "ok");
    app.cleanup().await;
    Ok(())
}
