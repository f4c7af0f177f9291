use std::net::SocketAddr;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::{routes, startup};

struct TestApp {
    base_url: String,
    articles_dir: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.storage.articles_dir = std::env::temp_dir()
        .join(format!("blog_e2e_{}", Uuid::new_v4()))
        .to_string_lossy()
        .to_string();
    cfg.normalize_and_validate()?;

    let state = startup::build_state(&cfg).await?;
    let app = routes::build_router(state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, articles_dir: cfg.storage.articles_dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_login_publish_and_logout() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = client();

    // anonymous dashboard lands on the login entry point
    let res = http.get(format!("{}/admin/dashboard", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.url().path().ends_with("/admin/login"));

    // login follows the redirect to the dashboard with the cookie attached
    let res = http
        .post(format!("{}/admin/login", app.base_url))
        .form(&[("username", "admin"), ("password", "password")])
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.url().path().ends_with("/admin/dashboard"));
    let list: serde_json::Value = res.json().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(0));

    let res = http
        .post(format!("{}/admin/add", app.base_url))
        .form(&[("title", "Test Article"), ("content", "Test content"), ("date", "2026-02-25")])
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let list: serde_json::Value = res.json().await?;
    assert_eq!(list[0]["filename"], "test_article_2026-02-25.md");

    // anonymous readers see it rendered
    let res = reqwest::get(format!("{}/article/test_article_2026-02-25.md", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let article: serde_json::Value = res.json().await?;
    assert_eq!(article["title"], "Test Article");
    assert!(article["content"].as_str().unwrap_or_default().contains("Test content"));

    // after logout the admin area is closed again
    let res = http.get(format!("{}/admin/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = http
        .post(format!("{}/admin/delete/test_article_2026-02-25.md", app.base_url))
        .send()
        .await?;
    assert!(res.url().path().ends_with("/admin/login"));
    assert!(std::path::Path::new(&app.articles_dir).join("test_article_2026-02-25.md").exists());

    let _ = tokio::fs::remove_dir_all(&app.articles_dir).await;
    Ok(())
}
