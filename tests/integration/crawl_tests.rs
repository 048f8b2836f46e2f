//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site over HTTP and run the full
//! survey end-to-end, checking the files written to a temporary directory.

use site_survey::config::{resolve_config, Config, Overrides, TextMode};
use site_survey::crawler::run_survey;
use site_survey::output::{load_statistics, COMBINED_FILE, LINK_FILE, PAGE_FILE, SUMMARY_FILE};
use site_survey::storage::{open_storage, RunStatus};
use site_survey::ConfigError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` into `dir`
fn create_test_config(seed: &str, max_pages: usize, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = Some(seed.to_string());
    config.crawler.max_pages = max_pages;
    config.crawler.accepted_scheme = "http".to_string();
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.output.directory = dir.path().to_string_lossy().into_owned();
    config
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Home -> {page1, page2}, page1 -> page2, plus an orphan declared in the sitemap
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    mount_page(
        server,
        "/",
        r#"<html><head><title>Home</title>
        <meta name="description" content="Welcome">
        </head><body>
        <div class="navbar"><a href="/page1">Menu Page 1</a></div>
        <h1>Welcome home</h1>
        <p>Intro paragraph</p>
        <a href="/page1">Page 1</a>
        <a href="/page2">Page 2</a>
        </body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/page1",
        &format!(
            r#"<html><head><title>Page 1</title>
            <link rel="canonical" href="{}/page1">
            </head><body>
            <p>Content 1</p>
            <a href="/page2">Second page</a>
            <a href="https://elsewhere.example/">External</a>
            </body></html>"#,
            base
        ),
    )
    .await;

    mount_page(
        server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><li>Item</li></body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/orphan",
        r#"<html><head><title>Orphan</title></head><body><a href="/page2">Back</a></body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{base}/</loc></url>
              <url><loc>{base}/page1</loc></url>
              <url><loc>{base}/orphan</loc></url>
            </urlset>"#,
            base = base
        )))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_survey_writes_all_outputs() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base = mock_server.uri();

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base), 10, &dir);
    config.output.tabular = true;
    config.output.database_path = Some("survey.db".to_string());

    let report = run_survey(&config, "test-hash", Arc::new(AtomicBool::new(false)))
        .await
        .expect("Survey failed");

    assert_eq!(
        report.visited,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
            format!("{}/orphan", base),
        ]
    );
    assert_eq!(report.primary_visited, 3);
    assert_eq!(report.sitemap_only, vec![format!("{}/orphan", base)]);
    assert!(report.failures.is_empty());

    // nav link excluded, two body links from home, one from page1, one from orphan
    let page2 = report.link_graph.get(&format!("{}/page2", base)).unwrap();
    assert_eq!(page2.inbound_count, 3);
    assert_eq!(page2.anchor_texts, vec!["Page 2", "Second page", "Back"]);
    let page1 = report.link_graph.get(&format!("{}/page1", base)).unwrap();
    assert_eq!(page1.inbound_count, 1);
    assert_eq!(page1.anchor_texts, vec!["Page 1"]);

    // text sink
    let text = std::fs::read_to_string(dir.path().join(COMBINED_FILE)).unwrap();
    assert!(text.starts_with(&format!("{}/\n\nWelcome home\nIntro paragraph\n\n----------\n\n", base)));
    assert_eq!(text.matches("----------").count(), 4);

    // page CSV
    let data = std::fs::read_to_string(dir.path().join(PAGE_FILE)).unwrap();
    let rows: Vec<&str> = data.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows[0],
        "URL,Title,Description,H1,H2,Canonical,Is Canonical Same as URL,Indexed from Sitemap"
    );
    assert_eq!(
        rows[1],
        format!("{}/,Home,Welcome,Welcome home,,,No,No", base)
    );
    assert_eq!(
        rows[2],
        format!("{b}/page1,Page 1,,,,{b}/page1,Yes,No", b = base)
    );
    assert!(rows[4].ends_with(",No,Yes"));

    // link CSV
    let links = std::fs::read_to_string(dir.path().join(LINK_FILE)).unwrap();
    assert!(links.starts_with("URL,Inbound Links Count,Source URLs,Anchor Texts\n"));
    assert!(links.contains(&format!(
        "{b}/page2,3,{b}/|{b}/page1|{b}/orphan,Page 2|Second page|Back",
        b = base
    )));

    // summary
    let summary = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    assert!(summary.contains("## Pages Found Only in Sitemap"));
    assert!(summary.contains(&format!("- {}/orphan", base)));

    // database
    let storage = open_storage(&dir.path().join("survey.db")).unwrap();
    let stats = load_statistics(&storage, None).unwrap();
    assert_eq!(stats.run.status, RunStatus::Completed);
    assert_eq!(stats.run.config_hash, "test-hash");
    assert_eq!(stats.run.pages_visited, 4);
    assert_eq!(stats.pages_recorded, 4);
    assert_eq!(stats.sitemap_only_pages, 1);
    assert_eq!(stats.sitemap_only_urls, vec![format!("{}/orphan", base)]);
    assert_eq!(stats.total_links, 4);
}

#[tokio::test]
async fn test_page_budget_limits_traversal() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base = mock_server.uri();

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base), 2, &dir);

    let report = run_survey(&config, "h", Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    assert_eq!(report.primary_visited, 2);
    assert_eq!(
        report.visited,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/orphan", base),
        ]
    );
    // page2 was never reached by links; the sitemap does not declare it either
    assert!(!report.visited.contains(&format!("{}/page2", base)));
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_survey() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/gone">Gone</a><a href="/broken">Broken</a><a href="/ok">Ok</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "<html><body><p>Fine</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base), 10, &dir);

    let report = run_survey(&config, "h", Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    assert_eq!(report.visited, vec![format!("{}/", base), format!("{}/ok", base)]);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.url.as_str()).collect();
    assert_eq!(
        failed,
        vec![format!("{}/gone", base), format!("{}/broken", base)]
    );

    // failed destinations still count as linked
    assert_eq!(report.link_graph.len(), 3);
}

#[tokio::test]
async fn test_per_page_text_files() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let base = mock_server.uri();

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base), 10, &dir);
    config.output.text_mode = TextMode::PerPage;
    config.output.summary = false;

    run_survey(&config, "h", Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    let file_name = format!(
        "{}.txt",
        site_survey::output::sanitize_file_name(&format!("{}/page1", base))
    );
    let content = std::fs::read_to_string(dir.path().join(file_name)).unwrap();
    assert!(content.contains("Content 1"));
    assert!(!dir.path().join(COMBINED_FILE).exists());
    assert!(!dir.path().join(SUMMARY_FILE).exists());
}

#[tokio::test]
async fn test_missing_sitemap_is_not_an_error() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_page(&mock_server, "/", "<html><body><p>Only page</p></body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base), 5, &dir);

    let report = run_survey(&config, "h", Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();

    assert_eq!(report.visited, vec![format!("{}/", base)]);
    assert!(report.sitemap_only.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_invalid_configuration_aborts_before_fetching() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let overrides = Overrides {
        seed_url: Some(format!("{}/", mock_server.uri())),
        max_pages: Some(0),
        directory: Some(dir.path().to_string_lossy().into_owned()),
        ..Overrides::default()
    };

    let result = resolve_config(None, &overrides);
    assert!(matches!(result, Err(ConfigError::Validation(_))));

    let missing_seed = Overrides {
        max_pages: Some(5),
        directory: Some(dir.path().to_string_lossy().into_owned()),
        ..Overrides::default()
    };
    assert!(resolve_config(None, &missing_seed).is_err());
}

#[tokio::test]
async fn test_cancelled_survey_still_writes_summary() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", mock_server.uri()), 10, &dir);
    config.output.tabular = true;

    let report = run_survey(&config, "h", Arc::new(AtomicBool::new(true)))
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.visited.is_empty());
    assert!(dir.path().join(SUMMARY_FILE).exists());
    assert!(dir.path().join(LINK_FILE).exists());
}
