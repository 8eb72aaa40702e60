//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use rumble_crawl::crawler::{CrawlLimits, Crawler, Document, Fetcher, PageVisitor};
use rumble_crawl::mirror::{content_hash, LocalMirror};
use rumble_crawl::product::{product_id, ProductVisitor};
use rumble_crawl::storage::{ProductStore, SqliteStore};
use rumble_crawl::url::Origin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-image-data";

/// Visitor that records the pages it was handed
#[derive(Default)]
struct Recorder {
    pages: Vec<String>,
    titles: Vec<String>,
}

impl PageVisitor for Recorder {
    async fn visit(&mut self, url: &Url, document: &Document<'_>) {
        self.pages.push(url.path().to_string());
        self.titles.push(document.title());
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

fn crawler_for(server: &MockServer, min_interval: Duration) -> (Crawler, Url) {
    let seed = Url::parse(&server.uri()).expect("mock server uri");
    let origin = Origin::from_url(&seed).expect("origin");
    let fetcher = Fetcher::new(reqwest::Client::new(), min_interval);
    (Crawler::new(origin, Arc::new(fetcher)), seed)
}

fn visited_paths(visited: &[String]) -> Vec<String> {
    visited
        .iter()
        .map(|u| Url::parse(u).unwrap().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_each_page_visited_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/a">A</a>"#).await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/a", "/b"]);
    assert_eq!(report.pages_visited(), 3);
    assert_eq!(report.pages_processed, 3);
    assert_eq!(report.pages_failed, 0);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_depth_first_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a1">A1</a>"#).await;
    mount_page(&server, "/a1", "<p>leaf</p>").await;
    mount_page(&server, "/b", "<p>leaf</p>").await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(visited_paths(&report.visited), vec!["/", "/a", "/a1", "/b"]);
}

#[tokio::test]
async fn test_external_links_not_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<p>elsewhere</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let index = format!(
        r#"<a href="{}/x">Other port</a>
           <a href="mailto:shop@example.com">Mail</a>
           <a href="javascript:void(0)">JS</a>
           <a href="/local">Local</a>"#,
        other.uri()
    );
    mount_page(&server, "/", &index).await;
    mount_page(&server, "/local", "<h1>Local</h1>").await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/local"]);
    assert_eq!(recorder.titles[1], "local");
    assert_eq!(report.links_discovered, 1);
}

#[tokio::test]
async fn test_failed_page_does_not_abort_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/missing">Gone</a><a href="/ok">OK</a>"#).await;
    mount_page(&server, "/ok", "<h1>Still here</h1>").await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/ok"]);
    assert_eq!(visited_paths(&report.visited), vec!["/", "/missing", "/ok"]);
    assert_eq!(report.pages_failed, 1);
}

#[tokio::test]
async fn test_failed_page_is_not_retried() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/other">Other</a>"#,
    )
    .await;
    mount_page(&server, "/other", r#"<a href="/broken">Broken again</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/other"]);
    assert_eq!(visited_paths(&report.visited), vec!["/", "/broken", "/other"]);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(crawler.fetcher().requests_made(), 3);
}

#[tokio::test]
async fn test_redirects_stay_on_origin() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/old">Old</a><a href="/new">New</a><a href="/away">Away</a>"#,
    )
    .await;
    mount_page(&server, "/new", "<h1>Moved here</h1>").await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/offsite", other.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The off-site target is fetched by the redirect but never handed to the visitor
    mount_page(
        &other,
        "/offsite",
        r#"<h1>Foreign product</h1><img src="/f.png"><button>Add to cart</button>"#,
    )
    .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/new"]);
    assert_eq!(recorder.titles[1], "moved here");
    assert_eq!(
        visited_paths(&report.visited),
        vec!["/", "/old", "/new", "/away"]
    );
    assert_eq!(report.pages_processed, 2);
    assert_eq!(report.pages_skipped, 1);
    assert_eq!(report.pages_failed, 0);
}

#[tokio::test]
async fn test_non_html_pages_are_not_parsed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/manual.pdf">Manual</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/"]);
    assert_eq!(report.pages_skipped, 1);
    assert_eq!(report.pages_visited(), 2);
}

#[tokio::test]
async fn test_requests_are_spaced() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
    )
    .await;
    for route in ["/1", "/2", "/3"] {
        mount_page(&server, route, "<p>page</p>").await;
    }

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(200));
    let mut recorder = Recorder::default();

    let start = Instant::now();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(report.pages_visited(), 4);
    assert!(
        start.elapsed() >= Duration::from_millis(600),
        "four requests finished in {:?}",
        start.elapsed()
    );
    assert_eq!(crawler.fetcher().requests_made(), 4);
}

#[tokio::test]
async fn test_page_limit_truncates_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", "<p>a</p>").await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>b</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let crawler = crawler.with_limits(CrawlLimits {
        max_depth: None,
        max_pages: Some(2),
    });
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(visited_paths(&report.visited), vec!["/", "/a"]);
    assert!(report.truncated);
}

#[tokio::test]
async fn test_depth_limit_stops_descent() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a/deeper">Deeper</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/a/deeper"))
        .respond_with(html("<p>too deep</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let crawler = crawler.with_limits(CrawlLimits {
        max_depth: Some(1),
        max_pages: None,
    });
    let mut recorder = Recorder::default();
    let report = crawler.crawl(seed, &mut recorder).await;

    assert_eq!(recorder.pages, vec!["/", "/a"]);
    assert!(report.truncated);
}

#[tokio::test]
async fn test_product_page_is_recorded_with_mirrored_image() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<h1>Shop</h1>
           <a href="/p/mug">Mug</a>
           <a href="/p/cup">Cup</a>
           <button>Add to cart</button><button>Add to cart</button>"#,
    )
    .await;
    mount_page(
        &server,
        "/p/mug",
        r#"<h1>Blue Mug</h1>
           <img src="/img/mug.png?size=large">
           <button>Add to Cart</button>
           <a href="/">Back</a>"#,
    )
    .await;
    mount_page(&server, "/p/cup", "<h1>Cup</h1><p>Sold out</p>").await;

    Mock::given(method("GET"))
        .and(path("/img/mug.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PNG.to_vec(), "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
    let mirror = LocalMirror::new(dir.path(), "http://imgs.example").unwrap();
    let store = SqliteStore::new_in_memory().unwrap();
    let mut visitor = ProductVisitor::new(store, mirror, crawler.fetcher());

    let report = crawler.crawl(seed.clone(), &mut visitor).await;

    assert_eq!(report.pages_visited(), 3);
    let stats = visitor.stats();
    assert_eq!(stats.products_added, 1);
    assert_eq!(stats.pages_skipped, 2);
    assert_eq!(stats.images_mirrored, 1);

    let store = visitor.into_store();
    let mug = seed.join("/p/mug").unwrap();
    let product = store.get_product(&product_id(&mug)).unwrap().unwrap();
    assert_eq!(product.title, "blue mug");

    let image_id = content_hash(PNG);
    let listings = store.list_products().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].image_ids, vec![image_id.clone()]);
    assert_eq!(std::fs::read(dir.path().join(&image_id)).unwrap(), PNG);
}

#[tokio::test]
async fn test_shared_image_is_stored_once_across_runs() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("rumble.db");
    let mirror_dir = dir.path().join("imgs");

    for title in ["Red Kettle", "Green Kettle"] {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            &format!(
                r#"<h1>{}</h1><img src="/img/a.png"><button>add to cart</button>"#,
                title
            ),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/img/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PNG.to_vec(), "image/png"))
            .expect(1)
            .mount(&server)
            .await;

        let (crawler, seed) = crawler_for(&server, Duration::from_millis(10));
        let store = SqliteStore::new(&db_path).unwrap();
        let mirror = LocalMirror::new(&mirror_dir, "http://imgs.example").unwrap();
        let mut visitor = ProductVisitor::new(store, mirror, crawler.fetcher());

        crawler.crawl(seed, &mut visitor).await;
        assert_eq!(visitor.stats().products_added, 1);
        assert_eq!(visitor.stats().images_mirrored, 1);
    }

    // Each server has its own port, hence its own product
    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.count_products().unwrap(), 2);
    assert_eq!(store.count_images().unwrap(), 1);
    assert_eq!(std::fs::read_dir(&mirror_dir).unwrap().count(), 1);
}
