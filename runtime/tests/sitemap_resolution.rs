//! End-to-end resolution against a mock HTTP server.

use flate2::write::GzEncoder;
use flate2::Compression;
use sitewalk_runtime::acquisition::http_client::{Fetcher, HttpClient, HttpClientConfig};
use sitewalk_runtime::cartography::discovery::SiteDiscoverer;
use sitewalk_runtime::cartography::resolver::{ResolveError, ResolveOptions, SitemapResolver};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(body: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn url_set(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc></url>"))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#)
}

fn index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{loc}</loc></sitemap>"))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#)
}

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(HttpClient::new(HttpClientConfig::default()).unwrap())
}

fn resolver() -> SitemapResolver {
    SitemapResolver::new(fetcher(), ResolveOptions::default())
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn serve_gzip(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(gzip(body)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn leaf_document_needs_no_network() {
    let urls = resolver()
        .resolve(&url_set(&["/page1", "/page2"]))
        .await
        .unwrap();
    let locs: Vec<_> = urls.iter().map(|u| u.loc.as_str()).collect();
    assert_eq!(locs, vec!["/page1", "/page2"]);
}

#[tokio::test]
async fn index_with_plain_and_gzip_leaves() {
    let server = MockServer::start().await;
    serve(&server, "/sitemap1.xml", url_set(&["/a1", "/a2"])).await;
    serve_gzip(&server, "/sitemap2.xml.gz", &url_set(&["/b1", "/b2"])).await;

    let root = index(&[
        format!("{}/sitemap1.xml", server.uri()),
        format!("{}/sitemap2.xml.gz", server.uri()),
    ]);
    let urls = resolver().resolve(&root).await.unwrap();

    assert_eq!(urls.len(), 4);
    let locs: HashSet<_> = urls.iter().map(|u| u.loc.as_str()).collect();
    assert_eq!(locs, HashSet::from(["/a1", "/a2", "/b1", "/b2"]));
}

#[tokio::test]
async fn gzip_and_plain_bodies_resolve_identically() {
    let server = MockServer::start().await;
    let body = url_set(&["/x", "/y"]);
    serve(&server, "/plain.xml", body.clone()).await;
    serve_gzip(&server, "/packed.xml", &body).await;

    let r = resolver();
    let plain = r
        .resolve_url(&format!("{}/plain.xml", server.uri()))
        .await
        .unwrap();
    let packed = r
        .resolve_url(&format!("{}/packed.xml", server.uri()))
        .await
        .unwrap();
    assert_eq!(plain, packed);
}

#[tokio::test]
async fn nested_indexes_flatten() {
    let server = MockServer::start().await;
    serve(&server, "/leaf.xml", url_set(&["/deep"])).await;
    serve(
        &server,
        "/inner.xml",
        index(&[format!("{}/leaf.xml", server.uri())]),
    )
    .await;

    let root = index(&[format!("{}/inner.xml", server.uri())]);
    let urls = resolver().resolve(&root).await.unwrap();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].loc, "/deep");
}

#[tokio::test]
async fn failing_child_still_fetches_every_sibling() {
    let server = MockServer::start().await;
    serve(&server, "/ok1.xml", url_set(&["/1"])).await;
    serve(&server, "/broken.xml", "<html>not a sitemap</html>".to_string()).await;
    serve(&server, "/ok2.xml", url_set(&["/2"])).await;

    let root = index(&[
        format!("{}/ok1.xml", server.uri()),
        format!("{}/broken.xml", server.uri()),
        format!("{}/ok2.xml", server.uri()),
    ]);
    let err = resolver().resolve(&root).await.unwrap_err();
    assert!(matches!(err, ResolveError::UnknownFormat));
    // Each mock expects exactly one hit; verified when `server` drops.
}

#[tokio::test]
async fn transport_failure_surfaces_as_fetch_error() {
    let root = index(&["http://127.0.0.1:1/sitemap.xml".to_string()]);
    let err = resolver().resolve(&root).await.unwrap_err();
    assert!(matches!(err, ResolveError::Fetch(_)));
}

#[tokio::test]
async fn unknown_root_is_rejected() {
    let err = resolver().resolve("<feed/>").await.unwrap_err();
    assert!(matches!(err, ResolveError::UnknownFormat));
}

#[tokio::test]
async fn discovery_follows_robots_sitemaps() {
    let server = MockServer::start().await;
    let robots = format!(
        "User-agent: *\nDisallow: /private\n\nSitemap: {}/products.xml\n",
        server.uri()
    );
    let public = format!("{}/disc/1", server.uri());
    let private = format!("{}/private/2", server.uri());
    serve(&server, "/robots.txt", robots).await;
    serve(&server, "/products.xml", url_set(&[public.as_str(), private.as_str()])).await;

    let fetcher = fetcher();
    let discoverer = SiteDiscoverer::new(
        Arc::clone(&fetcher),
        SitemapResolver::new(fetcher, ResolveOptions::default()),
    );
    let found = discoverer
        .discover(&server.uri(), Some("sitewalk"))
        .await
        .unwrap();

    assert_eq!(found.urls.len(), 1);
    assert_eq!(found.urls[0].loc, public);
    assert_eq!(found.disallowed, 1);
}

#[tokio::test]
async fn real_world_layouts_between_entries() {
    let server = MockServer::start().await;
    let leaf = r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet type="text/xsl" href="/sitemap.xsl"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>/disc/1</loc>
    <image:image><image:loc>/disc/1.png</image:loc></image:image>
  </url>
  <!-- page 2 -->
  <image:note>unrelated</image:note>
  <url><loc>/disc/2</loc></url>
</urlset>"#;
    serve_gzip(&server, "/products.xml.gz", leaf).await;
    serve(&server, "/pages.xml", url_set(&["/about"])).await;

    let root = format!(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{0}/products.xml.gz</loc></sitemap>
  <!-- static pages -->
  <note>ignored</note>
  <sitemap><loc>{0}/pages.xml</loc></sitemap>
</sitemapindex>"#,
        server.uri()
    );
    let urls = resolver().resolve(&root).await.unwrap();

    let locs: Vec<_> = urls.iter().map(|u| u.loc.as_str()).collect();
    assert_eq!(locs, vec!["/disc/1", "/disc/2", "/about"]);
}
