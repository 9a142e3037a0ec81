//! The docs server must answer cross-origin requests from the application's
//! front end and serve GeoJSON with its proper media type.

use railbi_portable::docs_server::DocsServer;

const ORIGIN: &str = "http://localhost:8088";

async fn serve_fixture() -> (tempfile::TempDir, DocsServer, String) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html><body>docs</body></html>").unwrap();
    std::fs::write(
        dir.path().join("rail_network.geojson"),
        r#"{"type": "FeatureCollection", "features": []}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "plain notes").unwrap();

    let mut server = DocsServer::new(dir.path());
    let address = server.start("127.0.0.1:0").await.unwrap();
    (dir, server, format!("http://{}", address))
}

#[tokio::test]
async fn health_endpoint_answers() {
    let (_dir, mut server, base) = serve_fixture().await;
    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
    server.stop();
}

#[tokio::test]
async fn geojson_is_served_cross_origin_with_its_media_type() {
    let (_dir, mut server, base) = serve_fixture().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/rail_network.geojson", base))
        .header("Origin", ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/geo+json"
    );
    assert_eq!(
        response.headers()["access-control-allow-origin"]
            .to_str()
            .unwrap(),
        "*"
    );
    server.stop();
}

#[tokio::test]
async fn preflight_requests_are_accepted() {
    let (_dir, mut server, base) = serve_fixture().await;
    let client = reqwest::Client::new();

    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/rail_network.geojson", base),
        )
        .header("Origin", ORIGIN)
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
    server.stop();
}

#[tokio::test]
async fn text_files_get_an_explicit_charset() {
    let (_dir, mut server, base) = serve_fixture().await;
    let response = reqwest::get(format!("{}/notes.txt", base)).await.unwrap();
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.contains("charset=utf-8"), "{}", content_type);
    server.stop();
}

#[tokio::test]
async fn directory_requests_fall_back_to_index_html() {
    let (_dir, mut server, base) = serve_fixture().await;
    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("docs"));
    server.stop();
}
