//! Static file server for the bundled docs and demo data. The application's
//! map charts fetch the GeoJSON overlay from here, cross-origin, so the
//! server must answer with permissive CORS headers and the right media type.

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::info;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub struct DocsServer {
    docs_path: PathBuf,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DocsServer {
    pub fn new(docs_path: &Path) -> Self {
        Self {
            docs_path: docs_path.to_path_buf(),
            shutdown_tx: None,
        }
    }

    /// Bind and start serving in a background task. Returns the bound
    /// address; pass port 0 to let the OS pick one.
    pub async fn start(&mut self, address: &str) -> Result<SocketAddr> {
        if self.shutdown_tx.is_some() {
            anyhow::bail!("docs server already running");
        }
        if !self.docs_path.exists() {
            anyhow::bail!("docs directory not found: {}", self.docs_path.display());
        }

        let app = router(&self.docs_path);
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("cannot bind docs server on {}", address))?;
        let bound = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("docs server listening on http://{}", bound);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
            info!("docs server stopped");
        });

        Ok(bound)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for DocsServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn router(docs_path: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let serve_dir = ServeDir::new(docs_path).append_index_html_on_directories(true);

    Router::new()
        .route("/health", get(health))
        .fallback_service(serve_dir)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(fix_content_type)),
        )
}

async fn health() -> impl IntoResponse {
    "OK"
}

/// GeoJSON gets its proper media type (the mime guess falls back to opaque
/// bytes for it), and text responses an explicit UTF-8 charset.
async fn fix_content_type(request: Request, next: Next) -> Response {
    let is_geojson = request.uri().path().ends_with(".geojson");
    let mut response = next.run(request).await;

    if is_geojson {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/geo+json"),
        );
        return response;
    }

    let updated = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|ct| ct.starts_with("text/") && !ct.contains("charset"))
        .and_then(|ct| HeaderValue::from_str(&format!("{}; charset=utf-8", ct)).ok());
    if let Some(value) = updated {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_errors_on_missing_directory() {
        let mut server = DocsServer::new(Path::new("/nonexistent/docs"));
        let err = server.start("127.0.0.1:0").await.unwrap_err();
        assert!(err.to_string().contains("docs directory not found"));
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = DocsServer::new(dir.path());
        server.start("127.0.0.1:0").await.unwrap();
        assert!(server.is_running());
        let err = server.start("127.0.0.1:0").await.unwrap_err();
        assert!(err.to_string().contains("already running"));
        server.stop();
        assert!(!server.is_running());
    }
}
