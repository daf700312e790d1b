//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use spa_server::assets::ImportFallbackCache;
use spa_server::config::ServerConfig;
use spa_server::observability::{Signal, TelemetrySink};
use spa_server::HttpServer;
use tempfile::TempDir;
use tower::ServiceExt;

/// A throwaway directory tree standing in for a built application.
pub struct Site {
    dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn file(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.dir.path().join(relative)).unwrap();
    }
}

/// Config serving `roots`, with telemetry off and the default exclusion list.
pub fn config_for(roots: &[&Site]) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.assets.roots = roots.iter().map(|s| s.path().to_path_buf()).collect();
    config.observability.telemetry_disabled = true;
    config
}

/// Captures every signal for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    signals: Mutex<Vec<(Signal, String)>>,
}

impl RecordingSink {
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    pub fn entries(&self) -> Vec<(Signal, String)> {
        self.signals.lock().unwrap().clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&self, signal: Signal, path: &str) {
        self.signals.lock().unwrap().push((signal, path.to_string()));
    }
}

/// Build a router plus handles on its cache and recorded signals.
pub fn harness(config: ServerConfig) -> (Router, ImportFallbackCache, Arc<RecordingSink>) {
    let cache = ImportFallbackCache::new();
    let sink = Arc::new(RecordingSink::default());
    let server = HttpServer::with_collaborators(config, cache.clone(), sink.clone()).unwrap();
    (server.router(), cache, sink)
}

pub fn router(config: ServerConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// GET `path` with the given headers.
pub async fn get(router: &Router, path: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::get(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Remove all permission bits from `path`. Returns `false`, with the bits
/// restored, when the current user can still open it (e.g. root).
#[cfg(unix)]
pub fn lock(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::File::open(path).is_ok() {
        unlock(path);
        return false;
    }
    true
}

#[cfg(unix)]
pub fn unlock(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let mode = if path.is_dir() { 0o755 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}
