//! Response construction.
//!
//! # Design Decisions
//! - Range and conditional GET are delegated to `ServeFile`
//! - The header policy runs after `ServeFile` so configured headers win over
//!   nothing but each other
//! - Error bodies are fixed strings; details stay in the server log

use axum::{
    body::Body,
    http::{header, request::Parts, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::assets::{HeaderPolicy, ResolvedAsset};

pub const NOT_FOUND_BODY: &str = "Not Found";
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Stream `asset` to the client with the policy's headers applied.
pub async fn serve_asset(
    request: &Parts,
    asset: &ResolvedAsset,
    policy: &HeaderPolicy,
) -> Response {
    let method = if request.method == Method::HEAD {
        Method::HEAD
    } else {
        Method::GET
    };

    let mut file_request = Request::new(Body::empty());
    *file_request.method_mut() = method;
    *file_request.uri_mut() = request.uri.clone();
    *file_request.headers_mut() = request.headers.clone();

    let response = ServeFile::new_with_mime(&asset.file_path, &asset.content_type)
        .oneshot(file_request)
        .await
        .unwrap_or_else(|never| match never {});
    let mut response = response.map(Body::new);

    // The file vanished between lookup and open.
    if response.status() == StatusCode::NOT_FOUND {
        return not_found();
    }

    let headers = response.headers_mut();
    if let Some(encoding) = asset.encoding {
        headers.insert(
            header::CONTENT_ENCODING,
            HeaderValue::from_static(encoding.token()),
        );
        headers.insert(header::VARY, HeaderValue::from_static("accept-encoding"));
    }
    policy.apply(headers, &asset.resource_path);

    response
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Encoding;
    use mime_guess::mime;
    use std::fs;

    fn asset(path: std::path::PathBuf, resource_path: &str, encoding: Option<Encoding>) -> ResolvedAsset {
        ResolvedAsset {
            resource_path: resource_path.to_string(),
            file_path: path,
            content_type: mime::APPLICATION_JAVASCRIPT,
            encoding,
        }
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_encoded_asset_headers() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("app.js.br");
        fs::write(&path, b"compressed").unwrap();

        let request = Request::get("/app.js").body(Body::empty()).unwrap().into_parts().0;
        let response = serve_asset(
            &request,
            &asset(path, "/app.js", Some(Encoding::Brotli)),
            &HeaderPolicy::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-encoding"], "br");
        assert_eq!(response.headers()["content-type"], "application/javascript");
        assert_eq!(response.headers()["cache-control"], crate::assets::headers::IMMUTABLE_CACHE_CONTROL);
        assert_eq!(body_bytes(response).await, b"compressed");
    }

    #[tokio::test]
    async fn test_non_get_methods_are_served() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("app.js");
        fs::write(&path, b"plain").unwrap();

        let request = Request::post("/app.js").body(Body::empty()).unwrap().into_parts().0;
        let response = serve_asset(&request, &asset(path, "/app.js", None), &HeaderPolicy::default()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("content-encoding").is_none());
        assert_eq!(body_bytes(response).await, b"plain");
    }

    #[tokio::test]
    async fn test_range_request_is_honoured() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("app.js");
        fs::write(&path, b"0123456789").unwrap();

        let request = Request::get("/app.js")
            .header(header::RANGE, "bytes=2-4")
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0;
        let response = serve_asset(&request, &asset(path, "/app.js", None), &HeaderPolicy::default()).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_bytes(response).await, b"234");
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(response).await, NOT_FOUND_BODY.as_bytes());

        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, INTERNAL_ERROR_BODY.as_bytes());
    }
}
