//! Local preview server.
//!
//! Serves the output directory verbatim over plain HTTP, built on
//! `tiny_http`. Requests are resolved in this order:
//!
//! 1. Exact file match → serve file
//! 2. Directory with `index.html` → serve `index.html`
//! 3. Anything else → 404
//!
//! No rebuilding, no live reload. The server blocks until the process is
//! terminated.

use std::fs;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
    #[error("nothing to serve: {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Serve `root` on `localhost:<port>` until the process exits.
pub fn serve(root: &Path, port: u16) -> Result<(), ServeError> {
    if !root.is_dir() {
        return Err(ServeError::NotADirectory(root.to_path_buf()));
    }
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let server = Server::http(addr).map_err(|e| ServeError::Bind {
        addr,
        reason: e.to_string(),
    })?;

    println!("Serving {} at http://localhost:{} ...", root.display(), port);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            log::warn!("request error: {e}");
        }
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path) -> std::io::Result<()> {
    let resolved = resolve_request_path(root, request.url());
    log::debug!(
        "{} {} → {}",
        request.method(),
        request.url(),
        resolved
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "404".into())
    );

    match resolved {
        Some(path) => {
            let content = fs::read(&path)?;
            let mut response = Response::from_data(content);
            if let Ok(header) = Header::from_bytes("Content-Type", guess_content_type(&path)) {
                response = response.with_header(header);
            }
            request.respond(response)
        }
        None => {
            let response = Response::from_string("404 Not Found").with_status_code(StatusCode(404));
            request.respond(response)
        }
    }
}

/// Map a request URL onto a file inside `root`.
///
/// The query string is dropped and percent-escapes are decoded. Paths that
/// try to leave `root` (`..`) resolve to nothing.
pub fn resolve_request_path(root: &Path, url: &str) -> Option<PathBuf> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(without_query).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join(crate::index::INDEX_URL);
    if local.is_dir() && index.is_file() {
        return Some(index);
    }
    None
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
