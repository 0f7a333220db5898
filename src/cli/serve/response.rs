//! HTTP response handlers.

use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

pub(super) const JSON: &str = "application/json";
pub(super) const PLAIN: &str = "text/plain; charset=utf-8";

/// Respond with the serialized scene.
pub fn respond_json(request: Request, body: Vec<u8>) -> Result<()> {
    send_body(request, 200, JSON, body)
}

pub fn respond_text(request: Request, status: u16, text: &str) -> Result<()> {
    send_body(request, status, PLAIN, text.as_bytes().to_vec())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    respond_text(request, 404, "404 Not Found")
}

/// Initial load still running.
pub fn respond_loading(request: Request) -> Result<()> {
    respond_text(request, 503, "503 scene is loading")
}

pub fn respond_unavailable(request: Request) -> Result<()> {
    respond_text(request, 503, "503 Service Unavailable")
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    respond_text(request, 405, "405 Method Not Allowed")
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let head = request.method() == &Method::Head;
    let length = body.len();

    let mut response = Response::new(
        StatusCode(status),
        Vec::new(),
        std::io::Cursor::new(if head { Vec::new() } else { body }),
        Some(if head { 0 } else { length }),
        None,
    );
    for (key, value) in [
        ("Content-Type", content_type),
        ("Cache-Control", "no-store"),
        // Viewers are served from elsewhere.
        ("Access-Control-Allow-Origin", "*"),
    ] {
        if let Ok(header) = Header::from_bytes(key, value) {
            response.add_header(header);
        }
    }

    request.respond(response)?;
    Ok(())
}
