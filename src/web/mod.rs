//! Embedded web UI for homeval.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page UI with the predictor form and the market dashboard
//! - JSON API endpoints that drive one predictor controller per server
//!
//! Launched via `homeval web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::{ApiClient, PriceApi};
use crate::config::{self, HomevalConfig};
use crate::predictor::PredictorForm;

pub use api::Reply;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the request loop needs: the backend, the one predictor form
/// this server owns, and the settings for dashboards it mounts.
pub struct WebApp<A: PriceApi> {
    api: A,
    form: PredictorForm,
    config: HomevalConfig,
}

impl<A: PriceApi> WebApp<A> {
    /// Build the app and bootstrap the form's metadata.
    pub fn new(api: A, config: HomevalConfig) -> Self {
        let mut form = PredictorForm::from_config(&config.predictor);
        form.load_metadata(&api);
        Self { api, form, config }
    }

    pub fn form(&self) -> &PredictorForm {
        &self.form
    }

    /// Route one request to its handler.
    pub fn handle(&mut self, method: &Method, url: &str, body: Option<&str>) -> Reply {
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            (&Method::Get, "/api/form") => api::get_form(&self.form),
            (&Method::Post, "/api/form/retry") => api::post_retry(&mut self.form, &self.api),
            (&Method::Put, "/api/form/field") => {
                api::put_field(&mut self.form, body.unwrap_or("{}"))
            }
            (&Method::Post, "/api/form/submit") => api::post_submit(&mut self.form, &self.api),
            (&Method::Get, "/api/dashboard") => api::get_dashboard(&self.api, &self.config),
            (&Method::Get, "/api/health") => api::get_health(&self.api, &self.config),
            _ => Reply::error(404, "not found"),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web UI server. `addr` overrides `[web] addr` from config.
///
/// Blocks the current thread. Handles requests sequentially, so a
/// submission holds the loop until its prediction (and reveal delay) is
/// done.
pub fn serve(addr: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or(cfg.web.addr.as_str()).to_string();
    let open = cfg.web.open_browser;

    let client = ApiClient::from_config(&cfg);
    println!("homeval backend: {}", client.base_url());
    let mut app = WebApp::new(client, cfg);

    let server = Server::http(addr.as_str())
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("homeval UI running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = match (&method, url.split('?').next().unwrap_or(&url)) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => serve_frontend(),
            _ => into_response(app.handle(&method, &url, body.as_deref())),
        };
        let _ = request.respond(resp);

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn into_response(reply: Reply) -> Response<Cursor<Vec<u8>>> {
    let resp = Response::from_data(reply.body.to_string().into_bytes())
        .with_status_code(StatusCode(reply.status));
    with_content_type(resp, "application/json; charset=utf-8")
}

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let resp = Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_status_code(StatusCode(200));
    with_content_type(resp, "text/html; charset=utf-8")
}

fn with_content_type(
    resp: Response<Cursor<Vec<u8>>>,
    value: &str,
) -> Response<Cursor<Vec<u8>>> {
    match Header::from_bytes("Content-Type", value) {
        Ok(header) => resp.with_header(header),
        Err(()) => resp,
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
