//! `volum serve`: read endpoint, viewer channels and live sync.
//!
//! Startup order:
//!
//! 1. bind HTTP (read endpoint)
//! 2. attach the file watcher (before any load, so no write is missed)
//! 3. start the WebSocket acceptor
//! 4. start the coordinator thread (initial load, then message loop)
//! 5. serve requests until Ctrl+C

mod lifecycle;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};

use crate::actor::fs::{DetectorSettings, PathRole};
use crate::actor::{FsWatcher, SceneSnapshot, SyncCoordinator, sync_channel};
use crate::config::RuntimeConfig;
use crate::core::{is_serving, is_shutdown, register_server};
use crate::reload::server::start_ws_server;
use crate::{debug, log};

/// Start the server and block until shutdown.
pub fn serve(config: Arc<RuntimeConfig>) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    let (sync_tx, sync_rx) = sync_channel();

    let watcher = FsWatcher::new(
        &watch_targets(&config),
        DetectorSettings::from(&config.watch),
        sync_tx.clone(),
    )
    .context("Failed to start file watcher")?;

    let (ws_port, ws_handle) =
        start_ws_server(config.serve.interface, config.serve.ws_port, sync_tx.clone())?;

    let coordinator = SyncCoordinator::new(Arc::clone(&config), sync_rx);
    let snapshot = coordinator.snapshot();
    let sync_handle = lifecycle::spawn_coordinator(coordinator)?;
    let watch_handle = watcher.spawn().context("Failed to spawn watcher thread")?;

    log!("serve"; "http://{}/scene", addr);
    log!("ws"; "ws://{}:{}", addr.ip(), ws_port);
    log!("watch"; "{}", config.scene_path.display());
    if let Some(generator) = &config.generator {
        log!("watch"; "{} (generator)", generator.display());
    }

    run_request_loop(&server, &snapshot);

    lifecycle::shutdown(sync_tx, vec![sync_handle, watch_handle, ws_handle]);
    Ok(())
}

fn watch_targets(config: &RuntimeConfig) -> Vec<(PathBuf, PathRole)> {
    let mut targets = vec![(config.scene_path.clone(), PathRole::Scene)];
    if let Some(generator) = &config.generator {
        targets.push((generator.clone(), PathRole::Script));
    }
    targets
}

fn run_request_loop(server: &Server, snapshot: &SceneSnapshot) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, snapshot) {
            log!("serve"; "request error: {e}");
        }
        if is_shutdown() {
            break;
        }
    }
}

/// Endpoints a request can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Scene,
    Health,
    NotFound,
    MethodNotAllowed,
}

fn route(method: &Method, url: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.trim_end_matches('/');

    let known = match path {
        "/scene" => Route::Scene,
        "/health" => Route::Health,
        _ => return Route::NotFound,
    };
    match method {
        Method::Get | Method::Head => known,
        _ => Route::MethodNotAllowed,
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, snapshot: &SceneSnapshot) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match route(request.method(), request.url()) {
        Route::Health => response::respond_text(request, 200, "ok"),
        Route::Scene if !is_serving() => response::respond_loading(request),
        Route::Scene => {
            let body = serde_json::to_vec(&*snapshot.load())?;
            response::respond_json(request, body)
        }
        Route::MethodNotAllowed => response::respond_method_not_allowed(request),
        Route::NotFound => response::respond_not_found(request),
    }
}
