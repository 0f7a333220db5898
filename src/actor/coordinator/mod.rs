//! Sync Coordinator - sole owner of the Scene
//!
//! Runs on a single-threaded runtime. Every mutation of the scene and every
//! broadcast happens here, one message at a time:
//!
//! ```text
//! SceneChanged  → load (retry) → replace scene → publish snapshot → broadcast
//! ScriptChanged → run generator (await) → (watcher sees the new scene file)
//! Connect       → register channel → send `connected`
//! Shutdown      → close channels → stop
//! ```
//!
//! The snapshot is published before `scene_updated` goes out, so a viewer
//! that re-fetches on notification always sees the new scene.

mod loader;


use loader::{RetryPolicy, load_with_retry};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::hub::BroadcastHub;
use super::messages::SyncMsg;
use crate::config::RuntimeConfig;
use crate::hooks::GeneratorSupervisor;
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::reload::message::ViewerMessage;
use crate::scene::{PluginCatalog, Scene};
use crate::utils::plural::plural_count;
use crate::{debug, log};

pub const CHANNEL_BUFFER: usize = 32;

/// How often viewer channels are polled for disconnects.
const REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Create the coordinator's inbox.
pub fn sync_channel() -> (mpsc::Sender<SyncMsg>, mpsc::Receiver<SyncMsg>) {
    mpsc::channel(CHANNEL_BUFFER)
}

/// Last published scene serialization.
///
/// Cheap to clone; readers never block the coordinator.
#[derive(Clone)]
pub struct SceneSnapshot(Arc<ArcSwap<Value>>);

impl SceneSnapshot {
    fn new() -> Self {
        Self(Arc::new(ArcSwap::from_pointee(
            json!({ "plugins": [], "objects": [] }),
        )))
    }

    pub fn load(&self) -> Arc<Value> {
        self.0.load_full()
    }

    fn publish(&self, value: Value) {
        self.0.store(Arc::new(value));
    }
}

pub struct SyncCoordinator {
    config: Arc<RuntimeConfig>,
    scene: Scene,
    catalog: PluginCatalog,
    hub: BroadcastHub,
    generator: Option<GeneratorSupervisor>,
    snapshot: SceneSnapshot,
    retry: RetryPolicy,
    rx: mpsc::Receiver<SyncMsg>,
}

impl SyncCoordinator {
    pub fn new(config: Arc<RuntimeConfig>, rx: mpsc::Receiver<SyncMsg>) -> Self {
        let generator = config.generator.clone().map(|script| {
            GeneratorSupervisor::new(
                script,
                config.scene_path.clone(),
                config.interpreter.as_deref(),
            )
        });
        let retry = RetryPolicy {
            attempts: config.watch.retry_attempts,
            backoff: config.watch.retry_backoff(),
        };

        let coordinator = Self {
            config,
            scene: Scene::new(),
            catalog: PluginCatalog::builtin(),
            hub: BroadcastHub::new(),
            generator,
            snapshot: SceneSnapshot::new(),
            retry,
            rx,
        };
        coordinator.publish();
        coordinator
    }

    /// Handle for the read endpoint.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.snapshot.clone()
    }

    /// Load the scene once at startup.
    ///
    /// Runs the generator first if the scene file does not exist yet.
    /// Returns whether a scene was loaded.
    pub async fn initial_load(&mut self) -> bool {
        let path = self.config.scene_path.clone();

        if !path.exists()
            && let Some(generator) = &self.generator
        {
            log!("sync"; "{} missing, running `{}`", path.display(), generator.command_line());
            if let Err(e) = generator.run().await {
                status_error("generator failed", &e.to_string());
                return false;
            }
        }

        if !path.exists() {
            status_warning(&format!("waiting for {}", path.display()));
            return false;
        }

        self.reload(&path).await
    }

    /// Process messages until shutdown or until every sender is gone.
    pub async fn run(mut self) {
        let mut reap = tokio::time::interval(REAP_INTERVAL);
        reap.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                msg = self.rx.recv() => {
                    let Some(msg) = msg else { break };
                    if !self.handle(msg).await {
                        break;
                    }
                }
                _ = reap.tick() => {
                    let reaped = self.hub.reap();
                    if reaped > 0 {
                        debug!("ws"; "dropped {}", plural_count(reaped, "closed viewer"));
                    }
                }
            }
        }

        self.hub.close_all();
        debug!("sync"; "stopped");
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, msg: SyncMsg) -> bool {
        debug!("sync"; "{:?}", msg);
        match msg {
            SyncMsg::SceneChanged { path } => {
                self.reload(&path).await;
            }
            SyncMsg::ScriptChanged { path } => self.regenerate(&path).await,
            SyncMsg::Connect(channel) => {
                let id = self.hub.connect(channel);
                self.hub.send_to(id, &ViewerMessage::connected());
            }
            SyncMsg::Shutdown => return false,
        }
        true
    }

    /// Load `path`, swap it in, publish, then notify viewers.
    async fn reload(&mut self, path: &Path) -> bool {
        let loaded = match load_with_retry(path, self.retry).await {
            Ok(description) => self
                .scene
                .load_description(&description, &self.catalog)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match loaded {
            Ok(count) => {
                self.publish();
                let delivered = self.hub.broadcast(&ViewerMessage::SceneUpdated);
                status_success(&format!(
                    "scene reloaded ({}, {})",
                    plural_count(count, "object"),
                    plural_count(delivered, "viewer")
                ));
                true
            }
            Err(error) => {
                status_error(&format!("reload failed: {}", path.display()), &error);
                self.hub.broadcast(&ViewerMessage::error(error));
                false
            }
        }
    }

    /// Run the generator; the scene write it produces arrives as its own
    /// `SceneChanged`.
    async fn regenerate(&mut self, script: &Path) {
        let Some(generator) = &self.generator else {
            debug!("sync"; "no generator configured for {}", script.display());
            return;
        };

        log!("sync"; "running `{}`", generator.command_line());
        match generator.run().await {
            Ok(()) => status_unchanged("generator finished"),
            Err(e) => {
                let error = e.to_string();
                status_error("generator failed", &error);
                self.hub.broadcast(&ViewerMessage::error(error));
            }
        }
    }

    fn publish(&self) {
        self.snapshot.publish(self.scene.serialize());
    }
}
