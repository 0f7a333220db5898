//! FileSystem Watcher
//!
//! Watches the scene file and generator script and forwards accepted changes
//! to the SyncCoordinator. Runs on its own OS thread; debounce and hashing
//! never touch the coordinator's runtime.
//!
//! Architecture:
//! ```text
//! notify → ChangeDetector (time guard + content guard) → SyncMsg
//! ```
//!
//! Implements the "Watcher-First" pattern: the watcher is attached before
//! the initial load, so writes during startup are not lost.

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::SyncMsg;

// Debounce and content dedupe.
mod detector;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

pub use detector::{DetectorSettings, PathRole};
use detector::ChangeDetector;
use watch_roots::{WatchRoots, watch_dirs};

/// Upper bound on one blocking wait, so shutdown is noticed.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// FileSystem Watcher - owns the notify handle and the detector
pub struct FsWatcher {
    /// Channel to receive notify events
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    detector: ChangeDetector,
    sync_tx: mpsc::Sender<SyncMsg>,
}

impl FsWatcher {
    /// Attach the watcher and prime the detector with current digests.
    pub fn new(
        targets: &[(PathBuf, PathRole)],
        settings: DetectorSettings,
        sync_tx: mpsc::Sender<SyncMsg>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut detector = ChangeDetector::new(settings);
        for (path, role) in targets {
            detector.watch(path, *role);
        }

        let mut watch_roots = WatchRoots::new(watch_dirs(detector.watched()));
        watch_roots.attach_existing(&mut watcher)?;

        for (path, _) in targets {
            detector.prime(path);
        }

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            detector,
            sync_tx,
        })
    }

    /// Run the watcher loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("volum-watch".into())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        loop {
            if crate::core::is_shutdown() || self.sync_tx.is_closed() {
                break;
            }

            let timeout = self
                .detector
                .sleep_duration(Instant::now())
                .min(SHUTDOWN_POLL);

            match self.notify_rx.recv_timeout(timeout) {
                Ok(Ok(event)) => self.detector.add_event(&event, Instant::now()),
                Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.watch_roots.maintain(&mut self.watcher);

            for change in self.detector.take_ready(Instant::now()) {
                crate::debug!("watch"; "accepted {} ({})", change.path.display(), change.hash);
                let msg = match change.role {
                    PathRole::Scene => SyncMsg::SceneChanged { path: change.path },
                    PathRole::Script => SyncMsg::ScriptChanged { path: change.path },
                };
                if self.sync_tx.blocking_send(msg).is_err() {
                    crate::debug!("watch"; "coordinator gone, stopping");
                    return;
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}
