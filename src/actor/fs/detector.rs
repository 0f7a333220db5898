use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::config::WatchConfig;
use crate::freshness::{ContentHash, FileDigest, hash_file};
use crate::utils::path::normalize_watch_path;
use crate::{debug, log};

pub const DEBOUNCE_MS: u64 = 500;
pub const RETRY_ATTEMPTS: u32 = 10;
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Sleep when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// What a watched file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Scene,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Quiet period after the last raw event (and after the last acceptance).
    pub window: Duration,
    /// Delay before re-checking an empty or unreadable file.
    pub retry_backoff: Duration,
    /// Re-checks before a burst is abandoned.
    pub retry_attempts: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEBOUNCE_MS),
            retry_backoff: Duration::from_millis(RETRY_BACKOFF_MS),
            retry_attempts: RETRY_ATTEMPTS,
        }
    }
}

impl From<&WatchConfig> for DetectorSettings {
    fn from(watch: &WatchConfig) -> Self {
        Self {
            window: watch.debounce(),
            retry_backoff: watch.retry_backoff(),
            retry_attempts: watch.retry_attempts,
        }
    }
}

/// A change that passed both guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedChange {
    pub path: PathBuf,
    pub role: PathRole,
    pub hash: ContentHash,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    /// First raw event of the current burst.
    first_event: Instant,
    next_check: Instant,
    retries: u32,
}

#[derive(Debug)]
struct Tracked {
    role: PathRole,
    last_hash: Option<ContentHash>,
    last_accepted: Option<Instant>,
    pending: Option<Pending>,
}

/// Per-path debounce plus content dedupe.
///
/// Time guard (trailing edge): a path is evaluated once `window` has passed
/// since its latest raw event and since its last acceptance. A burst
/// collapses into one evaluation of its final state. A burst that never
/// goes quiet is still evaluated `window` after its first event, so a
/// continuous writer is picked up at least once per window.
///
/// Content guard: the blake3 digest must differ from the last accepted one.
///
/// All methods take `now` so that timing is driven by the caller.
#[derive(Debug)]
pub struct ChangeDetector {
    settings: DetectorSettings,
    tracked: FxHashMap<PathBuf, Tracked>,
}

impl ChangeDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            tracked: FxHashMap::default(),
        }
    }

    /// Start tracking `path`. Returns the normalized key.
    pub fn watch(&mut self, path: &Path, role: PathRole) -> PathBuf {
        let key = normalize_watch_path(path);
        self.tracked.insert(
            key.clone(),
            Tracked {
                role,
                last_hash: None,
                last_accepted: None,
                pending: None,
            },
        );
        key
    }

    /// Record the current digest so an unchanged file is not reported.
    pub fn prime(&mut self, path: &Path) {
        let key = normalize_watch_path(path);
        let Some(tracked) = self.tracked.get_mut(&key) else {
            return;
        };
        if let Ok(FileDigest::Content(hash)) = hash_file(&key) {
            debug!("watch"; "primed {} ({})", key.display(), hash);
            tracked.last_hash = Some(hash);
        }
    }

    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.tracked.keys().map(PathBuf::as_path)
    }

    pub fn has_pending(&self) -> bool {
        self.tracked.values().any(|t| t.pending.is_some())
    }

    /// Feed a notify event.
    pub fn add_event(&mut self, event: &notify::Event, now: Instant) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in &event.paths {
            self.touch(path, now);
        }
    }

    /// Register a raw event on `path`. Unrelated paths are ignored.
    pub fn touch(&mut self, path: &Path, now: Instant) {
        let key = normalize_watch_path(path);
        let window = self.settings.window;
        let Some(tracked) = self.tracked.get_mut(&key) else {
            return;
        };

        let first_event = tracked.pending.map_or(now, |p| p.first_event);
        let mut next_check = (now + window).min(first_event + window);
        if let Some(accepted) = tracked.last_accepted {
            next_check = next_check.max(accepted + window);
        }
        debug!("watch"; "event: {}", key.display());
        tracked.pending = Some(Pending {
            first_event,
            next_check,
            retries: 0,
        });
    }

    /// Evaluate every pending path whose time has come.
    pub fn take_ready(&mut self, now: Instant) -> Vec<AcceptedChange> {
        let settings = self.settings;
        let mut accepted = Vec::new();

        for (path, tracked) in &mut self.tracked {
            let Some(pending) = tracked.pending else {
                continue;
            };
            if pending.next_check > now {
                continue;
            }

            if path.is_dir() {
                tracked.pending = None;
                continue;
            }

            let digest = match hash_file(path) {
                Ok(digest) => Ok(digest),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("watch"; "removed, waiting for recreate: {}", path.display());
                    tracked.pending = None;
                    continue;
                }
                Err(e) => Err(e.to_string()),
            };

            match digest {
                Ok(FileDigest::Content(hash)) if tracked.last_hash == Some(hash) => {
                    debug!("watch"; "unchanged: {}", path.display());
                    tracked.pending = None;
                }
                Ok(FileDigest::Content(hash)) => {
                    tracked.last_hash = Some(hash);
                    tracked.last_accepted = Some(now);
                    tracked.pending = None;
                    accepted.push(AcceptedChange {
                        path: path.clone(),
                        role: tracked.role,
                        hash,
                    });
                }
                // Empty (mid-write) or unreadable: neither same nor different
                Ok(FileDigest::Empty) | Err(_) => {
                    let retries = pending.retries + 1;
                    if retries >= settings.retry_attempts {
                        let reason = match &digest {
                            Err(e) => e.as_str(),
                            _ => "file stayed empty",
                        };
                        log!("watch"; "giving up on {}: {}", path.display(), reason);
                        tracked.pending = None;
                    } else {
                        tracked.pending = Some(Pending {
                            next_check: now + settings.retry_backoff,
                            retries,
                            ..pending
                        });
                    }
                }
            }
        }

        accepted
    }

    /// Time until the next pending check is due.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.tracked
            .values()
            .filter_map(|t| t.pending)
            .map(|p| p.next_check.saturating_duration_since(now))
            .min()
            .map_or(IDLE, |d| d.max(Duration::from_millis(1)))
    }
}
