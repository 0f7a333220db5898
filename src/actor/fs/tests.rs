use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::detector::{ChangeDetector, DetectorSettings, PathRole};
use super::watch_roots::watch_dirs;
use crate::freshness::ContentHash;

const WINDOW: Duration = Duration::from_millis(500);
const BACKOFF: Duration = Duration::from_millis(500);

fn setup() -> (TempDir, PathBuf, ChangeDetector) {
    let temp = TempDir::new().unwrap();
    let scene = temp.path().join("scene.json");
    let mut detector = ChangeDetector::new(DetectorSettings::default());
    detector.watch(&scene, PathRole::Scene);
    (temp, scene, detector)
}

fn make_event(paths: Vec<&Path>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(Path::to_path_buf).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

#[test]
fn test_settings_default() {
    let settings = DetectorSettings::default();
    assert_eq!(settings.window, WINDOW);
    assert_eq!(settings.retry_backoff, BACKOFF);
    assert_eq!(settings.retry_attempts, 10);
}

#[test]
fn test_settings_from_watch_config() {
    let watch = crate::config::WatchConfig {
        debounce_ms: 200,
        retry_attempts: 4,
        retry_backoff_ms: 50,
    };
    let settings = DetectorSettings::from(&watch);
    assert_eq!(settings.window, Duration::from_millis(200));
    assert_eq!(settings.retry_backoff, Duration::from_millis(50));
    assert_eq!(settings.retry_attempts, 4);
}

#[test]
fn test_nothing_before_window() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "[1]");
    detector.touch(&scene, t0);

    assert!(detector.take_ready(t0 + Duration::from_millis(100)).is_empty());
    assert!(detector.has_pending());

    let accepted = detector.take_ready(t0 + WINDOW);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].role, PathRole::Scene);
    assert_eq!(accepted[0].hash, ContentHash::of(b"[1]"));
}

#[test]
fn test_burst_collapses_to_final_state() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "[1]");
    detector.touch(&scene, t0);
    write(&scene, "[2]");
    detector.touch(&scene, t0 + Duration::from_millis(200));

    assert!(detector.take_ready(t0 + Duration::from_millis(300)).is_empty());

    let accepted = detector.take_ready(t0 + WINDOW);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].hash, ContentHash::of(b"[2]"));
    assert!(!detector.has_pending());
}

#[test]
fn test_continuous_writer_accepted_every_window() {
    let (_temp, scene, mut detector) = setup();
    write(&scene, "[0]");
    detector.prime(&scene);

    let t0 = Instant::now();
    let tick = Duration::from_millis(100);
    let mut accepted = Vec::new();

    // One write every 200ms for 3s, polled every 100ms like the watch loop
    for step in 1..=30u32 {
        let now = t0 + tick * step;
        if step % 2 == 0 {
            write(&scene, &format!("[{step}]"));
            detector.touch(&scene, now);
        }
        accepted.extend(detector.take_ready(now));
    }
    assert!(accepted.len() >= 4, "accepted {}", accepted.len());

    // The last write of the burst is still delivered once it goes quiet
    let mut now = t0 + tick * 30;
    while detector.has_pending() {
        now += tick;
        accepted.extend(detector.take_ready(now));
    }
    assert_eq!(accepted.last().unwrap().hash, ContentHash::of(b"[30]"));
}

#[test]
fn test_identical_writes_accepted_at_most_once() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "[1]");
    detector.touch(&scene, t0);
    write(&scene, "[1]");
    detector.touch(&scene, t0 + Duration::from_millis(50));

    let t1 = t0 + Duration::from_secs(1);
    assert_eq!(detector.take_ready(t1).len(), 1);

    // Same bytes again, well after the window
    write(&scene, "[1]");
    detector.touch(&scene, t1 + Duration::from_secs(1));
    assert!(detector.take_ready(t1 + Duration::from_secs(2)).is_empty());
    assert!(!detector.has_pending());
}

#[test]
fn test_primed_file_not_reported() {
    let (_temp, scene, mut detector) = setup();
    write(&scene, "[1]");
    detector.prime(&scene);

    let t0 = Instant::now();
    detector.touch(&scene, t0);
    assert!(detector.take_ready(t0 + WINDOW).is_empty());
}

#[test]
fn test_differing_write_after_window_accepted() {
    let (_temp, scene, mut detector) = setup();
    write(&scene, "[1]");
    detector.prime(&scene);

    let t0 = Instant::now();
    write(&scene, "[2]");
    detector.touch(&scene, t0);
    assert_eq!(detector.take_ready(t0 + WINDOW).len(), 1);

    let t1 = t0 + WINDOW + Duration::from_millis(700);
    write(&scene, "[3]");
    detector.touch(&scene, t1);
    let accepted = detector.take_ready(t1 + WINDOW);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].hash, ContentHash::of(b"[3]"));
}

#[test]
fn test_event_right_after_acceptance_waits_for_cooldown() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "[1]");
    detector.touch(&scene, t0);
    let accepted_at = t0 + WINDOW;
    assert_eq!(detector.take_ready(accepted_at).len(), 1);

    write(&scene, "[2]");
    detector.touch(&scene, accepted_at);
    assert!(detector.take_ready(accepted_at + Duration::from_millis(499)).is_empty());
    assert_eq!(detector.take_ready(accepted_at + WINDOW).len(), 1);
}

#[test]
fn test_empty_file_retried_until_content() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "");
    detector.touch(&scene, t0);
    assert!(detector.take_ready(t0 + WINDOW).is_empty());
    assert!(detector.has_pending());

    write(&scene, "[1]");
    let accepted = detector.take_ready(t0 + WINDOW + BACKOFF);
    assert_eq!(accepted.len(), 1);
}

#[test]
fn test_whitespace_only_file_treated_as_empty() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "  \n");
    detector.touch(&scene, t0);
    assert!(detector.take_ready(t0 + WINDOW).is_empty());
    assert!(detector.has_pending());

    write(&scene, "[1]");
    assert_eq!(detector.take_ready(t0 + WINDOW + BACKOFF).len(), 1);
}

#[test]
fn test_empty_file_dropped_after_budget() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    write(&scene, "");
    detector.touch(&scene, t0);

    let mut now = t0 + WINDOW;
    for _ in 0..10 {
        assert!(detector.take_ready(now).is_empty());
        now += BACKOFF;
    }
    assert!(!detector.has_pending());
}

#[test]
fn test_missing_file_dropped() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();

    detector.touch(&scene, t0);
    assert!(detector.take_ready(t0 + WINDOW).is_empty());
    assert!(!detector.has_pending());
}

#[test]
fn test_unrelated_and_metadata_events_ignored() {
    let (temp, scene, mut detector) = setup();
    let other = temp.path().join("notes.txt");
    write(&other, "hi");
    write(&scene, "[1]");

    let t0 = Instant::now();
    detector.add_event(&make_event(vec![&other], modify_kind()), t0);
    detector.add_event(&make_event(vec![&scene], metadata_kind()), t0);
    assert!(!detector.has_pending());

    detector.add_event(&make_event(vec![&scene], modify_kind()), t0);
    assert!(detector.has_pending());
}

#[test]
fn test_directory_event_dropped() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scene.json");
    std::fs::create_dir(&dir).unwrap();

    let mut detector = ChangeDetector::new(DetectorSettings::default());
    detector.watch(&dir, PathRole::Scene);

    let t0 = Instant::now();
    detector.touch(&dir, t0);
    assert!(detector.take_ready(t0 + WINDOW).is_empty());
    assert!(!detector.has_pending());
}

#[test]
fn test_script_role_reported() {
    let (temp, _scene, mut detector) = setup();
    let script = temp.path().join("gen.py");
    detector.watch(&script, PathRole::Script);
    write(&script, "print('hi')");

    let t0 = Instant::now();
    detector.touch(&script, t0);
    let accepted = detector.take_ready(t0 + WINDOW);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].role, PathRole::Script);
}

#[test]
fn test_sleep_duration() {
    let (_temp, scene, mut detector) = setup();
    let t0 = Instant::now();
    assert!(detector.sleep_duration(t0) >= Duration::from_secs(3600));

    detector.touch(&scene, t0);
    assert_eq!(detector.sleep_duration(t0 + Duration::from_millis(100)), Duration::from_millis(400));
    assert_eq!(detector.sleep_duration(t0 + WINDOW), Duration::from_millis(1));
}

#[test]
fn test_watch_dirs_dedup_parents() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("scene.json");
    let b = temp.path().join("gen.py");
    let dirs = watch_dirs([a.as_path(), b.as_path()]);
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0], crate::utils::path::normalize_path(temp.path()));
}

#[tokio::test]
async fn test_real_watcher_drives_single_reload() {
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::FsWatcher;
    use crate::actor::messages::SyncMsg;
    use crate::actor::{SyncCoordinator, sync_channel};
    use crate::config::RuntimeConfig;
    use crate::reload::message::ViewerMessage;

    let temp = TempDir::new().unwrap();
    let scene = temp.path().join("scene.json");
    let sphere = |radius: u32| format!(r#"[{{"type": "Sphere", "radius": {radius}}}]"#);
    write(&scene, &sphere(1));

    let settings = DetectorSettings {
        window: Duration::from_millis(200),
        ..DetectorSettings::default()
    };
    let (tx, rx) = sync_channel();
    let watcher = FsWatcher::new(&[(scene.clone(), PathRole::Scene)], settings, tx.clone()).unwrap();
    let watch_handle = watcher.spawn().unwrap();

    let mut coordinator = SyncCoordinator::new(Arc::new(RuntimeConfig::new(scene.clone())), rx);
    let snapshot = coordinator.snapshot();
    assert!(coordinator.initial_load().await);

    let (viewer_tx, mut viewer_rx) = mpsc::unbounded_channel();

    let driver = async {
        tx.send(SyncMsg::Connect(Box::new(viewer_tx))).await.unwrap();
        assert!(matches!(
            viewer_rx.recv().await,
            Some(ViewerMessage::Connected { .. })
        ));

        write(&scene, &sphere(2));
        tokio::time::sleep(Duration::from_millis(100)).await;
        write(&scene, &sphere(2));

        let update = tokio::time::timeout(Duration::from_secs(5), viewer_rx.recv())
            .await
            .unwrap();
        assert_eq!(update, Some(ViewerMessage::SceneUpdated));
        assert_eq!(snapshot.load()["objects"][0]["radius"].as_f64(), Some(2.0));

        // The second identical write must not produce another update
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(matches!(viewer_rx.try_recv(), Err(TryRecvError::Empty)));

        tx.send(SyncMsg::Shutdown).await.unwrap();
    };

    tokio::join!(coordinator.run(), driver);

    // The coordinator's inbox is gone, so the watcher thread stops on its own
    drop(tx);
    watch_handle.join().unwrap();
}
