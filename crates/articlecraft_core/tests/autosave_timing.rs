mod support;

use articlecraft_core::{
    AutoSaveConfig, AutoSaveCoordinator, AutoSavePhase, DraftStore, ManualClock, TransportError,
};
use std::sync::Arc;
use std::time::Duration;
use support::{advance, settle, Outcome, RecordingPersistence, INTERVAL};
use tokio::time::Instant;

fn coordinator(
    store: &DraftStore,
    persistence: &Arc<RecordingPersistence>,
    clock: &Arc<ManualClock>,
) -> AutoSaveCoordinator {
    AutoSaveCoordinator::spawn(
        store.clone(),
        persistence.clone(),
        clock.clone(),
        AutoSaveConfig { interval: INTERVAL },
    )
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn single_change_saves_once_after_interval() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let autosave = coordinator(&store, &persistence, &clock);

    let changed_at = Instant::now();
    store.set_content("<p>ilk paragraf</p>");
    settle().await;
    assert_eq!(autosave.status().phase(), AutoSavePhase::Dirty);
    assert!(autosave.status().has_pending_timer);

    advance(INTERVAL - Duration::from_millis(1)).await;
    assert_eq!(persistence.call_count(), 0);

    advance(Duration::from_millis(1)).await;
    let calls = persistence.calls();
    assert_eq!(calls.len(), 1);
    let elapsed = calls[0].at - changed_at;
    assert!(elapsed >= INTERVAL);
    assert!(elapsed <= INTERVAL + Duration::from_millis(5));
    assert_eq!(calls[0].draft.content, "<p>ilk paragraf</p>");

    let status = autosave.status();
    assert_eq!(status.phase(), AutoSavePhase::Idle);
    assert_eq!(status.last_saved, Some(1_700_000_000_000));
    assert!(!status.has_pending_timer);

    advance(INTERVAL * 3).await;
    assert_eq!(persistence.call_count(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn burst_of_changes_is_timed_from_last_change() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let _autosave = coordinator(&store, &persistence, &clock);

    store.set_title("Miras");
    settle().await;
    advance(Duration::from_millis(100)).await;
    let second_change_at = Instant::now();
    store.set_title("Miras Hukuku");
    settle().await;

    advance(INTERVAL - Duration::from_millis(100)).await;
    assert_eq!(persistence.call_count(), 0);

    advance(Duration::from_millis(100)).await;
    let calls = persistence.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].at - second_change_at, INTERVAL);
    assert_eq!(calls[0].draft.title, "Miras Hukuku");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn timer_during_in_flight_save_is_skipped() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::gated());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("v1");
    settle().await;
    advance(INTERVAL).await;
    assert_eq!(persistence.call_count(), 1);
    assert!(autosave.status().is_saving);

    store.set_content("v2");
    settle().await;
    advance(INTERVAL).await;
    assert_eq!(persistence.call_count(), 1);
    assert!(!autosave.status().has_pending_timer);

    persistence.release();
    settle().await;
    let status = autosave.status();
    assert!(!status.is_saving);
    // v2 was never persisted.
    assert!(status.has_changes);

    store.set_content("v3");
    settle().await;
    advance(INTERVAL).await;
    persistence.release();
    settle().await;

    let calls = persistence.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].draft.content, "v1");
    assert_eq!(calls[1].draft.content, "v3");
    assert_eq!(autosave.status().phase(), AutoSavePhase::Idle);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn edits_after_dispatch_keep_draft_dirty() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::gated());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("sent");
    settle().await;
    advance(INTERVAL).await;
    store.set_content("typed while saving");
    settle().await;

    persistence.release();
    settle().await;
    assert_eq!(persistence.calls()[0].draft.content, "sent");
    assert!(autosave.status().has_changes);
    assert_eq!(autosave.status().last_saved, Some(0));

    // The edit made during the save still has its own timer.
    advance(INTERVAL).await;
    persistence.release();
    settle().await;
    assert_eq!(persistence.call_count(), 2);
    assert_eq!(persistence.calls()[1].draft.content, "typed while saving");
    assert!(!autosave.status().has_changes);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dispose_cancels_pending_timer() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("unsaved");
    settle().await;
    autosave.dispose();

    let status = autosave.status();
    assert!(status.disposed);
    assert!(!status.has_pending_timer);

    store.set_content("after dispose");
    settle().await;
    advance(INTERVAL * 2).await;
    assert_eq!(persistence.call_count(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dropping_coordinator_stops_autosave() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("unsaved");
    settle().await;
    drop(autosave);

    advance(INTERVAL * 2).await;
    assert_eq!(persistence.call_count(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn failures_keep_changes_without_retry() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    persistence.script(Outcome::Failed(TransportError::Timeout));
    persistence.script(Outcome::Rejected("slug already in use".to_string()));
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("first");
    settle().await;
    advance(INTERVAL).await;
    let status = autosave.status();
    assert_eq!(persistence.call_count(), 1);
    assert!(status.has_changes);
    assert!(!status.is_saving);
    assert_eq!(status.last_saved, None);

    // No backoff retry without a new change.
    advance(INTERVAL * 2).await;
    assert_eq!(persistence.call_count(), 1);

    store.set_content("second");
    settle().await;
    advance(INTERVAL).await;
    assert_eq!(persistence.call_count(), 2);
    assert!(autosave.status().has_changes);
    assert_eq!(store.snapshot().content, "second");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn identical_value_does_not_schedule() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("");
    settle().await;
    assert_eq!(autosave.status().phase(), AutoSavePhase::Idle);
    assert!(!autosave.status().has_pending_timer);

    advance(INTERVAL * 2).await;
    assert_eq!(persistence.call_count(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn server_echo_becomes_the_clean_baseline() {
    let store = DraftStore::empty();
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let autosave = coordinator(&store, &persistence, &clock);

    store.set_content("<p>gövde</p>");
    let mut echo = store.snapshot();
    echo.excerpt = "sunucu özeti".to_string();
    persistence.script(Outcome::Saved(Some(echo)));
    settle().await;

    advance(INTERVAL).await;
    assert_eq!(store.snapshot().excerpt, "sunucu özeti");
    assert_eq!(autosave.status().phase(), AutoSavePhase::Idle);

    advance(INTERVAL * 2).await;
    assert_eq!(persistence.call_count(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn autosave_keeps_the_draft_status() {
    let store = DraftStore::empty();
    store.set_status(articlecraft_core::ArticleStatus::Published);
    let persistence = Arc::new(RecordingPersistence::new());
    let clock = Arc::new(ManualClock::new(0));
    let _autosave = coordinator(&store, &persistence, &clock);

    store.set_content("<p>yayındaki yazı</p>");
    settle().await;
    advance(INTERVAL).await;

    let calls = persistence.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].status, articlecraft_core::ArticleStatus::Published);
}
