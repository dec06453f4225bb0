//! Overlay holder behaviour: show/update/hide contracts and the timer tasks.
//! Timer tests run on a paused clock so they are deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use loader_overlay::{Overlay, OverlayState, ShowOptions, UpdateOptions};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn counting_overlay() -> (Overlay, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = count.clone();
    let overlay = Overlay::with_on_complete(move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    });
    (overlay, count)
}

#[test]
fn show_uses_supplied_values_or_defaults() {
    let cases = [
        ShowOptions::default(),
        ShowOptions::default().with_title("Uploading"),
        ShowOptions {
            title: Some("T".into()),
            description: Some("D".into()),
            progress: Some(40),
            auto_advance: Some(false),
            indeterminate: Some(true),
            show_label: Some(false),
            completion_delay: Some(ms(0)),
        },
    ];

    for opts in cases {
        let overlay = Overlay::new();
        overlay.show(opts.clone());
        let s = overlay.state();
        assert!(s.visible, "opts={opts:?}");
        assert_eq!(s.title, opts.title.clone().unwrap_or_else(|| "Processing".into()));
        assert_eq!(
            s.description,
            opts.description
                .clone()
                .unwrap_or_else(|| "Please wait while we process your request.".into())
        );
        assert_eq!(s.progress, opts.progress.unwrap_or(0));
        assert_eq!(s.auto_advance, opts.auto_advance.unwrap_or(true));
        assert_eq!(s.indeterminate, opts.indeterminate.unwrap_or(false));
        assert_eq!(s.show_label, opts.show_label.unwrap_or(true));
        assert_eq!(s.completion_delay, opts.completion_delay.unwrap_or(ms(800)));
    }
}

#[test]
fn show_replaces_previous_state_wholesale() {
    let overlay = Overlay::new();
    overlay.show(
        ShowOptions::default()
            .with_title("First")
            .with_indeterminate(true)
            .with_show_label(false),
    );
    overlay.show(ShowOptions::default().with_indeterminate(true));
    let s = overlay.state();
    assert_eq!(s.title, "Processing");
    assert!(s.show_label);
}

#[test]
fn redundant_update_is_not_broadcast() {
    let overlay = Overlay::new();
    overlay.show(ShowOptions::default().with_indeterminate(true));
    let mut feed = overlay.subscribe();
    let before = overlay.state();

    assert!(!overlay.update(UpdateOptions::default()));
    assert!(!overlay.update(UpdateOptions {
        progress: Some(0),
        show_label: Some(true),
        ..Default::default()
    }));

    assert!(Arc::ptr_eq(&before, &overlay.state()));
    assert!(feed.try_recv().is_err());
}

#[test]
fn feed_sees_every_committed_change_in_order() {
    let overlay = Overlay::new();
    let mut feed = overlay.subscribe();
    overlay.show(ShowOptions::default().with_indeterminate(true));
    overlay.update(UpdateOptions::determinate());
    overlay.update(UpdateOptions::progress(42));
    overlay.hide();

    let states: Vec<Arc<OverlayState>> = std::iter::from_fn(|| feed.try_recv().ok()).collect();
    assert_eq!(states.len(), 4);
    assert!(states[0].indeterminate);
    assert!(!states[1].indeterminate && !states[1].auto_advance);
    assert_eq!(states[2].progress, 42);
    assert!(!states[3].visible);
}

#[tokio::test(start_paused = true)]
async fn auto_advance_fills_then_completes_once() {
    let (overlay, completions) = counting_overlay();
    overlay.show(ShowOptions::default());

    sleep(ms(2_600)).await;
    assert_eq!(overlay.state().progress, 25);

    sleep(ms(10_100 - 2_600)).await;
    let s = overlay.state();
    assert_eq!(s.progress, 100);
    assert!(s.visible, "completion delay has not elapsed yet");
    assert_eq!(completions.load(Ordering::SeqCst), 0);

    sleep(ms(800)).await;
    assert!(!overlay.state().visible);
    assert_eq!(overlay.state().progress, 100);
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    sleep(ms(5_000)).await;
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn hide_cancels_auto_advance() {
    let overlay = Overlay::new();
    overlay.show(ShowOptions::default());
    sleep(ms(1_100)).await;
    assert_eq!(overlay.state().progress, 10);

    overlay.hide();
    let mut feed = overlay.subscribe();
    sleep(ms(20_000)).await;

    assert_eq!(overlay.state().progress, 10);
    assert!(!overlay.state().visible);
    assert!(feed.try_recv().is_err(), "no mutation after hide");
}

#[tokio::test(start_paused = true)]
async fn indeterminate_and_manual_overlays_do_not_advance() {
    let overlay = Overlay::new();
    overlay.show(ShowOptions::default().with_indeterminate(true));
    sleep(ms(5_000)).await;
    assert_eq!(overlay.state().progress, 0);

    overlay.show(ShowOptions::default().with_auto_advance(false));
    sleep(ms(5_000)).await;
    assert_eq!(overlay.state().progress, 0);
    assert!(overlay.state().visible);
}

#[tokio::test(start_paused = true)]
async fn external_progress_overrides_simulation() {
    let overlay = Overlay::new();
    overlay.show(ShowOptions::default());
    sleep(ms(600)).await;
    assert_eq!(overlay.state().progress, 5);

    overlay.update(UpdateOptions::progress(70));
    sleep(ms(500)).await;
    assert_eq!(overlay.state().progress, 75);
}

#[tokio::test(start_paused = true)]
async fn external_progress_at_100_completes_after_delay() {
    let (overlay, completions) = counting_overlay();
    overlay.show(
        ShowOptions::default()
            .with_auto_advance(false)
            .with_completion_delay(ms(300)),
    );
    overlay.update(UpdateOptions::progress(100));
    overlay.update(UpdateOptions::progress(120));

    sleep(ms(250)).await;
    assert!(overlay.state().visible);

    sleep(ms(100)).await;
    assert!(!overlay.state().visible);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn new_show_discards_pending_completion() {
    let (overlay, completions) = counting_overlay();
    overlay.show(ShowOptions::default().with_auto_advance(false));
    overlay.update(UpdateOptions::progress(100));

    sleep(ms(400)).await;
    overlay.show(ShowOptions::default().with_indeterminate(true).with_title("Second"));
    sleep(ms(2_000)).await;

    let s = overlay.state();
    assert!(s.visible);
    assert_eq!(s.title, "Second");
    assert_eq!(completions.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn hide_cancels_pending_completion() {
    let (overlay, completions) = counting_overlay();
    overlay.show(ShowOptions::default().with_auto_advance(false));
    overlay.update(UpdateOptions::progress(100));

    overlay.hide();
    sleep(ms(2_000)).await;

    assert!(!overlay.state().visible);
    assert_eq!(completions.load(Ordering::SeqCst), 0);
    overlay.complete();
    assert_eq!(completions.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn complete_runs_hook_once_per_show() {
    let (overlay, completions) = counting_overlay();
    overlay.show(ShowOptions::default().with_auto_advance(false));
    overlay.update(UpdateOptions::progress(100));

    overlay.complete();
    assert!(!overlay.state().visible);
    sleep(ms(2_000)).await;
    overlay.complete();
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    overlay.show(ShowOptions {
        progress: Some(100),
        ..Default::default()
    });
    sleep(ms(2_000)).await;
    assert_eq!(completions.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_tears_down_timers() {
    let overlay = Overlay::new();
    let mut rx = overlay.watch();
    overlay.show(ShowOptions::default());
    sleep(ms(600)).await;
    rx.borrow_and_update();

    drop(overlay);
    assert!(rx.changed().await.is_err(), "holder must be gone");
    assert_eq!(rx.borrow().progress, 5);
}
