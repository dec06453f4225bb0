//! Overlay state holder: show / update / hide plus the cosmetic auto-advance.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::types::{AUTO_ADVANCE_INTERVAL, AUTO_ADVANCE_STEP, OverlayState, ShowOptions, UpdateOptions};

/// Capacity of the change feed handed out by [`Overlay::subscribe`].
const CHANGE_FEED_CAPACITY: usize = 256;

type CompletionHook = Box<dyn Fn() + Send + Sync>;

/// Owned, clonable handle to one overlay's state.
///
/// Displays either poll the latest snapshot through [`Overlay::watch`] or
/// consume every committed change through [`Overlay::subscribe`]. Timer tasks
/// only hold a weak reference, so dropping the last handle tears them down.
#[derive(Clone)]
pub struct Overlay {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Arc<OverlayState>>,
    changes: broadcast::Sender<Arc<OverlayState>>,
    tasks: Mutex<Tasks>,
    on_complete: Option<CompletionHook>,
}

#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    /// Scheduled at most once per show.
    completion: Option<JoinHandle<()>>,
    /// Hook already fired for the current show.
    completed: bool,
}

impl Tasks {
    fn cancel_all(&mut self) {
        if let Some(t) = self.ticker.take() {
            t.abort();
        }
        if let Some(t) = self.completion.take() {
            t.abort();
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    /// A hidden overlay with default state.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Like [`Overlay::new`], but `hook` runs each time the overlay completes
    /// (bar at 100% and the completion delay elapsed), right before it hides.
    pub fn with_on_complete(hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self::build(Some(Box::new(hook)))
    }

    fn build(on_complete: Option<CompletionHook>) -> Self {
        let (state, _) = watch::channel(Arc::new(OverlayState::default()));
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state,
                changes,
                tasks: Mutex::new(Tasks::default()),
                on_complete,
            }),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<OverlayState> {
        self.inner.state.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<OverlayState>> {
        self.inner.state.subscribe()
    }

    /// Feed of every committed change, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<OverlayState>> {
        self.inner.changes.subscribe()
    }

    /// Replace the whole state with `options` over the show defaults.
    pub fn show(&self, options: ShowOptions) {
        let next = Arc::new(options.into_state());
        debug!("overlay show: {:?}", next.title);
        {
            let mut tasks = self.inner.lock_tasks();
            tasks.cancel_all();
            tasks.completed = false;
        }
        self.inner.state.send_modify(|cur| *cur = next.clone());
        let _ = self.inner.changes.send(next);
        Inner::reconcile(&self.inner);
    }

    /// Merge the `Some` fields of `options`. Returns false, keeping the prior
    /// snapshot untouched, if nothing would change.
    pub fn update(&self, options: UpdateOptions) -> bool {
        Inner::update(&self.inner, options)
    }

    /// Hide the overlay and cancel its timers. No-op if already hidden.
    ///
    /// A completion still waiting on its delay is dropped without running
    /// the hook.
    pub fn hide(&self) {
        self.inner.hide();
    }

    /// Complete now: run the completion hook and hide.
    ///
    /// No-op if the overlay is hidden or has already completed since the
    /// last [`Overlay::show`], so the hook runs at most once per show even
    /// when this races the scheduled completion.
    pub fn complete(&self) {
        self.inner.complete();
    }
}

impl Inner {
    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(this: &Arc<Self>, options: UpdateOptions) -> bool {
        let mut committed = None;
        this.state.send_if_modified(|cur| {
            if options.is_noop_for(cur) {
                return false;
            }
            let mut next = OverlayState::clone(cur);
            options.apply_to(&mut next);
            *cur = Arc::new(next);
            committed = Some(cur.clone());
            true
        });
        match committed {
            Some(next) => {
                let _ = this.changes.send(next);
                Self::reconcile(this);
                true
            }
            None => false,
        }
    }

    fn hide(&self) {
        self.lock_tasks().cancel_all();
        let mut committed = None;
        self.state.send_if_modified(|cur| {
            if !cur.visible {
                return false;
            }
            let mut next = OverlayState::clone(cur);
            next.visible = false;
            *cur = Arc::new(next);
            committed = Some(cur.clone());
            true
        });
        if let Some(next) = committed {
            debug!("overlay hidden");
            let _ = self.changes.send(next);
        }
    }

    /// Start or stop timer tasks so they match the current state.
    fn reconcile(this: &Arc<Self>) {
        let state = this.state.borrow().clone();
        let mut tasks = this.lock_tasks();

        let should_tick =
            state.visible && state.auto_advance && !state.indeterminate && state.progress < 100;
        let ticking = tasks.ticker.as_ref().is_some_and(|t| !t.is_finished());
        if !should_tick {
            if let Some(t) = tasks.ticker.take() {
                t.abort();
            }
        } else if !ticking {
            tasks.ticker = spawn(Self::auto_advance(Arc::downgrade(this)));
        }

        let finished = state.visible && !state.indeterminate && state.progress >= 100;
        if finished && tasks.completion.is_none() {
            debug!("overlay reached 100%, completing in {:?}", state.completion_delay);
            tasks.completion = spawn(Self::complete_after(
                Arc::downgrade(this),
                state.completion_delay,
            ));
        }
    }

    async fn auto_advance(weak: Weak<Self>) {
        loop {
            tokio::time::sleep(AUTO_ADVANCE_INTERVAL).await;
            let Some(this) = weak.upgrade() else { return };
            let cur = this.state.borrow().progress;
            let next = (cur + AUTO_ADVANCE_STEP).min(100);
            Self::update(&this, UpdateOptions::progress(next));
            if next >= 100 {
                return;
            }
        }
    }

    async fn complete_after(weak: Weak<Self>, delay: std::time::Duration) {
        tokio::time::sleep(delay).await;
        let Some(this) = weak.upgrade() else { return };
        this.complete();
    }

    fn complete(&self) {
        {
            let mut tasks = self.lock_tasks();
            if tasks.completed || !self.state.borrow().visible {
                return;
            }
            tasks.completed = true;
        }
        debug!("overlay complete");
        if let Some(hook) = &self.on_complete {
            hook();
        }
        self.hide();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.lock_tasks().cancel_all();
    }
}

fn spawn<F>(fut: F) -> Option<JoinHandle<()>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(fut)),
        Err(_) => {
            warn!("no tokio runtime; overlay timers are disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_hidden_with_defaults() {
        let overlay = Overlay::new();
        assert_eq!(*overlay.state(), OverlayState::default());
        assert!(!overlay.state().visible);
    }

    #[test]
    fn show_fills_defaults() {
        let overlay = Overlay::new();
        overlay.show(ShowOptions::default().with_indeterminate(true));
        let s = overlay.state();
        assert!(s.visible);
        assert_eq!(s.title, "Processing");
        assert_eq!(s.description, "Please wait while we process your request.");
        assert_eq!(s.progress, 0);
        assert!(s.auto_advance);
        assert!(s.indeterminate);
        assert!(s.show_label);
        assert_eq!(s.completion_delay, Duration::from_millis(800));
    }

    #[test]
    fn noop_update_keeps_snapshot_identity() {
        let overlay = Overlay::new();
        overlay.show(ShowOptions::default().with_indeterminate(true));
        let before = overlay.state();
        let changed = overlay.update(UpdateOptions {
            title: Some("Processing".into()),
            indeterminate: Some(true),
            ..Default::default()
        });
        assert!(!changed);
        assert!(Arc::ptr_eq(&before, &overlay.state()));
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let overlay = Overlay::new();
        overlay.show(ShowOptions::default().with_indeterminate(true).with_title("A"));
        assert!(overlay.update(UpdateOptions {
            description: Some("new".into()),
            ..Default::default()
        }));
        let s = overlay.state();
        assert_eq!(s.title, "A");
        assert_eq!(s.description, "new");
        assert!(s.indeterminate);
    }

    #[test]
    fn hide_twice_is_idempotent() {
        let overlay = Overlay::new();
        let mut feed = overlay.subscribe();
        overlay.hide();
        assert!(feed.try_recv().is_err());

        overlay.show(ShowOptions::default().with_indeterminate(true));
        overlay.hide();
        let hidden = overlay.state();
        overlay.hide();
        assert!(Arc::ptr_eq(&hidden, &overlay.state()));
        assert!(!hidden.visible);
    }
}
