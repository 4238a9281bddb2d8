//! Debounced draft persistence.
//!
//! The controller moves through idle -> pending -> committing -> idle. Every
//! graph mutation schedules a snapshot; a schedule before the delay expires
//! cancels the pending timer and arms a new one. When the timer fires the
//! snapshot is upserted as a draft. An upsert in flight is never cancelled;
//! a timer expiring meanwhile parks its snapshot, which re-arms once the
//! upsert completes. Failures are logged and never surfaced; the next
//! debounce cycle is the retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::storage::{DiagramStorage, SavedDiagram};

pub const AUTOSAVE_TITLE: &str = "Autosave";
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(3);

pub struct AutosaveService {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn DiagramStorage>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    committing: AtomicBool,
    // Snapshot parked while a commit is in flight, re-armed afterwards.
    parked: Mutex<Option<SavedDiagram>>,
}

impl AutosaveService {
    pub fn new(storage: Arc<dyn DiagramStorage>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                delay,
                pending: Mutex::new(None),
                committing: AtomicBool::new(false),
                parked: Mutex::new(None),
            }),
        }
    }

    /// (Re)arms the debounce timer with a fresh snapshot of the graph. Empty
    /// graphs are never autosaved. Must be called from within a tokio
    /// runtime.
    pub fn schedule(&self, snapshot: SavedDiagram) {
        if snapshot.nodes.is_empty() && snapshot.edges.is_empty() {
            return;
        }

        let record = SavedDiagram {
            title: AUTOSAVE_TITLE.to_string(),
            description: format!(
                "Draft with {} nodes and {} edges",
                snapshot.nodes.len(),
                snapshot.edges.len()
            ),
            is_draft: true,
            created_at: None,
            updated_at: None,
            ..snapshot
        };

        Inner::arm(&self.inner, record);
    }

    /// Drops any pending cycle, e.g. after the diagram is cleared or a
    /// different diagram is loaded. An upsert already in flight runs to
    /// completion.
    pub fn cancel(&self) {
        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        drop(pending);
        self.inner
            .parked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}

impl Inner {
    /// Starts a fresh debounce timer, cancelling the previous one. Only the
    /// timer itself is abortable; commits run in detached tasks.
    fn arm(inner: &Arc<Inner>, record: SavedDiagram) {
        let delay = inner.delay;
        let task = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // No await past the sleep, so an abort can no longer land here.
            task.fire(record);
        });

        let mut pending = inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Runs when the debounce timer expires. If a commit is already in
    /// flight the snapshot is parked and re-armed once it completes.
    fn fire(self: Arc<Self>, record: SavedDiagram) {
        if self.committing.swap(true, Ordering::SeqCst) {
            let mut parked = self.parked.lock().unwrap_or_else(|e| e.into_inner());
            *parked = Some(record);
            return;
        }

        tokio::spawn(async move {
            debug!("Autosaving draft {}", record.id);
            if let Err(err) = self.storage.upsert(record).await {
                warn!("Autosave failed: {}", err);
            }
            self.committing.store(false, Ordering::SeqCst);

            let next = self
                .parked
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            if let Some(record) = next {
                Inner::arm(&self, record);
            }
        });
    }
}
