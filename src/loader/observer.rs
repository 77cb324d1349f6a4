use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::LoadStats;

/// Events emitted by the [`super::Loader`] while a load runs.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    LoadStarted,
    /// A destination table was created (or found) on first sight.
    TableCreated { table: String, columns: Vec<String> },
    /// Columns were appended because rows grew wider.
    TableWidened { table: String, added: Vec<String> },
    /// A batch transaction was committed; `rows` is the running total.
    BatchCommitted { rows: u64 },
    LoadFinished { elapsed: Duration, stats: LoadStats },
    /// The load aborted; rows since the last commit were rolled back.
    LoadFailed { elapsed: Duration, message: String },
}

/// Observer hook for load events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    fn on_event(&self, event: &LoadEvent);
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }

    pub fn push(&mut self, observer: Arc<dyn LoadObserver>) {
        self.observers.push(observer);
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_event(&self, event: &LoadEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}
