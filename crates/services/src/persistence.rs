use std::sync::{Arc, Mutex, PoisonError};

use storage::repository::DurabilityProbe;

type DeniedCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct PersistenceState {
    has_persisted: bool,
    has_requested: bool,
}

/// Asks the storage backend for durability at most once per process.
///
/// Failures never propagate: a probe error counts as "not durable", and a
/// refused or failed request fires the `on_denied` callback once.
#[derive(Clone)]
pub struct PersistenceManager {
    probe: Arc<dyn DurabilityProbe>,
    on_denied: Option<DeniedCallback>,
    state: Arc<Mutex<PersistenceState>>,
}

impl PersistenceManager {
    #[must_use]
    pub fn new(probe: Arc<dyn DurabilityProbe>) -> Self {
        Self {
            probe,
            on_denied: None,
            state: Arc::new(Mutex::new(PersistenceState::default())),
        }
    }

    /// Register the callback fired when durable storage is refused.
    #[must_use]
    pub fn with_on_denied(mut self, on_denied: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_denied = Some(Arc::new(on_denied));
        self
    }

    /// Query the backend and remember whether storage is already durable.
    pub async fn check_persisted(&self) -> bool {
        let persisted = match self.probe.persisted().await {
            Ok(persisted) => persisted,
            Err(err) => {
                tracing::warn!(error = %err, "could not query storage durability");
                false
            }
        };
        self.with_state(|state| state.has_persisted = persisted);
        persisted
    }

    /// Request durable storage unless it is already granted or was asked for before.
    ///
    /// Returns whether storage is durable afterwards.
    pub async fn request_persistence_once(&self) -> bool {
        let (has_persisted, has_requested) =
            self.with_state(|state| (state.has_persisted, state.has_requested));
        if has_persisted || has_requested {
            return has_persisted;
        }
        if !self.probe.supports_persist() {
            return false;
        }

        self.with_state(|state| state.has_requested = true);
        match self.probe.persist().await {
            Ok(true) => {
                self.with_state(|state| state.has_persisted = true);
                tracing::debug!("durable storage granted");
                true
            }
            Ok(false) => {
                tracing::warn!("durable storage was refused");
                self.notify_denied();
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "durable storage request failed");
                self.notify_denied();
                false
            }
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut PersistenceState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn notify_denied(&self) {
        if let Some(on_denied) = &self.on_denied {
            on_denied();
        }
    }
}
