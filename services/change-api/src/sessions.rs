//! Per-session cancellation of in-flight requests.
//!
//! A client that fires a new heatmap request for the same session (for
//! example after panning the map) no longer cares about the previous one.
//! Registering the new request cancels the old token, so its provider
//! fetches stop and no result is produced for it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Request header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

struct Entry {
    generation: u64,
    token: CancellationToken,
}

/// Tracks the one in-flight request per session.
#[derive(Default)]
pub struct SessionRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    next_generation: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking a request.
    ///
    /// With a session id, any earlier request of that session is cancelled
    /// and replaced. Without one, the request gets an untracked token.
    pub fn register(self: &Arc<Self>, session_id: Option<&str>) -> SessionGuard {
        let token = CancellationToken::new();
        let Some(id) = session_id.filter(|s| !s.is_empty()) else {
            return SessionGuard {
                registry: None,
                session_id: None,
                generation: 0,
                token,
            };
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let previous = self.lock().insert(
            id.to_string(),
            Entry {
                generation,
                token: token.clone(),
            },
        );
        if let Some(prev) = previous {
            debug!(session_id = id, "Superseding in-flight request");
            prev.token.cancel();
        }

        SessionGuard {
            registry: Some(Arc::clone(self)),
            session_id: Some(id.to_string()),
            generation,
            token,
        }
    }

    /// Cancel the in-flight request of `session_id`. Returns whether one existed.
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.lock().remove(session_id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of sessions with a request in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, session_id: &str, generation: u64) {
        let mut entries = self.lock();
        if entries
            .get(session_id)
            .is_some_and(|e| e.generation == generation)
        {
            entries.remove(session_id);
        }
    }
}

/// Registration of one request. Dropping it unregisters the request,
/// unless a newer request of the same session has taken its place.
pub struct SessionGuard {
    registry: Option<Arc<SessionRegistry>>,
    session_id: Option<String>,
    generation: u64,
    token: CancellationToken,
}

impl SessionGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let (Some(registry), Some(id)) = (&self.registry, &self.session_id) {
            registry.release(id, self.generation);
        }
    }
}
