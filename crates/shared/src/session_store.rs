use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::dialogue::DialogueSession;
use crate::service::AssistantService;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 1_800;
pub const DEFAULT_SESSION_PRUNE_INTERVAL_SECONDS: u64 = 60;

pub type SharedSession = Arc<tokio::sync::Mutex<DialogueSession>>;

struct SessionEntry {
    session: SharedSession,
    last_active_at: DateTime<Utc>,
}

/// Process-wide map of live dialogue sessions with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    service: Arc<AssistantService>,
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(service: Arc<AssistantService>, ttl: Duration) -> Self {
        Self {
            service,
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn service(&self) -> &Arc<AssistantService> {
        &self.service
    }

    /// Existing session for `session_id`, or a fresh one inserted on first use.
    pub fn get_or_create(&self, session_id: &str, now: DateTime<Utc>) -> SharedSession {
        let mut entries = self
            .entries
            .lock()
            .expect("session store mutex should not be poisoned");

        let entry = entries.entry(session_id.to_string()).or_insert_with(|| SessionEntry {
            session: Arc::new(tokio::sync::Mutex::new(DialogueSession::new(
                session_id,
                Arc::clone(&self.service),
            ))),
            last_active_at: now,
        });
        entry.last_active_at = now;

        Arc::clone(&entry.session)
    }

    /// Runs one turn; turns for the same session are serialized.
    pub async fn handle_turn(&self, session_id: &str, message: &str) -> String {
        let session = self.get_or_create(session_id, Utc::now());
        let mut session = session.lock().await;
        session.process_message(message).await
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("session store mutex should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions idle longer than the TTL. Sessions with a turn in
    /// flight are kept.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let cutoff = now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut entries = self
            .entries
            .lock()
            .expect("session store prune mutex should not be poisoned");
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.last_active_at > cutoff || entry.session.try_lock().is_err()
        });

        before - entries.len()
    }

    pub fn spawn_pruner(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.prune_expired(Utc::now());
                if removed > 0 {
                    info!(removed, remaining = store.len(), "pruned idle dialogue sessions");
                }
            }
        })
    }
}
