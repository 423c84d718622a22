use dashmap::DashMap;
use facetry::{FacetryError, QueryEngine};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub type SessionHandle = Arc<Mutex<QueryEngine>>;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    engine: SessionHandle,
    last_access: Instant,
}

/// Per-client engine state over one shared catalog.
///
/// Every session starts as a clone of `template`: same schema, facets, store
/// and default sort, no selections. The store is reference-counted, so a new
/// session costs a facet map and an empty filter set.
///
/// A session idle for longer than `idle_ttl` is evicted the next time a
/// session is created, or when it is looked up.
pub struct SessionRegistry {
    template: QueryEngine,
    sessions: DashMap<String, SessionEntry>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(template: QueryEngine, max_sessions: usize) -> Self {
        SessionRegistry {
            template,
            sessions: DashMap::new(),
            max_sessions,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn create(&self) -> Result<String, FacetryError> {
        self.evict_idle();
        let current = self.sessions.len();
        if current >= self.max_sessions {
            tracing::warn!(current, max = self.max_sessions, "[SESSION] limit reached");
            return Err(FacetryError::TooManySessions {
                current,
                max: self.max_sessions,
            });
        }
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                engine: Arc::new(Mutex::new(self.template.clone())),
                last_access: Instant::now(),
            },
        );
        tracing::debug!(session = %id, "[SESSION] created");
        Ok(id)
    }

    /// Look up a session and mark it as used.
    pub fn get(&self, id: &str) -> Result<SessionHandle, FacetryError> {
        let expired = match self.sessions.get_mut(id) {
            Some(mut entry) if entry.last_access.elapsed() < self.idle_ttl => {
                entry.last_access = Instant::now();
                return Ok(Arc::clone(&entry.engine));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(id);
            tracing::debug!(session = %id, "[SESSION] expired on lookup");
        }
        Err(FacetryError::SessionNotFound(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Result<(), FacetryError> {
        match self.sessions.remove(id) {
            Some(_) => {
                tracing::debug!(session = %id, "[SESSION] removed");
                Ok(())
            }
            None => Err(FacetryError::SessionNotFound(id.to_string())),
        }
    }

    /// Drop every session idle for at least `idle_ttl`. Returns how many went.
    pub fn evict_idle(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.idle_ttl;
        self.sessions
            .retain(|_, entry| entry.last_access.elapsed() < ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "[SESSION] evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// The engine new sessions are cloned from.
    pub fn template(&self) -> &QueryEngine {
        &self.template
    }
}
