use chrono::{DateTime, Local};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Session-scoped state shared by the refill and feedback loops.
///
/// The refill loop is the only writer; the feedback loop only looks ids up.
/// Entries are never removed, so a long session grows the map by one entry
/// per queued track.
pub struct SessionState {
    session_id: String,
    started_at: DateTime<Local>,
    /// local playback id → service track id
    tracks: RwLock<HashMap<String, String>>,
}

impl SessionState {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            started_at: Local::now(),
            tracks: RwLock::new(HashMap::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Must happen before the track is queued so feedback can resolve it.
    pub async fn remember(&self, local_id: &str, service_id: &str) {
        let mut tracks = self.tracks.write().await;
        tracks.insert(local_id.to_string(), service_id.to_string());
    }

    pub async fn service_id(&self, local_id: &str) -> Option<String> {
        self.tracks.read().await.get(local_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tracks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remember_and_resolve() {
        let state = SessionState::new("sess-1".into());
        assert_eq!(state.session_id(), "sess-1");
        assert!(state.is_empty().await);

        state.remember("spotify:track:a", "SOA").await;
        assert_eq!(state.service_id("spotify:track:a").await.as_deref(), Some("SOA"));
        assert!(state.service_id("spotify:track:b").await.is_none());
    }

    #[tokio::test]
    async fn test_requeued_track_overwrites() {
        let state = SessionState::new("sess-1".into());
        state.remember("spotify:track:a", "SOA").await;
        state.remember("spotify:track:a", "SOA2").await;
        assert_eq!(state.len().await, 1);
        assert_eq!(state.service_id("spotify:track:a").await.as_deref(), Some("SOA2"));
    }
}
