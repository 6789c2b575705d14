//! Server state and configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::SignetError;
use crate::export::{HttpImageSource, ImageSource};
use crate::form::FormController;

/// Idle time after which a session or cached image is dropped.
pub const SESSION_EXPIRATION_SECS: u64 = 30 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    pub listen_addr: String,
    /// Idle time before a session expires
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            session_ttl: Duration::from_secs(SESSION_EXPIRATION_SECS),
        }
    }
}

/// One browser's form.
#[derive(Debug)]
pub struct Session {
    pub controller: FormController,
    pub last_accessed: Instant,
}

impl Session {
    pub fn new() -> Self {
        Self {
            controller: FormController::new(),
            last_accessed: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
    pub sessions: RwLock<HashMap<Uuid, Session>>,
    pub images: Arc<dyn ImageSource>,
}

impl AppState {
    /// State backed by an HTTP image source.
    pub fn new(config: ServerConfig) -> Result<Self, SignetError> {
        Ok(Self::with_image_source(
            config,
            Arc::new(HttpImageSource::new()?),
        ))
    }

    pub fn with_image_source(config: ServerConfig, images: Arc<dyn ImageSource>) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            config,
            boot_time,
            sessions: RwLock::new(HashMap::new()),
            images,
        }
    }

    /// Remove sessions idle for longer than the configured TTL. Returns how
    /// many were removed.
    pub async fn expire_sessions(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.session_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_accessed) < ttl);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::StaticImageSource;

    #[tokio::test]
    async fn test_expire_sessions() {
        let config = ServerConfig {
            session_ttl: Duration::ZERO,
            ..Default::default()
        };
        let state = AppState::with_image_source(config, Arc::new(StaticImageSource::new()));
        state.sessions.write().await.insert(Uuid::new_v4(), Session::new());

        assert_eq!(state.expire_sessions().await, 1);
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_sessions_survive() {
        let state = AppState::with_image_source(
            ServerConfig::default(),
            Arc::new(StaticImageSource::new()),
        );
        state.sessions.write().await.insert(Uuid::new_v4(), Session::new());
        assert_eq!(state.expire_sessions().await, 0);
    }
}
