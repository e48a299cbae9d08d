//! WhatsApp session manager
//!
//! One session per user id. The browser-automation side lives in an
//! external bridge process behind `WhatsAppTransport`; this module owns the
//! session map and folds transport events (`qr`, `authenticated`, `ready`,
//! `disconnected`) into the per-user state the API reports.

use async_trait::async_trait;
use dashmap::DashMap;
use pulse_core::traits::Id;
use pulse_core::config::WhatsAppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("No session for user {0}")]
    NoSession(Id),
    #[error("Session is not ready: {0}")]
    NotReady(String),
    #[error("Bridge request failed: {0}")]
    Bridge(String),
    #[error("Bridge returned status {0}")]
    BridgeStatus(u16),
}

/// Events emitted by the transport for one session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WaEvent {
    Qr(String),
    Authenticated,
    Ready,
    Disconnected(String),
}

/// Per-user session state, reported to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Initializing,
    QrPending { qr: String },
    Authenticated,
    Ready,
    Disconnected { reason: String },
}

impl SessionState {
    /// Fold one transport event into the state. Disconnects win from any
    /// state; the rest follow the login handshake order.
    pub fn apply(self, event: WaEvent) -> SessionState {
        match event {
            WaEvent::Qr(qr) => SessionState::QrPending { qr },
            WaEvent::Authenticated => SessionState::Authenticated,
            WaEvent::Ready => SessionState::Ready,
            WaEvent::Disconnected(reason) => SessionState::Disconnected { reason },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Disconnected { .. })
    }
}

/// Transport seam to the WhatsApp Web bridge
#[async_trait]
pub trait WhatsAppTransport: Send + Sync {
    /// Start (or restart) a session and stream its events
    async fn start(&self, user_id: Id) -> Result<mpsc::Receiver<WaEvent>, WhatsAppError>;

    /// Send a text message from the user's session
    async fn send_text(&self, user_id: Id, to: &str, body: &str) -> Result<(), WhatsAppError>;

    /// Tear the session down on the bridge
    async fn stop(&self, user_id: Id) -> Result<(), WhatsAppError>;
}

/// Session map, one entry per user
pub struct SessionManager {
    sessions: Arc<DashMap<Id, SessionState>>,
    transport: Arc<dyn WhatsAppTransport>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn WhatsAppTransport>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            transport,
        }
    }

    /// Start a session for the user. Idempotent: an active session is left
    /// alone and its current state returned.
    pub async fn start_session(&self, user_id: Id) -> Result<SessionState, WhatsAppError> {
        if let Some(existing) = self.sessions.get(&user_id) {
            if existing.is_active() {
                return Ok(existing.clone());
            }
        }

        self.sessions.insert(user_id, SessionState::Initializing);
        let mut events = self.transport.start(user_id).await?;

        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                debug!(user_id, ?event, "WhatsApp event");
                let next = sessions
                    .get(&user_id)
                    .map(|s| s.clone())
                    .unwrap_or(SessionState::Initializing)
                    .apply(event);
                sessions.insert(user_id, next);
            }
            // channel closed without an explicit disconnect
            sessions.entry(user_id).and_modify(|state| {
                if state.is_active() {
                    *state = SessionState::Disconnected {
                        reason: "transport closed".into(),
                    };
                }
            });
            info!(user_id, "WhatsApp event stream ended");
        });

        Ok(SessionState::Initializing)
    }

    /// Current state, if a session was ever started
    pub fn state(&self, user_id: Id) -> Option<SessionState> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    /// Send a text message; the session must be `Ready`.
    pub async fn send_text(
        &self,
        user_id: Id,
        to: &str,
        body: &str,
    ) -> Result<(), WhatsAppError> {
        let state = self
            .state(user_id)
            .ok_or(WhatsAppError::NoSession(user_id))?;

        if !state.is_ready() {
            return Err(WhatsAppError::NotReady(format!("{:?}", state)));
        }

        self.transport.send_text(user_id, to, body).await
    }

    /// Stop and forget the user's session
    pub async fn end_session(&self, user_id: Id) -> Result<(), WhatsAppError> {
        if self.sessions.remove(&user_id).is_none() {
            return Err(WhatsAppError::NoSession(user_id));
        }
        self.transport.stop(user_id).await
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// HTTP client for the external bridge process
pub struct BridgeTransport {
    base_url: String,
    client: Client,
}

impl BridgeTransport {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, WhatsAppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| WhatsAppError::Bridge(e.to_string()))?;

        Ok(Self {
            base_url: config.bridge_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn poll_events(
        client: Client,
        url: String,
        tx: mpsc::Sender<WaEvent>,
    ) {
        let mut cursor = 0u64;
        loop {
            let response = client
                .get(&url)
                .query(&[("cursor", cursor.to_string())])
                .send()
                .await;

            let events: Vec<WaEvent> = match response {
                Ok(r) if r.status().is_success() => match r.json().await {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(error = %e, "Bridge sent unparseable events");
                        break;
                    }
                },
                Ok(r) => {
                    warn!(status = %r.status(), "Bridge poll rejected");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Bridge poll failed");
                    break;
                }
            };

            for event in events {
                cursor += 1;
                let disconnect = matches!(event, WaEvent::Disconnected(_));
                if tx.send(event).await.is_err() || disconnect {
                    return;
                }
            }

            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }
}

#[async_trait]
impl WhatsAppTransport for BridgeTransport {
    async fn start(&self, user_id: Id) -> Result<mpsc::Receiver<WaEvent>, WhatsAppError> {
        let response = self
            .client
            .post(format!("{}/sessions/{}", self.base_url, user_id))
            .send()
            .await
            .map_err(|e| WhatsAppError::Bridge(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WhatsAppError::BridgeStatus(response.status().as_u16()));
        }

        let (tx, rx) = mpsc::channel(32);
        let url = format!("{}/sessions/{}/events", self.base_url, user_id);
        tokio::spawn(Self::poll_events(self.client.clone(), url, tx));

        Ok(rx)
    }

    async fn send_text(&self, user_id: Id, to: &str, body: &str) -> Result<(), WhatsAppError> {
        let response = self
            .client
            .post(format!("{}/sessions/{}/messages", self.base_url, user_id))
            .json(&serde_json::json!({ "to": to, "body": body }))
            .send()
            .await
            .map_err(|e| WhatsAppError::Bridge(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WhatsAppError::BridgeStatus(response.status().as_u16()));
        }

        Ok(())
    }

    async fn stop(&self, user_id: Id) -> Result<(), WhatsAppError> {
        let response = self
            .client
            .delete(format!("{}/sessions/{}", self.base_url, user_id))
            .send()
            .await
            .map_err(|e| WhatsAppError::Bridge(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WhatsAppError::BridgeStatus(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Transport that replays a scripted event sequence; for tests
pub struct ScriptedTransport {
    script: Vec<WaEvent>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<WaEvent>) -> Self {
        Self { script }
    }
}

#[async_trait]
impl WhatsAppTransport for ScriptedTransport {
    async fn start(&self, _user_id: Id) -> Result<mpsc::Receiver<WaEvent>, WhatsAppError> {
        let (tx, rx) = mpsc::channel(32);
        let script = self.script.clone();
        tokio::spawn(async move {
            for event in script {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn send_text(&self, _user_id: Id, _to: &str, _body: &str) -> Result<(), WhatsAppError> {
        Ok(())
    }

    async fn stop(&self, _user_id: Id) -> Result<(), WhatsAppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_fold_follows_handshake() {
        let state = SessionState::Initializing
            .apply(WaEvent::Qr("qr-data".into()))
            .apply(WaEvent::Authenticated)
            .apply(WaEvent::Ready);
        assert!(state.is_ready());
    }

    #[test]
    fn test_disconnect_wins_from_any_state() {
        let state = SessionState::Ready.apply(WaEvent::Disconnected("logged out".into()));
        assert_eq!(
            state,
            SessionState::Disconnected {
                reason: "logged out".into()
            }
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_event_deserialization() {
        let event: WaEvent =
            serde_json::from_str("{\"type\":\"qr\",\"data\":\"abc\"}").unwrap();
        assert_eq!(event, WaEvent::Qr("abc".into()));

        let event: WaEvent = serde_json::from_str("{\"type\":\"ready\"}").unwrap();
        assert_eq!(event, WaEvent::Ready);
    }

    #[tokio::test]
    async fn test_session_reaches_ready() {
        let manager = SessionManager::new(Arc::new(ScriptedTransport::new(vec![
            WaEvent::Qr("qr-data".into()),
            WaEvent::Authenticated,
            WaEvent::Ready,
        ])));

        let initial = manager.start_session(7).await.unwrap();
        assert_eq!(initial, SessionState::Initializing);

        // events drain quickly; poll until the fold settles
        for _ in 0..50 {
            if manager.state(7).map(|s| s.is_ready()).unwrap_or(false) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(manager.state(7).unwrap().is_ready());
    }

    #[tokio::test]
    async fn test_send_requires_ready_session() {
        let manager = SessionManager::new(Arc::new(ScriptedTransport::new(vec![])));

        // no session at all
        assert!(matches!(
            manager.send_text(1, "+391234567890", "ciao").await,
            Err(WhatsAppError::NoSession(1))
        ));

        // session exists but is still initializing
        manager.start_session(1).await.unwrap();
        assert!(matches!(
            manager.send_text(1, "+391234567890", "ciao").await,
            Err(WhatsAppError::NotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_end_session_removes_entry() {
        let manager = SessionManager::new(Arc::new(ScriptedTransport::new(vec![])));
        manager.start_session(3).await.unwrap();
        assert_eq!(manager.session_count(), 1);

        manager.end_session(3).await.unwrap();
        assert_eq!(manager.session_count(), 0);
        assert!(manager.state(3).is_none());
    }

    #[tokio::test]
    async fn test_restart_after_disconnect() {
        let manager = SessionManager::new(Arc::new(ScriptedTransport::new(vec![
            WaEvent::Disconnected("bridge crashed".into()),
        ])));

        manager.start_session(5).await.unwrap();
        for _ in 0..50 {
            if !manager.state(5).map(|s| s.is_active()).unwrap_or(true) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!manager.state(5).unwrap().is_active());

        // a dead session can be restarted in place
        let restarted = manager.start_session(5).await.unwrap();
        assert_eq!(restarted, SessionState::Initializing);
    }
}
