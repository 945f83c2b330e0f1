use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::models::Role;

/// Event names carried in socket frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    ConnectionStatus,
    ReportUpdated,
    Notification,
}

/// Wire frame: `{"event": ..., "data": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub event: EventName,
    pub data: Value,
}

/// Which sessions receive a published frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    User(Uuid),
    Roles(Vec<Role>),
}

impl Audience {
    pub fn admits(&self, user_id: Uuid, role: Role) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::User(id) => *id == user_id,
            Audience::Roles(roles) => roles.contains(&role),
        }
    }
}

#[derive(Debug)]
enum Payload {
    Frame(Frame),
    /// Close every session of the addressed user
    EndSessions,
}

#[derive(Debug)]
struct Envelope {
    audience: Audience,
    payload: Payload,
}

/// Fanout point between the service layer and connected socket sessions.
/// Delivery is best effort: nobody listening is not an error.
#[derive(Clone)]
pub struct Hub {
    tx: broadcast::Sender<Arc<Envelope>>,
    online: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            online: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns how many sessions were subscribed at send time
    pub fn publish(&self, audience: Audience, event: EventName, data: Value) -> usize {
        let payload = Payload::Frame(Frame { event, data });
        match self.send(audience, payload) {
            0 => {
                debug!("No socket sessions connected, dropping {:?} event", event);
                0
            }
            receivers => receivers,
        }
    }

    /// Disconnect a user's live sessions, e.g. after their role changed.
    /// Sessions keep the role they authenticated with, so clients reconnect
    /// with a fresh token to get the new audience.
    pub fn end_sessions(&self, user_id: Uuid) {
        if self.is_online(user_id) {
            self.send(Audience::User(user_id), Payload::EndSessions);
        }
    }

    fn send(&self, audience: Audience, payload: Payload) -> usize {
        self.tx
            .send(Arc::new(Envelope { audience, payload }))
            .unwrap_or(0)
    }

    /// Register a session for `user_id`. Deregistered when the `Session` drops.
    pub fn connect(&self, user_id: Uuid, role: Role) -> Session {
        if let Ok(mut online) = self.online.lock() {
            *online.entry(user_id).or_insert(0) += 1;
        }
        Session {
            user_id,
            role,
            rx: self.tx.subscribe(),
            online: Arc::clone(&self.online),
        }
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.online
            .lock()
            .map(|online| online.contains_key(&user_id))
            .unwrap_or(false)
    }

    pub fn online_users(&self) -> usize {
        self.online.lock().map(|online| online.len()).unwrap_or(0)
    }
}

/// One connected socket client
pub struct Session {
    user_id: Uuid,
    role: Role,
    rx: broadcast::Receiver<Arc<Envelope>>,
    online: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Next frame addressed to this session. `None` once the hub is gone or
    /// the session was ended.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.audience.admits(self.user_id, self.role) => {
                    match &envelope.payload {
                        Payload::Frame(frame) => return Some(frame.clone()),
                        Payload::EndSessions => {
                            debug!("Ending session for user {}", self.user_id);
                            return None;
                        }
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session for user {} lagged, dropped {} events", self.user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(mut online) = self.online.lock() {
            if let Some(count) = online.get_mut(&self.user_id) {
                *count -= 1;
                if *count == 0 {
                    online.remove(&self.user_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn sessions_only_see_their_audience() {
        let hub = Hub::new(16);
        let user = Uuid::new_v4();
        let mut user_session = hub.connect(user, Role::User);
        let mut admin_session = hub.connect(Uuid::new_v4(), Role::Admin);

        hub.publish(Audience::Roles(vec![Role::Admin]), EventName::Notification, json!({"n": 1}));
        hub.publish(Audience::User(user), EventName::Notification, json!({"n": 2}));
        hub.publish(Audience::Everyone, EventName::ReportUpdated, json!({"n": 3}));

        assert_eq!(user_session.next_frame().await.unwrap().data["n"], 2);
        assert_eq!(user_session.next_frame().await.unwrap().data["n"], 3);
        assert_eq!(admin_session.next_frame().await.unwrap().data["n"], 1);
        assert_eq!(admin_session.next_frame().await.unwrap().data["n"], 3);
    }

    #[tokio::test]
    async fn ended_sessions_stop_after_earlier_frames() {
        let hub = Hub::new(16);
        let demoted = Uuid::new_v4();
        let mut stale = hub.connect(demoted, Role::Admin);
        let mut bystander = hub.connect(Uuid::new_v4(), Role::Admin);

        hub.publish(Audience::User(demoted), EventName::Notification, json!({"n": 1}));
        hub.end_sessions(demoted);
        hub.publish(Audience::Roles(vec![Role::Admin]), EventName::Notification, json!({"n": 2}));

        assert_eq!(stale.next_frame().await.unwrap().data["n"], 1);
        assert!(stale.next_frame().await.is_none());
        assert_eq!(bystander.next_frame().await.unwrap().data["n"], 2);
    }

    #[test]
    fn publish_without_sessions_is_not_an_error() {
        let hub = Hub::new(4);
        assert_eq!(hub.publish(Audience::Everyone, EventName::ReportUpdated, json!({})), 0);
    }

    #[test]
    fn online_tracking_follows_session_lifetime() {
        let hub = Hub::new(4);
        let user = Uuid::new_v4();
        let first = hub.connect(user, Role::User);
        let second = hub.connect(user, Role::User);
        assert!(hub.is_online(user));

        drop(first);
        assert!(hub.is_online(user));
        drop(second);
        assert!(!hub.is_online(user));
        assert_eq!(hub.online_users(), 0);
    }

    #[tokio::test]
    async fn lagging_session_skips_ahead() {
        let hub = Hub::new(2);
        let mut session = hub.connect(Uuid::new_v4(), Role::User);
        for n in 0..5 {
            hub.publish(Audience::Everyone, EventName::ReportUpdated, json!({ "n": n }));
        }
        assert_eq!(session.next_frame().await.unwrap().data["n"], 3);
        assert_eq!(session.next_frame().await.unwrap().data["n"], 4);
    }

    #[test]
    fn frame_serializes_with_camel_case_event() {
        let frame = Frame {
            event: EventName::ReportUpdated,
            data: json!({"type": "new_report"}),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["event"], "reportUpdated");
        assert_eq!(value["data"]["type"], "new_report");
    }
}
