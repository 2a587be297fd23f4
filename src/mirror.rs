//! Best-effort local mirror of the transcript and intents.
//!
//! Messages are appended to a per-session list in the local store and forwarded
//! to the backend. A failed upload marks the session as pending; pending
//! sessions are retried by [`ChatMirror::retry_pending`], which the UI drives
//! from a timer and a key binding.

use crate::{
    api::ApiClient,
    constants::{CHAT_KEY_PREFIX, INTENTS_KEY, PENDING_SYNC_PREFIX},
    models::{IntentRecord, Message},
    session::SessionId,
    storage::LocalStore,
};
use chrono::Utc;
use log::{info, warn};
use std::future::Future;

#[derive(Debug, Clone)]
pub struct ChatMirror {
    store: LocalStore,
    api: ApiClient,
}

fn chat_key(session_id: &str) -> String {
    format!("{}{}", CHAT_KEY_PREFIX, session_id)
}

fn pending_key(session_id: &str) -> String {
    format!("{}{}", PENDING_SYNC_PREFIX, session_id)
}

impl ChatMirror {
    pub fn new(store: LocalStore, api: ApiClient) -> Self {
        Self { store, api }
    }

    pub fn local_messages(&self, session: &SessionId) -> Vec<Message> {
        self.store
            .get_json(&chat_key(session.as_str()))
            .unwrap_or_default()
    }

    pub fn is_pending(&self, session: &SessionId) -> bool {
        self.store
            .get_json::<bool>(&pending_key(session.as_str()))
            .unwrap_or(false)
    }

    /// Appends `message` to the local list now and returns its upload.
    ///
    /// The returned future is `'static` and can be spawned.
    /// Upload failure marks the session pending.
    pub fn save_chat(
        &self,
        session: &SessionId,
        message: &Message,
    ) -> impl Future<Output = ()> + Send + 'static {
        self.record_local(session, message);
        let mirror = self.clone();
        let session = session.clone();
        let message = message.clone();
        async move { mirror.forward(&session, &message).await }
    }

    fn record_local(&self, session: &SessionId, message: &Message) {
        let key = chat_key(session.as_str());
        let mut messages: Vec<Message> = self.store.get_json(&key).unwrap_or_default();
        messages.push(message.clone());
        self.store.set_json(&key, &messages);
    }

    async fn forward(&self, session: &SessionId, message: &Message) {
        if let Err(e) = self.api.post_chat(session, message).await {
            warn!("Mirror upload failed for session {}: {}", session, e);
            self.mark_pending(session);
        }
    }

    /// Uploads the whole local list for `session`. Returns whether it went through.
    pub async fn safe_sync(&self, session: &SessionId) -> bool {
        let messages = self.local_messages(session);
        match self.api.sync_chats(&messages).await {
            Ok(()) => {
                // messages recorded during the upload are not in it
                if self.local_messages(session).len() == messages.len() {
                    self.store.remove(&pending_key(session.as_str()));
                }
                true
            }
            Err(e) => {
                warn!("Sync failed, maintaining local copy for {}: {}", session, e);
                self.mark_pending(session);
                false
            }
        }
    }

    pub fn save_intent(&self, intent: &str, parameters: serde_json::Value) {
        let mut intents: Vec<IntentRecord> = self.store.get_json(INTENTS_KEY).unwrap_or_default();
        intents.push(IntentRecord {
            intent: intent.to_string(),
            parameters,
            timestamp_ms: Utc::now().timestamp_millis(),
        });
        self.store.set_json(INTENTS_KEY, &intents);
    }

    /// Sessions whose last upload failed.
    pub fn pending_sessions(&self) -> Vec<SessionId> {
        self.store
            .keys_with_prefix(PENDING_SYNC_PREFIX)
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(PENDING_SYNC_PREFIX)
                    .map(|id| SessionId::from(id.to_string()))
            })
            .filter(|session| self.is_pending(session))
            .collect()
    }

    /// Re-syncs every pending session. Returns how many succeeded.
    pub async fn retry_pending(&self) -> usize {
        let pending = self.pending_sessions();
        if pending.is_empty() {
            return 0;
        }
        let mut synced = 0;
        for session in &pending {
            if self.safe_sync(session).await {
                synced += 1;
            }
        }
        info!("Pending sync retry: {}/{} sessions synced", synced, pending.len());
        synced
    }

    fn mark_pending(&self, session: &SessionId) {
        self.store.set_json(&pending_key(session.as_str()), &true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn mirror_for(uri: String, store: LocalStore) -> ChatMirror {
        let config = Config {
            api_base_url: uri,
            ..Config::default()
        };
        let api = ApiClient::new(&config, store.clone()).unwrap();
        ChatMirror::new(store, api)
    }

    fn session(id: &str) -> SessionId {
        SessionId::from(id.to_string())
    }

    #[tokio::test]
    async fn test_save_chat_appends_and_forwards() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats"))
            .and(body_json(json!({ "session_id": "s1", "sender": "user", "text": "hi" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mirror = mirror_for(mock_server.uri(), LocalStore::in_memory());
        mirror.save_chat(&session("s1"), &Message::user("hi")).await;

        assert_eq!(mirror.local_messages(&session("s1")), vec![Message::user("hi")]);
        assert!(!mirror.is_pending(&session("s1")));
    }

    #[tokio::test]
    async fn test_failed_upload_marks_pending_and_keeps_local_copy() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let mirror = mirror_for(mock_server.uri(), LocalStore::in_memory());
        mirror.save_chat(&session("s1"), &Message::bot("hello")).await;

        assert!(mirror.is_pending(&session("s1")));
        assert_eq!(mirror.local_messages(&session("s1")).len(), 1);
        assert_eq!(mirror.pending_sessions(), vec![session("s1")]);
    }

    #[tokio::test]
    async fn test_retry_pending_clears_synced_sessions() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats/sync"))
            .and(body_json(json!([{ "sender": "user", "text": "hi" }])))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chats/sync"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let store = LocalStore::in_memory();
        store.set_json("chat_good", &vec![Message::user("hi")]);
        store.set_json("pending_sync_good", &true);
        store.set_json("chat_bad", &vec![Message::user("other")]);
        store.set_json("pending_sync_bad", &true);

        let mirror = mirror_for(mock_server.uri(), store);
        assert_eq!(mirror.retry_pending().await, 1);
        assert_eq!(mirror.pending_sessions(), vec![session("bad")]);
    }

    #[tokio::test]
    async fn test_save_chat_records_locally_before_upload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let mirror = mirror_for(mock_server.uri(), LocalStore::in_memory());
        let upload = mirror.save_chat(&session("s1"), &Message::user("first"));
        assert_eq!(mirror.local_messages(&session("s1")), vec![Message::user("first")]);
        assert!(mock_server.received_requests().await.unwrap().is_empty());

        tokio::spawn(upload).await.unwrap();
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_keeps_marker_when_list_grew_during_upload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats/sync"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let store = LocalStore::in_memory();
        store.set_json("chat_s1", &vec![Message::user("hi")]);
        store.set_json("pending_sync_s1", &true);
        let mirror = mirror_for(mock_server.uri(), store);

        let syncing = {
            let mirror = mirror.clone();
            tokio::spawn(async move { mirror.safe_sync(&session("s1")).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        mirror.save_chat(&session("s1"), &Message::bot("late")).await;

        assert!(syncing.await.unwrap());
        assert_eq!(mirror.local_messages(&session("s1")).len(), 2);
        assert!(mirror.is_pending(&session("s1")));
    }

    #[tokio::test]
    async fn test_sync_clears_marker_when_list_unchanged() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats/sync"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let store = LocalStore::in_memory();
        store.set_json("chat_s1", &vec![Message::user("hi")]);
        store.set_json("pending_sync_s1", &true);
        let mirror = mirror_for(mock_server.uri(), store);

        assert!(mirror.safe_sync(&session("s1")).await);
        assert!(!mirror.is_pending(&session("s1")));
    }

    #[tokio::test]
    async fn test_retry_pending_without_markers_is_a_no_op() {
        let mock_server = MockServer::start().await;
        let mirror = mirror_for(mock_server.uri(), LocalStore::in_memory());
        assert_eq!(mirror.retry_pending().await, 0);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_save_intent_appends_records() {
        let mirror = mirror_for(
            "http://127.0.0.1:9".to_string(),
            LocalStore::in_memory(),
        );
        mirror.save_intent("loan_inquiry", json!({ "loan_type": "home" }));
        mirror.save_intent("farewell", json!({}));

        let intents: Vec<IntentRecord> = mirror.store.get_json(INTENTS_KEY).unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].intent, "loan_inquiry");
        assert_eq!(intents[0].parameters["loan_type"], "home");
    }
}
