use crate::{
    config::Config,
    constants::{SESSION_HEADER, SESSION_ID_HEADER, SESSION_ID_KEY, USER_UUID_HEADER},
    errors::{AdvisorError, AdvisorResult},
    logging::log_api_call,
    models::{
        ApiCallLog, ChatReply, ChatRequest, Message, MirroredMessage, RagReply, RagRequest,
        ResumeResponse,
    },
    session::{SessionId, VisitorId},
    storage::LocalStore,
};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// HTTP client for the advisor backend.
///
/// Every request carries `Session-ID` read from the local store at send time,
/// so a reset is picked up without rebuilding the client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    model: String,
    store: LocalStore,
}

impl ApiClient {
    pub fn new(config: &Config, store: LocalStore) -> AdvisorResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            store,
        })
    }

    /// Fetches the stored transcript for this visitor and session.
    pub async fn resume_history(
        &self,
        visitor: &VisitorId,
        session: &SessionId,
    ) -> AdvisorResult<ResumeResponse> {
        let request = with_identity(self.request(Method::GET, "/chats/resume"), visitor, session);
        let response = self.send_logged(request, "/chats/resume", "resume_history").await?;
        decode(response).await
    }

    /// Plain-mode turn.
    pub async fn send_chat_message(
        &self,
        text: &str,
        visitor: &VisitorId,
        session: &SessionId,
    ) -> AdvisorResult<ChatReply> {
        let request = with_identity(self.request(Method::POST, "/chat"), visitor, session).json(
            &ChatRequest {
                message: text,
                model: &self.model,
            },
        );
        let response = self.send_logged(request, "/chat", "send_chat_message").await?;
        decode(response).await
    }

    /// Retrieval-augmented turn.
    pub async fn send_rag_message(
        &self,
        text: &str,
        visitor: &VisitorId,
        session: &SessionId,
    ) -> AdvisorResult<RagReply> {
        let request = with_identity(self.request(Method::POST, "/rag-chat"), visitor, session)
            .json(&RagRequest { message: text });
        let response = self.send_logged(request, "/rag-chat", "send_rag_message").await?;
        decode(response).await
    }

    /// Forwards one mirrored message.
    pub async fn post_chat(&self, session: &SessionId, message: &Message) -> AdvisorResult<()> {
        let request = self.request(Method::POST, "/chats").json(&MirroredMessage {
            session_id: session.as_str(),
            message,
        });
        self.send_logged(request, "/chats", "post_chat").await?;
        Ok(())
    }

    /// Uploads a locally buffered message list.
    pub async fn sync_chats(&self, messages: &[Message]) -> AdvisorResult<()> {
        let request = self.request(Method::POST, "/chats/sync").json(messages);
        self.send_logged(request, "/chats/sync", "sync_chats").await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.store.get_string(SESSION_ID_KEY) {
            Some(session_id) => builder.header(SESSION_HEADER, session_id),
            None => builder,
        }
    }

    async fn send_logged(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        summary: &str,
    ) -> AdvisorResult<Response> {
        let start_time = Instant::now();
        let result = request.send().await;
        let status = result
            .as_ref()
            .map(|r| r.status().as_u16())
            .unwrap_or_default();

        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: format!("{}{}", self.base_url, endpoint),
            request_summary: summary.to_string(),
            response_status: status,
            response_time_ms: start_time.elapsed().as_millis(),
        });

        let response =
            result.map_err(|e| AdvisorError::api_error(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn with_identity(
    request: RequestBuilder,
    visitor: &VisitorId,
    session: &SessionId,
) -> RequestBuilder {
    request
        .header(USER_UUID_HEADER, visitor.as_str())
        .header(SESSION_ID_HEADER, session.as_str())
}

async fn decode<T: DeserializeOwned>(response: Response) -> AdvisorResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
