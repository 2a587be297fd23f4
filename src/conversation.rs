// src/conversation.rs

use crate::{
    api::ApiClient,
    constants::{APOLOGY, FAREWELL_INTENTS, GOODBYE_MARKER, GREETING, RAG_FALLBACK, WELCOME_BACK},
    errors::AdvisorError,
    mirror::ChatMirror,
    models::{HistoryTurn, Message, Mode},
    session::{IdentityProvider, SessionContext},
};
use log::{debug, error, info, warn};
use serde_json::json;
use std::fmt;

/// Why a turn produced no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    Transport,
    Status(u16),
    Decode,
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::Transport => f.write_str("backend unreachable"),
            TurnError::Status(code) => write!(f, "backend returned {}", code),
            TurnError::Decode => f.write_str("unreadable reply"),
        }
    }
}

impl From<&AdvisorError> for TurnError {
    fn from(err: &AdvisorError) -> Self {
        match err {
            AdvisorError::Status { status, .. } => TurnError::Status(*status),
            AdvisorError::Json(_) => TurnError::Decode,
            AdvisorError::Http(e) if e.is_decode() => TurnError::Decode,
            _ => TurnError::Transport,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub mode_hint: Option<Mode>,
}

pub type TurnResult = Result<BotReply, TurnError>;

/// A turn whose user message is on screen and whose reply is outstanding.
///
/// Carries the mode and session that were active at dispatch time.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub text: String,
    pub mode: Mode,
    pub session: SessionContext,
}

impl PendingTurn {
    pub async fn dispatch(&self, api: &ApiClient) -> TurnResult {
        let ctx = &self.session;
        let outcome = match self.mode {
            Mode::Chat => api
                .send_chat_message(&self.text, &ctx.visitor_id, &ctx.session_id)
                .await
                .map(|reply| BotReply {
                    text: reply.response,
                    mode_hint: reply.mode,
                }),
            Mode::Rag => api
                .send_rag_message(&self.text, &ctx.visitor_id, &ctx.session_id)
                .await
                .map(|reply| BotReply {
                    text: reply
                        .response
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| RAG_FALLBACK.to_string()),
                    mode_hint: None,
                }),
        };
        outcome.map_err(|e| {
            error!("Chat error: {}", e);
            TurnError::from(&e)
        })
    }
}

/// What `complete_turn` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnApplied {
    Replied,
    Failed(TurnError),
    /// The session changed while the turn was in flight; nothing was appended.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    Greeted,
    /// History ended with a farewell, so the conversation starts over.
    Concluded,
    Restored { turns: usize },
}

/// Owns the transcript and the chat/rag mode for one conversation.
pub struct Conversation {
    identity: IdentityProvider,
    api: ApiClient,
    mirror: Option<ChatMirror>,
    session: SessionContext,
    messages: Vec<Message>,
    mode: Mode,
    context: Option<String>,
    loading: bool,
}

impl Conversation {
    pub fn new(identity: IdentityProvider, api: ApiClient, mirror: Option<ChatMirror>) -> Self {
        let session = identity.init();
        Self {
            identity,
            api,
            mirror,
            session,
            messages: Vec::new(),
            mode: Mode::Chat,
            context: None,
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Restores the previous transcript, or greets when there is nothing to resume.
    pub async fn init(&mut self) -> ResumeOutcome {
        let resumed = self
            .api
            .resume_history(&self.session.visitor_id, &self.session.session_id)
            .await;

        let resume = match resumed {
            Ok(resume) => resume,
            Err(e) => {
                warn!("Failed to load history: {}", e);
                self.greet();
                return ResumeOutcome::Greeted;
            }
        };

        let Some(last) = resume.history.last() else {
            self.greet();
            return ResumeOutcome::Greeted;
        };

        if let (Some(mirror), Some(intent)) = (&self.mirror, &last.intent) {
            mirror.save_intent(
                intent,
                json!({ "session_id": self.session.session_id.as_str() }),
            );
        }

        if is_concluded(last) {
            info!("Previous session ended with a farewell, starting over");
            self.greet();
            return ResumeOutcome::Concluded;
        }

        let turns = resume.history.len();
        self.messages.clear();
        self.push(Message::bot(WELCOME_BACK));
        for message in flatten_history(&resume.history) {
            self.push(message);
        }
        self.context = resume.context.and_then(|c| c.summary);
        self.mode = Mode::Rag;
        info!("Resumed {} turns for session {}", turns, self.session.session_id);
        ResumeOutcome::Restored { turns }
    }

    /// Appends the user message and marks a turn in flight.
    ///
    /// Returns `None` for blank input or while another turn is outstanding.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        let trimmed = input.trim();
        if trimmed.is_empty() || self.loading {
            return None;
        }
        self.push(Message::user(trimmed));
        self.loading = true;
        Some(PendingTurn {
            text: trimmed.to_string(),
            mode: self.mode,
            session: self.session.clone(),
        })
    }

    pub fn complete_turn(&mut self, pending: &PendingTurn, result: TurnResult) -> TurnApplied {
        if pending.session.session_id != self.session.session_id {
            debug!(
                "Discarding reply for stale session {}",
                pending.session.session_id
            );
            return TurnApplied::Stale;
        }
        self.loading = false;

        match result {
            Ok(reply) => {
                self.push(Message::bot(reply.text));
                if pending.mode == Mode::Chat && reply.mode_hint == Some(Mode::Rag) {
                    info!("Backend switched conversation to rag mode");
                    self.mode = Mode::Rag;
                }
                TurnApplied::Replied
            }
            Err(kind) => {
                self.push(Message::bot(APOLOGY));
                TurnApplied::Failed(kind)
            }
        }
    }

    /// Runs a whole turn in place.
    pub async fn send_message(&mut self, input: &str) -> Option<TurnApplied> {
        let pending = self.begin_turn(input)?;
        let result = pending.dispatch(&self.api).await;
        Some(self.complete_turn(&pending, result))
    }

    /// Starts a brand new conversation under a fresh session id.
    pub fn reset(&mut self) {
        self.session.session_id = self.identity.reset_session();
        self.messages.clear();
        self.context = None;
        self.mode = Mode::Chat;
        self.loading = false;
        self.greet();
    }

    fn greet(&mut self) {
        self.messages.clear();
        self.push(Message::bot(GREETING));
        self.mode = Mode::Chat;
        self.context = None;
    }

    fn push(&mut self, message: Message) {
        if let Some(mirror) = &self.mirror {
            tokio::spawn(mirror.save_chat(&self.session.session_id, &message));
        }
        self.messages.push(message);
    }
}

fn is_concluded(turn: &HistoryTurn) -> bool {
    let farewell_intent = turn
        .intent
        .as_deref()
        .is_some_and(|intent| FAREWELL_INTENTS.contains(&intent));
    farewell_intent || turn.bot_response.to_lowercase().contains(GOODBYE_MARKER)
}

fn flatten_history(history: &[HistoryTurn]) -> Vec<Message> {
    history
        .iter()
        .flat_map(|turn| {
            [
                Message::user(turn.user_message.clone()),
                Message::bot(turn.bot_response.clone()),
            ]
        })
        .collect()
}
