// src/constants.rs

// API Constants
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8029/api";
pub const DEFAULT_MODEL: &str = "GPT-4";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const API_URL_ENV: &str = "LOAN_ADVISOR_API_URL";

pub const SESSION_HEADER: &str = "Session-ID";
pub const USER_UUID_HEADER: &str = "user_uuid";
pub const SESSION_ID_HEADER: &str = "session_id";

// Storage keys
pub const VISITOR_ID_KEY: &str = "user_uuid";
pub const SESSION_ID_KEY: &str = "session_id";
pub const INTENTS_KEY: &str = "intents";
pub const CHAT_KEY_PREFIX: &str = "chat_";
pub const PENDING_SYNC_PREFIX: &str = "pending_sync_";

// Conversation copy
pub const GREETING: &str = "👋 I’m your Loan Advisor Chatbot.\n\
I can help you explore personal, home, education, business, MSME, or vehicle loans based on your income, city, and timeline.\n\
Let's get started. What kind of loan are you looking for?";
pub const WELCOME_BACK: &str = "🔁 Welcome back!";
pub const APOLOGY: &str = "🚫 Sorry, something went wrong.";
pub const RAG_FALLBACK: &str = "⚠️ I'm not sure how to help with that.";

pub const FAREWELL_INTENTS: [&str; 2] = ["farewell", "exit"];
pub const GOODBYE_MARKER: &str = "goodbye";

// UI Constants
pub const APP_TITLE: &str = "💸 Loan Advisor Chatbot";
pub const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
