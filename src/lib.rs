// src/lib.rs

pub mod api;
pub mod app;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod errors;
pub mod key_handlers;
pub mod logging;
pub mod mirror;
pub mod models;
pub mod session;
pub mod status_indicator;
pub mod storage;
pub mod ui;
