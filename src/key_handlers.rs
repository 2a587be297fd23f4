use crate::app::{App, AppScreen};
use crate::conversation::PendingTurn;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Work the event loop has to carry out after a key press on the chat screen.
#[derive(Debug)]
pub enum ChatAction {
    None,
    Dispatch(PendingTurn),
    SyncNow,
}

pub fn handle_chat_input(key: KeyEvent, app: &mut App) -> ChatAction {
    let loading = app.conversation.is_loading();
    match key.code {
        KeyCode::Esc => {
            app.screen = AppScreen::Splash;
        }
        KeyCode::Enter => {
            if let Some(pending) = app.conversation.begin_turn(&app.input) {
                app.input.clear();
                app.scroll = 0;
                app.status_indicator.set_status("");
                app.status_indicator.set_thinking(true);
                return ChatAction::Dispatch(pending);
            }
        }
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Backspace if !loading => {
            app.input.pop();
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.request_quit(),
                    'r' => {
                        app.conversation.reset();
                        app.input.clear();
                        app.scroll = 0;
                        app.status_indicator.set_thinking(false);
                        app.status_indicator.set_status("Started a new conversation");
                    }
                    's' if app.mirror.is_some() => {
                        app.status_indicator.set_status("Syncing local copy...");
                        return ChatAction::SyncNow;
                    }
                    'u' => app.scroll_up(),
                    'd' => app.scroll_down(),
                    _ => {}
                }
            } else if !loading {
                app.input.push(c);
            }
        }
        _ => {}
    }
    ChatAction::None
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.should_quit = true;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.screen = app.previous_screen;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::ApiClient, config::Config, constants::GREETING, conversation::Conversation,
        models::Message, session::IdentityProvider, storage::LocalStore,
    };

    fn offline_app() -> App {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let store = LocalStore::in_memory();
        let api = ApiClient::new(&config, store.clone()).unwrap();
        let mut app = App::new(Conversation::new(IdentityProvider::new(store), api, None), None);
        app.screen = AppScreen::Chat;
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_chat_input(key(KeyCode::Char(c)), app);
        }
    }

    #[test]
    fn test_enter_dispatches_and_clears_input() {
        let mut app = offline_app();
        type_text(&mut app, "home loan");

        let action = handle_chat_input(key(KeyCode::Enter), &mut app);
        match action {
            ChatAction::Dispatch(pending) => assert_eq!(pending.text, "home loan"),
            other => panic!("expected dispatch, got {other:?}"),
        }
        assert!(app.input.is_empty());
        assert!(app.status_indicator.is_thinking());
        assert_eq!(app.conversation.messages(), &[Message::user("home loan")]);
    }

    #[test]
    fn test_typing_is_ignored_while_loading() {
        let mut app = offline_app();
        type_text(&mut app, "first");
        handle_chat_input(key(KeyCode::Enter), &mut app);

        type_text(&mut app, "second");
        assert!(app.input.is_empty());
        assert!(matches!(
            handle_chat_input(key(KeyCode::Enter), &mut app),
            ChatAction::None
        ));
    }

    #[test]
    fn test_whitespace_input_does_nothing() {
        let mut app = offline_app();
        type_text(&mut app, "   ");
        assert!(matches!(
            handle_chat_input(key(KeyCode::Enter), &mut app),
            ChatAction::None
        ));
        assert!(app.conversation.messages().is_empty());
    }

    #[test]
    fn test_ctrl_r_resets_conversation() {
        let mut app = offline_app();
        let before = app.conversation.session().session_id.clone();
        type_text(&mut app, "draft");

        handle_chat_input(ctrl('r'), &mut app);
        assert!(app.input.is_empty());
        assert_eq!(app.conversation.messages(), &[Message::bot(GREETING)]);
        assert_ne!(app.conversation.session().session_id, before);
    }

    #[test]
    fn test_sync_requires_mirror() {
        let mut app = offline_app();
        assert!(matches!(
            handle_chat_input(ctrl('s'), &mut app),
            ChatAction::None
        ));
    }

    #[test]
    fn test_quit_confirm_returns_to_previous_screen() {
        let mut app = offline_app();
        handle_chat_input(ctrl('c'), &mut app);
        assert_eq!(app.screen, AppScreen::QuitConfirm);

        handle_quit_confirm_input(key(KeyCode::Char('n')), &mut app);
        assert_eq!(app.screen, AppScreen::Chat);

        handle_chat_input(ctrl('c'), &mut app);
        handle_quit_confirm_input(key(KeyCode::Char('y')), &mut app);
        assert!(app.should_quit);
    }
}
