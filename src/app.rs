use crate::conversation::{Conversation, ResumeOutcome};
use crate::mirror::ChatMirror;
use crate::status_indicator::StatusIndicator;
use crate::ui::splash::SplashScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Splash,
    Chat,
    QuitConfirm,
}

pub struct App {
    pub screen: AppScreen,
    /// Screen to go back to when a quit is cancelled.
    pub previous_screen: AppScreen,
    pub splash: SplashScreen,
    pub conversation: Conversation,
    pub mirror: Option<ChatMirror>,
    pub input: String,
    /// Lines scrolled up from the bottom of the transcript. 0 follows new messages.
    pub scroll: u16,
    pub status_indicator: StatusIndicator,
    pub mounted: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(conversation: Conversation, mirror: Option<ChatMirror>) -> App {
        App {
            screen: AppScreen::Splash,
            previous_screen: AppScreen::Splash,
            splash: SplashScreen::new(),
            conversation,
            mirror,
            input: String::new(),
            scroll: 0,
            status_indicator: StatusIndicator::new(),
            mounted: false,
            should_quit: false,
        }
    }

    /// Runs the resume step the first time the chat widget is shown.
    pub async fn mount_chat(&mut self) {
        self.screen = AppScreen::Chat;
        if self.mounted {
            return;
        }
        self.mounted = true;
        let status = match self.conversation.init().await {
            ResumeOutcome::Restored { turns } => format!("Resumed {} earlier turns", turns),
            ResumeOutcome::Concluded => "Previous conversation ended, starting fresh".to_string(),
            ResumeOutcome::Greeted => String::new(),
        };
        self.status_indicator.set_status(status);
        self.scroll = 0;
    }

    pub fn request_quit(&mut self) {
        if self.screen != AppScreen::QuitConfirm {
            self.previous_screen = self.screen;
        }
        self.screen = AppScreen::QuitConfirm;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(3);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(3);
    }
}
