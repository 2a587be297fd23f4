use crate::app::{App, AppScreen};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};
/// Draws the footer with dynamic instructions
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let instructions = match app.screen {
        AppScreen::Splash => "Use Up/Down arrows to navigate, Enter to select, 'q' to quit.",
        AppScreen::Chat if app.mirror.is_some() => {
            "Enter send · Ctrl+R new chat · Ctrl+S sync · PgUp/PgDn scroll · Esc back"
        }
        AppScreen::Chat => "Enter send · Ctrl+R new chat · PgUp/PgDn scroll · Esc back",
        AppScreen::QuitConfirm => "Press 'y' to confirm quit or 'n' to cancel.",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(footer, area);
}
