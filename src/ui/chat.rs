use crate::app::App;
use crate::chat_message::render_message;
use crate::constants::APP_TITLE;
use crate::models::Mode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    draw_title_bar(f, app, chunks[0]);
    draw_messages(f, app, chunks[1]);

    app.status_indicator.update_spinner();
    app.status_indicator.render(f, chunks[2]);

    draw_input(f, app, chunks[3]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mode = app.conversation.mode();
    let mode_style = match mode {
        Mode::Chat => Style::default().fg(Color::Black).bg(Color::Gray),
        Mode::Rag => Style::default().fg(Color::Black).bg(Color::Rgb(16, 185, 129)),
    };
    let mut left = vec![
        Span::styled(APP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!(" {} ", mode.as_str()), mode_style),
    ];
    if let Some(context) = app.conversation.context() {
        left.push(Span::styled(
            format!("  {}", context),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(left)), halves[0]);

    let refresh = Paragraph::new(Line::from(Span::styled(
        "🔄 Refresh Chat (Ctrl+R)",
        Style::default().fg(Color::Gray),
    )))
    .alignment(ratatui::layout::Alignment::Right);
    f.render_widget(refresh, halves[1]);
}

fn draw_messages(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.conversation.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_message(message, inner.width));
    }

    // follow the newest message unless the user scrolled up
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(inner.height);
    let top = max_scroll - app.scroll.min(max_scroll);

    f.render_widget(Paragraph::new(lines).scroll((top, 0)), inner);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let loading = app.conversation.is_loading();
    let (title, text, text_style) = if loading {
        (" ... ", "", Style::default().fg(Color::DarkGray))
    } else if app.input.is_empty() {
        (
            " Send (Enter) ",
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (" Send (Enter) ", app.input.as_str(), Style::default().fg(Color::White))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(if loading {
            Color::DarkGray
        } else {
            Color::Blue
        }));
    let inner = block.inner(area);

    let text_width = u16::try_from(app.input.width()).unwrap_or(u16::MAX);
    let scroll_offset = text_width.saturating_sub(inner.width.saturating_sub(1));

    f.render_widget(
        Paragraph::new(Span::styled(text, text_style))
            .block(block)
            .scroll((0, scroll_offset)),
        area,
    );

    if !loading {
        let cursor_x = inner.x.saturating_add(text_width - scroll_offset);
        f.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::ApiClient, app::AppScreen, config::Config, conversation::Conversation,
        session::IdentityProvider, storage::LocalStore,
    };
    use ratatui::{backend::TestBackend, Terminal};

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

    #[test]
    fn test_oversized_input_keeps_cursor_inside_box() {
        let mut app = offline_app();
        app.input = "x".repeat(70_000);

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_chat(f, &mut app, area);
            })
            .unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 40);
    }
}
