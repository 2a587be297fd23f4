use crate::models::{Message, Sender};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Bubbles take at most this share of the transcript width.
const BUBBLE_WIDTH_PERCENT: usize = 80;

/// Lays out one transcript message. User messages sit on the right, advisor messages on the left.
pub fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let (label, style, alignment) = match message.sender {
        Sender::User => (
            "You",
            Style::default().fg(Color::Rgb(209, 231, 221)),
            Alignment::Right,
        ),
        Sender::Bot => (
            "Advisor",
            Style::default().fg(Color::Rgb(226, 227, 229)),
            Alignment::Left,
        ),
    };

    let wrap_width = (width as usize * BUBBLE_WIDTH_PERCENT / 100).max(10);
    let mut lines = vec![
        Line::from(Span::styled(label, style.add_modifier(Modifier::DIM))).alignment(alignment),
    ];

    // newlines in the text are kept, long lines wrap
    for raw in message.text.lines() {
        if raw.trim().is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for wrapped in wrap(raw, wrap_width) {
            lines.push(
                Line::from(Span::styled(wrapped.into_owned(), style)).alignment(alignment),
            );
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_align_right() {
        let lines = render_message(&Message::user("hello"), 80);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].alignment, Some(Alignment::Right));
    }

    #[test]
    fn test_multiline_bot_text_keeps_breaks_and_wraps() {
        let text = format!("first line\n{}", "word ".repeat(30));
        let lines = render_message(&Message::bot(text), 50);
        // label + first line + wrapped paragraph over several lines
        assert!(lines.len() > 3);
        assert_eq!(lines[1].alignment, Some(Alignment::Left));
        assert!(lines.iter().all(|l| l.width() <= 40));
    }
}
