use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn draw_quit_confirm(f: &mut Frame<'_>, area: Rect) {
    let [row] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(44)])
        .flex(Flex::Center)
        .areas(row);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm Quit ")
        .style(Style::default().fg(Color::LightYellow).bg(Color::Black));

    let paragraph = Paragraph::new("🚪 Are you sure you want to quit?\n\n(y) quit   (n) cancel")
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
