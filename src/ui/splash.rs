use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const BANNER: &str = "💸 Your AI-powered Personal Loan Advisor. Ask your questions now!";
const HERO_TITLE: &str = "Welcome to Your Loan Advisory Chatbot";
const HERO_TEXT: &str = "I’ll help you explore the best loan options based on your needs, income, location, and goals.";

const CAPABILITIES: [&str; 4] = [
    "Suggest personal, home, or education loan options",
    "Compare interest rates from different lenders",
    "Guide you based on your income, city, and timeline",
    "Answer EMI, documentation, or eligibility-related questions",
];

const USE_CASES: [&str; 4] = [
    "You're exploring loan options for a new house or car",
    "You want to know if you're eligible for a personal loan",
    "You’re confused about interest rates, banks, or documentation",
    "You need help planning your repayment or EMI strategy",
];

#[derive(Debug)]
pub enum SplashScreenAction {
    Quit,
    StartChat,
}

/// Landing screen: informational sections plus the entry menu.
#[derive(Debug)]
pub struct SplashScreen {
    pub selected_idx: usize,
    pub menu_items: Vec<&'static str>,
}

impl Default for SplashScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SplashScreen {
    pub fn new() -> Self {
        Self {
            selected_idx: 0,
            menu_items: vec!["talk to your loan advisor", "quit"],
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(self.menu_items.len() as u16 + 2),
            ])
            .split(area);

        let banner = Paragraph::new(BANNER)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Rgb(16, 185, 129))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(banner, rows[0]);

        let hero = Paragraph::new(vec![
            Line::from(Span::styled(
                HERO_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(HERO_TEXT, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(hero, rows[1]);

        let sections = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        f.render_widget(bullet_section("What I Can Help With", &CAPABILITIES), sections[0]);
        f.render_widget(bullet_section("Use Cases", &USE_CASES), sections[1]);

        let menu_lines: Vec<Line> = self
            .menu_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let selected = i == self.selected_idx;
                let style = if selected {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(
                    format!("{} {}", if selected { "▶" } else { " " }, item),
                    style,
                ))
            })
            .collect();
        let menu = Paragraph::new(menu_lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(menu, rows[3]);
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SplashScreenAction> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.selected_idx = (self.selected_idx + 1) % self.menu_items.len();
                None
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                if self.selected_idx == 0 {
                    self.selected_idx = self.menu_items.len() - 1;
                } else {
                    self.selected_idx -= 1;
                }
                None
            }
            (KeyModifiers::NONE, KeyCode::Enter) => match self.selected_idx {
                0 => Some(SplashScreenAction::StartChat),
                _ => Some(SplashScreenAction::Quit),
            },
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(SplashScreenAction::Quit),
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(SplashScreenAction::Quit),
            _ => None,
        }
    }
}

fn bullet_section<'a>(title: &'a str, items: &[&'a str]) -> Paragraph<'a> {
    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Green)),
                Span::raw(*item),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", title),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wraps_and_selects() {
        let mut splash = SplashScreen::new();
        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

        assert!(splash.handle_input(up).is_none());
        assert_eq!(splash.selected_idx, 1);
        assert!(matches!(
            splash.handle_input(enter),
            Some(SplashScreenAction::Quit)
        ));

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        splash.handle_input(down);
        assert!(matches!(
            splash.handle_input(enter),
            Some(SplashScreenAction::StartChat)
        ));
    }
}
