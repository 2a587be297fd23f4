// src/ui.rs

pub mod chat;
pub mod footer;
pub mod quit_confirm;
pub mod splash;

use crate::{
    app::{App, AppScreen},
    conversation::{PendingTurn, TurnApplied, TurnResult},
    errors::AdvisorResult,
    key_handlers::{handle_chat_input, handle_quit_confirm_input, ChatAction},
};
use chat::draw_chat;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use footer::draw_footer;
use futures::StreamExt;
use log::{error, info};
use quit_confirm::draw_quit_confirm;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use splash::SplashScreenAction;
use std::{io, time::Duration};
use tokio::{
    sync::mpsc,
    time::{self, Instant, Interval},
};

/// Result of a finished sync: (triggered by the user, sessions synced).
type SyncReport = (bool, usize);

struct Channels {
    turn_tx: mpsc::Sender<(PendingTurn, TurnResult)>,
    sync_tx: mpsc::Sender<SyncReport>,
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui(app: App, sync_interval: Option<Duration>) -> AdvisorResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, sync_interval).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("UI loop ended with error: {}", err);
    }
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    sync_interval: Option<Duration>,
) -> AdvisorResult<()> {
    let (turn_tx, mut turn_rx) = mpsc::channel::<(PendingTurn, TurnResult)>(16);
    let (sync_tx, mut sync_rx) = mpsc::channel::<SyncReport>(4);
    let channels = Channels { turn_tx, sync_tx };

    let mut events = EventStream::new();
    let mut tick = time::interval(Duration::from_millis(120));
    let mut sync_timer = sync_interval
        .filter(|_| app.mirror.is_some())
        .map(|period| time::interval_at(Instant::now() + period, period));

    loop {
        terminal.draw(|f| draw(f, &mut app))?;
        if app.should_quit {
            break;
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(key, &mut app, terminal, &channels).await?;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some((pending, result)) = turn_rx.recv() => {
                let applied = app.conversation.complete_turn(&pending, result);
                if applied != TurnApplied::Stale {
                    app.status_indicator.set_thinking(false);
                }
                if let TurnApplied::Failed(kind) = applied {
                    app.status_indicator.set_status(format!("Last message failed: {}", kind));
                }
            },
            Some((manual, synced)) = sync_rx.recv() => {
                if manual || synced > 0 {
                    app.status_indicator.set_status(format!("Synced {} pending session(s)", synced));
                }
            },
            _ = next_sync(&mut sync_timer) => {
                spawn_sync(&app, &channels, false);
            },
            _ = tick.tick() => {},
        }
    }

    info!("Exiting UI loop");
    Ok(())
}

async fn handle_key<B: Backend>(
    key: KeyEvent,
    app: &mut App,
    terminal: &mut Terminal<B>,
    channels: &Channels,
) -> AdvisorResult<()> {
    match app.screen {
        AppScreen::Splash => match app.splash.handle_input(key) {
            Some(SplashScreenAction::Quit) => app.request_quit(),
            Some(SplashScreenAction::StartChat) => {
                if !app.mounted {
                    app.screen = AppScreen::Chat;
                    app.status_indicator.set_status("Loading your conversation...");
                    terminal.draw(|f| draw(f, app))?;
                }
                app.mount_chat().await;
            }
            None => {}
        },
        AppScreen::Chat => match handle_chat_input(key, app) {
            ChatAction::Dispatch(pending) => {
                let api = app.conversation.api().clone();
                let turn_tx = channels.turn_tx.clone();
                tokio::spawn(async move {
                    let result = pending.dispatch(&api).await;
                    let _ = turn_tx.send((pending, result)).await;
                });
            }
            ChatAction::SyncNow => spawn_sync(app, channels, true),
            ChatAction::None => {}
        },
        AppScreen::QuitConfirm => handle_quit_confirm_input(key, app),
    }
    Ok(())
}

fn spawn_sync(app: &App, channels: &Channels, manual: bool) {
    let Some(mirror) = app.mirror.clone() else {
        return;
    };
    let sync_tx = channels.sync_tx.clone();
    tokio::spawn(async move {
        let synced = mirror.retry_pending().await;
        let _ = sync_tx.send((manual, synced)).await;
    });
}

async fn next_sync(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let underlying = match app.screen {
        AppScreen::QuitConfirm => app.previous_screen,
        screen => screen,
    };
    match underlying {
        AppScreen::Chat => draw_chat(f, app, chunks[0]),
        _ => app.splash.draw(f, chunks[0]),
    }
    if app.screen == AppScreen::QuitConfirm {
        draw_quit_confirm(f, chunks[0]);
    }

    draw_footer(f, chunks[1], app);
}
