//! Main event loop for the TUI.
//!
//! One task owns the `App`. Every wake-up (a key, a feed event from the
//! orchestrator, the spinner tick, a shutdown signal) is turned into a
//! [`Wake`] and handled in order, then the screen is redrawn if anything
//! changed.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Interval;

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// Result of handling a key press event.
pub enum Action {
    Continue,
    Quit,
}

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

const TICK: Duration = Duration::from_millis(250);

/// Why the loop woke up.
enum Wake {
    Shutdown(&'static str),
    Terminal(Option<io::Result<Event>>),
    Background(AppEvent),
    Tick,
}

/// Alternate screen + raw mode for as long as the guard lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// SIGTERM/SIGINT on Unix; never fires elsewhere.
#[cfg(unix)]
struct ShutdownSignals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        std::future::pending().await
    }
}

/// Runs the TUI until the user quits or a shutdown signal arrives.
///
/// A panic hook restores the terminal before the default hook prints, so a
/// panic never leaves the shell in raw mode.
pub async fn run(app: &mut App, mut event_rx: mpsc::Receiver<AppEvent>) -> Result<()> {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut guard = TerminalGuard::enter()?;
    let mut signals = ShutdownSignals::install()?;
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        if app.needs_redraw {
            guard.terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        // Feed results first, so fast typing cannot starve them
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
            app.needs_redraw = true;
        }

        let wake = next_wake(&mut signals, &mut input, &mut event_rx, &mut tick).await;
        match wake {
            Wake::Shutdown(name) => {
                tracing::info!(signal = name, "Shutting down");
                break;
            }
            Wake::Terminal(None) => break,
            Wake::Terminal(Some(Err(e))) => {
                tracing::warn!(error = %e, "Terminal event stream error");
            }
            Wake::Terminal(Some(Ok(event))) => {
                if let Action::Quit = on_terminal_event(app, event).await {
                    break;
                }
            }
            Wake::Background(event) => {
                handle_app_event(app, event);
                app.needs_redraw = true;
            }
            Wake::Tick => on_tick(app),
        }
    }

    Ok(())
}

async fn next_wake(
    signals: &mut ShutdownSignals,
    input: &mut EventStream,
    event_rx: &mut mpsc::Receiver<AppEvent>,
    tick: &mut Interval,
) -> Wake {
    tokio::select! {
        biased;
        name = signals.recv() => Wake::Shutdown(name),
        event = input.next() => Wake::Terminal(event),
        Some(event) = event_rx.recv() => Wake::Background(event),
        _ = tick.tick() => Wake::Tick,
    }
}

async fn on_terminal_event(app: &mut App, event: Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            app.needs_redraw = true;
            handle_input(app, key.code, key.modifiers).await
        }
        Event::Resize(_, _) => {
            app.needs_redraw = true;
            Action::Continue
        }
        _ => Action::Continue,
    }
}

/// Advance the spinner while loading and expire old status messages.
fn on_tick(app: &mut App) {
    if app.feed_state().is_loading() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
    if app.clear_expired_status() {
        app.needs_redraw = true;
    }
}
