//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into core::Action values. This is the only
//! module that knows about ratatui and crossterm.
//!
//! Background work (API calls, the pending-work poll) runs on tokio tasks
//! that feed completions back through an `mpsc::Sender<Action>`; the run
//! loop drains that channel and feeds each action through `update()`.
//!
//! Key map: Enter submits the input line (`/target` navigates, anything else
//! goes to the active page), digits 1-9 on an empty line jump to menu
//! entries, Ctrl+B goes back, Ctrl+L logs out, Ctrl+O opens the pending
//! notification, Ctrl+C quits.

mod event;
mod ui;

use std::collections::VecDeque;
use std::io::{stdout, Write};
use std::sync::{mpsc, Arc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::execute;
use log::{info, warn};
use serde_json::json;

use crate::api::client::{ApiClient, AuthHeaders};
use crate::core::action::{update, Action, Effect, FetchRequest};
use crate::core::config::ResolvedConfig;
use crate::core::poller::{Notice, Notifier, Permission, PENDING_METHOD};
use crate::core::router::Router;
use crate::core::session::FileBackend;
use crate::core::state::Console;
use crate::pages::{default_registry, standard_view};
use crate::tui::event::{poll_event_timeout, TuiEvent};

/// TUI-specific presentation state (not part of core business logic)
#[derive(Default)]
pub struct TuiState {
    pub input_buffer: String,
    /// Notification banner currently shown, cleared on Ctrl+O.
    pub notice: Option<Notice>,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Steady block: continuous redraws reset the terminal's blink timer,
        // which makes a blinking cursor look erratic.
        execute!(stdout(), Show, SetCursorStyle::SteadyBlock)?;
        info!("Terminal modes enabled (steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetCursorStyle::DefaultUserShape);
    }
}

/// Terminal notifier: rings the bell. The banner itself is drawn by the UI
/// from `TuiState::notice`.
struct BellNotifier;

impl Notifier for BellNotifier {
    fn probe(&self) -> Permission {
        Permission::Granted
    }

    fn raise(&self, notice: &Notice) -> bool {
        info!("Raising notification: {}", notice.title);
        let mut out = stdout();
        out.write_all(b"\x07").and_then(|_| out.flush()).is_ok()
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let registry = default_registry()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let backend = FileBackend::new(FileBackend::default_path()?);
    let mut console = Console::new(registry, standard_view(), Box::new(backend));

    let client = ApiClient::new(config.server_url.clone(), config.accept_invalid_certs)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let notifier: Arc<dyn Notifier> = Arc::new(BellNotifier);

    let mut tui = TuiState::default();
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel::<Action>();

    // Pending-work poll ticker
    let tick_tx = tx.clone();
    let poll_interval = std::time::Duration::from_secs(config.poll_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        interval.tick().await; // first tick fires immediately; skip it
        loop {
            interval.tick().await;
            if tick_tx.send(Action::PollTick).is_err() {
                break;
            }
        }
    });

    // First navigation: deep link beats session restore beats login.
    let initial = Router::initial_target(config.start_fragment.as_deref(), &console.session);
    let mut should_quit = drive(
        &mut console,
        &mut tui,
        &client,
        &notifier,
        &tx,
        Action::Navigate(initial),
    );

    while !should_quit {
        console.alerts.sweep();
        terminal.draw(|f| ui::draw_ui(f, &console, &tui))?;

        if let Some(event) = poll_event_timeout(std::time::Duration::from_millis(200))? {
            if let Some(action) = translate(event, &mut tui, &console) {
                should_quit = drive(&mut console, &mut tui, &client, &notifier, &tx, action);
            }
        }

        // Background task completions
        while let Ok(action) = rx.try_recv() {
            if drive(&mut console, &mut tui, &client, &notifier, &tx, action) {
                should_quit = true;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Map a terminal event to a core action, editing the input buffer in place.
fn translate(event: TuiEvent, tui: &mut TuiState, console: &Console) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => Some(Action::Quit),
        TuiEvent::Back => Some(Action::Back),
        TuiEvent::Logout => Some(Action::Logout),
        TuiEvent::OpenNotification => {
            tui.notice.take().map(|_| Action::NotificationClicked)
        }
        TuiEvent::Submit => {
            let line = std::mem::take(&mut tui.input_buffer);
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            if let Some(target) = line.strip_prefix('/') {
                return Some(Action::Navigate(target.to_string()));
            }
            Some(Action::Submit(line.to_string()))
        }
        TuiEvent::InputChar(c) => {
            // Digits on an empty line are menu shortcuts.
            if tui.input_buffer.is_empty() {
                if let Some(slot) = c.to_digit(10).filter(|d| *d >= 1) {
                    let pages = ui::menu_pages(&console.view);
                    if let Some(page) = pages.get(slot as usize - 1) {
                        return Some(Action::Navigate(page.to_string()));
                    }
                }
            }
            tui.input_buffer.push(c);
            None
        }
        TuiEvent::Backspace => {
            tui.input_buffer.pop();
            None
        }
        TuiEvent::Escape => {
            tui.input_buffer.clear();
            None
        }
        TuiEvent::Resize => None,
    }
}

/// Run one action through the reducer and execute the resulting effects,
/// following effect-produced actions until the queue drains. Returns true
/// when the console should quit.
fn drive(
    console: &mut Console,
    tui: &mut TuiState,
    client: &ApiClient,
    notifier: &Arc<dyn Notifier>,
    tx: &mpsc::Sender<Action>,
    first: Action,
) -> bool {
    let mut queue = VecDeque::from([first]);
    let mut quit = false;

    while let Some(action) = queue.pop_front() {
        for effect in update(console, action) {
            match effect {
                Effect::Request(request) => {
                    spawn_call(client, auth_snapshot(console), request, tx.clone());
                }
                Effect::Poll => spawn_poll(client, auth_snapshot(console), tx.clone()),
                Effect::Navigate(target) => queue.push_back(Action::Navigate(target)),
                Effect::Notify(notice) => {
                    if notifier.raise(&notice) {
                        tui.notice = Some(notice);
                    } else {
                        queue.push_back(Action::NotifyDeliveryFailed);
                    }
                }
                Effect::ProbeNotifier => {
                    queue.push_back(Action::NotifierProbed(notifier.probe()));
                }
                Effect::Quit => quit = true,
            }
        }
    }
    quit
}

/// Identity headers are snapshotted at spawn time so background tasks never
/// reach back into shared state.
fn auth_snapshot(console: &Console) -> AuthHeaders {
    let session = console.session.session();
    AuthHeaders {
        username: session.username.clone(),
        token: session.token.clone(),
    }
}

fn spawn_call(
    client: &ApiClient,
    auth: AuthHeaders,
    request: FetchRequest,
    tx: mpsc::Sender<Action>,
) {
    let client = client.clone();
    tokio::spawn(async move {
        log::debug!(
            "Spawning fetch {} '{}' (method {})",
            request.id,
            request.tag,
            request.method
        );
        let result = client.call(&request.method, &request.body, &auth).await;
        let sent = tx.send(Action::EnvelopeReceived {
            tag: request.tag.clone(),
            generation: request.generation,
            result,
        });
        if sent.is_err() {
            warn!("Dropping completion for '{}': receiver gone", request.tag);
        }
    });
}

fn spawn_poll(client: &ApiClient, auth: AuthHeaders, tx: mpsc::Sender<Action>) {
    let client = client.clone();
    tokio::spawn(async move {
        let result = client.call(PENDING_METHOD, &json!({}), &auth).await;
        if tx.send(Action::PollResult(result)).is_err() {
            warn!("Dropping poll result: receiver gone");
        }
    });
}
