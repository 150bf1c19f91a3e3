//! # Actions
//!
//! Everything that can happen in the console becomes an `Action`: a key
//! mapped to a navigation, an envelope arriving from a background fetch, a
//! poll tick firing. `update()` takes the current state and an action and
//! returns the effects the runtime must execute (spawn a fetch, raise a
//! notification, quit). No I/O happens here, which keeps the whole
//! state machine testable without a terminal or a network.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effects
//! ```
//!
//! The single envelope funnel also lives here: every response, no matter
//! which page or the poller triggered it, is classified once. Authorization
//! loss is fatal to the session (forced logout, redirect to login); all
//! failures surface an alert banner; stale-generation responses are dropped
//! before they can mutate a page that has since been torn down.

use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::api::client::{triage, ApiError, Triage};
use crate::api::types::{ConsensusRequestInfo, Envelope};
use crate::core::poller::{Notice, Permission, PENDING_PAGE};
use crate::core::router::LOGIN_PAGE;
use crate::core::state::Console;

/// A fetch to run in the background, tagged with the navigation generation
/// it was issued under.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub id: Uuid,
    pub tag: String,
    pub method: String,
    pub body: Value,
    pub generation: u64,
}

#[derive(Debug)]
pub enum Action {
    Navigate(String),
    Back,
    /// Input line submitted to the active page.
    Submit(String),
    Logout,
    /// A background fetch completed.
    EnvelopeReceived {
        tag: String,
        generation: u64,
        result: Result<Envelope, ApiError>,
    },
    /// The poll interval fired.
    PollTick,
    /// The pending-work poll completed.
    PollResult(Result<Envelope, ApiError>),
    /// The notifier capability probe resolved.
    NotifierProbed(Permission),
    /// The user interacted with the open notification.
    NotificationClicked,
    /// The notifier could not deliver the raised notification.
    NotifyDeliveryFailed,
    Quit,
}

/// Side effects for the runtime to execute after an update.
#[derive(Debug)]
pub enum Effect {
    /// Spawn an authenticated API call; completion comes back as
    /// `Action::EnvelopeReceived`.
    Request(FetchRequest),
    /// Fetch the pending-work set; completion comes back as
    /// `Action::PollResult`.
    Poll,
    Navigate(String),
    /// Raise a notification through the notifier.
    Notify(Notice),
    /// Probe notification capability; resolution comes back as
    /// `Action::NotifierProbed`.
    ProbeNotifier,
    Quit,
}

pub fn update(console: &mut Console, action: Action) -> Vec<Effect> {
    match action {
        Action::Navigate(target) => console.navigate(&target),
        Action::Back => console.back(),
        Action::Submit(input) => console.submit(&input),
        Action::Logout => {
            console.session.logout();
            console.alerts.info("Logged out");
            console.navigate(LOGIN_PAGE)
        }
        Action::EnvelopeReceived {
            tag,
            generation,
            result,
        } => handle_envelope(console, &tag, generation, result),
        Action::PollTick => {
            if console.session.is_authenticated() {
                vec![Effect::Poll]
            } else {
                Vec::new()
            }
        }
        Action::PollResult(result) => handle_poll(console, result),
        Action::NotifierProbed(permission) => {
            debug!("Notifier capability: {:?}", permission);
            console.notifications.permission = permission;
            Vec::new()
        }
        Action::NotificationClicked => {
            console.notifications.acknowledge();
            console.navigate(PENDING_PAGE)
        }
        Action::NotifyDeliveryFailed => {
            console.notifications.delivery_failed();
            Vec::new()
        }
        Action::Quit => vec![Effect::Quit],
    }
}

/// Apply the shared funnel to an envelope. Returns `None` when the envelope
/// consumed the session (auth lost) and the effects to run instead.
fn funnel(console: &mut Console, envelope: &Envelope) -> Result<(), Vec<Effect>> {
    match triage(envelope) {
        Triage::Ok => Ok(()),
        Triage::AppError(message) => {
            console.alerts.error(message);
            Ok(())
        }
        Triage::AuthLost(message) => {
            warn!("Session lost authorization: {}", message);
            console.alerts.error(message);
            console.session.logout();
            Err(console.navigate(LOGIN_PAGE))
        }
    }
}

fn handle_envelope(
    console: &mut Console,
    tag: &str,
    generation: u64,
    result: Result<Envelope, ApiError>,
) -> Vec<Effect> {
    let envelope = match result {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Fetch '{}' failed: {}", tag, e);
            console.alerts.error(e.to_string());
            return Vec::new();
        }
    };

    // The funnel runs regardless of generation: auth expiry is page-agnostic.
    if let Err(effects) = funnel(console, &envelope) {
        return effects;
    }

    // Stale completions must not touch the current page.
    if !console.router.is_current(generation) {
        debug!(
            "Discarding stale response '{}' (generation {} != {})",
            tag,
            generation,
            console.router.generation()
        );
        return Vec::new();
    }

    console.dispatch_envelope(tag, &envelope)
}

fn handle_poll(console: &mut Console, result: Result<Envelope, ApiError>) -> Vec<Effect> {
    let envelope = match result {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Pending-work poll failed: {}", e);
            console.alerts.error(e.to_string());
            return Vec::new();
        }
    };

    if let Err(effects) = funnel(console, &envelope) {
        return effects;
    }
    if !envelope.is_ok() {
        return Vec::new();
    }

    let pending: Vec<ConsensusRequestInfo> = envelope.list("requests");
    match console.notifications.on_pending_work(&pending) {
        Some(notice) => vec![Effect::Notify(notice)],
        None => Vec::new(),
    }
}
