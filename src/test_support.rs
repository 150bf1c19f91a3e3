//! Shared helpers for unit tests. Compiled only under `cfg(test)`.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::core::action::Effect;
use crate::core::poller::{Notice, Notifier, Permission};
use crate::core::router::PageContext;
use crate::core::session::{MemoryBackend, SessionStore};
use crate::core::state::Console;
use crate::pages::{default_registry, standard_view, Page, PageView};

/// A session store over a fresh in-memory backend, starting logged out.
pub fn memory_store() -> SessionStore {
    SessionStore::new(Box::new(MemoryBackend::default()))
}

/// A session store already logged in with the given roles.
pub fn logged_in_store(roles: &[&str]) -> SessionStore {
    let mut store = memory_store();
    let roles: BTreeSet<String> = roles.iter().map(|r| r.to_string()).collect();
    store.login("test-token".into(), "tester".into(), Some("u-test".into()), roles);
    store
}

/// A full console over the production registry and chrome, persisting to
/// memory. Starts logged out with no active page.
pub fn test_console() -> Console {
    let registry = default_registry().unwrap();
    Console::new(registry, standard_view(), Box::new(MemoryBackend::default()))
}

/// Append-only event log shared between a test and its probe pages.
#[derive(Clone, Default)]
pub struct SharedLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl SharedLog {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

/// Minimal page that records its lifecycle calls into a [`SharedLog`].
pub struct ProbePage {
    name: &'static str,
    log: SharedLog,
}

impl ProbePage {
    pub fn new(name: &'static str, log: SharedLog) -> Self {
        Self { name, log }
    }
}

impl Page for ProbePage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn load(&mut self, _ctx: &mut PageContext<'_>) -> Vec<Effect> {
        self.log.record(format!("load:{}", self.name));
        Vec::new()
    }

    fn unload(&mut self, _ctx: &mut PageContext<'_>) {
        self.log.record(format!("unload:{}", self.name));
    }

    fn view(&self) -> PageView {
        PageView::default()
    }
}

/// Notifier that records raised notices instead of displaying them.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub raised: Arc<Mutex<Vec<Notice>>>,
    pub permission: Permission,
    pub fail_delivery: bool,
}

impl Notifier for RecordingNotifier {
    fn probe(&self) -> Permission {
        self.permission
    }

    fn raise(&self, notice: &Notice) -> bool {
        if self.fail_delivery {
            return false;
        }
        self.raised.lock().unwrap().push(notice.clone());
        true
    }
}
