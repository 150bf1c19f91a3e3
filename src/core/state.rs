//! # Console State
//!
//! The constructed aggregate the whole console hangs off: session, router,
//! view model, alerts and notification state are owned here and passed by
//! reference into page lifecycle hooks. All mutation happens through
//! `update()` in `action.rs`, on one thread.

use crate::core::action::Effect;
use crate::core::alert::AlertLog;
use crate::core::poller::NotificationState;
use crate::core::router::{PageRegistry, Router};
use crate::core::session::{SessionBackend, SessionStore};
use crate::core::visibility::ViewModel;

pub struct Console {
    pub session: SessionStore,
    pub router: Router,
    pub view: ViewModel,
    pub alerts: AlertLog,
    pub notifications: NotificationState,
}

impl Console {
    pub fn new(
        registry: PageRegistry,
        view: ViewModel,
        session_backend: Box<dyn SessionBackend>,
    ) -> Self {
        Self {
            session: SessionStore::new(session_backend),
            router: Router::new(registry),
            view,
            alerts: AlertLog::default(),
            notifications: NotificationState::default(),
        }
    }

    pub fn navigate(&mut self, target: &str) -> Vec<Effect> {
        self.router.navigate(
            target,
            &mut self.session,
            &mut self.alerts,
            &mut self.view,
            &mut self.notifications,
        )
    }

    pub fn back(&mut self) -> Vec<Effect> {
        self.router.back(
            &mut self.session,
            &mut self.alerts,
            &mut self.view,
            &mut self.notifications,
        )
    }

    pub fn submit(&mut self, input: &str) -> Vec<Effect> {
        self.router.dispatch_submit(
            input,
            &mut self.session,
            &mut self.alerts,
            &mut self.view,
            &mut self.notifications,
        )
    }

    pub fn dispatch_envelope(&mut self, tag: &str, envelope: &crate::api::types::Envelope) -> Vec<Effect> {
        self.router.dispatch_envelope(
            tag,
            envelope,
            &mut self.session,
            &mut self.alerts,
            &mut self.view,
            &mut self.notifications,
        )
    }
}
