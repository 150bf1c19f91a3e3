//! # Router
//!
//! Owns "current page" state and the navigation state machine. A navigation
//! runs the fixed sequence: parse target → resolve fallback → unload current
//! → view swap (exactly one container visible) → load target → re-apply role
//! visibility. Unload-before-load ordering is mandatory: pages rely on it to
//! drop their subscriptions so repeated entry cannot accumulate duplicate
//! handlers.
//!
//! Each navigation bumps a generation counter. Fetches spawned during `load`
//! are tagged with the generation they were issued under; completions whose
//! generation is stale are discarded by the update loop instead of mutating a
//! page that has since been torn down.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use uuid::Uuid;

use crate::api::types::Envelope;
use crate::core::action::{Effect, FetchRequest};
use crate::core::alert::AlertLog;
use crate::core::poller::NotificationState;
use crate::core::route::{self, RouteState};
use crate::core::session::SessionStore;
use crate::core::visibility::{self, ViewModel};
use crate::pages::Page;

/// Fallback page for unknown targets.
pub const FALLBACK_PAGE: &str = "404";
pub const HOME_PAGE: &str = "home";
pub const LOGIN_PAGE: &str = "login";

/// Everything a page may touch during a lifecycle hook. Handed by reference
/// so pages depend on the router's context, never the other way around.
pub struct PageContext<'a> {
    pub session: &'a mut SessionStore,
    pub alerts: &'a mut AlertLog,
    pub view: &'a mut ViewModel,
    pub notifications: &'a mut NotificationState,
    /// Query parameters of the current route, replaced on every navigation.
    pub params: BTreeMap<String, String>,
    /// Navigation generation fetches issued from this context are tagged with.
    pub generation: u64,
}

impl PageContext<'_> {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Build a fetch effect tagged with this navigation's generation.
    pub fn fetch(&self, tag: &str, method: &str, body: serde_json::Value) -> Effect {
        Effect::Request(FetchRequest {
            id: Uuid::new_v4(),
            tag: tag.to_string(),
            method: method.to_string(),
            body,
            generation: self.generation,
        })
    }
}

#[derive(Debug)]
pub struct DuplicatePage(pub &'static str);

impl fmt::Display for DuplicatePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page '{}' registered twice", self.0)
    }
}

impl std::error::Error for DuplicatePage {}

/// Fixed table of page modules, validated at registration time. Descriptors
/// are never mutated after registration; only their lifecycle hooks run.
#[derive(Default)]
pub struct PageRegistry {
    pages: Vec<Box<dyn Page>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, page: Box<dyn Page>) -> Result<(), DuplicatePage> {
        if self.contains(page.name()) {
            return Err(DuplicatePage(page.name()));
        }
        self.pages.push(page);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pages.iter().any(|p| p.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pages.iter().map(|p| p.name())
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Page>> {
        self.pages.iter_mut().find(|p| p.name() == name)
    }

    fn get(&self, name: &str) -> Option<&dyn Page> {
        self.pages.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }
}

pub struct Router {
    registry: PageRegistry,
    route: RouteState,
    history: Vec<String>,
    generation: u64,
}

impl Router {
    pub fn new(registry: PageRegistry) -> Self {
        Self {
            registry,
            route: RouteState::default(),
            history: Vec::new(),
            generation: 0,
        }
    }

    pub fn route(&self) -> &RouteState {
        &self.route
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `generation` belongs to the navigation currently on screen.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Visited fragments, oldest first; enables back navigation and
    /// deep-link reconstruction.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn active_page(&self) -> Option<&dyn Page> {
        if self.route.current.is_empty() {
            return None;
        }
        self.registry.get(&self.route.current)
    }

    /// Where the console starts: an explicit deep link wins; otherwise home
    /// when a session token survives, else login.
    pub fn initial_target(fragment: Option<&str>, session: &SessionStore) -> String {
        match fragment {
            Some(f) if !f.is_empty() => f.to_string(),
            _ if session.is_authenticated() => HOME_PAGE.to_string(),
            _ => LOGIN_PAGE.to_string(),
        }
    }

    /// Navigate to `target` (`<page>[?k=v&...]`, with or without the `#!`
    /// prefix). Returns the effects emitted by the target page's `load`.
    pub fn navigate(
        &mut self,
        target: &str,
        session: &mut SessionStore,
        alerts: &mut AlertLog,
        view: &mut ViewModel,
        notifications: &mut NotificationState,
    ) -> Vec<Effect> {
        let (page, params) = route::parse_target(target);

        // Unknown page: degrade to the fallback, which carries no params.
        if !self.registry.contains(&page) && page != FALLBACK_PAGE {
            warn!("Unknown page '{}', falling back to {}", page, FALLBACK_PAGE);
            return self.navigate(FALLBACK_PAGE, session, alerts, view, notifications);
        }

        self.generation += 1;
        debug!(
            "Navigating '{}' -> '{}' (generation {})",
            self.route.current, page, self.generation
        );

        // Unload the current page before any view mutation.
        let previous = self.route.current.clone();
        if !previous.is_empty() {
            let mut ctx = PageContext {
                session: &mut *session,
                alerts: &mut *alerts,
                view: &mut *view,
                notifications: &mut *notifications,
                params: self.route.params.clone(),
                generation: self.generation,
            };
            if let Some(prev_page) = self.registry.get_mut(&previous) {
                prev_page.unload(&mut ctx);
            }
        }

        // Route state is replaced, never merged.
        self.route = RouteState {
            current: page.clone(),
            params,
        };
        self.history
            .push(route::encode_fragment(&page, &self.route.params));

        // View swap: exactly one page container visible from here on.
        view.set_active_page(&page);

        let mut effects = Vec::new();
        {
            let mut ctx = PageContext {
                session: &mut *session,
                alerts: &mut *alerts,
                view: &mut *view,
                notifications: &mut *notifications,
                params: self.route.params.clone(),
                generation: self.generation,
            };
            if let Some(target_page) = self.registry.get_mut(&page) {
                effects = target_page.load(&mut ctx);
            }
        }

        // Load may have introduced new gated regions; resync.
        visibility::apply(session, &page, view);

        effects
    }

    /// Navigate to the previously visited fragment, if any.
    pub fn back(
        &mut self,
        session: &mut SessionStore,
        alerts: &mut AlertLog,
        view: &mut ViewModel,
        notifications: &mut NotificationState,
    ) -> Vec<Effect> {
        if self.history.len() < 2 {
            return Vec::new();
        }
        self.history.pop();
        let target = match self.history.pop() {
            Some(t) => t,
            None => return Vec::new(),
        };
        self.navigate(&target, session, alerts, view, notifications)
    }

    /// Hand a submitted input line to the active page.
    pub fn dispatch_submit(
        &mut self,
        input: &str,
        session: &mut SessionStore,
        alerts: &mut AlertLog,
        view: &mut ViewModel,
        notifications: &mut NotificationState,
    ) -> Vec<Effect> {
        let current = self.route.current.clone();
        let mut ctx = PageContext {
            session,
            alerts,
            view,
            notifications,
            params: self.route.params.clone(),
            generation: self.generation,
        };
        match self.registry.get_mut(&current) {
            Some(page) => page.on_submit(input, &mut ctx),
            None => Vec::new(),
        }
    }

    /// Hand a completed fetch to the active page.
    pub fn dispatch_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        session: &mut SessionStore,
        alerts: &mut AlertLog,
        view: &mut ViewModel,
        notifications: &mut NotificationState,
    ) -> Vec<Effect> {
        let current = self.route.current.clone();
        let mut ctx = PageContext {
            session,
            alerts,
            view,
            notifications,
            params: self.route.params.clone(),
            generation: self.generation,
        };
        match self.registry.get_mut(&current) {
            Some(page) => page.on_envelope(tag, envelope, &mut ctx),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::visibility::Region;
    use crate::test_support::{memory_store, ProbePage, SharedLog};

    fn registry_with(names: &[&'static str], log: &SharedLog) -> PageRegistry {
        let mut registry = PageRegistry::new();
        for name in names {
            registry.register(Box::new(ProbePage::new(name, log.clone()))).unwrap();
        }
        registry
            .register(Box::new(ProbePage::new(FALLBACK_PAGE, log.clone())))
            .unwrap();
        registry
    }

    fn view_for(names: &[&'static str]) -> ViewModel {
        let mut regions: Vec<Region> =
            names.iter().map(|n| Region::container(n, &[])).collect();
        regions.push(Region::container(FALLBACK_PAGE, &[]));
        ViewModel::new(regions)
    }

    struct Fixture {
        router: Router,
        session: SessionStore,
        alerts: AlertLog,
        view: ViewModel,
        notifications: NotificationState,
        log: SharedLog,
    }

    fn fixture(names: &[&'static str]) -> Fixture {
        let log = SharedLog::default();
        Fixture {
            router: Router::new(registry_with(names, &log)),
            session: memory_store(),
            alerts: AlertLog::default(),
            view: view_for(names),
            notifications: NotificationState::default(),
            log,
        }
    }

    impl Fixture {
        fn navigate(&mut self, target: &str) -> Vec<Effect> {
            self.router.navigate(
                target,
                &mut self.session,
                &mut self.alerts,
                &mut self.view,
                &mut self.notifications,
            )
        }
    }

    #[test]
    fn test_exactly_one_container_visible_after_navigate() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("home");
        assert_eq!(fx.view.visible_page(), Some("home"));

        fx.navigate("templates");
        assert_eq!(fx.view.visible_page(), Some("templates"));
        let containers_visible = fx
            .view
            .regions()
            .iter()
            .filter(|r| r.page.is_some() && r.visible)
            .count();
        assert_eq!(containers_visible, 1);
    }

    #[test]
    fn test_unload_runs_exactly_once_before_next_load() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("home");
        fx.navigate("templates");

        let events = fx.log.events();
        assert_eq!(
            events,
            vec!["load:home", "unload:home", "load:templates"]
        );
    }

    #[test]
    fn test_unknown_page_falls_back_to_404() {
        let mut fx = fixture(&["home"]);
        fx.navigate("bogus");
        assert_eq!(fx.router.route().current, FALLBACK_PAGE);
        assert_eq!(fx.view.visible_page(), Some(FALLBACK_PAGE));
        // Fallback navigation carries no params.
        assert!(fx.router.route().params.is_empty());
    }

    #[test]
    fn test_unknown_page_with_params_drops_params() {
        let mut fx = fixture(&["home"]);
        fx.navigate("bogus?x=1");
        assert_eq!(fx.router.route().current, FALLBACK_PAGE);
        assert!(fx.router.route().params.is_empty());
    }

    #[test]
    fn test_params_replaced_not_merged() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("templates?id=1&sort=title");
        fx.navigate("home?view=summary");

        let params = &fx.router.route().params;
        assert_eq!(params.get("view").map(String::as_str), Some("summary"));
        assert!(!params.contains_key("id"));
        assert!(!params.contains_key("sort"));
    }

    #[test]
    fn test_unhandled_params_still_reach_the_page() {
        let mut fx = fixture(&["templates"]);
        fx.navigate("templates?foo=bar");
        assert_eq!(fx.router.route().current, "templates");
        assert_eq!(
            fx.router.route().params.get("foo").map(String::as_str),
            Some("bar")
        );
    }

    #[test]
    fn test_generation_bumps_per_navigation() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("home");
        let first = fx.router.generation();
        fx.navigate("templates");
        assert!(fx.router.generation() > first);
        assert!(!fx.router.is_current(first));
    }

    #[test]
    fn test_history_records_fragments() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("home");
        fx.navigate("templates?id=3");
        assert_eq!(
            fx.router.history(),
            &["#!home".to_string(), "#!templates?id=3".to_string()]
        );
    }

    #[test]
    fn test_back_returns_to_previous_page() {
        let mut fx = fixture(&["home", "templates"]);
        fx.navigate("home");
        fx.navigate("templates");
        fx.router.back(
            &mut fx.session,
            &mut fx.alerts,
            &mut fx.view,
            &mut fx.notifications,
        );
        assert_eq!(fx.router.route().current, "home");
        assert_eq!(fx.view.visible_page(), Some("home"));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let log = SharedLog::default();
        let mut registry = PageRegistry::new();
        registry
            .register(Box::new(ProbePage::new("home", log.clone())))
            .unwrap();
        let err = registry.register(Box::new(ProbePage::new("home", log)));
        assert!(err.is_err());
    }

    #[test]
    fn test_initial_target_prefers_fragment() {
        let session = memory_store();
        assert_eq!(
            Router::initial_target(Some("#!templates?id=1"), &session),
            "#!templates?id=1"
        );
    }

    #[test]
    fn test_initial_target_login_when_logged_out() {
        let session = memory_store();
        assert_eq!(Router::initial_target(None, &session), LOGIN_PAGE);
    }

    #[test]
    fn test_initial_target_home_when_authenticated() {
        let mut session = memory_store();
        session.login("tok".into(), "alice".into(), None, Default::default());
        assert_eq!(Router::initial_target(None, &session), HOME_PAGE);
    }
}
