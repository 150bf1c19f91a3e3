//! # Page Modules
//!
//! Each page is a named, independently loadable/unloadable unit bound to one
//! router state. Pages depend on the router's [`PageContext`] and emit fetch
//! effects; the router never depends on a concrete page. Business pages are
//! deliberately thin table/form modules over the core's output.

pub mod clients;
pub mod consensus;
pub mod home;
pub mod login;
pub mod logs;
pub mod not_found;
pub mod tags;
pub mod templates;
pub mod users;

use chrono::{DateTime, Local};

use crate::api::types::Envelope;
use crate::core::action::Effect;
use crate::core::router::{DuplicatePage, PageContext, PageRegistry};
use crate::core::visibility::{Region, ViewModel};

/// Render a server RFC 3339 timestamp in local time for table cells.
/// Unparseable or missing timestamps pass through as-is.
pub(crate) fn format_timestamp(ts: &Option<String>) -> String {
    let Some(ts) = ts else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(ts) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => ts.clone(),
    }
}

/// Presentation-agnostic snapshot of a page: the TUI renders this without
/// knowing anything about the page behind it.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    /// One-line usage hint shown next to the input bar.
    pub hint: String,
}

/// The `{load, unload?}` lifecycle contract. `load`/`unload` may run many
/// times over a page's navigational lifetime; registration happens once.
pub trait Page {
    fn name(&self) -> &'static str;

    /// Called when the page becomes active. Returns fetch effects tagged
    /// with the current navigation generation.
    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect>;

    /// Called before the view swap when the page is left. Pages drop any
    /// acquired subscriptions and transient state here.
    fn unload(&mut self, _ctx: &mut PageContext<'_>) {}

    /// An input line submitted while this page is active.
    fn on_submit(&mut self, _input: &str, _ctx: &mut PageContext<'_>) -> Vec<Effect> {
        Vec::new()
    }

    /// A completed fetch for this page. Only called for envelopes whose
    /// generation is still current.
    fn on_envelope(
        &mut self,
        _tag: &str,
        _envelope: &Envelope,
        _ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        Vec::new()
    }

    fn view(&self) -> PageView;
}

/// Page name, required roles, and menu label for the standard chrome.
pub fn page_defs() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("login", &[]),
        ("home", &[]),
        ("clients", &[]),
        ("tags", &["admin"]),
        ("templates", &[]),
        ("consensus", &[]),
        ("logs", &[]),
        ("users", &["admin"]),
        ("404", &[]),
    ]
}

/// The full registry used in production.
pub fn default_registry() -> Result<PageRegistry, DuplicatePage> {
    let mut registry = PageRegistry::new();
    registry.register(Box::new(login::LoginPage::default()))?;
    registry.register(Box::new(home::HomePage::default()))?;
    registry.register(Box::new(clients::ClientsPage::default()))?;
    registry.register(Box::new(tags::TagsPage::default()))?;
    registry.register(Box::new(templates::TemplatesPage::default()))?;
    registry.register(Box::new(consensus::ConsensusPage::default()))?;
    registry.register(Box::new(logs::LogsPage::default()))?;
    registry.register(Box::new(users::UsersPage::default()))?;
    registry.register(Box::new(not_found::NotFoundPage::default()))?;
    Ok(registry)
}

/// The standard chrome: one container per page plus a role-gated menu entry
/// each. Pages add their own action regions during `load`.
pub fn standard_view() -> ViewModel {
    let mut regions = Vec::new();
    for (name, roles) in page_defs() {
        regions.push(Region::container(name, roles));
        if name != "login" && name != "404" {
            regions.push(Region::gated(&format!("nav:{name}"), roles));
        }
    }
    ViewModel::new(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_every_page() {
        let registry = default_registry().unwrap();
        for (name, _) in page_defs() {
            assert!(registry.contains(name), "missing page {name}");
        }
    }

    #[test]
    fn test_format_timestamp_passes_garbage_through() {
        assert_eq!(format_timestamp(&None), "");
        assert_eq!(
            format_timestamp(&Some("yesterday-ish".to_string())),
            "yesterday-ish"
        );
    }

    #[test]
    fn test_format_timestamp_parses_rfc3339() {
        let out = format_timestamp(&Some("2026-08-24T10:00:00Z".to_string()));
        // Rendered in local time; only the shape is stable across zones.
        assert_eq!(out.len(), "2026-08-24 10:00:00".len());
        assert!(out.starts_with("2026-08-2"));
    }

    #[test]
    fn test_standard_view_has_one_container_per_page() {
        let view = standard_view();
        let containers = view.regions().iter().filter(|r| r.page.is_some()).count();
        assert_eq!(containers, page_defs().len());
    }
}
