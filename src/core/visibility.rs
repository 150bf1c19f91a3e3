//! # Role Visibility
//!
//! Computes which view regions are shown for the current session. Regions
//! carry a required-role annotation; a region is shown iff the session holds
//! every required role. Regions that are page containers additionally
//! intersect with "is this the active page".
//!
//! Policy: when the session has zero roles (pre-login) the role computation
//! is skipped entirely and regions keep their default-open state, rather than
//! hiding everything until roles are known. This is advisory UI sugar only;
//! the server is the authorization authority.

use crate::core::session::SessionStore;

/// A named view region, optionally bound to a page container.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    /// Roles required to see this region. Empty means no gating.
    pub roles: Vec<String>,
    /// Set when this region is the container of a page; visibility then also
    /// requires the page to be active.
    pub page: Option<String>,
    pub visible: bool,
}

impl Region {
    pub fn gated(id: &str, roles: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            page: None,
            visible: true,
        }
    }

    pub fn container(page: &str, roles: &[&str]) -> Self {
        Self {
            id: format!("page:{page}"),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            page: Some(page.to_string()),
            visible: false,
        }
    }
}

/// The full set of regions the console can show. Page containers start
/// hidden (no page is active before the first navigation); everything else
/// starts shown, matching the default-open policy.
#[derive(Debug, Default)]
pub struct ViewModel {
    regions: Vec<Region>,
}

impl ViewModel {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Add a region, replacing any existing region with the same id. Pages
    /// use this during `load` to introduce role-gated regions of their own.
    pub fn upsert(&mut self, region: Region) {
        self.regions.retain(|r| r.id != region.id);
        self.regions.push(region);
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.regions.iter().any(|r| r.id == id && r.visible)
    }

    /// Mark exactly one page container visible: the one for `page`. Runs as
    /// part of the navigation view swap, before role gating is re-applied.
    pub fn set_active_page(&mut self, page: &str) {
        for region in &mut self.regions {
            if let Some(ref container) = region.page {
                region.visible = container == page;
            }
        }
    }

    /// The page container currently visible, if any.
    pub fn visible_page(&self) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.page.is_some() && r.visible)
            .and_then(|r| r.page.as_deref())
    }
}

/// Resync every region against the session's role set. Called after each
/// navigation completes, because page `load` may have introduced new gated
/// regions.
pub fn apply(session: &SessionStore, active_page: &str, view: &mut ViewModel) {
    if session.session().roles.is_empty() {
        // Pre-login: gating inactive, regions keep their default-open state.
        return;
    }
    for region in &mut view.regions {
        let mut shown = session.has_all_roles(region.roles.iter().map(String::as_str));
        if let Some(ref page) = region.page {
            shown = shown && page == active_page;
        }
        region.visible = shown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logged_in_store, memory_store};

    fn view_with(regions: Vec<Region>) -> ViewModel {
        ViewModel::new(regions)
    }

    #[test]
    fn test_shown_iff_required_subset_of_roles() {
        let store = logged_in_store(&["requester", "approver"]);
        let mut view = view_with(vec![
            Region::gated("consensus:approve", &["approver"]),
            Region::gated("users:create", &["admin"]),
            Region::gated("consensus:submit", &["requester", "approver"]),
        ]);

        apply(&store, "home", &mut view);

        assert!(view.is_visible("consensus:approve"));
        assert!(!view.is_visible("users:create"));
        assert!(view.is_visible("consensus:submit"));
    }

    #[test]
    fn test_ungated_region_always_shown() {
        let store = logged_in_store(&["requester"]);
        let mut view = view_with(vec![Region::gated("nav:home", &[])]);
        apply(&store, "home", &mut view);
        assert!(view.is_visible("nav:home"));
    }

    #[test]
    fn test_empty_role_set_defaults_open() {
        let store = memory_store();
        let mut view = view_with(vec![Region::gated("users:create", &["admin"])]);

        apply(&store, "home", &mut view);

        // Gating is inactive pre-login: the region keeps its default-open state.
        assert!(view.is_visible("users:create"));
    }

    #[test]
    fn test_page_container_intersects_with_active_page() {
        let store = logged_in_store(&["admin"]);
        let mut view = view_with(vec![
            Region::container("users", &["admin"]),
            Region::container("home", &[]),
        ]);

        view.set_active_page("users");
        apply(&store, "users", &mut view);

        assert!(view.is_visible("page:users"));
        assert!(!view.is_visible("page:home"));
        assert_eq!(view.visible_page(), Some("users"));
    }

    #[test]
    fn test_container_hidden_without_required_role() {
        let store = logged_in_store(&["requester"]);
        let mut view = view_with(vec![Region::container("users", &["admin"])]);

        view.set_active_page("users");
        apply(&store, "users", &mut view);

        assert!(!view.is_visible("page:users"));
    }

    #[test]
    fn test_set_active_page_shows_exactly_one_container() {
        let mut view = view_with(vec![
            Region::container("home", &[]),
            Region::container("templates", &[]),
            Region::container("404", &[]),
        ]);

        view.set_active_page("templates");
        let visible: Vec<_> = view
            .regions()
            .iter()
            .filter(|r| r.page.is_some() && r.visible)
            .collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(view.visible_page(), Some("templates"));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut view = view_with(vec![Region::gated("x", &["admin"])]);
        view.upsert(Region::gated("x", &["approver"]));
        assert_eq!(view.regions().len(), 1);
        assert_eq!(view.regions()[0].roles, vec!["approver".to_string()]);
    }
}
