//! Login form: authenticates against the `auth` method and seeds the
//! session store on success.

use std::collections::BTreeSet;

use log::info;
use serde_json::json;

use crate::api::types::{AuthUser, Envelope};
use crate::core::action::Effect;
use crate::core::router::{PageContext, HOME_PAGE};
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct LoginPage;

impl Page for LoginPage {
    fn name(&self) -> &'static str {
        "login"
    }

    fn load(&mut self, _ctx: &mut PageContext<'_>) -> Vec<Effect> {
        Vec::new()
    }

    fn on_submit(&mut self, input: &str, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        let mut parts = input.split_whitespace();
        let (Some(username), Some(password)) = (parts.next(), parts.next()) else {
            ctx.alerts
                .error("Usage: <username> <password> [two-factor token]");
            return Vec::new();
        };
        let token = parts.next().unwrap_or("");

        vec![ctx.fetch(
            "login:auth",
            "auth",
            json!({
                "username": username,
                "password": password,
                "token": token,
            }),
        )]
    }

    fn on_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        if tag != "login:auth" || !envelope.is_ok() {
            return Vec::new();
        }

        let token = envelope
            .field("session_token")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let Some(user) = envelope.object::<AuthUser>("user") else {
            ctx.alerts.error("Malformed auth response");
            return Vec::new();
        };
        if token.is_empty() {
            ctx.alerts.error("Malformed auth response");
            return Vec::new();
        }

        let roles: BTreeSet<String> = user.roles.iter().cloned().collect();
        info!("Authenticated as '{}' with roles {:?}", user.username, roles);
        ctx.session
            .login(token.to_string(), user.username.clone(), Some(user.id), roles);
        ctx.alerts.info(format!("Welcome, {}", user.username));

        vec![Effect::Navigate(HOME_PAGE.to_string())]
    }

    fn view(&self) -> PageView {
        PageView {
            title: "Login".to_string(),
            columns: vec![],
            rows: vec![],
            hint: "<username> <password> [two-factor token]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{update, Action};
    use crate::test_support::test_console;
    use serde_json::json;

    #[test]
    fn test_submit_builds_auth_request() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("login".into()));

        let effects = update(&mut console, Action::Submit("alice secret 123456".into()));
        match effects.as_slice() {
            [Effect::Request(req)] => {
                assert_eq!(req.method, "auth");
                assert_eq!(req.tag, "login:auth");
                assert_eq!(req.body["username"], json!("alice"));
                assert_eq!(req.body["token"], json!("123456"));
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_submit_without_password_alerts() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("login".into()));
        let effects = update(&mut console, Action::Submit("alice".into()));
        assert!(effects.is_empty());
        assert!(!console.alerts.is_empty());
    }

    #[test]
    fn test_successful_auth_logs_in_and_navigates_home() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("login".into()));

        let envelope = serde_json::from_value(json!({
            "status": "OK",
            "session_token": "tok-1",
            "user": {"id": "u-1", "username": "alice", "roles": ["admin", "approver"]}
        }))
        .unwrap();
        let generation = console.router.generation();
        let effects = update(
            &mut console,
            Action::EnvelopeReceived {
                tag: "login:auth".into(),
                generation,
                result: Ok(envelope),
            },
        );

        assert!(console.session.is_authenticated());
        assert_eq!(console.session.session().username, "alice");
        assert!(console.session.has_all_roles(["admin", "approver"]));
        assert!(matches!(effects.as_slice(), [Effect::Navigate(p)] if p == "home"));
    }

    #[test]
    fn test_malformed_auth_response_alerts() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("login".into()));

        let envelope = serde_json::from_value(json!({"status": "OK"})).unwrap();
        let generation = console.router.generation();
        let effects = update(
            &mut console,
            Action::EnvelopeReceived {
                tag: "login:auth".into(),
                generation,
                result: Ok(envelope),
            },
        );

        assert!(effects.is_empty());
        assert!(!console.session.is_authenticated());
        assert!(!console.alerts.is_empty());
    }
}
