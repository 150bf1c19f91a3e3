//! Consensus requests: the approval queue. Requesters submit command
//! executions, approvers vote them through, anyone may cancel their own.
//! Submit/approve regions are role-gated per action.

use serde_json::json;

use crate::api::types::{ConsensusRequestInfo, Envelope};
use crate::core::action::Effect;
use crate::core::poller::PENDING_METHOD;
use crate::core::router::PageContext;
use crate::core::visibility::Region;
use crate::pages::{format_timestamp, Page, PageView};

#[derive(Default)]
pub struct ConsensusPage {
    pending: Vec<ConsensusRequestInfo>,
}

impl ConsensusPage {
    fn refresh(&self, ctx: &PageContext<'_>) -> Effect {
        ctx.fetch("consensus:pending", PENDING_METHOD, json!({}))
    }
}

impl Page for ConsensusPage {
    fn name(&self) -> &'static str {
        "consensus"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        ctx.view
            .upsert(Region::gated("consensus:submit", &["requester"]));
        ctx.view
            .upsert(Region::gated("consensus:approve", &["approver"]));
        vec![self.refresh(ctx)]
    }

    fn unload(&mut self, _ctx: &mut PageContext<'_>) {
        // Stale approval counts must not flash on re-entry.
        self.pending.clear();
    }

    fn on_submit(&mut self, input: &str, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        if let Some(rest) = input.strip_prefix("request ") {
            let mut parts = rest.splitn(2, ' ');
            let Some(template_id) = parts.next().filter(|t| !t.is_empty()) else {
                ctx.alerts.error("Usage: request <template id> [reason]");
                return Vec::new();
            };
            let reason = parts.next().unwrap_or("");
            return vec![ctx.fetch(
                "consensus:request",
                "consensus_request",
                json!({"template_id": template_id, "reason": reason}),
            )];
        }
        if let Some(id) = input.strip_prefix("approve ") {
            return vec![ctx.fetch(
                "consensus:approve",
                "consensus_approve",
                json!({"id": id.trim()}),
            )];
        }
        if let Some(id) = input.strip_prefix("cancel ") {
            return vec![ctx.fetch(
                "consensus:cancel",
                "consensus_cancel",
                json!({"id": id.trim()}),
            )];
        }
        ctx.alerts
            .error("Unknown command; try 'request', 'approve' or 'cancel'");
        Vec::new()
    }

    fn on_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        if !envelope.is_ok() {
            return Vec::new();
        }
        match tag {
            "consensus:pending" => {
                self.pending = envelope.list("requests");
                Vec::new()
            }
            "consensus:request" => {
                ctx.alerts.info("Execution requested");
                vec![self.refresh(ctx)]
            }
            "consensus:approve" => {
                ctx.alerts.info("Approval recorded");
                vec![self.refresh(ctx)]
            }
            "consensus:cancel" => {
                ctx.alerts.info("Request cancelled");
                vec![self.refresh(ctx)]
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> PageView {
        let rows = self
            .pending
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.template_title.clone(),
                    r.requested_by.clone(),
                    format!("{}/{}", r.approvals, r.quorum),
                    format_timestamp(&r.created_at),
                ]
            })
            .collect();
        PageView {
            title: "Consensus requests".to_string(),
            columns: vec!["Id", "Template", "Requested by", "Approvals", "Created"],
            rows,
            hint: "request <template> [reason]  ·  approve <id>  ·  cancel <id>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{update, Action};
    use crate::test_support::test_console;

    #[test]
    fn test_load_registers_role_gated_action_regions() {
        let mut console = test_console();
        console.session.login(
            "tok".into(),
            "bob".into(),
            None,
            ["approver".to_string()].into(),
        );

        update(&mut console, Action::Navigate("consensus".into()));

        assert!(console.view.is_visible("consensus:approve"));
        assert!(!console.view.is_visible("consensus:submit"));
    }

    #[test]
    fn test_approve_builds_request() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("consensus".into()));

        let effects = update(&mut console, Action::Submit("approve cr-7".into()));
        match effects.as_slice() {
            [Effect::Request(req)] => {
                assert_eq!(req.method, "consensus_approve");
                assert_eq!(req.body["id"], json!("cr-7"));
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_unload_clears_pending_rows() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("consensus".into()));

        let envelope = serde_json::from_value(json!({
            "status": "OK",
            "requests": [{
                "id": "cr-1", "template_id": "t-1", "template_title": "restart",
                "requested_by": "bob", "approvals": 1, "quorum": 2
            }]
        }))
        .unwrap();
        let generation = console.router.generation();
        update(
            &mut console,
            Action::EnvelopeReceived {
                tag: "consensus:pending".into(),
                generation,
                result: Ok(envelope),
            },
        );
        assert_eq!(
            console.router.active_page().unwrap().view().rows.len(),
            1
        );

        update(&mut console, Action::Navigate("home".into()));
        update(&mut console, Action::Navigate("consensus".into()));
        // Freshly loaded page shows nothing until its fetch completes.
        assert!(console.router.active_page().unwrap().view().rows.is_empty());
    }
}
