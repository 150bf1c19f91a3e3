//! Home: a summary of pending approval work. The first load also probes
//! notification capability, lazily, so the permission prompt never fires
//! before the user has actually reached the console.

use serde_json::json;

use crate::api::types::{ConsensusRequestInfo, Envelope};
use crate::core::action::Effect;
use crate::core::poller::{Permission, PENDING_METHOD};
use crate::core::router::PageContext;
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct HomePage {
    pending: Vec<ConsensusRequestInfo>,
}

impl Page for HomePage {
    fn name(&self) -> &'static str {
        "home"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        let mut effects = vec![ctx.fetch("home:pending", PENDING_METHOD, json!({}))];
        if ctx.notifications.permission == Permission::Unknown {
            effects.push(Effect::ProbeNotifier);
        }
        effects
    }

    fn on_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        _ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        if tag == "home:pending" && envelope.is_ok() {
            self.pending = envelope.list("requests");
        }
        Vec::new()
    }

    fn view(&self) -> PageView {
        let rows = self
            .pending
            .iter()
            .map(|r| {
                vec![
                    r.template_title.clone(),
                    r.requested_by.clone(),
                    format!("{}/{}", r.approvals, r.quorum),
                ]
            })
            .collect();
        PageView {
            title: "Pending approvals".to_string(),
            columns: vec!["Template", "Requested by", "Approvals"],
            rows,
            hint: "open the consensus page to act on a request".to_string(),
        }
    }
}
