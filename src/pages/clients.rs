//! Client inventory: the machines registered with the server and the tags
//! assigned to them. Read-only.

use serde_json::json;

use crate::api::types::{ClientInfo, Envelope};
use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::pages::{format_timestamp, Page, PageView};

#[derive(Default)]
pub struct ClientsPage {
    clients: Vec<ClientInfo>,
}

impl Page for ClientsPage {
    fn name(&self) -> &'static str {
        "clients"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        vec![ctx.fetch("clients:list", "client_list", json!({}))]
    }

    fn on_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        _ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        if tag == "clients:list" && envelope.is_ok() {
            self.clients = envelope.list("clients");
        }
        Vec::new()
    }

    fn view(&self) -> PageView {
        let rows = self
            .clients
            .iter()
            .map(|c| {
                vec![
                    c.id.clone(),
                    c.hostname.clone(),
                    c.tags.join(","),
                    format_timestamp(&c.last_seen),
                ]
            })
            .collect();
        PageView {
            title: "Clients".to_string(),
            columns: vec!["Id", "Hostname", "Tags", "Last seen"],
            rows,
            hint: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{update, Action};
    use crate::test_support::test_console;

    #[test]
    fn test_list_envelope_fills_rows() {
        let mut console = test_console();
        update(&mut console, Action::Navigate("clients".into()));

        let envelope = serde_json::from_value(json!({
            "status": "OK",
            "clients": [
                {"id": "c-1", "hostname": "web01", "tags": ["web"], "last_seen": "2026-08-24T10:00:00Z"}
            ]
        }))
        .unwrap();
        let generation = console.router.generation();
        update(
            &mut console,
            Action::EnvelopeReceived {
                tag: "clients:list".into(),
                generation,
                result: Ok(envelope),
            },
        );

        let view = console.router.active_page().unwrap().view();
        assert_eq!(view.rows[0][1], "web01");
    }
}
