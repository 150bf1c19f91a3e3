//! Execution logs and dispatch history for one consensus request, selected
//! via the `id` route parameter (`logs?id=<request>`).

use serde_json::json;

use crate::api::types::{DispatchRecord, Envelope, LogEntry};
use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::pages::{format_timestamp, Page, PageView};

#[derive(Default)]
pub struct LogsPage {
    request_id: Option<String>,
    entries: Vec<LogEntry>,
    dispatches: Vec<DispatchRecord>,
}

impl Page for LogsPage {
    fn name(&self) -> &'static str {
        "logs"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        self.entries.clear();
        self.dispatches.clear();
        self.request_id = ctx.param("id").map(str::to_string);

        let Some(ref id) = self.request_id else {
            return Vec::new();
        };
        vec![
            ctx.fetch("logs:entries", "execution_logs", json!({"request_id": id})),
            ctx.fetch("logs:dispatch", "dispatch_history", json!({"request_id": id})),
        ]
    }

    fn on_envelope(
        &mut self,
        tag: &str,
        envelope: &Envelope,
        _ctx: &mut PageContext<'_>,
    ) -> Vec<Effect> {
        if !envelope.is_ok() {
            return Vec::new();
        }
        match tag {
            "logs:entries" => self.entries = envelope.list("logs"),
            "logs:dispatch" => self.dispatches = envelope.list("dispatches"),
            _ => {}
        }
        Vec::new()
    }

    fn view(&self) -> PageView {
        let title = match self.request_id {
            Some(ref id) => format!("Logs for {id}"),
            None => "Logs".to_string(),
        };
        let mut rows: Vec<Vec<String>> = self
            .dispatches
            .iter()
            .map(|d| {
                vec![
                    d.client_id.clone(),
                    "dispatch".to_string(),
                    format!("{} ({})", d.state, format_timestamp(&d.dispatched_at)),
                ]
            })
            .collect();
        rows.extend(self.entries.iter().map(|e| {
            vec![e.client_id.clone(), e.stream.clone(), e.line.clone()]
        }));
        PageView {
            title,
            columns: vec!["Client", "Stream", "Line"],
            rows,
            hint: "open via logs?id=<request id>".to_string(),
        }
    }
}
