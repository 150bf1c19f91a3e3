//! Template management: list, create and delete the command templates that
//! consensus requests execute. Creation and deletion are admin actions; the
//! corresponding regions are role-gated (advisory, the server enforces).

use serde_json::json;

use crate::api::types::{Envelope, TemplateInfo};
use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::core::visibility::Region;
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct TemplatesPage {
    templates: Vec<TemplateInfo>,
}

impl TemplatesPage {
    fn refresh(&self, ctx: &PageContext<'_>) -> Effect {
        ctx.fetch("templates:list", "template_list", json!({}))
    }
}

impl Page for TemplatesPage {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        ctx.view.upsert(Region::gated("templates:create", &["admin"]));
        vec![self.refresh(ctx)]
    }

    fn on_submit(&mut self, input: &str, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        if let Some(rest) = input.strip_prefix("create ") {
            // create <title> | <command> | <quorum> [| tag,tag]
            let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
            let (Some(title), Some(command), Some(quorum)) =
                (fields.first(), fields.get(1), fields.get(2))
            else {
                ctx.alerts
                    .error("Usage: create <title> | <command> | <quorum> [| tag,tag]");
                return Vec::new();
            };
            let Ok(quorum) = quorum.parse::<u32>() else {
                ctx.alerts.error("Quorum must be a number");
                return Vec::new();
            };
            let tags: Vec<&str> = fields
                .get(3)
                .map(|t| t.split(',').map(str::trim).collect())
                .unwrap_or_default();
            return vec![ctx.fetch(
                "templates:create",
                "template_create",
                json!({
                    "title": title,
                    "command": command,
                    "quorum": quorum,
                    "tags": tags,
                }),
            )];
        }
        if let Some(id) = input.strip_prefix("delete ") {
            return vec![ctx.fetch(
                "templates:delete",
                "template_delete",
                json!({"id": id.trim()}),
            )];
        }
        ctx.alerts.error("Unknown command; try 'create' or 'delete'");
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
            "templates:list" => {
                self.templates = envelope.list("templates");
                Vec::new()
            }
            "templates:create" => {
                ctx.alerts.info("Template created");
                vec![self.refresh(ctx)]
            }
            "templates:delete" => {
                ctx.alerts.info("Template deleted");
                vec![self.refresh(ctx)]
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> PageView {
        let rows = self
            .templates
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.title.clone(),
                    t.command.clone(),
                    t.quorum.to_string(),
                    t.tags.join(","),
                ]
            })
            .collect();
        PageView {
            title: "Templates".to_string(),
            columns: vec!["Id", "Title", "Command", "Quorum", "Tags"],
            rows,
            hint: "create <title> | <command> | <quorum> [| tags]  ·  delete <id>".to_string(),
        }
    }
}
