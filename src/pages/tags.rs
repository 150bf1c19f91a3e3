//! Tag administration: the labels that group clients and scope templates.

use serde_json::json;

use crate::api::types::{Envelope, TagInfo};
use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::core::visibility::Region;
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct TagsPage {
    tags: Vec<TagInfo>,
}

impl TagsPage {
    fn refresh(&self, ctx: &PageContext<'_>) -> Effect {
        ctx.fetch("tags:list", "tag_list", json!({}))
    }
}

impl Page for TagsPage {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        ctx.view.upsert(Region::gated("tags:create", &["admin"]));
        vec![self.refresh(ctx)]
    }

    fn on_submit(&mut self, input: &str, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        if let Some(name) = input.strip_prefix("create ") {
            return vec![ctx.fetch("tags:create", "tag_create", json!({"name": name.trim()}))];
        }
        if let Some(id) = input.strip_prefix("delete ") {
            return vec![ctx.fetch("tags:delete", "tag_delete", json!({"id": id.trim()}))];
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
            "tags:list" => {
                self.tags = envelope.list("tags");
                Vec::new()
            }
            "tags:create" => {
                ctx.alerts.info("Tag created");
                vec![self.refresh(ctx)]
            }
            "tags:delete" => {
                ctx.alerts.info("Tag deleted");
                vec![self.refresh(ctx)]
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> PageView {
        let rows = self
            .tags
            .iter()
            .map(|t| vec![t.id.clone(), t.name.clone()])
            .collect();
        PageView {
            title: "Tags".to_string(),
            columns: vec!["Id", "Name"],
            rows,
            hint: "create <name>  ·  delete <id>".to_string(),
        }
    }
}
