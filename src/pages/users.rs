//! User administration: list, create and delete console users. Admin only;
//! the whole page container is role-gated.

use serde_json::json;

use crate::api::types::{Envelope, UserInfo};
use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::core::visibility::Region;
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct UsersPage {
    users: Vec<UserInfo>,
}

impl UsersPage {
    fn refresh(&self, ctx: &PageContext<'_>) -> Effect {
        ctx.fetch("users:list", "user_list", json!({}))
    }
}

impl Page for UsersPage {
    fn name(&self) -> &'static str {
        "users"
    }

    fn load(&mut self, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        ctx.view.upsert(Region::gated("users:create", &["admin"]));
        vec![self.refresh(ctx)]
    }

    fn on_submit(&mut self, input: &str, ctx: &mut PageContext<'_>) -> Vec<Effect> {
        if let Some(rest) = input.strip_prefix("create ") {
            let mut parts = rest.split_whitespace();
            let (Some(username), Some(password)) = (parts.next(), parts.next()) else {
                ctx.alerts
                    .error("Usage: create <username> <password> [role,role]");
                return Vec::new();
            };
            let roles: Vec<&str> = parts
                .next()
                .map(|r| r.split(',').collect())
                .unwrap_or_default();
            return vec![ctx.fetch(
                "users:create",
                "user_create",
                json!({
                    "username": username,
                    "password": password,
                    "roles": roles,
                }),
            )];
        }
        if let Some(id) = input.strip_prefix("delete ") {
            return vec![ctx.fetch("users:delete", "user_delete", json!({"id": id.trim()}))];
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
            "users:list" => {
                self.users = envelope.list("users");
                Vec::new()
            }
            "users:create" => {
                ctx.alerts.info("User created");
                vec![self.refresh(ctx)]
            }
            "users:delete" => {
                ctx.alerts.info("User deleted");
                vec![self.refresh(ctx)]
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> PageView {
        let rows = self
            .users
            .iter()
            .map(|u| {
                vec![
                    u.id.clone(),
                    u.username.clone(),
                    u.roles.join(","),
                    if u.enabled { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        PageView {
            title: "Users".to_string(),
            columns: vec!["Id", "Username", "Roles", "Enabled"],
            rows,
            hint: "create <username> <password> [roles]  ·  delete <id>".to_string(),
        }
    }
}
