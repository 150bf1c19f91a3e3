//! Fallback page for unknown navigation targets.

use crate::core::action::Effect;
use crate::core::router::PageContext;
use crate::pages::{Page, PageView};

#[derive(Default)]
pub struct NotFoundPage;

impl Page for NotFoundPage {
    fn name(&self) -> &'static str {
        "404"
    }

    fn load(&mut self, _ctx: &mut PageContext<'_>) -> Vec<Effect> {
        Vec::new()
    }

    fn view(&self) -> PageView {
        PageView {
            title: "Page not found".to_string(),
            columns: vec![],
            rows: vec![],
            hint: "press a menu key to continue".to_string(),
        }
    }
}
