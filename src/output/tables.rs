use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};
use serde_json::Value;

use crate::actions::params::ParamDef;
use crate::actions::ActionDef;
use crate::context::RunContext;

/// Longest value preview shown in a context table cell.
const PREVIEW_CHARS: usize = 60;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// One row per action: name, category and description.
pub fn actions_table<'a>(actions: impl IntoIterator<Item = &'a ActionDef>) -> Table {
    let mut table = create_table();
    table.set_header(cyan_header(&["Action", "Category", "Description"]));
    for action in actions {
        table.add_row(vec![
            Cell::new(action.name),
            Cell::new(action.category.as_str()).fg(TableColor::DarkGrey),
            Cell::new(action.description),
        ]);
    }
    table
}

pub fn params_table(params: &[ParamDef]) -> Table {
    let mut table = create_table();
    table.set_header(cyan_header(&["Parameter", "Type", "Required", "Env", "Default"]));
    for param in params {
        let required = if param.required {
            Cell::new("yes").fg(TableColor::Yellow)
        } else {
            Cell::new("no")
        };
        let default = param
            .default
            .map(|value| value.to_value().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(param.key),
            Cell::new(param.kind.to_string()),
            required,
            Cell::new(param.env.join("\n")),
            Cell::new(default),
        ]);
    }
    table
}

pub fn context_table(ctx: &RunContext) -> Table {
    let mut table = create_table();
    table.set_header(cyan_header(&["Context key", "Value"]));
    for (key, value) in ctx.iter() {
        table.add_row(vec![Cell::new(key), Cell::new(preview(value))]);
    }
    table
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let mut short: String = text.chars().take(PREVIEW_CHARS).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_truncates_long_values() {
        assert_eq!(preview(&json!("abc")), "abc");
        assert_eq!(preview(&json!(42)), "42");

        let long = "x".repeat(100);
        let shown = preview(&json!(long));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn test_context_table_lists_every_key() {
        let mut ctx = RunContext::new();
        ctx.set("CIRCLECI_PIPELINE_ID", json!("abc"));
        ctx.set("CIRCLECI_PIPELINE_NUMBER", json!(7));

        let rendered = context_table(&ctx).to_string();
        assert!(rendered.contains("CIRCLECI_PIPELINE_ID"));
        assert!(rendered.contains("CIRCLECI_PIPELINE_NUMBER"));
    }
}
