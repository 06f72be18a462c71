use std::fmt::Write;

use serde_json::Value;

use crate::actions::ActionDef;
use crate::context::RunContext;

use super::styling::{bright, dim, state};
use super::tables::{context_table, params_table};

/// Prints what a run left in the context to stderr, so stdout stays JSON.
pub fn print_run_summary(action: &ActionDef, result: &Value, ctx: &RunContext) {
    eprintln!("{}", render_run_summary(action, result, ctx));
}

pub fn print_action_details(action: &ActionDef) {
    println!("{}", render_action_details(action));
}

fn render_run_summary(action: &ActionDef, result: &Value, ctx: &RunContext) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", bright(action.name).underlined());

    // Wait results and download summaries carry a status worth highlighting.
    if let Some(status) = result.get("status").and_then(Value::as_str) {
        let _ = writeln!(output, "  status: {}", state(status));
    }
    if let Some(count) = result.get("downloaded_artifacts").and_then(Value::as_array) {
        let _ = writeln!(output, "  downloaded: {} file(s)", count.len());
    }

    if ctx.is_empty() {
        let _ = writeln!(output, "  {}", dim("no context keys set"));
    } else {
        let _ = writeln!(output, "{}", context_table(ctx));
    }
    output
}

fn render_action_details(action: &ActionDef) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} {}",
        bright(action.name).underlined(),
        dim(format!("({})", action.category))
    );
    let _ = writeln!(output, "  {}\n", action.description);
    let _ = writeln!(output, "{}", params_table(action.params));

    if !action.outputs.is_empty() {
        let keys: Vec<&str> = action.outputs.iter().map(|output| output.key).collect();
        let _ = writeln!(output, "Context keys: {}", keys.join(", "));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;
    use serde_json::json;

    #[test]
    fn test_details_list_params_and_outputs() {
        let action = actions::find("circleci_trigger_pipeline").unwrap();
        let rendered = render_action_details(action);

        assert!(rendered.contains("project_slug"));
        assert!(rendered.contains("CIRCLE_CI_BRANCH"));
        assert!(rendered.contains("CIRCLECI_PIPELINE_URL"));
    }

    #[test]
    fn test_run_summary_without_context() {
        let action = actions::find("circleci_get_user_info").unwrap();
        let rendered = render_run_summary(action, &json!({"login": "me"}), &RunContext::new());
        assert!(rendered.contains("no context keys set"));
    }
}
