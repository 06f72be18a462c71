//! Static action table, one file per category.

mod artifacts;
mod contexts;
mod definitions;
mod insights;
mod legacy;
mod pipelines;
mod projects;
mod schedules;
mod user;
mod webhooks;
mod workflows;

use serde_json::Value;

use super::params::{DefaultValue, ParamDef};
use super::ActionDef;

pub(super) static CATALOG: &[&[ActionDef]] = &[
    pipelines::ACTIONS,
    workflows::ACTIONS,
    artifacts::ACTIONS,
    projects::ACTIONS,
    contexts::ACTIONS,
    schedules::ACTIONS,
    webhooks::ACTIONS,
    definitions::ACTIONS,
    insights::ACTIONS,
    user::ACTIONS,
    legacy::ACTIONS,
];

const TOKEN: ParamDef = ParamDef::string("api_token")
    .required()
    .env(&["CIRCLE_CI_API_TOKEN"])
    .about("CircleCI personal API token");

const PROJECT_SLUG: ParamDef = ParamDef::string("project_slug")
    .required()
    .env(&["CIRCLE_CI_PROJECT_SLUG"])
    .about("Project slug, e.g. gh/org/repo");

const PROJECT_ID: ParamDef = ParamDef::string("project_id")
    .required()
    .env(&["CIRCLE_CI_PROJECT_ID"])
    .about("Project UUID");

const PIPELINE_ID: ParamDef = ParamDef::string("pipeline_id")
    .required()
    .env(&["CIRCLE_CI_PIPELINE_ID"])
    .about("Pipeline UUID");

const WORKFLOW_ID: ParamDef = ParamDef::string("workflow_id")
    .required()
    .env(&["CIRCLE_CI_WORKFLOW_ID"])
    .about("Workflow UUID");

const JOB_NUMBER: ParamDef = ParamDef::integer("job_number")
    .required()
    .env(&["CIRCLE_CI_JOB_NUMBER"])
    .about("Job number within the project");

const CONTEXT_ID: ParamDef = ParamDef::string("context_id")
    .required()
    .env(&["CIRCLE_CI_CONTEXT_ID"])
    .about("Context UUID");

const PIPELINE_DEFINITION_ID: ParamDef = ParamDef::string("pipeline_definition_id")
    .required()
    .about("Pipeline definition UUID");

const TRIGGER_ID: ParamDef = ParamDef::string("trigger_id")
    .required()
    .about("Trigger UUID");

const EMPTY_OBJECT: DefaultValue = DefaultValue::EmptyObject;

fn has_provider(value: &Value) -> std::result::Result<(), String> {
    if value.get("provider").is_some() {
        Ok(())
    } else {
        Err("config_source must contain 'provider'".to_string())
    }
}

fn positive(value: &Value) -> std::result::Result<(), String> {
    match value.as_i64() {
        Some(n) if n > 0 => Ok(()),
        _ => Err("must be greater than zero".to_string()),
    }
}

fn non_negative(value: &Value) -> std::result::Result<(), String> {
    match value.as_i64() {
        Some(n) if n >= 0 => Ok(()),
        _ => Err("must not be negative".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_provider() {
        assert!(has_provider(&json!({"provider": "github_app"})).is_ok());
        assert_eq!(
            has_provider(&json!({"repo": "x"})).unwrap_err(),
            "config_source must contain 'provider'"
        );
    }

    #[test]
    fn test_numeric_checks() {
        assert!(positive(&json!(30)).is_ok());
        assert!(positive(&json!(0)).is_err());
        assert!(non_negative(&json!(0)).is_ok());
        assert!(non_negative(&json!(-1)).is_err());
    }
}
