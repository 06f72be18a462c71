use serde_json::Value;

use super::{JOB_NUMBER, PROJECT_SLUG, TOKEN, WORKFLOW_ID};
use crate::actions::params::{DefaultValue, ParamDef, ResolvedParams};
use crate::actions::{
    AckField, ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape,
};
use crate::links;

const RERUN_BODY: &[Binding] = &[Binding::same("from_failed"), Binding::same("sparse_tree")];

const CANCEL_ACK: &[AckField] = &[AckField::response("message", "message")];

const APPROVE_ACK: &[AckField] = &[AckField::literal("message", "Job approved")];

/// Web URL built from the `project_slug`, `pipeline_number` and `id` a
/// workflow response carries.
fn workflow_url(_params: &ResolvedParams, response: &Value) -> Option<Value> {
    let slug = response.get("project_slug")?.as_str()?;
    let number = response.get("pipeline_number")?.as_u64()?;
    let id = response.get("id")?.as_str()?;
    Some(Value::String(links::workflow_url(slug, number, id)))
}

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_get_workflow",
        category: Category::Workflows,
        description: "Get a workflow by ID",
        params: &[TOKEN, WORKFLOW_ID],
        handler: Handler::Rest(RestCall::get("workflow/{workflow_id}")),
        outputs: &[
            Output::result("CIRCLECI_WORKFLOW"),
            Output::derived("CIRCLECI_WORKFLOW_URL", workflow_url),
        ],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_jobs",
        category: Category::Workflows,
        description: "List the jobs of a workflow",
        params: &[TOKEN, WORKFLOW_ID],
        handler: Handler::Rest(
            RestCall::get("workflow/{workflow_id}/job").returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_JOBS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_cancel_workflow",
        category: Category::Workflows,
        description: "Cancel a running workflow",
        params: &[TOKEN, WORKFLOW_ID],
        handler: Handler::Rest(
            RestCall::post("workflow/{workflow_id}/cancel").returns(ResultShape::Ack(CANCEL_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_CANCELED_WORKFLOW")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_rerun_workflow",
        category: Category::Workflows,
        description: "Rerun a workflow, by default from its failed jobs",
        params: &[
            TOKEN,
            WORKFLOW_ID,
            ParamDef::bool("from_failed")
                .env(&["CIRCLE_CI_WORKFLOW_FROM_FAILED"])
                .default(DefaultValue::Bool(true))
                .about("Rerun only the failed jobs"),
            ParamDef::bool("sparse_tree")
                .env(&["CIRCLE_CI_WORKFLOW_SPARSE_TREE"])
                .default(DefaultValue::Bool(false))
                .about("Rerun only the selected jobs and their dependencies"),
        ],
        handler: Handler::Rest(RestCall::post("workflow/{workflow_id}/rerun").body(RERUN_BODY)),
        outputs: &[Output::field("CIRCLECI_RERUN_WORKFLOW_ID", "workflow_id")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_approve_job",
        category: Category::Workflows,
        description: "Approve a pending approval job",
        params: &[
            TOKEN,
            WORKFLOW_ID,
            ParamDef::string("approval_request_id")
                .required()
                .env(&["CIRCLE_CI_APPROVAL_REQUEST_ID"])
                .about("ID of the approval job"),
        ],
        handler: Handler::Rest(
            RestCall::post("workflow/{workflow_id}/approve/{approval_request_id}")
                .empty_body()
                .returns(ResultShape::Ack(APPROVE_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_APPROVED_JOB")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_job_details",
        category: Category::Workflows,
        description: "Get the details of a job",
        params: &[TOKEN, PROJECT_SLUG, JOB_NUMBER],
        handler: Handler::Rest(RestCall::get("project/{project_slug}/job/{job_number}")),
        outputs: &[Output::result("CIRCLECI_JOB_DETAILS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_cancel_job",
        category: Category::Workflows,
        description: "Cancel a running job",
        params: &[TOKEN, PROJECT_SLUG, JOB_NUMBER],
        handler: Handler::Rest(
            RestCall::post("project/{project_slug}/job/{job_number}/cancel")
                .empty_body()
                .returns(ResultShape::Ack(CANCEL_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_CANCELED_JOB")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_job_tests",
        category: Category::Workflows,
        description: "Get the test metadata of a job",
        params: &[TOKEN, PROJECT_SLUG, JOB_NUMBER],
        handler: Handler::Rest(RestCall::get("project/{project_slug}/{job_number}/tests")),
        outputs: &[Output::result("CIRCLECI_JOB_TESTS")],
        prepare: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_url_from_response() {
        let response = json!({
            "id": "wf-1",
            "project_slug": "gh/acme/app",
            "pipeline_number": 42,
            "status": "running"
        });
        assert_eq!(
            workflow_url(&ResolvedParams::default(), &response),
            Some(json!("https://app.circleci.com/pipelines/gh/acme/app/42/workflows/wf-1"))
        );
        assert_eq!(
            workflow_url(&ResolvedParams::default(), &json!({"id": "wf-1"})),
            None
        );
    }
}
