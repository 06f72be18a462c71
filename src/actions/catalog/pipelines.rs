use serde_json::Value;

use super::{positive, non_negative, EMPTY_OBJECT, PIPELINE_ID, PROJECT_SLUG, TOKEN};
use crate::actions::params::{DefaultValue, ParamDef, ResolvedParams};
use crate::actions::{ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape};
use crate::links;
use crate::poller::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS};

const TRIGGER_BODY: &[Binding] = &[
    Binding::same("branch"),
    Binding::same("parameters").omit_empty(),
];

const CONTINUE_BODY: &[Binding] = &[
    Binding::new("pipeline-id", "pipeline_id"),
    Binding::same("parameters"),
];

const ORG_SLUG_QUERY: &[Binding] = &[Binding::new("org-slug", "org_slug")];

fn pipeline_url(params: &ResolvedParams, response: &Value) -> Option<Value> {
    let slug = params.str("project_slug")?;
    let number = response.get("number")?.as_u64()?;
    Some(Value::String(links::pipeline_url(slug, number)))
}

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_trigger_pipeline",
        category: Category::Pipelines,
        description: "Trigger a new pipeline on a branch",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::string("branch")
                .required()
                .env(&["CIRCLE_CI_BRANCH"])
                .default(DefaultValue::Str("main"))
                .about("Branch to build"),
            ParamDef::object("parameters")
                .env(&["CIRCLE_CI_PIPELINE_PARAMETERS"])
                .default(EMPTY_OBJECT)
                .about("Pipeline parameters"),
        ],
        handler: Handler::Rest(
            RestCall::post("project/{project_slug}/pipeline").body(TRIGGER_BODY),
        ),
        outputs: &[
            Output::field("CIRCLECI_PIPELINE_ID", "id"),
            Output::field("CIRCLECI_PIPELINE_NUMBER", "number"),
            Output::derived("CIRCLECI_PIPELINE_URL", pipeline_url),
        ],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_pipeline",
        category: Category::Pipelines,
        description: "Get a pipeline by ID",
        params: &[TOKEN, PIPELINE_ID],
        handler: Handler::Rest(RestCall::get("pipeline/{pipeline_id}")),
        outputs: &[Output::result("CIRCLECI_PIPELINE")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_pipeline_by_number",
        category: Category::Pipelines,
        description: "Get a pipeline by its project-scoped number",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::integer("pipeline_number")
                .required()
                .env(&["CIRCLE_CI_PIPELINE_NUMBER"])
                .about("Pipeline number"),
        ],
        handler: Handler::Rest(RestCall::get(
            "project/{project_slug}/pipeline/{pipeline_number}",
        )),
        outputs: &[Output::result("CIRCLECI_PIPELINE_BY_NUMBER")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_pipeline_config",
        category: Category::Pipelines,
        description: "Get the source and compiled configuration of a pipeline",
        params: &[TOKEN, PIPELINE_ID],
        handler: Handler::Rest(RestCall::get("pipeline/{pipeline_id}/config")),
        outputs: &[Output::result("CIRCLECI_PIPELINE_CONFIG")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_pipeline_workflows",
        category: Category::Pipelines,
        description: "List the workflows of a pipeline",
        params: &[TOKEN, PIPELINE_ID],
        handler: Handler::Rest(
            RestCall::get("pipeline/{pipeline_id}/workflow").returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_PIPELINE_WORKFLOWS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_my_pipelines",
        category: Category::Pipelines,
        description: "List recent pipelines triggered by the current user",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(
            RestCall::get("project/{project_slug}/pipeline/mine").returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_MY_PIPELINES")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_list_all_pipelines",
        category: Category::Pipelines,
        description: "List recent pipelines across an organization",
        params: &[
            TOKEN,
            ParamDef::string("org_slug")
                .env(&["CIRCLE_CI_ORG_SLUG"])
                .about("Organization slug, e.g. gh/org"),
        ],
        handler: Handler::Rest(RestCall::get("pipeline").query(ORG_SLUG_QUERY)),
        outputs: &[Output::result("CIRCLECI_ALL_PIPELINES")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_continue_pipeline",
        category: Category::Pipelines,
        description: "Continue a pipeline from its setup phase",
        params: &[
            TOKEN,
            PIPELINE_ID,
            ParamDef::object("parameters").about("Pipeline parameters"),
        ],
        handler: Handler::Rest(RestCall::post("pipeline/continue").body(CONTINUE_BODY)),
        outputs: &[Output::result("CIRCLECI_CONTINUED_PIPELINE")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_wait_for_pipeline",
        category: Category::Pipelines,
        description: "Poll a pipeline until it finishes or the timeout passes",
        params: &[
            TOKEN,
            PIPELINE_ID,
            ParamDef::integer("timeout")
                .env(&["CIRCLE_CI_WAIT_TIMEOUT"])
                .default(DefaultValue::Int(DEFAULT_TIMEOUT_SECS as i64))
                .check(non_negative)
                .about("Seconds to wait before giving up"),
            ParamDef::integer("poll_interval")
                .env(&["CIRCLE_CI_POLL_INTERVAL"])
                .default(DefaultValue::Int(DEFAULT_POLL_INTERVAL_SECS as i64))
                .check(positive)
                .about("Seconds between status checks"),
        ],
        handler: Handler::WaitForPipeline,
        outputs: &[Output::result("CIRCLECI_WAIT_RESULT")],
        prepare: None,
    },
];
