use super::{has_provider, PIPELINE_DEFINITION_ID, PROJECT_ID, TOKEN, TRIGGER_ID};
use crate::actions::params::{DefaultValue, ParamDef};
use crate::actions::{ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape};

const DEFINITION_BODY: &[Binding] = &[
    Binding::same("name"),
    Binding::same("description"),
    Binding::same("config_source"),
];

const TRIGGER_BODY: &[Binding] = &[
    Binding::new("type", "trigger_type"),
    Binding::same("description"),
    Binding::same("config"),
];

const UPDATE_TRIGGER_BODY: &[Binding] = &[Binding::same("description"), Binding::same("config")];

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_get_pipeline_definitions",
        category: Category::Definitions,
        description: "List the pipeline definitions of a project",
        params: &[TOKEN, PROJECT_ID],
        handler: Handler::Rest(RestCall::get("projects/{project_id}/pipeline-definitions")),
        outputs: &[Output::result("CIRCLECI_PIPELINE_DEFINITIONS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_pipeline_definition",
        category: Category::Definitions,
        description: "Get one pipeline definition",
        params: &[TOKEN, PROJECT_ID, PIPELINE_DEFINITION_ID],
        handler: Handler::Rest(RestCall::get(
            "projects/{project_id}/pipeline-definitions/{pipeline_definition_id}",
        )),
        outputs: &[Output::result("CIRCLECI_PIPELINE_DEFINITION")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_create_pipeline_definition",
        category: Category::Definitions,
        description: "Create a pipeline definition",
        params: &[
            TOKEN,
            PROJECT_ID,
            ParamDef::string("name").required().about("Definition name"),
            ParamDef::string("description").about("Definition description"),
            ParamDef::object("config_source")
                .required()
                .check(has_provider)
                .about("Where the config lives, must name a provider"),
        ],
        handler: Handler::Rest(
            RestCall::post("projects/{project_id}/pipeline-definitions").body(DEFINITION_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_CREATED_PIPELINE_DEFINITION")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_update_pipeline_definition",
        category: Category::Definitions,
        description: "Update a pipeline definition",
        params: &[
            TOKEN,
            PROJECT_ID,
            PIPELINE_DEFINITION_ID,
            ParamDef::string("name").about("New name"),
            ParamDef::string("description").about("New description"),
            ParamDef::object("config_source")
                .check(has_provider)
                .about("New config source"),
        ],
        handler: Handler::Rest(
            RestCall::patch("projects/{project_id}/pipeline-definitions/{pipeline_definition_id}")
                .body(DEFINITION_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_UPDATED_PIPELINE_DEFINITION")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_pipeline_definition",
        category: Category::Definitions,
        description: "Delete a pipeline definition",
        params: &[TOKEN, PROJECT_ID, PIPELINE_DEFINITION_ID],
        handler: Handler::Rest(
            RestCall::delete("projects/{project_id}/pipeline-definitions/{pipeline_definition_id}")
                .returns(ResultShape::Flag),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_PIPELINE_DEFINITION")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_create_pipeline_definition_trigger",
        category: Category::Definitions,
        description: "Create a trigger for a pipeline definition",
        params: &[
            TOKEN,
            PROJECT_ID,
            PIPELINE_DEFINITION_ID,
            ParamDef::string("trigger_type")
                .required()
                .about("Trigger type, e.g. webhook"),
            ParamDef::string("description")
                .default(DefaultValue::Str(""))
                .about("Trigger description"),
            ParamDef::object("config").required().about("Trigger configuration"),
        ],
        handler: Handler::Rest(
            RestCall::post(
                "projects/{project_id}/pipeline-definitions/{pipeline_definition_id}/triggers",
            )
            .body(TRIGGER_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_PIPELINE_DEFINITION_TRIGGER")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_trigger",
        category: Category::Definitions,
        description: "Get a pipeline trigger",
        params: &[TOKEN, PROJECT_ID, TRIGGER_ID],
        handler: Handler::Rest(RestCall::get("projects/{project_id}/triggers/{trigger_id}")),
        outputs: &[Output::result("CIRCLECI_TRIGGER_INFO")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_update_trigger",
        category: Category::Definitions,
        description: "Update a pipeline trigger",
        params: &[
            TOKEN,
            PROJECT_ID,
            TRIGGER_ID,
            ParamDef::string("description").about("New description"),
            ParamDef::object("config").about("New configuration"),
        ],
        handler: Handler::Rest(
            RestCall::patch("projects/{project_id}/triggers/{trigger_id}")
                .body(UPDATE_TRIGGER_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_UPDATED_TRIGGER")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_trigger",
        category: Category::Definitions,
        description: "Delete a pipeline trigger",
        params: &[TOKEN, PROJECT_ID, TRIGGER_ID],
        handler: Handler::Rest(
            RestCall::delete("projects/{project_id}/triggers/{trigger_id}")
                .returns(ResultShape::Flag),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_TRIGGER")],
        prepare: None,
    },
];
