use super::{EMPTY_OBJECT, PROJECT_SLUG, TOKEN};
use crate::actions::params::{DefaultValue, ParamDef};
use crate::actions::{
    AckField, ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape,
};

const CREATE_BODY: &[Binding] = &[
    Binding::same("name"),
    Binding::same("description"),
    Binding::new("attribution-actor", "attribution_actor"),
    Binding::same("parameters"),
    Binding::same("timetable"),
    Binding::same("branch"),
];

const UPDATE_BODY: &[Binding] = &[
    Binding::same("description"),
    Binding::same("name"),
    Binding::same("parameters"),
    Binding::same("timetable"),
    Binding::new("attribution-actor", "attribution_actor"),
    Binding::same("active"),
];

const DELETE_ACK: &[AckField] = &[AckField::param("schedule_id", "schedule_id")];

const SCHEDULE_ID: ParamDef = ParamDef::string("schedule_id")
    .required()
    .env(&["CIRCLE_CI_SCHEDULE_ID"])
    .about("Schedule UUID");

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_list_pipeline_schedules",
        category: Category::Schedules,
        description: "List the pipeline schedules of a project",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(
            RestCall::get("project/{project_slug}/schedule").returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_PIPELINE_SCHEDULES")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_create_pipeline_schedule",
        category: Category::Schedules,
        description: "Create a schedule that triggers pipelines on a timetable",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::string("name")
                .required()
                .env(&["CIRCLE_CI_SCHEDULE_NAME"])
                .about("Schedule name"),
            ParamDef::string("description")
                .env(&["CIRCLE_CI_SCHEDULE_DESCRIPTION"])
                .about("Schedule description"),
            ParamDef::string("attribution_actor")
                .env(&["CIRCLE_CI_ATTRIBUTION_ACTOR"])
                .default(DefaultValue::Str("current"))
                .one_of(&["current", "system"])
                .about("Actor the scheduled pipelines are attributed to"),
            ParamDef::object("parameters")
                .env(&["CIRCLE_CI_SCHEDULE_PARAMETERS"])
                .default(EMPTY_OBJECT)
                .about("Pipeline parameters"),
            ParamDef::object("timetable")
                .required()
                .env(&["CIRCLE_CI_SCHEDULE_TIMETABLE"])
                .about("Timetable, e.g. {\"per-hour\":1,\"hours-of-day\":[1],\"days-of-week\":[\"MON\"]}"),
            ParamDef::string("branch")
                .env(&["CIRCLE_CI_SCHEDULE_BRANCH"])
                .about("Branch the schedule builds"),
        ],
        handler: Handler::Rest(
            RestCall::post("project/{project_slug}/schedule").body(CREATE_BODY),
        ),
        outputs: &[Output::field("CIRCLECI_CREATED_SCHEDULE_ID", "id")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_update_pipeline_schedule",
        category: Category::Schedules,
        description: "Update the fields of a pipeline schedule",
        params: &[
            TOKEN,
            SCHEDULE_ID,
            ParamDef::string("description").about("New description"),
            ParamDef::string("name").about("New name"),
            ParamDef::object("parameters").about("New pipeline parameters"),
            ParamDef::object("timetable").about("New timetable"),
            ParamDef::string("attribution_actor")
                .one_of(&["current", "system"])
                .about("New attribution actor"),
            ParamDef::bool("active").about("Enable or pause the schedule"),
        ],
        handler: Handler::Rest(RestCall::patch("schedule/{schedule_id}").body(UPDATE_BODY)),
        outputs: &[Output::result("CIRCLECI_UPDATED_SCHEDULE")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_pipeline_schedule",
        category: Category::Schedules,
        description: "Delete a pipeline schedule",
        params: &[TOKEN, PROJECT_SLUG, SCHEDULE_ID],
        handler: Handler::Rest(
            RestCall::delete("project/{project_slug}/schedule/{schedule_id}")
                .returns(ResultShape::Ack(DELETE_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_SCHEDULE")],
        prepare: None,
    },
];
