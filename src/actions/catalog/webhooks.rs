use super::TOKEN;
use crate::actions::params::{DefaultValue, ParamDef};
use crate::actions::{
    AckField, ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape,
};

const SCOPE_QUERY: &[Binding] = &[
    Binding::new("scope-id", "scope_id"),
    Binding::new("scope-type", "scope_type"),
];

const CREATE_BODY: &[Binding] = &[
    Binding::same("name"),
    Binding::same("url"),
    Binding::same("events"),
    Binding::new("signing-secret", "signing_secret"),
    Binding::new("verify-tls", "verify_tls"),
    Binding::new("scope.id", "scope_id"),
    Binding::new("scope.type", "scope_type"),
];

const DELETE_ACK: &[AckField] = &[AckField::param("webhook_id", "webhook_id")];

const SCOPE_ID: ParamDef = ParamDef::string("scope_id")
    .required()
    .env(&["CIRCLE_CI_WEBHOOK_SCOPE_ID"])
    .about("ID of the project or organization");

const SCOPE_TYPE: ParamDef = ParamDef::string("scope_type")
    .required()
    .env(&["CIRCLE_CI_WEBHOOK_SCOPE_TYPE"])
    .default(DefaultValue::Str("project"))
    .one_of(&["project", "organization"])
    .about("Kind of scope");

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_list_webhooks",
        category: Category::Webhooks,
        description: "List the outbound webhooks of a scope",
        params: &[TOKEN, SCOPE_ID, SCOPE_TYPE],
        handler: Handler::Rest(
            RestCall::get("webhook")
                .query(SCOPE_QUERY)
                .returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_WEBHOOKS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_create_webhook",
        category: Category::Webhooks,
        description: "Create an outbound webhook",
        params: &[
            TOKEN,
            ParamDef::string("name")
                .required()
                .env(&["CIRCLE_CI_WEBHOOK_NAME"])
                .about("Webhook name"),
            ParamDef::string("url")
                .required()
                .env(&["CIRCLE_CI_WEBHOOK_URL"])
                .about("Receiver URL"),
            ParamDef::list("events")
                .required()
                .env(&["CIRCLE_CI_WEBHOOK_EVENTS"])
                .about("Events to deliver, e.g. workflow-completed,job-completed"),
            ParamDef::string("signing_secret")
                .required()
                .env(&["CIRCLE_CI_WEBHOOK_SIGNING_SECRET"])
                .about("Secret used to sign deliveries"),
            ParamDef::bool("verify_tls")
                .env(&["CIRCLE_CI_WEBHOOK_VERIFY_TLS"])
                .default(DefaultValue::Bool(true))
                .about("Verify the receiver's TLS certificate"),
            SCOPE_ID,
            SCOPE_TYPE,
        ],
        handler: Handler::Rest(RestCall::post("webhook").body(CREATE_BODY)),
        outputs: &[Output::field("CIRCLECI_CREATED_WEBHOOK_ID", "id")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_webhook",
        category: Category::Webhooks,
        description: "Delete an outbound webhook",
        params: &[
            TOKEN,
            ParamDef::string("webhook_id")
                .required()
                .env(&["CIRCLE_CI_WEBHOOK_ID"])
                .about("Webhook UUID"),
        ],
        handler: Handler::Rest(
            RestCall::delete("webhook/{webhook_id}").returns(ResultShape::Ack(DELETE_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_WEBHOOK")],
        prepare: None,
    },
];
