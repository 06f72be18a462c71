use super::{PROJECT_SLUG, TOKEN};
use crate::actions::params::{DefaultValue, ParamDef};
use crate::actions::{
    AckField, ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape,
};

const COLLABORATOR_BODY: &[Binding] = &[Binding::new("id", "username")];

const ENV_VAR_BODY: &[Binding] = &[Binding::same("name"), Binding::same("value")];

const DELETE_ENV_VAR_ACK: &[AckField] = &[AckField::param("name", "name")];

const CHECKOUT_KEY_BODY: &[Binding] = &[Binding::new("type", "key_type")];

const FINGERPRINT: ParamDef = ParamDef::string("fingerprint")
    .required()
    .about("Checkout key fingerprint");

const ENV_VAR_NAME: ParamDef = ParamDef::string("name")
    .required()
    .env(&["CIRCLE_CI_ENV_VAR_NAME"])
    .about("Environment variable name");

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_create_project",
        category: Category::Projects,
        description: "Follow a project so CircleCI builds it",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(RestCall::post("project/{project_slug}/follow")),
        outputs: &[Output::result("CIRCLECI_PROJECT")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_list_projects",
        category: Category::Projects,
        description: "List the projects visible to the current user",
        params: &[TOKEN],
        handler: Handler::Rest(RestCall::get("projects").returns(ResultShape::Items)),
        outputs: &[Output::result("CIRCLECI_PROJECTS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_project_config",
        category: Category::Projects,
        description: "Get the settings of a project",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(RestCall::get("project/{project_slug}/config")),
        outputs: &[Output::result("CIRCLECI_PROJECT_CONFIG")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_add_project_collaborator",
        category: Category::Projects,
        description: "Add a user as a project collaborator",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::string("username")
                .required()
                .env(&["CIRCLE_CI_COLLABORATOR_USERNAME"])
                .about("User to add"),
        ],
        handler: Handler::Rest(
            RestCall::post("project/{project_slug}/user/{username}").body(COLLABORATOR_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_PROJECT_COLLABORATOR")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_env_vars",
        category: Category::Projects,
        description: "List the environment variables of a project (values masked)",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(
            RestCall::get("project/{project_slug}/envvar").returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_ENV_VARS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_set_env_var",
        category: Category::Projects,
        description: "Create or replace a project environment variable",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ENV_VAR_NAME,
            ParamDef::string("value")
                .required()
                .env(&["CIRCLE_CI_ENV_VAR_VALUE"])
                .about("Environment variable value"),
        ],
        handler: Handler::Rest(RestCall::post("project/{project_slug}/envvar").body(ENV_VAR_BODY)),
        outputs: &[Output::result("CIRCLECI_ENV_VAR")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_env_var",
        category: Category::Projects,
        description: "Delete a project environment variable",
        params: &[TOKEN, PROJECT_SLUG, ENV_VAR_NAME],
        handler: Handler::Rest(
            RestCall::delete("project/{project_slug}/envvar/{name}")
                .returns(ResultShape::Ack(DELETE_ENV_VAR_ACK)),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_ENV_VAR")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_checkout_keys",
        category: Category::Projects,
        description: "List the checkout keys of a project",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(RestCall::get("project/{project_slug}/checkout-key")),
        outputs: &[Output::result("CIRCLECI_CHECKOUT_KEYS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_checkout_key",
        category: Category::Projects,
        description: "Get one checkout key by fingerprint",
        params: &[TOKEN, PROJECT_SLUG, FINGERPRINT],
        handler: Handler::Rest(RestCall::get(
            "project/{project_slug}/checkout-key/{fingerprint}",
        )),
        outputs: &[Output::result("CIRCLECI_CHECKOUT_KEY_INFO")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_create_checkout_key",
        category: Category::Projects,
        description: "Create a deploy key or user key for a project",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::string("key_type")
                .required()
                .default(DefaultValue::Str("deploy-key"))
                .one_of(&["deploy-key", "github-user-key"])
                .about("Kind of key to create"),
        ],
        handler: Handler::Rest(
            RestCall::post("project/{project_slug}/checkout-key").body(CHECKOUT_KEY_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_CHECKOUT_KEY")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_checkout_key",
        category: Category::Projects,
        description: "Delete a checkout key by fingerprint",
        params: &[TOKEN, PROJECT_SLUG, FINGERPRINT],
        handler: Handler::Rest(RestCall::delete(
            "project/{project_slug}/checkout-key/{fingerprint}",
        )),
        outputs: &[Output::result("CIRCLECI_DELETED_CHECKOUT_KEY")],
        prepare: None,
    },
];
