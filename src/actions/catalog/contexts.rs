use super::{CONTEXT_ID, TOKEN};
use crate::actions::params::{ParamDef, ResolvedParams};
use crate::actions::{ActionDef, Binding, Category, Handler, Output, RestCall, ResultShape};
use crate::error::{CircleCiError, Result};

const OWNER_QUERY: &[Binding] = &[
    Binding::new("owner-id", "owner_id"),
    Binding::new("owner-type", "owner_type"),
    Binding::new("owner-slug", "owner_slug"),
];

const CONTEXT_ENV_VAR_BODY: &[Binding] = &[
    Binding::new("variable", "env_var_name"),
    Binding::new("value", "env_var_value"),
];

const ENV_VAR_NAME: ParamDef = ParamDef::string("env_var_name")
    .required()
    .env(&["CIRCLE_CI_ENV_VAR_NAME"])
    .about("Environment variable name");

/// Contexts are listed either by owner ID and type or by owner slug; the
/// ID pair wins when both are given.
fn select_owner(params: &mut ResolvedParams) -> Result<()> {
    if params.contains("owner_id") && params.contains("owner_type") {
        params.remove("owner_slug");
        return Ok(());
    }

    if params.contains("owner_slug") {
        params.remove("owner_id");
        params.remove("owner_type");
        return Ok(());
    }

    Err(CircleCiError::validation(
        "Either owner_id and owner_type, or owner_slug must be provided",
    ))
}

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_list_contexts",
        category: Category::Contexts,
        description: "List the contexts of an organization or account",
        params: &[
            TOKEN,
            ParamDef::string("owner_id")
                .env(&["CIRCLE_CI_CONTEXT_OWNER_ID"])
                .about("Owner UUID"),
            ParamDef::string("owner_type")
                .env(&["CIRCLE_CI_CONTEXT_OWNER_TYPE"])
                .one_of(&["organization", "account"])
                .about("Owner kind"),
            ParamDef::string("owner_slug")
                .env(&["CIRCLE_CI_CONTEXT_OWNER_SLUG"])
                .about("Owner slug, e.g. gh/org"),
        ],
        handler: Handler::Rest(
            RestCall::get("context")
                .query(OWNER_QUERY)
                .returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_CONTEXTS")],
        prepare: Some(select_owner),
    },
    ActionDef {
        name: "circleci_get_context_env_vars",
        category: Category::Contexts,
        description: "List the environment variables of a context (values masked)",
        params: &[TOKEN, CONTEXT_ID],
        handler: Handler::Rest(
            RestCall::get("context/{context_id}/environment-variable")
                .returns(ResultShape::Items),
        ),
        outputs: &[Output::result("CIRCLECI_CONTEXT_ENV_VARS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_add_context_env_var",
        category: Category::Contexts,
        description: "Create or replace an environment variable in a context",
        params: &[
            TOKEN,
            CONTEXT_ID,
            ENV_VAR_NAME,
            ParamDef::string("env_var_value")
                .required()
                .env(&["CIRCLE_CI_ENV_VAR_VALUE"])
                .about("Environment variable value"),
        ],
        handler: Handler::Rest(
            RestCall::put("context/{context_id}/environment-variable/{env_var_name}")
                .body(CONTEXT_ENV_VAR_BODY),
        ),
        outputs: &[Output::result("CIRCLECI_CONTEXT_ENV_VAR")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_delete_context_env_var",
        category: Category::Contexts,
        description: "Delete an environment variable from a context",
        params: &[TOKEN, CONTEXT_ID, ENV_VAR_NAME],
        handler: Handler::Rest(
            RestCall::delete("context/{context_id}/environment-variable/{env_var_name}")
                .returns(ResultShape::Flag),
        ),
        outputs: &[Output::result("CIRCLECI_DELETED_CONTEXT_ENV_VAR")],
        prepare: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_owner_by_slug() {
        let mut params = ResolvedParams::default();
        params.insert("owner_slug", json!("gh/acme"));
        params.insert("owner_type", json!("organization"));

        select_owner(&mut params).unwrap();

        assert!(params.contains("owner_slug"));
        assert!(!params.contains("owner_type"));
    }

    #[test]
    fn test_select_owner_requires_one_form() {
        let mut params = ResolvedParams::default();
        params.insert("owner_type", json!("account"));
        assert!(matches!(
            select_owner(&mut params),
            Err(CircleCiError::Validation(_))
        ));
    }
}
