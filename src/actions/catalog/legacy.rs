//! API v1.1 actions, authenticated with the token as a basic-auth user.

use serde_json::{Map, Value};

use super::EMPTY_OBJECT;
use crate::actions::params::{DefaultValue, ParamDef, ResolvedParams};
use crate::actions::{ActionDef, Binding, Category, Handler, Output, RestCall};
use crate::error::Result;

const TRIGGER_BODY: &[Binding] = &[Binding::same("build_parameters")];

const TRIGGER_TOKEN: ParamDef = ParamDef::string("api_token")
    .required()
    .env(&["FL_TRIGGER_CIRCLE_CI_JOB_API_TOKEN", "CIRCLE_CI_API_TOKEN"])
    .about("CircleCI personal API token");

const ARTIFACTS_TOKEN: ParamDef = ParamDef::string("api_token")
    .required()
    .env(&["FL_GET_CIRCLE_CI_ARTIFACTS_API_TOKEN", "CIRCLE_CI_API_TOKEN"])
    .about("CircleCI personal API token");

const STATUS_TOKEN: ParamDef = ParamDef::string("api_token")
    .required()
    .env(&["FL_GET_CIRCLE_CI_BUILD_STATUS_API_TOKEN", "CIRCLE_CI_API_TOKEN"])
    .about("CircleCI personal API token");

const DOWNLOAD_TOKEN: ParamDef = ParamDef::string("api_token")
    .required()
    .env(&["FL_DOWNLOAD_CIRCLE_CI_ARTIFACT_API_TOKEN", "CIRCLE_CI_API_TOKEN"])
    .about("CircleCI personal API token");

const fn vcs_type(env: &'static [&'static str]) -> ParamDef {
    ParamDef::string("vcs_type")
        .required()
        .env(env)
        .default(DefaultValue::Str("github"))
        .about("VCS provider, e.g. github or bitbucket")
}

const fn user_name(env: &'static [&'static str]) -> ParamDef {
    ParamDef::string("user_name")
        .required()
        .env(env)
        .about("Repository owner")
}

const fn project_name(env: &'static [&'static str]) -> ParamDef {
    ParamDef::string("project_name")
        .required()
        .env(env)
        .about("Repository name")
}

const fn build_number(env: &'static [&'static str]) -> ParamDef {
    ParamDef::string("build_number")
        .required()
        .env(env)
        .about("Build number")
}

/// Folds `job_name` into the build parameters as `CIRCLE_JOB` and drops
/// null entries so they are not sent.
fn merge_build_parameters(params: &mut ResolvedParams) -> Result<()> {
    let mut merged = match params.remove("build_parameters") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if let Some(job) = params.get("job_name").cloned() {
        merged.insert("CIRCLE_JOB".to_string(), job);
    }
    merged.retain(|_, value| !value.is_null());

    params.insert("build_parameters", Value::Object(merged));
    Ok(())
}

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "trigger_circle_ci_job",
        category: Category::Legacy,
        description: "Trigger a job on a branch through the v1.1 API",
        params: &[
            TRIGGER_TOKEN,
            ParamDef::string("job_name")
                .required()
                .env(&["FL_TRIGGER_CIRCLE_CI_JOB_NAME"])
                .about("Job name from .circleci/config.yml"),
            vcs_type(&["FL_TRIGGER_CIRCLE_CI_JOB_VCS_TYPE"]),
            user_name(&["FL_TRIGGER_CIRCLE_CI_JOB_USER_NAME"]),
            project_name(&["FL_TRIGGER_CIRCLE_CI_JOB_PROJECT_NAME"]),
            ParamDef::string("branch_name")
                .required()
                .env(&["FL_TRIGGER_CIRCLE_CI_JOB_BRANCH_NAME"])
                .default(DefaultValue::Str("master"))
                .about("Branch to build"),
            ParamDef::object("build_parameters")
                .env(&["FL_TRIGGER_CIRCLE_CI_JOB_BUILD_PARAMETERS"])
                .default(EMPTY_OBJECT)
                .about("Extra build parameters"),
        ],
        handler: Handler::Rest(
            RestCall::post("project/{vcs_type}/{user_name}/{project_name}/tree/{branch_name}")
                .legacy()
                .basic_auth()
                .body(TRIGGER_BODY),
        ),
        outputs: &[Output::result("TRIGGER_CIRCLE_CI_JOB_RESULT")],
        prepare: Some(merge_build_parameters),
    },
    ActionDef {
        name: "get_circle_ci_artifacts",
        category: Category::Legacy,
        description: "List the artifacts of a build through the v1.1 API",
        params: &[
            ARTIFACTS_TOKEN,
            vcs_type(&["FL_GET_CIRCLE_CI_ARTIFACTS_VCS_TYPE"]),
            user_name(&["FL_GET_CIRCLE_CI_ARTIFACTS_USER_NAME"]),
            project_name(&["FL_GET_CIRCLE_CI_ARTIFACTS_PROJECT_NAME"]),
            build_number(&["FL_GET_CIRCLE_CI_ARTIFACTS_BUILD_NUMBER"]),
        ],
        handler: Handler::Rest(
            RestCall::get("project/{vcs_type}/{user_name}/{project_name}/{build_number}/artifacts")
                .legacy(),
        ),
        outputs: &[Output::result("GET_CIRCLE_CI_ARTIFACTS_RESULT")],
        prepare: None,
    },
    ActionDef {
        name: "get_circle_ci_build_status",
        category: Category::Legacy,
        description: "Get the status of a build through the v1.1 API",
        params: &[
            STATUS_TOKEN,
            vcs_type(&["FL_GET_CIRCLE_CI_BUILD_STATUS_VCS_TYPE"]),
            user_name(&["FL_GET_CIRCLE_CI_BUILD_STATUS_USER_NAME"]),
            project_name(&["FL_GET_CIRCLE_CI_BUILD_STATUS_PROJECT_NAME"]),
            build_number(&["FL_GET_CIRCLE_CI_BUILD_STATUS_BUILD_NUMBER"]),
        ],
        handler: Handler::Rest(
            RestCall::get("project/{vcs_type}/{user_name}/{project_name}/{build_number}").legacy(),
        ),
        outputs: &[Output::result("GET_CIRCLE_CI_BUILD_STATUS_RESULT")],
        prepare: None,
    },
    ActionDef {
        name: "download_circle_ci_artifact",
        category: Category::Legacy,
        description: "Download a build artifact URL to a local file",
        params: &[
            DOWNLOAD_TOKEN,
            ParamDef::string("file_url")
                .required()
                .env(&["FL_DOWNLOAD_CIRCLE_CI_ARTIFACT_FILE_URL"])
                .about("Artifact URL"),
            ParamDef::string("output_file_name")
                .env(&["FL_DOWNLOAD_CIRCLE_CI_ARTIFACT_OUTPUT_FILE_NAME"])
                .about("File to write, defaults to the URL's last segment"),
        ],
        handler: Handler::LegacyDownload,
        outputs: &[Output::result("DOWNLOAD_CIRCLE_CI_ARTIFACT_RESULT")],
        prepare: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_build_parameters() {
        let mut params = ResolvedParams::default();
        params.insert("job_name", json!("deploy"));
        params.insert("build_parameters", json!({"FLAVOR": "prod", "SKIP": null}));

        merge_build_parameters(&mut params).unwrap();

        assert_eq!(
            params.get("build_parameters"),
            Some(&json!({"FLAVOR": "prod", "CIRCLE_JOB": "deploy"}))
        );
    }
}
