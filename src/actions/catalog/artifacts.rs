use super::{PROJECT_SLUG, TOKEN};
use crate::actions::params::{DefaultValue, ParamDef};
use crate::actions::{ActionDef, Category, Handler, Output};

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_download_workflow_artifacts",
        category: Category::Artifacts,
        description: "Find the latest matching workflow on a branch and download its job artifacts",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            ParamDef::string("branch")
                .env(&["CIRCLE_CI_BRANCH"])
                .default(DefaultValue::Str("master"))
                .about("Branch whose pipelines are searched"),
            ParamDef::string("workflow_name")
                .env(&["CIRCLE_CI_WORKFLOW_NAME"])
                .default(DefaultValue::Str("test"))
                .about("Workflow to look for"),
            ParamDef::string("job_name")
                .env(&["CIRCLE_CI_JOB_NAME"])
                .about("Only download artifacts of this job"),
            ParamDef::string("destination_dir")
                .env(&["CIRCLE_CI_ARTIFACT_DESTINATION_DIR"])
                .default(DefaultValue::Str("./artifacts"))
                .about("Directory that receives one sub-directory per job"),
            ParamDef::list("file_extensions")
                .env(&["CIRCLE_CI_ARTIFACT_FILE_EXTENSIONS"])
                .about("Extensions to keep, e.g. json,xml; all files when unset"),
            ParamDef::bool("require_success")
                .env(&["CIRCLE_CI_REQUIRE_SUCCESS"])
                .default(DefaultValue::Bool(true))
                .about("Only accept a workflow that succeeded"),
        ],
        handler: Handler::WorkflowArtifacts,
        outputs: &[Output::result("CIRCLECI_DOWNLOADED_ARTIFACTS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_download_artifact",
        category: Category::Artifacts,
        description: "Download a single artifact URL to a file",
        params: &[
            TOKEN,
            ParamDef::string("artifact_url")
                .required()
                .env(&["CIRCLE_CI_ARTIFACT_URL"])
                .about("Artifact URL"),
            ParamDef::string("destination_path")
                .required()
                .env(&["CIRCLE_CI_ARTIFACT_DESTINATION"])
                .about("File to write"),
        ],
        handler: Handler::DownloadArtifact,
        outputs: &[Output::result("CIRCLECI_DOWNLOADED_ARTIFACT")],
        prepare: None,
    },
];
