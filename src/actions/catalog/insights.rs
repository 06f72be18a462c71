use super::{PROJECT_SLUG, TOKEN};
use crate::actions::params::ParamDef;
use crate::actions::{ActionDef, Binding, Category, Handler, Output, RestCall};

const BRANCH: ParamDef = ParamDef::string("branch")
    .env(&["CIRCLE_CI_BRANCH"])
    .about("Only count runs on this branch");

const REPORTING_WINDOW: ParamDef = ParamDef::string("reporting_window")
    .env(&["CIRCLE_CI_REPORTING_WINDOW"])
    .one_of(&[
        "last-7-days",
        "last-90-days",
        "last-24-hours",
        "last-30-days",
        "last-60-days",
    ])
    .about("Time window of the metrics");

const WORKFLOW_NAME: ParamDef = ParamDef::string("workflow_name")
    .required()
    .env(&["CIRCLE_CI_WORKFLOW_NAME"])
    .about("Workflow name");

const PAGE_TOKEN: ParamDef = ParamDef::string("page_token")
    .about("Token of the page to fetch");

const START_DATE: ParamDef = ParamDef::string("start_date")
    .env(&["CIRCLE_CI_START_DATE"])
    .about("Earliest run date, RFC 3339");

const END_DATE: ParamDef = ParamDef::string("end_date")
    .env(&["CIRCLE_CI_END_DATE"])
    .about("Latest run date, RFC 3339");

const WINDOW_QUERY: &[Binding] = &[Binding::new("reporting-window", "reporting_window")];

const WORKFLOW_METRICS_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::new("reporting-window", "reporting_window"),
    Binding::new("workflow-name", "workflow_name"),
    Binding::new("page-token", "page_token"),
];

const RUNS_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::new("start-date", "start_date"),
    Binding::new("end-date", "end_date"),
    Binding::new("page-token", "page_token"),
];

const INSIGHTS_QUERY: &[Binding] = &[
    Binding::same("branches"),
    Binding::same("branch"),
    Binding::new("start-date", "start_date"),
    Binding::new("end-date", "end_date"),
];

const SUMMARY_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::new("reporting-window", "reporting_window"),
];

const JOB_METRICS_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::new("reporting-window", "reporting_window"),
    Binding::new("page-token", "page_token"),
];

const TEST_METRICS_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::new("page-token", "page_token"),
];

const TIMESERIES_QUERY: &[Binding] = &[
    Binding::same("branch"),
    Binding::same("granularity"),
    Binding::new("start-date", "start_date"),
    Binding::new("end-date", "end_date"),
];

const ORG_SUMMARY_QUERY: &[Binding] = &[
    Binding::new("reporting-window", "reporting_window"),
    Binding::new("project-names", "project_names").omit_empty(),
];

pub(super) const ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "circleci_get_flaky_tests",
        category: Category::Insights,
        description: "List the flaky tests of a project",
        params: &[TOKEN, PROJECT_SLUG],
        handler: Handler::Rest(RestCall::get("insights/{project_slug}/flaky-tests")),
        outputs: &[Output::result("CIRCLECI_FLAKY_TESTS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_project_branches",
        category: Category::Insights,
        description: "List the branches that have insights data",
        params: &[TOKEN, PROJECT_SLUG, REPORTING_WINDOW],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/branches").query(WINDOW_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_PROJECT_BRANCHES")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_project_workflow_metrics",
        category: Category::Insights,
        description: "Aggregated metrics of every workflow in a project",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            BRANCH,
            REPORTING_WINDOW,
            ParamDef::string("workflow_name").about("Only report this workflow"),
            PAGE_TOKEN,
        ],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows").query(WORKFLOW_METRICS_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_PROJECT_WORKFLOW_METRICS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_runs",
        category: Category::Insights,
        description: "Recent runs of a workflow",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            WORKFLOW_NAME,
            BRANCH,
            START_DATE,
            END_DATE,
            PAGE_TOKEN,
        ],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows/{workflow_name}").query(RUNS_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_RUNS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_insights",
        category: Category::Insights,
        description: "Run history of a workflow across one or more branches",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            WORKFLOW_NAME,
            ParamDef::list("branches")
                .env(&["CIRCLE_CI_BRANCHES"])
                .about("Branches to include"),
            BRANCH,
            START_DATE,
            END_DATE,
        ],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows/{workflow_name}")
                .query(INSIGHTS_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_INSIGHTS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_summary",
        category: Category::Insights,
        description: "Summary metrics and trends of a workflow",
        params: &[TOKEN, PROJECT_SLUG, WORKFLOW_NAME, BRANCH, REPORTING_WINDOW],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows/{workflow_name}/summary")
                .query(SUMMARY_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_SUMMARY")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_job_metrics",
        category: Category::Insights,
        description: "Aggregated metrics of the jobs in a workflow",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            WORKFLOW_NAME,
            BRANCH,
            REPORTING_WINDOW,
            PAGE_TOKEN,
        ],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows/{workflow_name}/jobs")
                .query(JOB_METRICS_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_JOB_METRICS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_workflow_test_metrics",
        category: Category::Insights,
        description: "Test metrics of a workflow",
        params: &[TOKEN, PROJECT_SLUG, WORKFLOW_NAME, BRANCH, PAGE_TOKEN],
        handler: Handler::Rest(
            RestCall::get("insights/{project_slug}/workflows/{workflow_name}/test-metrics")
                .query(TEST_METRICS_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_WORKFLOW_TEST_METRICS")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_job_timeseries",
        category: Category::Insights,
        description: "Job metrics of a workflow bucketed over time",
        params: &[
            TOKEN,
            PROJECT_SLUG,
            WORKFLOW_NAME,
            BRANCH,
            ParamDef::string("granularity")
                .one_of(&["daily", "hourly"])
                .about("Bucket size"),
            START_DATE,
            END_DATE,
        ],
        handler: Handler::Rest(
            RestCall::get("insights/time-series/{project_slug}/workflows/{workflow_name}/jobs")
                .query(TIMESERIES_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_JOB_TIMESERIES")],
        prepare: None,
    },
    ActionDef {
        name: "circleci_get_org_summary",
        category: Category::Insights,
        description: "Aggregated metrics of an organization and its projects",
        params: &[
            TOKEN,
            ParamDef::string("org_slug")
                .required()
                .env(&["CIRCLE_CI_ORG_SLUG"])
                .about("Organization slug, e.g. gh/org"),
            REPORTING_WINDOW,
            ParamDef::list("project_names")
                .env(&["CIRCLE_CI_PROJECT_NAMES"])
                .about("Only report these projects"),
        ],
        handler: Handler::Rest(
            RestCall::get("insights/{org_slug}/summary").query(ORG_SUMMARY_QUERY),
        ),
        outputs: &[Output::result("CIRCLECI_ORG_SUMMARY")],
        prepare: None,
    },
];
