mod api;
mod locator;
mod single;

pub use api::{ArtifactApi, CircleCiArtifactApi};
pub use locator::{
    download_workflow_artifacts, find_workflow, DownloadSummary, DownloadedArtifact, JobArtifacts,
    LocateRequest, WorkflowMatch, MAX_PIPELINE_PAGES,
};
pub use single::{download_artifact, download_legacy_artifact};
