mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::ActionProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{print_action_details, print_run_summary};
pub use tables::actions_table;

/// Prints the tool banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("circleci-actions"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CircleCI API actions")
    );
}
