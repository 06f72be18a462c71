use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow};

/// Spinner shown on stderr while one action runs.
pub struct ActionProgress {
    pb: ProgressBar,
    action: String,
}

impl ActionProgress {
    pub fn start(action: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
            pb.set_style(style);
        }
        pb.set_message(bright_yellow(format!("Running {action}")).to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            action: action.to_string(),
        }
    }

    pub fn succeed(self) {
        self.pb
            .finish_with_message(bright_green(format!("{} ✓", self.action)).to_string());
    }

    pub fn fail(self) {
        self.pb
            .finish_with_message(bright_red(format!("{} ✗", self.action)).to_string());
    }
}
