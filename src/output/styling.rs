use console::{style, StyledObject};

pub fn bright_yellow(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_red(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Colors a pipeline or workflow state: green for success, red for
/// failures and timeouts, yellow for anything still moving.
pub fn state(text: &str) -> StyledObject<String> {
    match text {
        "success" | "created" => bright_green(text),
        "failed" | "error" | "errored" | "canceled" | "cancelled" | "timeout" => bright_red(text),
        _ => bright_yellow(text),
    }
}
