mod core;
mod download;
mod request;

pub use self::core::CircleCiClient;
pub use request::{ApiVersion, AuthScheme, Method, RequestSpec};

