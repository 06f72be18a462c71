use std::time::Duration;

use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::request::{ApiVersion, AuthScheme, RequestSpec};
use crate::config::ApiConfig;
use crate::error::{CircleCiError, Result};

pub(crate) const CIRCLE_TOKEN: &str = "Circle-Token";
const MAX_REDIRECTS: usize = 10;

pub struct CircleCiClient {
    pub(super) client: Client,
    api_url: Url,
    legacy_url: Url,
}

impl CircleCiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| CircleCiError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = parse_base(&config.base_url)?;
        let legacy_url = parse_base(&config.legacy_base_url)?;

        Ok(Self {
            client,
            api_url,
            legacy_url,
        })
    }

    /// Resolve an endpoint path against the base URL of the given API surface.
    pub fn endpoint(&self, api: ApiVersion, path: &str) -> Result<Url> {
        let base = match api {
            ApiVersion::V2 => &self.api_url,
            ApiVersion::Legacy => &self.legacy_url,
        };

        base.join(path.trim_start_matches('/'))
            .map_err(|e| CircleCiError::validation(format!("Invalid endpoint path '{path}': {e}")))
    }

    /// Send exactly one request and decode the JSON response.
    ///
    /// An empty 2xx body decodes to `{}`. Non-2xx statuses become
    /// [`CircleCiError::Api`] carrying the raw body. No retries.
    pub async fn send(&self, spec: &RequestSpec) -> Result<Value> {
        let url = self.endpoint(spec.api, &spec.path)?;
        debug!("{} {}", spec.method, url);

        let mut request = self
            .client
            .request(spec.method.into(), url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        request = match spec.auth {
            AuthScheme::TokenHeader => request.header(CIRCLE_TOKEN, spec.token.as_str()),
            AuthScheme::Basic => request.basic_auth(spec.token.as_str(), Some("")),
        };

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }

        if let Some(body) = &spec.body {
            request = request.body(serde_json::to_vec(body).map_err(CircleCiError::Encode)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CircleCiError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_body(&text)
    }

    /// Send a request and deserialize the response into a typed resource.
    pub async fn fetch<T>(&self, spec: &RequestSpec) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self.send(spec).await?;
        Ok(serde_json::from_value(value)?)
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends with a slash
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    Url::parse(&normalized).map_err(|e| CircleCiError::Config(format!("Invalid base URL '{raw}': {e}")))
}

pub(crate) fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    Ok(serde_json::from_str(text)?)
}
