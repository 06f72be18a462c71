use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Map, Value};

use super::params::{self, ParamSources, Params, ResolvedParams};
use super::{ActionDef, AckSource, Body, Handler, Output, OutputSource, RestCall, ResultShape};
use crate::artifacts::{self, CircleCiArtifactApi, LocateRequest};
use crate::client::{CircleCiClient, RequestSpec};
use crate::context::RunContext;
use crate::error::{CircleCiError, Result};
use crate::poller::{self, ClientStateSource, TokioClock, WaitOptions};

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + Send + Sync + 'a>;

/// Runs actions by name against one API client.
pub struct Executor<'a> {
    client: &'a CircleCiClient,
    defaults: IndexMap<String, Value>,
    env: EnvLookup<'a>,
}

impl<'a> Executor<'a> {
    pub fn new(client: &'a CircleCiClient) -> Self {
        Self {
            client,
            defaults: IndexMap::new(),
            env: Box::new(params::process_env),
        }
    }

    /// Parameter defaults consulted after the environment.
    #[must_use]
    pub fn with_defaults(mut self, defaults: IndexMap<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the process environment lookup.
    #[must_use]
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'a) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Resolve and validate parameters without touching the network.
    pub fn resolve(&self, action: &ActionDef, explicit: &Params) -> Result<ResolvedParams> {
        let sources = ParamSources {
            defaults: &self.defaults,
            env: &*self.env,
        };
        let mut resolved = params::resolve(action.name, action.params, explicit, &sources)?;
        if let Some(prepare) = action.prepare {
            prepare(&mut resolved)?;
        }
        Ok(resolved)
    }

    /// Run one action, mirror its outputs into `ctx` and return its result.
    pub async fn run(&self, ctx: &mut RunContext, name: &str, explicit: &Params) -> Result<Value> {
        let action = super::find(name)?;
        let resolved = self.resolve(action, explicit)?;
        info!("Running {}", action.name);

        let (result, response) = match &action.handler {
            Handler::Rest(call) => {
                let request = build_request(call, &resolved)?;
                let response = self.client.send(&request).await?;
                let result = shape_result(&call.result, &resolved, &response);
                (result, response)
            }
            Handler::WorkflowArtifacts => {
                let result = self.download_workflow_artifacts(&resolved).await?;
                (result.clone(), result)
            }
            Handler::WaitForPipeline => {
                let result = self.wait_for_pipeline(&resolved).await?;
                (result.clone(), result)
            }
            Handler::DownloadArtifact => {
                let destination = PathBuf::from(resolved.require_str("destination_path")?);
                let result = artifacts::download_artifact(
                    self.client,
                    &resolved.token()?,
                    resolved.require_str("artifact_url")?,
                    &destination,
                )
                .await;
                (result.clone(), result)
            }
            Handler::LegacyDownload => {
                let result = artifacts::download_legacy_artifact(
                    self.client,
                    &resolved.token()?,
                    resolved.require_str("file_url")?,
                    resolved.str("output_file_name"),
                )
                .await?;
                (result.clone(), result)
            }
        };

        write_outputs(ctx, action.outputs, &resolved, &result, &response);
        info!("{} completed", action.name);

        Ok(result)
    }

    async fn download_workflow_artifacts(&self, resolved: &ResolvedParams) -> Result<Value> {
        let project_slug = resolved.require_str("project_slug")?;
        let request = LocateRequest {
            branch: resolved.require_str("branch")?.to_string(),
            workflow_name: resolved.require_str("workflow_name")?.to_string(),
            job_name: resolved.str("job_name").map(str::to_string),
            file_extensions: resolved.string_list("file_extensions"),
            destination_dir: PathBuf::from(resolved.require_str("destination_dir")?),
            require_success: resolved.bool("require_success").unwrap_or(true),
        };

        let api = CircleCiArtifactApi::new(self.client, resolved.token()?, project_slug);
        let summary = artifacts::download_workflow_artifacts(&api, &request).await?;
        serde_json::to_value(summary).map_err(CircleCiError::Encode)
    }

    async fn wait_for_pipeline(&self, resolved: &ResolvedParams) -> Result<Value> {
        let pipeline_id = resolved.require_str("pipeline_id")?;
        let defaults = WaitOptions::default();
        let options = WaitOptions {
            timeout: resolved
                .u64("timeout")
                .map_or(defaults.timeout, Duration::from_secs),
            poll_interval: resolved
                .u64("poll_interval")
                .map_or(defaults.poll_interval, Duration::from_secs),
        };

        let source = ClientStateSource::new(self.client, resolved.token()?);
        let result = poller::wait_for_pipeline(&source, &TokioClock, pipeline_id, options).await?;
        serde_json::to_value(result).map_err(CircleCiError::Encode)
    }
}

/// Run `name` with parameters from `params` and the process environment.
pub async fn run_action(
    client: &CircleCiClient,
    ctx: &mut RunContext,
    name: &str,
    params: &Params,
) -> Result<Value> {
    Executor::new(client).run(ctx, name, params).await
}

pub(crate) fn build_request(call: &RestCall, resolved: &ResolvedParams) -> Result<RequestSpec> {
    let path = render_path(call.path, resolved)?;
    let mut request = RequestSpec::new(call.method, path, resolved.token()?)
        .api(call.api)
        .auth(call.auth);

    for binding in call.query {
        let Some(value) = resolved.get(binding.param) else {
            continue;
        };
        if binding.omit_empty && is_empty(value) {
            continue;
        }
        if let Some(text) = resolved.text(binding.param) {
            request = request.query(binding.wire, text);
        }
    }

    match call.body {
        Body::None => {}
        Body::Empty => request = request.body(Value::Object(Map::new())),
        Body::Object(bindings) => {
            let mut body = Map::new();
            for binding in bindings {
                let Some(value) = resolved.get(binding.param) else {
                    continue;
                };
                if binding.omit_empty && is_empty(value) {
                    continue;
                }
                insert_nested(&mut body, binding.wire, value.clone());
            }
            request = request.body(Value::Object(body));
        }
    }

    debug!("Built {} {}", request.method, request.path);
    Ok(request)
}

/// Substitute `{param}` placeholders with resolved values.
fn render_path(template: &str, resolved: &ResolvedParams) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let end = rest[start..]
            .find('}')
            .map(|offset| start + offset)
            .ok_or_else(|| CircleCiError::Config(format!("Unclosed placeholder in '{template}'")))?;
        let key = &rest[start + 1..end];
        let value = resolved
            .text(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CircleCiError::validation(format!("Missing required parameter '{key}'")))?;

        path.push_str(&rest[..start]);
        path.push_str(&encode_segments(&value));
        rest = &rest[end + 1..];
    }
    path.push_str(rest);

    Ok(path)
}

/// Percent-encodes each `/`-separated piece so slugs keep their slashes.
fn encode_segments(value: &str) -> String {
    value
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn insert_nested(body: &mut Map<String, Value>, wire: &str, value: Value) {
    match wire.split_once('.') {
        Some((head, tail)) => {
            let entry = body
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_nested(child, tail, value);
            }
        }
        None => {
            body.insert(wire.to_string(), value);
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn shape_result(shape: &ResultShape, resolved: &ResolvedParams, response: &Value) -> Value {
    match shape {
        ResultShape::Json => response.clone(),
        ResultShape::Items => response
            .get("items")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        ResultShape::Ack(fields) => {
            let mut ack = Map::new();
            ack.insert("success".to_string(), Value::Bool(true));
            for field in *fields {
                let value = match field.source {
                    AckSource::Literal(text) => Value::String(text.to_string()),
                    AckSource::Param(key) => resolved.get(key).cloned().unwrap_or(Value::Null),
                    AckSource::Response(key) => response.get(key).cloned().unwrap_or(Value::Null),
                };
                ack.insert(field.key.to_string(), value);
            }
            Value::Object(ack)
        }
        ResultShape::Flag => Value::Bool(true),
    }
}

fn write_outputs(
    ctx: &mut RunContext,
    outputs: &[Output],
    resolved: &ResolvedParams,
    result: &Value,
    response: &Value,
) {
    for output in outputs {
        let value = match output.source {
            OutputSource::Result => Some(result.clone()),
            OutputSource::Field(field) => response.get(field).cloned(),
            OutputSource::Derived(derive) => derive(resolved, response),
        };
        match value {
            Some(value) => ctx.set(output.key, value),
            None => debug!("No value for context key {}", output.key),
        }
    }
}
