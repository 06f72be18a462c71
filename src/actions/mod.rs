mod catalog;
mod executor;
pub mod params;

use std::fmt;

use serde_json::Value;

use crate::client::{ApiVersion, AuthScheme, Method};
use crate::error::{CircleCiError, Result};
use params::{ParamDef, ResolvedParams};

pub use executor::{run_action, Executor};
pub use params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Pipelines,
    Workflows,
    Artifacts,
    Projects,
    Contexts,
    Schedules,
    Webhooks,
    Definitions,
    Insights,
    User,
    Legacy,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Pipelines,
        Category::Workflows,
        Category::Artifacts,
        Category::Projects,
        Category::Contexts,
        Category::Schedules,
        Category::Webhooks,
        Category::Definitions,
        Category::Insights,
        Category::User,
        Category::Legacy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pipelines => "pipelines",
            Category::Workflows => "workflows",
            Category::Artifacts => "artifacts",
            Category::Projects => "projects",
            Category::Contexts => "contexts",
            Category::Schedules => "schedules",
            Category::Webhooks => "webhooks",
            Category::Definitions => "definitions",
            Category::Insights => "insights",
            Category::User => "user",
            Category::Legacy => "legacy",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one action.
#[derive(Debug)]
pub struct ActionDef {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub params: &'static [ParamDef],
    pub handler: Handler,
    /// Context keys written after a successful run
    pub outputs: &'static [Output],
    /// Cross-parameter validation and normalization, run before any request
    pub prepare: Option<fn(&mut ResolvedParams) -> Result<()>>,
}

#[derive(Debug)]
pub enum Handler {
    Rest(RestCall),
    WorkflowArtifacts,
    WaitForPipeline,
    DownloadArtifact,
    LegacyDownload,
}

/// A single HTTP call described as data.
#[derive(Debug)]
pub struct RestCall {
    pub api: ApiVersion,
    pub method: Method,
    pub auth: AuthScheme,
    /// Path relative to the API base, with `{param}` placeholders
    pub path: &'static str,
    pub query: &'static [Binding],
    pub body: Body,
    pub result: ResultShape,
}

impl RestCall {
    pub const fn new(method: Method, path: &'static str) -> Self {
        Self {
            api: ApiVersion::V2,
            method,
            auth: AuthScheme::TokenHeader,
            path,
            query: &[],
            body: Body::None,
            result: ResultShape::Json,
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(Method::Get, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(Method::Post, path)
    }

    pub const fn put(path: &'static str) -> Self {
        Self::new(Method::Put, path)
    }

    pub const fn patch(path: &'static str) -> Self {
        Self::new(Method::Patch, path)
    }

    pub const fn delete(path: &'static str) -> Self {
        Self::new(Method::Delete, path)
    }

    pub const fn legacy(mut self) -> Self {
        self.api = ApiVersion::Legacy;
        self
    }

    pub const fn basic_auth(mut self) -> Self {
        self.auth = AuthScheme::Basic;
        self
    }

    pub const fn query(mut self, bindings: &'static [Binding]) -> Self {
        self.query = bindings;
        self
    }

    pub const fn body(mut self, bindings: &'static [Binding]) -> Self {
        self.body = Body::Object(bindings);
        self
    }

    pub const fn empty_body(mut self) -> Self {
        self.body = Body::Empty;
        self
    }

    pub const fn returns(mut self, result: ResultShape) -> Self {
        self.result = result;
        self
    }
}

/// Maps a resolved parameter onto a query key or body field.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// Query key or body field; dots nest body fields (`scope.id`)
    pub wire: &'static str,
    pub param: &'static str,
    /// Skip the field when the value is an empty object or list
    pub omit_empty: bool,
}

impl Binding {
    pub const fn new(wire: &'static str, param: &'static str) -> Self {
        Self {
            wire,
            param,
            omit_empty: false,
        }
    }

    /// Binding whose wire name equals the parameter name.
    pub const fn same(param: &'static str) -> Self {
        Self::new(param, param)
    }

    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }
}

#[derive(Debug)]
pub enum Body {
    None,
    /// `{}`
    Empty,
    Object(&'static [Binding]),
}

#[derive(Debug)]
pub enum ResultShape {
    /// Whole decoded body
    Json,
    /// The `items` array of a list response
    Items,
    /// `{"success": true, ...}` built from the listed fields
    Ack(&'static [AckField]),
    /// Literal `true`
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct AckField {
    pub key: &'static str,
    pub source: AckSource,
}

#[derive(Debug, Clone, Copy)]
pub enum AckSource {
    Literal(&'static str),
    Param(&'static str),
    Response(&'static str),
}

impl AckField {
    pub const fn literal(key: &'static str, value: &'static str) -> Self {
        Self {
            key,
            source: AckSource::Literal(value),
        }
    }

    pub const fn param(key: &'static str, param: &'static str) -> Self {
        Self {
            key,
            source: AckSource::Param(param),
        }
    }

    pub const fn response(key: &'static str, field: &'static str) -> Self {
        Self {
            key,
            source: AckSource::Response(field),
        }
    }
}

/// A run context entry written after the action succeeds.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub key: &'static str,
    pub source: OutputSource,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputSource {
    /// The value the action returns
    Result,
    /// A top-level field of the raw response
    Field(&'static str),
    Derived(fn(&ResolvedParams, &Value) -> Option<Value>),
}

impl Output {
    pub const fn result(key: &'static str) -> Self {
        Self {
            key,
            source: OutputSource::Result,
        }
    }

    pub const fn field(key: &'static str, field: &'static str) -> Self {
        Self {
            key,
            source: OutputSource::Field(field),
        }
    }

    pub const fn derived(key: &'static str, f: fn(&ResolvedParams, &Value) -> Option<Value>) -> Self {
        Self {
            key,
            source: OutputSource::Derived(f),
        }
    }
}

/// Every registered action, grouped by category in declaration order.
pub fn all() -> impl Iterator<Item = &'static ActionDef> {
    catalog::CATALOG.iter().flat_map(|group| group.iter())
}

pub fn find(name: &str) -> Result<&'static ActionDef> {
    all()
        .find(|action| action.name == name)
        .ok_or_else(|| CircleCiError::UnknownAction(name.to_string()))
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static ActionDef> {
    all().filter(move |action| action.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_action_names_are_unique() {
        let mut seen = HashSet::new();
        for action in all() {
            assert!(seen.insert(action.name), "duplicate action {}", action.name);
        }
        assert!(seen.len() >= 60);
    }

    #[test]
    fn test_every_action_takes_a_token() {
        for action in all() {
            let token = action
                .params
                .iter()
                .find(|param| param.key == "api_token")
                .unwrap_or_else(|| panic!("{} has no api_token", action.name));
            assert!(token.required, "{}", action.name);
            assert!(!token.env.is_empty(), "{}", action.name);
        }
    }

    #[test]
    fn test_path_placeholders_name_declared_params() {
        for action in all() {
            let Handler::Rest(call) = &action.handler else {
                continue;
            };
            let mut rest = call.path;
            while let Some(start) = rest.find('{') {
                let end = rest[start..].find('}').unwrap() + start;
                let key = &rest[start + 1..end];
                let param = action
                    .params
                    .iter()
                    .find(|param| param.key == key)
                    .unwrap_or_else(|| panic!("{}: undeclared {key}", action.name));
                assert!(
                    param.required || param.default.is_some(),
                    "{}: path param {key} may be absent",
                    action.name
                );
                rest = &rest[end + 1..];
            }
        }
    }

    #[test]
    fn test_bindings_name_declared_params() {
        for action in all() {
            let Handler::Rest(call) = &action.handler else {
                continue;
            };
            let body: &[Binding] = match call.body {
                Body::Object(bindings) => bindings,
                _ => &[],
            };
            for binding in call.query.iter().chain(body) {
                assert!(
                    action.params.iter().any(|p| p.key == binding.param),
                    "{}: binding to undeclared {}",
                    action.name,
                    binding.param
                );
            }
        }
    }

    #[test]
    fn test_find_unknown_action() {
        assert!(find("circleci_get_pipeline").is_ok());
        assert!(matches!(
            find("circleci_does_not_exist"),
            Err(CircleCiError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Insights"), Some(Category::Insights));
        assert_eq!(Category::parse("nope"), None);
        assert!(by_category(Category::Legacy).count() >= 4);
    }
}
