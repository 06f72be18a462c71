use std::fmt;

use serde_json::Value;

use crate::auth::Token;

/// Which CircleCI REST surface a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// `https://circleci.com/api/v2/`
    V2,
    /// Deprecated `https://circleci.com/api/v1.1/` surface.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// How the token is attached to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Circle-Token: <token>` header.
    TokenHeader,
    /// HTTP basic auth with the token as username and an empty password.
    Basic,
}

/// One fully described API call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub api: ApiVersion,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Token,
    pub auth: AuthScheme,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>, token: Token) -> Self {
        Self {
            api: ApiVersion::V2,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token,
            auth: AuthScheme::TokenHeader,
        }
    }

    pub fn get(path: impl Into<String>, token: Token) -> Self {
        Self::new(Method::Get, path, token)
    }

    #[must_use]
    pub fn api(mut self, api: ApiVersion) -> Self {
        self.api = api;
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
