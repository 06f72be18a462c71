use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

use crate::auth::Token;
use crate::error::{CircleCiError, Result};

/// Caller-supplied parameter values, keyed by parameter name.
pub type Params = IndexMap<String, Value>;

/// Value checks run after coercion; the error string is shown to the user.
pub type Check = fn(&Value) -> std::result::Result<(), String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Bool,
    Object,
    StringList,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Bool => "bool",
            ParamKind::Object => "object",
            ParamKind::StringList => "string list",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    EmptyObject,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(n) => Value::from(n),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::EmptyObject => Value::Object(Map::new()),
        }
    }
}

/// Schema of one action parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Environment variables consulted in order when no value is given
    pub env: &'static [&'static str],
    pub default: Option<DefaultValue>,
    /// Accepted string values, empty means unrestricted
    pub allowed: &'static [&'static str],
    pub check: Option<Check>,
    pub description: &'static str,
}

impl ParamDef {
    pub const fn new(key: &'static str, kind: ParamKind) -> Self {
        Self {
            key,
            kind,
            required: false,
            env: &[],
            default: None,
            allowed: &[],
            check: None,
            description: "",
        }
    }

    pub const fn string(key: &'static str) -> Self {
        Self::new(key, ParamKind::String)
    }

    pub const fn integer(key: &'static str) -> Self {
        Self::new(key, ParamKind::Integer)
    }

    pub const fn bool(key: &'static str) -> Self {
        Self::new(key, ParamKind::Bool)
    }

    pub const fn object(key: &'static str) -> Self {
        Self::new(key, ParamKind::Object)
    }

    pub const fn list(key: &'static str) -> Self {
        Self::new(key, ParamKind::StringList)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn env(mut self, names: &'static [&'static str]) -> Self {
        self.env = names;
        self
    }

    pub const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = values;
        self
    }

    pub const fn check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }

    pub const fn about(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Parameter values after defaulting, coercion and validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: IndexMap<String, Value>,
}

impl ResolvedParams {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.str(key)
            .ok_or_else(|| CircleCiError::validation(format!("Missing required parameter '{key}'")))
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn token(&self) -> Result<Token> {
        self.require_str("api_token").map(Token::from)
    }

    /// String form used for path templates and query strings.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        })
    }
}

/// Where parameter values come from besides the caller.
pub struct ParamSources<'a> {
    /// `[defaults]` section of the config file
    pub defaults: &'a IndexMap<String, Value>,
    pub env: &'a dyn Fn(&str) -> Option<String>,
}

/// Process environment lookup, treating empty variables as unset.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Resolve every parameter of an action.
///
/// Order: explicit value, first set environment variable, config default,
/// built-in default. Fails on unknown keys, missing required values, kind
/// mismatches, disallowed values and failed checks.
pub fn resolve(
    action: &str,
    defs: &[ParamDef],
    explicit: &Params,
    sources: &ParamSources<'_>,
) -> Result<ResolvedParams> {
    if let Some(unknown) = explicit
        .keys()
        .find(|key| !defs.iter().any(|def| def.key == key.as_str()))
    {
        return Err(CircleCiError::validation(format!(
            "Unknown parameter '{unknown}' for action {action}"
        )));
    }

    let mut resolved = ResolvedParams::default();

    for def in defs {
        let Some(raw) = lookup(def, explicit, sources) else {
            if def.required {
                return Err(CircleCiError::validation(missing_message(def)));
            }
            continue;
        };

        let value = coerce(def, raw)?;
        validate(def, &value)?;
        resolved.insert(def.key, value);
    }

    Ok(resolved)
}

fn lookup(def: &ParamDef, explicit: &Params, sources: &ParamSources<'_>) -> Option<Value> {
    if let Some(value) = explicit.get(def.key).filter(|v| !v.is_null()) {
        return Some(value.clone());
    }

    for name in def.env {
        if let Some(value) = (sources.env)(name) {
            debug!("Parameter '{}' taken from ${name}", def.key);
            return Some(Value::String(value));
        }
    }

    if let Some(value) = sources.defaults.get(def.key).filter(|v| !v.is_null()) {
        debug!("Parameter '{}' taken from config defaults", def.key);
        return Some(value.clone());
    }

    def.default.map(DefaultValue::to_value)
}

fn missing_message(def: &ParamDef) -> String {
    if def.env.is_empty() {
        format!("Missing required parameter '{}'", def.key)
    } else {
        format!(
            "Missing required parameter '{}' (or set {})",
            def.key,
            def.env.join(" / ")
        )
    }
}

/// Convert a raw value, typically a string from the environment or the
/// command line, into the parameter's kind.
pub fn coerce(def: &ParamDef, raw: Value) -> Result<Value> {
    let mismatch = |raw: &Value| {
        CircleCiError::validation(format!(
            "Parameter '{}' expects {}, got {raw}",
            def.key, def.kind
        ))
    };

    match def.kind {
        ParamKind::String => match raw {
            Value::String(_) => Ok(raw),
            Value::Number(_) | Value::Bool(_) => Ok(Value::String(raw.to_string())),
            other => Err(mismatch(&other)),
        },
        ParamKind::Integer => match &raw {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch(&raw)),
            _ => Err(mismatch(&raw)),
        },
        ParamKind::Bool => match &raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(mismatch(&raw)),
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(mismatch(&raw)),
            },
            _ => Err(mismatch(&raw)),
        },
        ParamKind::Object => match &raw {
            Value::Object(_) => Ok(raw.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(mismatch(&raw)),
            },
            _ => Err(mismatch(&raw)),
        },
        ParamKind::StringList => match raw {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(_) => Ok(item),
                    Value::Number(_) | Value::Bool(_) => Ok(Value::String(item.to_string())),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.starts_with('[') {
                    let parsed: Value = serde_json::from_str(trimmed)
                        .map_err(|_| mismatch(&Value::String(s.clone())))?;
                    coerce(def, parsed)
                } else {
                    Ok(Value::Array(
                        trimmed
                            .split(',')
                            .map(str::trim)
                            .filter(|part| !part.is_empty())
                            .map(|part| Value::String(part.to_string()))
                            .collect(),
                    ))
                }
            }
            other => Err(mismatch(&other)),
        },
    }
}

fn validate(def: &ParamDef, value: &Value) -> Result<()> {
    if !def.allowed.is_empty() {
        let accepted = value
            .as_str()
            .is_some_and(|s| def.allowed.contains(&s));
        if !accepted {
            return Err(CircleCiError::validation(format!(
                "Parameter '{}' must be one of: {}",
                def.key,
                def.allowed.join(", ")
            )));
        }
    }

    if let Some(check) = def.check {
        check(value).map_err(|message| {
            CircleCiError::validation(format!("Parameter '{}': {message}", def.key))
        })?;
    }

    Ok(())
}
