//! Scenario file model and loading.
//!
//! A suite file is a JSON object mapping case names to step lists:
//!
//! ```json
//! { "1": [ { "method": "PKG_CREATE_AT", "args": [0, "A", 10, "X"], "output": null } ] }
//! ```
//!
//! A step without an `output` key is executed but not checked; an explicit
//! `"output": null` expects a null result.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ReplayResult<T> = Result<T, ReplayError>;

/// Ordered mapping of case name to steps.
pub type ScenarioSuite = BTreeMap<String, Vec<ScenarioStep>>;

/// One recorded call and its expected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<Value>,
}

impl ScenarioStep {
    /// Builds a step from positional arguments.
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            kwargs: Map::new(),
            output: None,
        }
    }
}

/// Errors from loading or interpreting scenario files.
#[derive(Debug)]
pub enum ReplayError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    UnknownMethod(String),
    MissingArgument { method: String, name: &'static str },
    UnknownCase(String),
}

impl Display for ReplayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(
                f,
                "failed to read scenario file `{}`: {source}",
                path.display()
            ),
            Self::Json(err) => write!(f, "invalid scenario json: {err}"),
            Self::UnknownMethod(method) => write!(f, "unknown scenario method: {method}"),
            Self::MissingArgument { method, name } => {
                write!(f, "scenario method {method} is missing argument `{name}`")
            }
            Self::UnknownCase(name) => write!(f, "scenario case not found: {name}"),
        }
    }
}

impl Error for ReplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::UnknownMethod(_) | Self::MissingArgument { .. } | Self::UnknownCase(_) => None,
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a suite from JSON text.
pub fn parse_suite(json: &str) -> ReplayResult<ScenarioSuite> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a suite file.
pub fn load_suite(path: impl AsRef<Path>) -> ReplayResult<ScenarioSuite> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_suite(&text)
}

// Keeps an explicit `null` distinct from a missing key.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{parse_suite, ReplayError};
    use serde_json::{json, Value};

    #[test]
    fn distinguishes_null_output_from_missing_output() {
        let suite = parse_suite(
            r#"{
                "case": [
                    {"method": "PKG_GET", "args": ["A"], "output": null},
                    {"method": "PKG_GET", "args": ["A"]}
                ]
            }"#,
        )
        .expect("suite should parse");

        let steps = &suite["case"];
        assert_eq!(steps[0].output, Some(Value::Null));
        assert_eq!(steps[1].output, None);
        assert!(steps[1].kwargs.is_empty());
    }

    #[test]
    fn accepts_keyword_arguments() {
        let suite = parse_suite(
            r#"{"case": [{"method": "PKG_CREATE", "kwargs": {"tracking_id": "A", "weight": 1, "destination": "X"}}]}"#,
        )
        .expect("suite should parse");
        assert!(suite["case"][0].args.is_empty());
        assert_eq!(suite["case"][0].kwargs["weight"], json!(1));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_suite("{not json").expect_err("malformed json must fail");
        assert!(matches!(err, ReplayError::Json(_)));
    }
}
