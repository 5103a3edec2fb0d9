//! Typed scenario commands and their execution against a registry.
//!
//! # Responsibility
//! - Turn untyped scenario steps into registry calls.
//! - Render call results as JSON values comparable with recorded outputs.
//!
//! # Invariants
//! - Ill-typed arguments become `Command::Rejected`, which renders as an
//!   `invalid_argument` outcome without touching the registry.
//! - Unknown methods and missing arguments are scenario errors, not outcomes.

use crate::model::package::PackageSnapshot;
use crate::model::time::{QueryTime, Timestamp};
use crate::registry::error::{ArgumentError, ErrorKind, RegistryResult};
use crate::registry::package_registry::PackageRegistry;
use crate::replay::scenario::{ReplayError, ReplayResult, ScenarioStep};
use crate::service::report::{average_weight, list_ids_by_destination, top_n_heaviest};
use serde_json::{json, Value};

pub const PKG_CREATE: &str = "PKG_CREATE";
pub const PKG_GET: &str = "PKG_GET";
pub const PKG_SET_WEIGHT: &str = "PKG_SET_WEIGHT";
pub const PKG_REDIRECT: &str = "PKG_REDIRECT";
pub const PKG_LIST_BY_DEST: &str = "PKG_LIST_BY_DEST";
pub const PKG_TOP_N_HEAVIEST: &str = "PKG_TOP_N_HEAVIEST";
pub const PKG_AVG_WEIGHT: &str = "PKG_AVG_WEIGHT";
pub const PKG_CREATE_AT: &str = "PKG_CREATE_AT";
pub const PKG_SET_WEIGHT_AT: &str = "PKG_SET_WEIGHT_AT";
pub const PKG_REDIRECT_AT: &str = "PKG_REDIRECT_AT";
pub const PKG_MARK_DELIVERED_AT: &str = "PKG_MARK_DELIVERED_AT";
pub const PKG_GET_AT: &str = "PKG_GET_AT";
pub const ROLLBACK: &str = "ROLLBACK";

/// One registry call decoded from a scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        at: QueryTime,
        id: String,
        weight: i64,
        destination: String,
    },
    SetWeight {
        at: QueryTime,
        id: String,
        weight: i64,
    },
    Redirect {
        at: QueryTime,
        id: String,
        destination: String,
    },
    MarkDelivered { at: Timestamp, id: String },
    Get { at: QueryTime, id: String },
    ListByDestination { destination: String },
    TopNHeaviest { n: i64 },
    AverageWeight,
    Rollback { horizon: Timestamp },
    /// An argument had the wrong JSON type.
    Rejected(ArgumentError),
}

impl Command {
    /// Decodes a scenario step.
    ///
    /// # Errors
    /// - `UnknownMethod` for unsupported method names.
    /// - `MissingArgument` when a required argument is absent both
    ///   positionally and by keyword.
    pub fn parse(step: &ScenarioStep) -> ReplayResult<Self> {
        match decode(step) {
            Ok(command) => Ok(command),
            Err(DecodeError::Argument(err)) => Ok(Self::Rejected(err)),
            Err(DecodeError::Scenario(err)) => Err(err),
        }
    }

    /// Runs the command and renders its result.
    pub fn execute(&self, registry: &mut PackageRegistry) -> Value {
        match self {
            Self::Create {
                at,
                id,
                weight,
                destination,
            } => render_unit(match at {
                QueryTime::Now => registry.create(id, *weight, destination),
                QueryTime::At(at) => registry.create_at(*at, id, *weight, destination),
            }),
            Self::SetWeight { at, id, weight } => render_unit(match at {
                QueryTime::Now => registry.set_weight(id, *weight),
                QueryTime::At(at) => registry.set_weight_at(*at, id, *weight),
            }),
            Self::Redirect {
                at,
                id,
                destination,
            } => render_unit(match at {
                QueryTime::Now => registry.redirect(id, destination),
                QueryTime::At(at) => registry.redirect_at(*at, id, destination),
            }),
            Self::MarkDelivered { at, id } => render_unit(registry.mark_delivered_at(*at, id)),
            Self::Get { at, id } => match at {
                QueryTime::Now => render_snapshot(registry.get(id)),
                QueryTime::At(at) => match registry.get_at(*at, id) {
                    Ok(snapshot) => render_snapshot(snapshot),
                    Err(err) => render_error(err.kind()),
                },
            },
            Self::ListByDestination { destination } => {
                match list_ids_by_destination(registry, destination) {
                    Ok(ids) => json!(ids),
                    Err(err) => render_error(err.kind()),
                }
            }
            Self::TopNHeaviest { n } => match top_n_heaviest(registry, *n) {
                Ok(ranked) => Value::Array(
                    ranked
                        .into_iter()
                        .map(|row| json!([row.id, row.weight, row.destination]))
                        .collect(),
                ),
                Err(err) => render_error(err.kind()),
            },
            Self::AverageWeight => match average_weight(registry) {
                Some(mean) => json!(mean),
                None => Value::Null,
            },
            Self::Rollback { horizon } => render_unit(registry.rollback(*horizon).map(|_| ())),
            Self::Rejected(_) => render_error(ErrorKind::InvalidArgument),
        }
    }
}

/// Compares a recorded output with an actual one.
///
/// Numbers compare by value, so `10` and `10.0` match.
pub fn outputs_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(left), Value::Number(right)) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => left == right,
            _ => left.as_f64() == right.as_f64(),
        },
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(left, right)| outputs_match(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right
                        .get(key)
                        .is_some_and(|other| outputs_match(value, other))
                })
        }
        _ => expected == actual,
    }
}

enum DecodeError {
    Scenario(ReplayError),
    Argument(ArgumentError),
}

impl From<ReplayError> for DecodeError {
    fn from(value: ReplayError) -> Self {
        Self::Scenario(value)
    }
}

impl From<ArgumentError> for DecodeError {
    fn from(value: ArgumentError) -> Self {
        Self::Argument(value)
    }
}

fn decode(step: &ScenarioStep) -> Result<Command, DecodeError> {
    let args = StepArgs { step };

    let command = match step.method.as_str() {
        PKG_CREATE => Command::Create {
            at: QueryTime::Now,
            id: args.string(0, "tracking_id")?,
            weight: args.integer(1, "weight")?,
            destination: args.string(2, "destination")?,
        },
        PKG_CREATE_AT => Command::Create {
            at: QueryTime::At(args.timestamp(0)?),
            id: args.string(1, "tracking_id")?,
            weight: args.integer(2, "weight")?,
            destination: args.string(3, "destination")?,
        },
        PKG_SET_WEIGHT => Command::SetWeight {
            at: QueryTime::Now,
            id: args.string(0, "tracking_id")?,
            weight: args.integer(1, "weight")?,
        },
        PKG_SET_WEIGHT_AT => Command::SetWeight {
            at: QueryTime::At(args.timestamp(0)?),
            id: args.string(1, "tracking_id")?,
            weight: args.integer(2, "weight")?,
        },
        PKG_REDIRECT => Command::Redirect {
            at: QueryTime::Now,
            id: args.string(0, "tracking_id")?,
            destination: args.string(1, "destination")?,
        },
        PKG_REDIRECT_AT => Command::Redirect {
            at: QueryTime::At(args.timestamp(0)?),
            id: args.string(1, "tracking_id")?,
            destination: args.string(2, "destination")?,
        },
        PKG_MARK_DELIVERED_AT => Command::MarkDelivered {
            at: args.timestamp(0)?,
            id: args.string(1, "tracking_id")?,
        },
        PKG_GET => Command::Get {
            at: QueryTime::Now,
            id: args.string(0, "tracking_id")?,
        },
        PKG_GET_AT => Command::Get {
            at: QueryTime::At(args.timestamp(0)?),
            id: args.string(1, "tracking_id")?,
        },
        PKG_LIST_BY_DEST => Command::ListByDestination {
            destination: args.string(0, "destination")?,
        },
        PKG_TOP_N_HEAVIEST => Command::TopNHeaviest {
            n: args.integer(0, "n")?,
        },
        PKG_AVG_WEIGHT => Command::AverageWeight,
        ROLLBACK => Command::Rollback {
            horizon: args.timestamp(0)?,
        },
        other => return Err(ReplayError::UnknownMethod(other.to_string()).into()),
    };
    Ok(command)
}

struct StepArgs<'a> {
    step: &'a ScenarioStep,
}

impl<'a> StepArgs<'a> {
    fn value(&self, position: usize, name: &'static str) -> Result<&'a Value, DecodeError> {
        let value = self
            .step
            .args
            .get(position)
            .or_else(|| self.step.kwargs.get(name))
            .ok_or_else(|| ReplayError::MissingArgument {
                method: self.step.method.clone(),
                name,
            })?;
        Ok(value)
    }

    fn timestamp(&self, position: usize) -> Result<Timestamp, DecodeError> {
        self.integer(position, "timestamp")
    }

    fn integer(&self, position: usize, name: &'static str) -> Result<i64, DecodeError> {
        let value = self.value(position, name)?;
        let integer = value.as_i64().ok_or_else(|| ArgumentError::NotAnInteger {
            field: name,
            raw: value.to_string(),
        })?;
        Ok(integer)
    }

    fn string(&self, position: usize, name: &'static str) -> Result<String, DecodeError> {
        let value = self.value(position, name)?;
        let text = value.as_str().ok_or_else(|| ArgumentError::NotAString {
            field: name,
            raw: value.to_string(),
        })?;
        Ok(text.to_string())
    }
}

fn render_unit(result: RegistryResult<()>) -> Value {
    match result {
        Ok(()) => Value::Null,
        Err(err) => render_error(err.kind()),
    }
}

fn render_snapshot(snapshot: Option<PackageSnapshot>) -> Value {
    match snapshot {
        Some(snapshot) => json!([snapshot.weight, snapshot.destination]),
        None => Value::Null,
    }
}

fn render_error(kind: ErrorKind) -> Value {
    json!({ "error": kind.as_str() })
}
