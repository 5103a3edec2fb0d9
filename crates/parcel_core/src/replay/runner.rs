//! Scenario execution and reporting.
//!
//! # Responsibility
//! - Run each scenario case against a fresh registry.
//! - Collect output mismatches per case.
//!
//! # Invariants
//! - Cases never share registry state.
//! - A scenario error (unknown method, missing argument) aborts the run; an
//!   output mismatch does not.

use crate::registry::config::RegistryConfig;
use crate::registry::package_registry::PackageRegistry;
use crate::replay::command::{outputs_match, Command};
use crate::replay::scenario::{ReplayError, ReplayResult, ScenarioStep, ScenarioSuite};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One step whose actual output differed from the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepMismatch {
    pub step_index: usize,
    pub method: String,
    pub expected: Value,
    pub actual: Value,
}

/// Result of replaying one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub steps_run: usize,
    pub steps_checked: usize,
    pub mismatches: Vec<StepMismatch>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Result of replaying a set of cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseReport> + '_ {
        self.cases.iter().filter(|case| !case.passed())
    }
}

/// Replays scenario cases with one registry configuration.
pub struct ReplayRunner {
    run_id: Uuid,
    config: RegistryConfig,
}

impl ReplayRunner {
    /// Creates a runner with a fresh correlation id.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
        }
    }

    /// Correlation id attached to every log line of this runner.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Replays one case against a fresh registry.
    pub fn run_case(&self, name: &str, steps: &[ScenarioStep]) -> ReplayResult<CaseReport> {
        let mut registry = PackageRegistry::with_config(self.config);
        let mut report = CaseReport {
            name: name.to_string(),
            steps_run: 0,
            steps_checked: 0,
            mismatches: Vec::new(),
        };

        for (step_index, step) in steps.iter().enumerate() {
            let command = Command::parse(step)?;
            let actual = command.execute(&mut registry);
            report.steps_run += 1;

            let Some(expected) = &step.output else {
                continue;
            };
            report.steps_checked += 1;
            if !outputs_match(expected, &actual) {
                warn!(
                    "event=replay_mismatch module=replay status=error run_id={} case={} step={} method={}",
                    self.run_id, name, step_index, step.method
                );
                report.mismatches.push(StepMismatch {
                    step_index,
                    method: step.method.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        info!(
            "event=replay_case module=replay status={} run_id={} case={} steps_run={} mismatches={}",
            if report.passed() { "ok" } else { "error" },
            self.run_id,
            name,
            report.steps_run,
            report.mismatches.len()
        );
        Ok(report)
    }

    /// Replays every case in the suite, in case-name order.
    pub fn run_suite(&self, suite: &ScenarioSuite) -> ReplayResult<SuiteReport> {
        info!(
            "event=replay_start module=replay status=start run_id={} cases={} current_queries_respect_delivery={} reuse_rolled_back_ids={}",
            self.run_id,
            suite.len(),
            self.config.current_queries_respect_delivery,
            self.config.reuse_rolled_back_ids
        );

        let cases = suite
            .iter()
            .map(|(name, steps)| self.run_case(name, steps))
            .collect::<ReplayResult<Vec<_>>>()?;
        Ok(SuiteReport {
            run_id: self.run_id,
            cases,
        })
    }

    /// Replays a single named case from the suite.
    ///
    /// # Errors
    /// - `UnknownCase` when `name` is not in the suite.
    pub fn run_named(&self, suite: &ScenarioSuite, name: &str) -> ReplayResult<SuiteReport> {
        let steps = suite
            .get(name)
            .ok_or_else(|| ReplayError::UnknownCase(name.to_string()))?;
        let case = self.run_case(name, steps)?;
        Ok(SuiteReport {
            run_id: self.run_id,
            cases: vec![case],
        })
    }
}
