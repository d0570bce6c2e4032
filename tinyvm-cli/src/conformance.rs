//! Conformance fixtures: assembly files annotated with expected outcomes.
//!
//! A fixture is ordinary assembly text. Comment lines that start with
//! `; @` carry expectations for zero-argument entry methods:
//!
//! ```text
//! ; @expect main 225
//! ; @fault outOfBounds IndexOutOfBounds
//! ```
//!
//! Every expectation runs in its own interpreter session.

use std::fmt;

use log::debug;
use thiserror::Error;
use tinyvm_assembler::AsmError;
use tinyvm_common::Program;
use tinyvm_vm::{Fault, FaultKind, Interpreter, State, VmConfig};

/// The outcome a fixture demands of one entry method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The method returns this value.
    Value(i32),
    /// The method faults with this [`FaultKind::name`].
    Fault(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Value(value) => write!(f, "{value}"),
            Expected::Fault(name) => write!(f, "fault {name}"),
        }
    }
}

/// One `@expect` / `@fault` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub line: usize,
    pub entry: String,
    pub expected: Expected,
}

/// Malformed expectation directives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("line {line}: unknown directive '@{name}'")]
    UnknownDirective { line: usize, name: String },

    #[error("line {line}: @{directive} expects a method name and {what}")]
    MissingArgument {
        line: usize,
        directive: &'static str,
        what: &'static str,
    },

    #[error("line {line}: invalid value '{token}'")]
    InvalidValue { line: usize, token: String },

    #[error("line {line}: unknown fault kind '{token}'")]
    UnknownFault { line: usize, token: String },

    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}

/// Why a fixture could not be checked at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error(transparent)]
    Assembly(#[from] AsmError),

    #[error("no @expect or @fault directives")]
    NoExpectations,
}

/// Extract the expectation directives from fixture text.
pub fn parse_expectations(text: &str) -> Result<Vec<Expectation>, DirectiveError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let Some(body) = raw
            .trim_start()
            .strip_prefix(';')
            .and_then(|rest| rest.trim_start().strip_prefix('@'))
        else {
            continue;
        };

        let mut words = body.split_whitespace();
        let name = words.next().unwrap_or_default();
        let (directive, what) = match name {
            "expect" => ("expect", "a value"),
            "fault" => ("fault", "a fault kind"),
            _ => {
                return Err(DirectiveError::UnknownDirective {
                    line,
                    name: name.to_string(),
                })
            }
        };

        let missing = DirectiveError::MissingArgument {
            line,
            directive,
            what,
        };
        let entry = words.next().ok_or_else(|| missing.clone())?;
        let operand = words.next().ok_or(missing)?;
        if let Some(extra) = words.next() {
            return Err(DirectiveError::UnexpectedToken {
                line,
                token: extra.to_string(),
            });
        }

        let expected = if directive == "expect" {
            Expected::Value(operand.parse().map_err(|_| DirectiveError::InvalidValue {
                line,
                token: operand.to_string(),
            })?)
        } else {
            let name = FaultKind::NAMES
                .into_iter()
                .find(|n| *n == operand)
                .ok_or_else(|| DirectiveError::UnknownFault {
                    line,
                    token: operand.to_string(),
                })?;
            Expected::Fault(name)
        };

        out.push(Expectation {
            line,
            entry: entry.to_string(),
            expected,
        });
    }
    Ok(out)
}

/// Resource limits for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub config: VmConfig,
    /// Instruction budget. `None` runs to completion.
    pub max_steps: Option<u64>,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Returned(i32),
    Faulted(Fault),
    /// The step budget ran out while the program was still running.
    Exhausted { steps: u64 },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Returned(value) => write!(f, "{value}"),
            Outcome::Faulted(fault) => write!(f, "fault {}: {fault}", fault.kind.name()),
            Outcome::Exhausted { steps } => write!(f, "step budget exhausted after {steps} steps"),
        }
    }
}

/// Run `entry` with `args` in a fresh session.
pub fn execute(program: &Program, entry: &str, args: &[i32], limits: &Limits) -> Outcome {
    let mut vm = Interpreter::new(program, entry, args, limits.config);
    let state = vm.run_for(limits.max_steps.unwrap_or(u64::MAX)).clone();
    match state {
        State::Returned(value) => Outcome::Returned(value),
        State::Faulted(fault) => Outcome::Faulted(fault),
        State::Running => Outcome::Exhausted { steps: vm.steps() },
    }
}

/// One checked expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub expectation: Expectation,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        match (&self.expectation.expected, &self.outcome) {
            (Expected::Value(want), Outcome::Returned(got)) => want == got,
            (Expected::Fault(name), Outcome::Faulted(fault)) => fault.kind.name() == *name,
            _ => false,
        }
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        write!(
            f,
            "{status} {}: expected {}, got {}",
            self.expectation.entry, self.expectation.expected, self.outcome
        )
    }
}

/// Check every expectation against an already-loaded program.
pub fn run_expectations(
    program: &Program,
    expectations: &[Expectation],
    limits: &Limits,
) -> Vec<CaseResult> {
    expectations
        .iter()
        .map(|expectation| {
            let outcome = execute(program, &expectation.entry, &[], limits);
            debug!("{} -> {outcome}", expectation.entry);
            CaseResult {
                expectation: expectation.clone(),
                outcome,
            }
        })
        .collect()
}

/// Assemble fixture text and check its expectations.
pub fn check_fixture(text: &str, limits: &Limits) -> Result<Vec<CaseResult>, FixtureError> {
    let expectations = parse_expectations(text)?;
    if expectations.is_empty() {
        return Err(FixtureError::NoExpectations);
    }
    let program = tinyvm_assembler::assemble(text)?;
    Ok(run_expectations(&program, &expectations, limits))
}
