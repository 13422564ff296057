//! Environment probes.
//!
//! Each probe takes an interpreter and always returns a `CheckResult`.
//! Interpreter errors become messages; nothing is propagated to the caller.

pub mod distributed;
pub mod functional;
pub mod precision;
pub mod quantization;
pub mod runtime;
pub mod tools;

#[cfg(test)]
pub(crate) mod fake;

use crate::check::CheckResult;
use crate::python::Interpreter;

pub type ProbeFn = fn(&mut dyn Interpreter) -> CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Required,
    Optional,
}

#[derive(Debug)]
pub struct Probe {
    pub name: &'static str,
    pub title: &'static str,
    pub tier: Tier,
    pub run: ProbeFn,
}

/// All probes, in execution order.
pub static PROBES: &[Probe] = &[
    Probe {
        name: runtime::NAME,
        title: runtime::TITLE,
        tier: Tier::Required,
        run: runtime::check,
    },
    Probe {
        name: precision::NAME,
        title: precision::TITLE,
        tier: Tier::Required,
        run: precision::check,
    },
    Probe {
        name: quantization::NAME,
        title: quantization::TITLE,
        tier: Tier::Optional,
        run: quantization::check,
    },
    Probe {
        name: distributed::NAME,
        title: distributed::TITLE,
        tier: Tier::Required,
        run: distributed::check,
    },
    Probe {
        name: tools::NAME,
        title: tools::TITLE,
        tier: Tier::Optional,
        run: tools::check,
    },
    Probe {
        name: functional::NAME,
        title: functional::TITLE,
        tier: Tier::Optional,
        run: functional::check,
    },
];
