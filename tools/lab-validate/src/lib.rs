pub mod check;
pub mod config;
pub mod probes;
pub mod python;
pub mod report;
pub mod reporter;
pub mod runner;

use check::{CheckResult, Findings, Status};
use probes::{Probe, Tier};
use python::{EvalError, Interpreter};
use report::{Report, ReportError};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

pub use config::ValidateConfig;
pub use python::{InterpreterInfo, PythonSession};

/// Run every probe in order, each against a fresh interpreter from `open`,
/// and collect the results into a report. A probe that cannot get an
/// interpreter, or that panics, yields a failed result instead of stopping
/// the run.
pub fn run_probes<O>(probes: &[Probe], mut open: O) -> Result<Report, ReportError>
where
    O: FnMut() -> Result<Box<dyn Interpreter>, EvalError>,
{
    let mut results = Vec::with_capacity(probes.len());

    for probe in probes {
        let start = Instant::now();
        let mut result = match open() {
            Ok(mut interpreter) => guarded(probe, interpreter.as_mut()),
            Err(err) => {
                log::warn!("{}: no interpreter: {err}", probe.name);
                let mut findings = Findings::new(probe.name, probe.title);
                findings.error(format!("{}: {err}", probe.title));
                findings.finish(Status::Failed)
            }
        };
        // The table entry names the result, whatever the probe called it.
        if result.name != probe.name {
            log::warn!("{} reported its result as `{}`", probe.name, result.name);
        }
        result.name = probe.name.to_string();
        result.title = probe.title.to_string();
        log::debug!(
            "[{:>6.0?}] {} -> {:?}",
            start.elapsed(),
            result.name,
            result.status
        );
        results.push(result);
    }

    let names = |tier: Tier| -> Vec<String> {
        probes
            .iter()
            .filter(|probe| probe.tier == tier)
            .map(|probe| probe.name.to_string())
            .collect()
    };
    Report::new(results, names(Tier::Required), names(Tier::Optional))
}

/// Run all probes against the configured Python interpreter.
pub fn run_all(config: &ValidateConfig) -> Result<Report, ReportError> {
    run_probes(probes::PROBES, || {
        PythonSession::spawn(&config.python).map(|session| Box::new(session) as Box<dyn Interpreter>)
    })
}

fn guarded(probe: &Probe, interpreter: &mut dyn Interpreter) -> CheckResult {
    match panic::catch_unwind(AssertUnwindSafe(|| (probe.run)(interpreter))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let mut findings = Findings::new(probe.name, probe.title);
            findings.error(format!("{}: probe panicked: {reason}", probe.title));
            findings.finish(Status::Failed)
        }
    }
}
