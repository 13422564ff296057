use crate::check::{CheckResult, Findings, Status};
use crate::python::{EvalError, Interpreter};

pub const NAME: &str = "modelopt";
pub const TITLE: &str = "ModelOpt";

/// Plugin warnings ModelOpt emits on import that say nothing about whether
/// quantization works.
const QUIET_WARNINGS: &str = "import warnings\n\
                              warnings.filterwarnings('ignore', message='.*Conv1D.*')\n\
                              warnings.filterwarnings('ignore', message='.*apex plugin.*')";

const CONFIG_SYMBOLS: &str =
    "[c for c in dir(mtq) if 'quant' in c.lower() or 'config' in c.lower()]";

const LISTED_CONFIGS: usize = 6;

/// ModelOpt gates on installation only: once the package imports, any
/// later error is reported but the check still passes.
pub fn check(py: &mut dyn Interpreter) -> CheckResult {
    let mut findings = Findings::new(NAME, TITLE);

    if let Err(err) = py.eval(QUIET_WARNINGS) {
        log::debug!("could not filter ModelOpt warnings: {err}");
    }

    if let Err(err) = py.eval("import modelopt") {
        return if err.is_import_error() {
            findings.error(format!("ModelOpt not installed: {err}"));
            findings.finish(Status::Failed)
        } else {
            findings.warning(format!("ModelOpt has issues but is installed: {err}"));
            findings.finish(Status::Passed)
        };
    }

    if let Err(err) = probe(py, &mut findings) {
        findings.warning(format!("ModelOpt has issues but is installed: {err}"));
    }
    findings.finish(Status::Passed)
}

fn probe(py: &mut dyn Interpreter, findings: &mut Findings) -> Result<(), EvalError> {
    let version = py.eval_str("modelopt.__version__")?;
    findings.success(format!("ModelOpt {version}"));

    let configs = py
        .eval("import modelopt.torch.quantization as mtq")
        .and_then(|_| py.eval_strings(CONFIG_SYMBOLS));
    match configs {
        Ok(configs) => {
            findings.success("Quantization module available");
            findings.info(format!("  Available configs: {} found", configs.len()));
            if !configs.is_empty() {
                findings.info(format!("  {}", summarize(&configs)));
            }
        }
        Err(err) => findings.warning(format!("Quantization module: {err}")),
    }

    match py.eval("import modelopt.torch.export as mte") {
        Ok(_) => findings.success("Export module available"),
        Err(err) if err.is_import_error() => {
            findings.info("Export module not available (optional)")
        }
        Err(err) => return Err(err),
    }

    Ok(())
}

fn summarize(names: &[String]) -> String {
    let shown = names
        .iter()
        .take(LISTED_CONFIGS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match names.len().saturating_sub(LISTED_CONFIGS) {
        0 => shown,
        rest => format!("{shown} (+{rest} more)"),
    }
}
