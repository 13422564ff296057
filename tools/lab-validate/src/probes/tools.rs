use crate::check::{CheckResult, Findings, Status};
use crate::python::Interpreter;

pub const NAME: &str = "additional_tools";
pub const TITLE: &str = "Additional Tools";

/// Importable module name and display name, in report order.
pub const AUXILIARY_TOOLS: &[(&str, &str)] = &[
    ("jupyter", "Jupyter"),
    ("tensorboard", "TensorBoard"),
    ("wandb", "Weights & Biases"),
    ("datasets", "HuggingFace Datasets"),
    ("transformers", "HuggingFace Transformers"),
];

/// Passes when at least one auxiliary tool imports.
pub fn check(py: &mut dyn Interpreter) -> CheckResult {
    let mut findings = Findings::new(NAME, TITLE);
    let mut available = 0usize;

    for (module, display) in AUXILIARY_TOOLS {
        match py.eval(&format!("import {module}")) {
            Ok(_) => {
                findings.success(*display);
                available += 1;
            }
            Err(err) if err.is_import_error() => {
                findings.info(format!("{display} not installed (optional)"))
            }
            Err(err) => findings.warning(format!("{display}: {err}")),
        }
    }

    let status = if available > 0 {
        Status::Passed
    } else {
        Status::Failed
    };
    findings.finish(status)
}
