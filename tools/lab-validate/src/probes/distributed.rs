use crate::check::{CheckResult, Findings, Status};
use crate::python::Interpreter;

pub const NAME: &str = "megatron_lm";
pub const TITLE: &str = "Megatron-LM";

/// Regular packages expose `__file__`; namespace packages only `__path__`.
const INSTALL_LOCATION: &str = "(__import__('os').path.dirname(megatron.__file__) \
                                if getattr(megatron, '__file__', None) \
                                else next(iter(getattr(megatron, '__path__', [])), None))";

pub fn check(py: &mut dyn Interpreter) -> CheckResult {
    let mut findings = Findings::new(NAME, TITLE);

    if let Err(err) = py.eval("import megatron") {
        findings.error(format!("Megatron-LM: {err}"));
        return findings.finish(Status::Failed);
    }
    findings.success("Megatron package importable");

    let status = match py.eval("from megatron.core import parallel_state") {
        Ok(_) => {
            findings.success("Megatron Core parallel_state available");
            Status::Passed
        }
        Err(err) => {
            findings.error(format!("Megatron Core: {err}"));
            Status::Failed
        }
    };

    match py.eval("from megatron.core.tensor_parallel import layers") {
        Ok(_) => findings.success("Tensor Parallel layers available"),
        Err(err) => findings.warning(format!("Tensor Parallel: {err}")),
    }

    match py.eval("from megatron.core.transformer import TransformerConfig") {
        Ok(_) => findings.success("TransformerConfig available"),
        Err(err) => findings.warning(format!("TransformerConfig: {err}")),
    }

    match py.eval("from megatron.core.models.gpt import GPTModel") {
        Ok(_) => findings.success("GPTModel available"),
        Err(err) => findings.info(format!("GPTModel: {err} (may require initialization)")),
    }

    match py.eval(INSTALL_LOCATION) {
        Ok(serde_json::Value::String(path)) => findings.info(format!("  Installed at: {path}")),
        Ok(_) => {}
        Err(err) => log::debug!("megatron install location unavailable: {err}"),
    }

    findings.finish(status)
}
