use crate::check::{CheckResult, Findings, Status};
use crate::python::{EvalError, Interpreter};

pub const NAME: &str = "pytorch";
pub const TITLE: &str = "PyTorch";

const SMOKE_MATMUL: &str = "_x = torch.randn(100, 100, device='cuda')\n\
                            _y = torch.matmul(_x, _x)\n\
                            torch.cuda.synchronize()";

/// PyTorch import, CUDA availability, device inventory and one matmul on
/// the accelerator.
pub fn check(py: &mut dyn Interpreter) -> CheckResult {
    let mut findings = Findings::new(NAME, TITLE);
    let status = match probe(py, &mut findings) {
        Ok(status) => status,
        Err(err) => {
            findings.error(format!("PyTorch: {err}"));
            Status::Failed
        }
    };
    findings.finish(status)
}

fn probe(py: &mut dyn Interpreter, findings: &mut Findings) -> Result<Status, EvalError> {
    py.eval("import torch")?;
    let version = py.eval_str("torch.__version__")?;
    findings.success(format!("PyTorch {version}"));

    if !py.eval_bool("torch.cuda.is_available()")? {
        findings.error("CUDA not available");
        return Ok(Status::Failed);
    }

    let cuda = py.eval_str("torch.version.cuda")?;
    findings.success(format!("CUDA available: {cuda}"));

    let count = py.eval_u64("torch.cuda.device_count()")?;
    findings.success(format!("GPU count: {count}"));
    for index in 0..count {
        let name = py.eval_str(&format!("torch.cuda.get_device_name({index})"))?;
        let bytes = py.eval_f64(&format!(
            "torch.cuda.get_device_properties({index}).total_memory"
        ))?;
        findings.info(format!("  GPU {index}: {name} ({:.1} GB)", bytes / 1e9));
    }

    py.eval(SMOKE_MATMUL)?;
    findings.success("CUDA tensor operations working");
    Ok(Status::Passed)
}
