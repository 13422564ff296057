use crate::check::{CheckResult, Findings, Status};
use crate::python::{EvalError, Interpreter};

pub const NAME: &str = "fp8_test";
pub const TITLE: &str = "FP8 Functional Test";

/// Lowest compute capability with native FP8 tensor cores (Ada, sm_89).
pub const NATIVE_FP8_CAPABILITY: (u64, u64) = (8, 9);

/// Delayed-scaling settings for the forward pass under `fp8_autocast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingRecipe {
    pub format: &'static str,
    pub amax_history_len: u32,
    pub amax_compute_algo: &'static str,
}

pub const HYBRID_RECIPE: ScalingRecipe = ScalingRecipe {
    format: "HYBRID",
    amax_history_len: 16,
    amax_compute_algo: "max",
};

impl ScalingRecipe {
    fn to_python(self) -> String {
        format!(
            "_recipe = DelayedScaling(fp8_format=Format.{}, amax_history_len={}, amax_compute_algo={:?})",
            self.format, self.amax_history_len, self.amax_compute_algo
        )
    }
}

// Token count (8 * 32) must be divisible by 8 and the hidden size by 16.
const FP8_FORWARD: &str = "_model = te.Linear(512, 512).cuda()\n\
                           _x = torch.randn(8, 32, 512, device='cuda')\n\
                           with te.fp8_autocast(enabled=True, fp8_recipe=_recipe):\n    \
                           _y = _model(_x)";

/// Runs one Linear layer under FP8 autocast. Never fatal: errors are
/// warnings and a missing GPU is a skip.
pub fn check(py: &mut dyn Interpreter) -> CheckResult {
    let mut findings = Findings::new(NAME, TITLE);
    let status = match probe(py, &mut findings) {
        Ok(status) => status,
        Err(err) => {
            findings.warning(format!("FP8 test: {err}"));
            Status::Failed
        }
    };
    findings.finish(status)
}

fn probe(py: &mut dyn Interpreter, findings: &mut Findings) -> Result<Status, EvalError> {
    py.eval("import torch")?;
    if !py.eval_bool("torch.cuda.is_available()")? {
        findings.warning("Skipping FP8 test - no GPU available");
        return Ok(Status::Unavailable);
    }

    py.eval(
        "import transformer_engine.pytorch as te\n\
         from transformer_engine.common.recipe import DelayedScaling, Format",
    )?;

    let capability = py.eval("list(torch.cuda.get_device_capability())")?;
    let major = capability.get(0).and_then(|v| v.as_u64()).unwrap_or(0);
    let minor = capability.get(1).and_then(|v| v.as_u64()).unwrap_or(0);
    if (major, minor) < NATIVE_FP8_CAPABILITY {
        findings.info(format!(
            "GPU compute capability {major}.{minor} - FP8 requires sm_89+ (H100/Ada)"
        ));
        findings.info("FP8 will work in emulation mode on older GPUs");
    }

    py.eval(&HYBRID_RECIPE.to_python())?;
    findings.success("FP8 recipe created");

    py.eval(FP8_FORWARD)?;
    let shape = py.eval_str("str(_y.shape)")?;
    findings.success(format!("FP8 forward pass completed (output shape: {shape})"));
    Ok(Status::Passed)
}
