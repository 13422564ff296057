use std::process;

use lab_validate::{reporter, InterpreterInfo, ValidateConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = ValidateConfig::from_env();
    log::debug!("using interpreter {}", config.python);
    let interpreter = InterpreterInfo::probe(&config.python);

    let report = match lab_validate::run_all(&config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    reporter::render(&mut stdout, &report, &interpreter);

    process::exit(report.exit_code());
}
