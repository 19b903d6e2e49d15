//! Scenario replay entry point.

use hipaxis_app::{Scenario, ScenarioError, replay};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: hipaxis <scenario.json>");
        return ExitCode::from(2);
    };
    log::info!("Replaying {}", path.display());

    let result = Scenario::load(&path)
        .and_then(|scenario| replay(&scenario))
        .and_then(|report| serde_json::to_string_pretty(&report).map_err(ScenarioError::from));
    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("hipaxis: {err}");
            ExitCode::FAILURE
        }
    }
}
