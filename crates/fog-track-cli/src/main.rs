mod commands;
mod logging;
mod settings;

use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    logging::setup_logging();
    #[cfg(feature = "profiling")]
    profiling::register_thread!("main");

    let stdout = std::io::stdout();
    match commands::run(&settings, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
