use std::process::ExitCode;

use solarium::SimulationConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn")),
        )
        .init();

    // Optional TOML config path as the only argument.
    let config = match std::env::args_os().nth(1) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.to_string_lossy(), "Loaded configuration");
                config
            }
            Err(e) => {
                tracing::error!("{}: {}", path.to_string_lossy(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };

    match solarium::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
