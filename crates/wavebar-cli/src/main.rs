//! wavebar - render audio files as bar waveform images
//!
//! Usage: `wavebar [AUDIO_FILE]`

use anyhow::Context;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wavebar_cli::{AppConfig, Console, Session};
use wavebar_core::config::{load_config, resolve_in, working_dir, APP_CONFIG_FILE};
use wavebar_core::{AudioBackend, ParameterStore};

/// Exit status when the audio backend can't be initialised
const EXIT_BACKEND_INIT: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    // Optional audio file to start with
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock());

    let backend = match AudioBackend::init() {
        Ok(backend) => backend,
        Err(e) => {
            log::error!("Audio backend initialisation failed: {}", e);
            console.error(&e)?;
            console.line("Press Enter to exit.")?;
            console.read_line()?;
            return Ok(ExitCode::from(EXIT_BACKEND_INIT));
        }
    };

    let work_dir = working_dir();
    let config: AppConfig = load_config(&resolve_in(&work_dir, Path::new(APP_CONFIG_FILE)));
    log::info!("Working directory: {:?}", work_dir);

    let store = ParameterStore::new(config.params_path(&work_dir));
    let last = match store.load() {
        Ok(last) => last,
        Err(e) => {
            console.error(format!("Failed to load last parameters: {}", e))?;
            None
        }
    };

    let mut session = Session::new(console, backend, store, config.output_path(&work_dir))
        .with_bar_color(config.bar_color())
        .with_last(last);
    session.run(initial).context("Console session failed")?;

    Ok(ExitCode::SUCCESS)
}
