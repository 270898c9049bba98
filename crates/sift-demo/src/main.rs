#![forbid(unsafe_code)]

//! `sift` binary entry point.

use std::process;
use std::time::Duration;

use sift_demo::app::AppModel;
use sift_demo::{cli, logging, options};
use sift_runtime::{Clock, Program, ProgramConfig};
use sift_style::SelectTheme;
use sift_widgets::SelectConfig;

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file
        && let Err(e) = logging::init(path)
    {
        eprintln!("Failed to open log file {}: {e}", path.display());
        process::exit(1);
    }

    let options = match &opts.options_file {
        Some(path) => match options::load_options(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                process::exit(1);
            }
        },
        None => options::numbered(opts.count),
    };

    let config = SelectConfig {
        debounce: Duration::from_millis(opts.debounce_ms),
        viewport_rows: opts.viewport_rows,
        ..SelectConfig::default()
    };
    let model = AppModel::new(
        options,
        config,
        opts.width,
        SelectTheme::detect(),
        Clock::system(),
    );

    let mut program_config = ProgramConfig::default();
    program_config.session.mouse_capture = opts.mouse;
    // The program is dropped, restoring the terminal, before any error
    // is printed.
    let result = Program::new(model, program_config).and_then(|mut program| program.run());
    if let Err(e) = result {
        eprintln!("sift: {e}");
        process::exit(1);
    }
}
