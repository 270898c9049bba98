#![forbid(unsafe_code)]

//! Command-line argument parsing for the `sift` binary.
//!
//! Parses args manually to keep the binary lean. Every flag that takes a
//! value has a `SIFT_*` environment override; explicit flags win.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
sift: pick one option out of thousands

USAGE:
    sift [OPTIONS]

OPTIONS:
    --count=N            Offer Option 1..Option N (default: 10000)
    --options-file=PATH  Read options from a JSON array instead
    --debounce-ms=N      Quiet period before the search applies (default: 500)
    --viewport-rows=N    Rows visible in the dropdown (default: 6)
    --width=N            Width of the select box (default: 40)
    --no-mouse           Disable mouse event capture
    --log-file=PATH      Write logs to PATH (filtered by SIFT_LOG)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Enter / Down / Space Open the dropdown
    Up / Down            Move the highlight
    PageUp / PageDown    Move by one page
    Ctrl+Home / Ctrl+End First / last match
    Enter                Select the highlighted option
    Esc                  Close the dropdown
    q / Esc              Quit (while closed)
    Ctrl+C               Quit

OPTIONS FILE:
    [{\"text\": \"Apple\"}, {\"text\": \"Banana\"}] or [\"Apple\", \"Banana\"]

ENVIRONMENT VARIABLES:
    SIFT_COUNT           Override --count
    SIFT_OPTIONS_FILE    Override --options-file
    SIFT_DEBOUNCE_MS     Override --debounce-ms
    SIFT_VIEWPORT_ROWS   Override --viewport-rows
    SIFT_WIDTH           Override --width
    SIFT_LOG_FILE        Override --log-file
    SIFT_LOG             Log filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Number of generated options when no file is given.
    pub count: usize,
    pub options_file: Option<PathBuf>,
    pub debounce_ms: u64,
    pub viewport_rows: u16,
    /// Width of the select box in columns.
    pub width: u16,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            count: 10_000,
            options_file: None,
            debounce_ms: 500,
            viewport_rows: 6,
            width: 40,
            mouse: true,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// A flag's value did not parse or is out of range.
    InvalidValue { flag: &'static str, value: String },
    /// A flag that needs `=VALUE` was given without one.
    MissingValue(&'static str),
    Unknown(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "invalid {flag} value: {value}"),
            Self::MissingValue(flag) => write!(f, "{flag} needs a value ({flag}=...)"),
            Self::Unknown(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits 0 when asked to; prints the error and
    /// exits 2 on a usage error.
    pub fn parse() -> Self {
        let args = env::args().skip(1);
        match parse_from(args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("sift {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }
}

/// Parse `args` (without the program name), reading overrides through `env`.
///
/// Environment values that fail to parse are ignored; flag values that fail
/// to parse are errors.
pub fn parse_from<I, S>(
    args: I,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut opts = Opts::default();

    // Apply environment variable defaults first
    if let Some(n) = env("SIFT_COUNT").and_then(|v| v.parse::<usize>().ok()) {
        opts.count = n;
    }
    if let Some(path) = env("SIFT_OPTIONS_FILE").filter(|v| !v.is_empty()) {
        opts.options_file = Some(path.into());
    }
    if let Some(n) = env("SIFT_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
        opts.debounce_ms = n;
    }
    if let Some(n) = env("SIFT_VIEWPORT_ROWS").and_then(|v| v.parse::<u16>().ok())
        && n > 0
    {
        opts.viewport_rows = n;
    }
    if let Some(n) = env("SIFT_WIDTH").and_then(|v| v.parse::<u16>().ok())
        && n >= MIN_WIDTH
    {
        opts.width = n;
    }
    if let Some(path) = env("SIFT_LOG_FILE").filter(|v| !v.is_empty()) {
        opts.log_file = Some(path.into());
    }

    // Parse command-line args (override env vars)
    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-mouse" => opts.mouse = false,
            other => {
                let (flag, value) = match other.split_once('=') {
                    Some((flag, value)) => (flag, Some(value)),
                    None => (other, None),
                };
                match flag {
                    "--count" => opts.count = number("--count", value)?,
                    "--options-file" => {
                        opts.options_file = Some(text("--options-file", value)?.into());
                    }
                    "--debounce-ms" => opts.debounce_ms = number("--debounce-ms", value)?,
                    "--viewport-rows" => {
                        opts.viewport_rows = number("--viewport-rows", value)?;
                        if opts.viewport_rows == 0 {
                            return Err(invalid("--viewport-rows", value));
                        }
                    }
                    "--width" => {
                        opts.width = number("--width", value)?;
                        if opts.width < MIN_WIDTH {
                            return Err(invalid("--width", value));
                        }
                    }
                    "--log-file" => opts.log_file = Some(text("--log-file", value)?.into()),
                    _ => return Err(CliError::Unknown(other.to_string())),
                }
            }
        }
    }

    Ok(Command::Run(opts))
}

/// Narrowest box that still shows a border, the icon and some text.
const MIN_WIDTH: u16 = 8;

fn text<'a>(flag: &'static str, value: Option<&'a str>) -> Result<&'a str, CliError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(CliError::MissingValue(flag))
}

fn number<T: std::str::FromStr>(flag: &'static str, value: Option<&str>) -> Result<T, CliError> {
    text(flag, value)?
        .parse()
        .map_err(|_| invalid(flag, value))
}

fn invalid(flag: &'static str, value: Option<&str>) -> CliError {
    CliError::InvalidValue {
        flag,
        value: value.unwrap_or_default().to_string(),
    }
}
