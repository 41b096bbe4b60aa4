//! SpurC - a terminal C/C++ editor with live syntax highlighting
//!
//! Edits keep the buffer's style tags and the line-number gutter in step
//! with the text; F5/F6 compile and run the file with the system compiler.

mod access;
mod buffer;
mod command;
mod config;
mod console;
mod display;
mod editor;
mod error;
mod gutter;
mod input;
mod line;
mod scheduler;
mod syntax;
mod terminal;
mod toolchain;
mod window;

use std::env;
use std::path::PathBuf;
use std::process;

use tracing::{info, warn};

use config::Config;
use editor::EditorState;
use error::Result;
use terminal::Terminal;

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    verbose: bool,
    file: Option<PathBuf>,
}

fn main() {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Try 'spurc --help' for more information.");
            process::exit(2);
        }
    };

    setup_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parse arguments; `Ok(None)` when help or version was printed
fn parse_args() -> std::result::Result<Option<Args>, String> {
    let mut args = Args::default();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--verbose" | "-v" => args.verbose = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option '{}'", flag));
            }
            path => {
                if args.file.is_some() {
                    return Err("only one file may be given".to_string());
                }
                args.file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(Some(args))
}

fn run(args: Args) -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => {
            warn!(error = %e, "using default configuration");
            (Config::default(), Some(e))
        }
    };

    let mut terminal = Terminal::new()?;
    let mut editor = EditorState::new(config, terminal.rows())?;

    if let Some(path) = &args.file {
        editor.visit_file(path);
    }
    if let Some(e) = config_error {
        editor.report_error(&e);
    }

    info!("editor started");
    editor.run(&mut terminal)
}

/// Log to `$SPURC_LOG_DIR/spurc.<pid>.log`; without it nothing is logged,
/// since the terminal belongs to the editor.
fn setup_tracing(verbose: bool) {
    use std::fs::OpenOptions;
    use std::sync::Mutex;

    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let Some(log_dir) = env::var_os("SPURC_LOG_DIR").map(PathBuf::from) else {
        return;
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }

    let log_path = log_dir.join(format!("spurc.{}.log", process::id()));
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("spurc=debug")
        } else {
            EnvFilter::new("spurc=info")
        }
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    info!(path = ?log_path, "tracing initialized");
}

fn print_usage() {
    println!("SpurC {} - C/C++ editor with live highlighting", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: spurc [OPTIONS] [FILE]");
    println!();
    println!("Options:");
    println!("  -h, --help     Show this help message");
    println!("  -V, --version  Show version information");
    println!("  -v, --verbose  Log debug output (with SPURC_LOG_DIR set)");
    println!();
    println!("Key bindings:");
    println!("  C-x C-f        Open file");
    println!("  C-x C-s        Save file");
    println!("  C-x C-w        Save file under a new name");
    println!("  F5, C-c C-c    Compile");
    println!("  F6, C-c C-r    Run");
    println!("  F7, C-c C-t    Show or hide the console");
    println!("  C-x #          Toggle line numbers");
    println!("  C-l            Recenter and redraw");
    println!("  C-k, C-y       Kill line, yank");
    println!("  C-/, C-_       Undo");
    println!("  C-g            Abort current operation or running job");
    println!("  C-x C-c        Quit");
    println!();
    println!("Settings are read from ~/.spurc.toml.");
    println!("Press F1 in editor for complete key binding list");
}

fn print_version() {
    println!("SpurC {}", env!("CARGO_PKG_VERSION"));
}
