//! procview - a terminal process viewer with a sortable, filterable table
//!
//! Copyright (C) 2026 Trung Le
//! Released under the GNU GPLv2+

mod core;
mod platform;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::{FilterState, Settings, SortKey, SortState, ViewState};
use crate::platform::{HostWorker, SignalTerminator};
use crate::ui::{Crt, ScreenManager};

/// Static flag for clean shutdown
static RUNNING: AtomicBool = AtomicBool::new(true);

const VERSION: &str = env!("CARGO_PKG_VERSION");
const COPYRIGHT: &str = "(C) 2026 Trung Le.";
const LICENSE_SPDX: &str = env!("CARGO_PKG_LICENSE");

/// Convert SPDX license identifier to display string
fn license_display() -> &'static str {
    match LICENSE_SPDX {
        "GPL-2.0-or-later" => "GNU GPLv2+",
        "GPL-2.0" | "GPL-2.0-only" => "GNU GPLv2",
        _ => LICENSE_SPDX,
    }
}

fn print_version_full() {
    println!("procview {}", VERSION);
    println!("{}", COPYRIGHT);
    println!("Released under the {}.", license_display());
}

fn print_version() {
    println!("procview {}", VERSION);
}

fn print_help() {
    print_version_full();
    println!();
    println!("-C --no-color                   Use a monochrome color scheme");
    println!("-d --delay=DELAY                Set the delay between updates, in tenths of seconds");
    println!("-F --filter=FILTER              Show only the processes whose name contains FILTER");
    println!("-h --help                       Print this help screen");
    println!("   --log-file=PATH              Write the log to PATH");
    println!("-M --no-mouse                   Disable the mouse");
    println!("-n --max-iterations=NUMBER      Exit after NUMBER process list updates");
    println!("   --readonly                   Disable killing processes");
    println!("-s --sort-key=COLUMN            Sort by COLUMN (try --sort-key=help for a list)");
    println!("-U --no-unicode                 Do not use unicode but plain ASCII");
    println!("-V --version                    Print version info");
    println!();
    println!("Keys: N/C/R/P/M sort, F4 or / filter, F9 or k kill, Esc unselect, q quit.");
    println!("Set RUST_LOG to change the log level (default: info).");
}

/// procview - a terminal process viewer
#[derive(Parser, Debug)]
#[command(name = "procview")]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
struct Args {
    /// Use a monochrome color scheme
    #[arg(short = 'C', long = "no-color")]
    no_color: bool,

    /// Set the delay between updates, in tenths of seconds
    #[arg(short = 'd', long = "delay", value_name = "DELAY")]
    delay: Option<u32>,

    /// Show only the processes whose name contains FILTER
    #[arg(short = 'F', long = "filter", value_name = "FILTER")]
    filter: Option<String>,

    /// Disable the mouse
    #[arg(short = 'M', long = "no-mouse")]
    no_mouse: bool,

    /// Exit after NUMBER process list updates
    #[arg(short = 'n', long = "max-iterations", value_name = "NUMBER")]
    max_iterations: Option<i64>,

    /// Disable killing processes
    #[arg(long = "readonly")]
    readonly: bool,

    /// Sort by COLUMN
    #[arg(short = 's', long = "sort-key", value_name = "COLUMN")]
    sort_key: Option<String>,

    /// Do not use unicode but plain ASCII
    #[arg(short = 'U', long = "no-unicode")]
    no_unicode: bool,

    /// Write the log to PATH
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print this help screen
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    help: bool,

    /// Print version info
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("procview")
        .join("procview.log")
}

/// Send tracing output to a file; the terminal belongs to ncurses.
/// Logging is skipped (with a warning) if the file cannot be opened.
fn init_logging(path: &Path) {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "procview.log".to_string());

    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Warning: Failed to create log directory {}: {}", dir.display(), e);
        return;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Failed to open log file {}: {}", path.display(), e);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(appender)
                .with_ansi(false),
        )
        .with(filter)
        .try_init();
}

/// Restore the terminal and log before the previous hook prints, so the
/// message is not drawn into curses mode (or lost under panic = "abort")
fn install_panic_hook(restore: fn()) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        error!("panic: {}", info);
        previous(info);
    }));
}

fn print_sort_keys() {
    println!("Available sort keys:");
    for key in SortKey::all() {
        println!("  {:>8} {}", key.name(), key.description());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle help and version flags first
    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        print_version();
        return Ok(());
    }

    let sort = match args.sort_key.as_deref() {
        Some("help") => {
            print_sort_keys();
            return Ok(());
        }
        Some(name) => match SortKey::from_name(name) {
            Some(key) => SortState::new(key),
            None => {
                eprintln!("Error: invalid column \"{}\".", name);
                std::process::exit(1);
            }
        },
        None => SortState::default(),
    };

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path);
    install_panic_hook(ui::restore_terminal);
    info!(version = VERSION, log = %log_path.display(), "procview starting");

    signals::install();

    // Create settings and load from config file
    let mut settings = Settings::new();
    if let Err(e) = settings.load() {
        warn!(error = %e, "failed to load settings, using defaults");
    }

    // Apply command line arguments
    if args.no_color {
        settings.color_scheme = core::ColorScheme::Monochrome;
    }
    if let Some(delay) = args.delay {
        settings.set_delay_tenths(delay);
    }
    if args.no_mouse {
        settings.enable_mouse = false;
    }
    if args.no_unicode {
        settings.allow_unicode = false;
    }
    if args.readonly {
        settings.readonly = true;
    }

    let mut filter = FilterState::new();
    if let Some(text) = args.filter {
        filter.set(text);
    }
    let view = ViewState::new(sort, filter);
    let worker = HostWorker::new(
        platform::default_source(),
        Arc::new(SignalTerminator::new(settings.kill_signal)),
    );

    // Initialize CRT (terminal)
    let mut crt = Crt::new(&settings)?;

    let mut screen_manager = ScreenManager::new(settings, view, worker);
    screen_manager.set_max_iterations(args.max_iterations.unwrap_or(-1));

    let result = screen_manager.run(&mut crt, &RUNNING);

    // Cleanup
    crt.done();
    info!("procview exiting");

    result
}

/// SIGINT/SIGTERM end the event loop instead of killing the process, so
/// the terminal is restored on the way out
mod signals {
    use super::RUNNING;
    use std::sync::atomic::Ordering;

    #[cfg(unix)]
    pub fn install() {
        use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

        let action = SigAction::new(
            SigHandler::Handler(handle_signal),
            SaFlags::empty(),
            SigSet::empty(),
        );
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            // SAFETY: the handler only stores to an atomic
            if let Err(e) = unsafe { sigaction(signal, &action) } {
                tracing::warn!(?signal, error = %e, "failed to install signal handler");
            }
        }
    }

    #[cfg(not(unix))]
    pub fn install() {}

    #[cfg(unix)]
    extern "C" fn handle_signal(_: libc::c_int) {
        RUNNING.store(false, Ordering::SeqCst);
    }

}
