//! # windows-build: The Main Entry Point
//!
//! Parses the command line, initializes logging, and hands a `BuildRequest` to the
//! orchestrator. Any failure is logged and turns into exit status 1.
//!
//! Typical use from the repository root:
//!
//! ```text
//! windows-build                       # version from brilliance-client/Cargo.toml
//! windows-build -v 2.0.0 -z true      # explicit version, zip the result
//! windows-build -p /tmp/out -f false  # refuse to touch an existing /tmp/out
//! ```

use std::path::PathBuf;
use clap::Parser;
use clap::builder::BoolishValueParser;
use log::{error, info, LevelFilter};
use simplelog::{Config, SimpleLogger};

mod archive;
mod error;
mod invariants;
mod layout;
mod manifest;
mod orchestrator;
mod toolchain;

use orchestrator::BuildRequest;
use toolchain::HostToolchain;

/// Command line options.
///
/// `-v` is the client version, so clap's own `--version` flag is disabled.
#[derive(Parser)]
#[command(name = "windows-build")]
#[command(about = "Builds and exports the Brilliance client for Windows", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Client version. Read from brilliance-client/Cargo.toml when omitted.
    #[arg(short = 'v', long)]
    version: Option<String>,

    /// Output directory. Defaults to ~/Dropbox/Brilliance/windows-build-<version>.
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Zip the output directory into <path>.zip.
    #[arg(short, long, default_value_t = false, action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    zip: bool,

    /// Replace an existing output directory. With `false`, an existing path aborts the build.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    force: bool,

    /// Export only; don't rebuild the client dll first.
    #[arg(long)]
    skip_native: bool,

    /// Directory containing brilliance-client/ and brilliance-godot/.
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Cargo executable.
    #[arg(long, default_value = "cargo")]
    cargo: String,

    /// Godot executable.
    #[arg(long, default_value = "godot")]
    godot: String,

    /// Turn on verbose logging.
    ///
    /// - `--verbose`: Debug
    /// - `--verbose --verbose`: Trace
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_request(self) -> BuildRequest {
        BuildRequest {
            version: self.version,
            output_path: self.path,
            make_archive: self.zip,
            force_overwrite: self.force,
            native_build: !self.skip_native,
            project_root: self.project_root,
            cargo: self.cargo,
            godot: self.godot,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // A second logger init is the only failure mode, so it is safe to ignore.
    let _ = SimpleLogger::init(log_level, Config::default());

    match orchestrator::run(&cli.into_request(), &HostToolchain) {
        Ok(report) => {
            info!("Windows build {} is in {:?}", report.version, report.output_dir);
            info!("Executable: {:?}", report.executable);
            if let Some(archive) = report.archive {
                info!("Archive: {:?}", archive);
            }
        }
        Err(e) => {
            error!("Windows build failed: {}", e);
            std::process::exit(1);
        }
    }
}
