//! External tools behind a trait.
//!
//! `Invocation` describes the cargo and Godot runs; `Toolchain` executes them and
//! supplies the home directory, so the pipeline can run against `MockToolchain` in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use log::{debug, warn};

/// Cargo package holding the client library.
pub const CLIENT_PACKAGE: &str = "brilliance-client";
/// Cross-compilation target for the Windows dll.
pub const WINDOWS_TARGET: &str = "x86_64-pc-windows-gnu";
/// Godot project directory, relative to the project root.
pub const GODOT_PROJECT_DIR: &str = "brilliance-godot";
/// Export preset configured in the Godot project.
pub const EXPORT_PRESET: &str = "windows_desktop";
/// File name of the exported executable.
pub const EXECUTABLE_NAME: &str = "Brilliance.exe";

/// Which external collaborator an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Compiler,
    Exporter,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Compiler => write!(f, "compiler"),
            Tool::Exporter => write!(f, "exporter"),
        }
    }
}

/// A fully described external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
    /// File the process is expected to produce, if any.
    pub artifact: Option<PathBuf>,
}

impl Invocation {
    /// `cargo build -p brilliance-client --release --target x86_64-pc-windows-gnu`, run from
    /// the Godot project so cargo finds the workspace whether it is rooted there or above.
    pub fn native_build(cargo: &str, project_root: &Path) -> Self {
        Self {
            tool: Tool::Compiler,
            program: cargo.to_string(),
            args: vec![
                "build".into(),
                "-p".into(),
                CLIENT_PACKAGE.into(),
                "--release".into(),
                "--target".into(),
                WINDOWS_TARGET.into(),
            ],
            current_dir: project_root.join(GODOT_PROJECT_DIR),
            artifact: None,
        }
    }

    /// `godot --headless --export-release windows_desktop <exe>`, run from the Godot project.
    pub fn export(godot: &str, project_root: &Path, exe_path: &Path) -> Self {
        Self {
            tool: Tool::Exporter,
            program: godot.to_string(),
            args: vec![
                "--headless".into(),
                "--export-release".into(),
                EXPORT_PRESET.into(),
                exe_path.to_string_lossy().into_owned(),
            ],
            current_dir: project_root.join(GODOT_PROJECT_DIR),
            artifact: Some(exe_path.to_path_buf()),
        }
    }

    /// The command as it would be typed in a shell, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status of a finished external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    pub tool: Tool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} exited with code {}", self.tool, code),
            None => write!(f, "{} was terminated by a signal", self.tool),
        }
    }
}

/// Abstraction over the host: home directory lookup and process execution.
/// Lets the pipeline be tested without cargo or Godot installed.
pub trait Toolchain {
    /// The current user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Runs `invocation` to completion, blocking the caller.
    ///
    /// `Err` means the process could not be started at all.
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutcome>;
}

/// The real host (Production).
pub struct HostToolchain;

impl Toolchain for HostToolchain {
    fn home_dir(&self) -> Option<PathBuf> {
        directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }

    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutcome> {
        debug!("Running in {:?}: {}", invocation.current_dir, invocation.command_line());

        // stdout/stderr are inherited so cargo and Godot report their own progress.
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.current_dir)
            .status()?;

        let outcome = ToolOutcome { tool: invocation.tool, code: status.code() };
        if outcome.success() {
            if let Some(artifact) = invocation.artifact.as_deref().filter(|a| !a.exists()) {
                warn!("{} succeeded but {:?} was not produced", invocation.tool, artifact);
            }
        }
        Ok(outcome)
    }
}

/// A scripted host for tests.
///
/// Records every invocation, answers with the configured exit codes and, when the
/// exporter "succeeds", writes a placeholder file at the expected artifact path.
#[cfg(test)]
#[derive(Debug)]
pub struct MockToolchain {
    pub home: Option<PathBuf>,
    pub compiler_code: i32,
    pub exporter_code: i32,
    pub spawn_fails: bool,
    pub invocations: std::sync::Mutex<Vec<Invocation>>,
}

#[cfg(test)]
impl Default for MockToolchain {
    fn default() -> Self {
        Self {
            home: Some(PathBuf::from("/home/tester")),
            compiler_code: 0,
            exporter_code: 0,
            spawn_fails: false,
            invocations: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn calls_to(&self, tool: Tool) -> usize {
        self.calls().iter().filter(|inv| inv.tool == tool).count()
    }
}

#[cfg(test)]
impl Toolchain for MockToolchain {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutcome> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if self.spawn_fails {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"));
        }

        let code = match invocation.tool {
            Tool::Compiler => self.compiler_code,
            Tool::Exporter => self.exporter_code,
        };
        if code == 0 {
            if let Some(artifact) = &invocation.artifact {
                std::fs::write(artifact, b"MZ")?;
            }
        }
        Ok(ToolOutcome { tool: invocation.tool, code: Some(code) })
    }
}
