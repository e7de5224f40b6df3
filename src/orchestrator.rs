//! # Build Orchestrator
//!
//! Runs one Windows build from start to finish:
//! 1. Resolve the client version (`--version` or the client manifest).
//! 2. Resolve and prepare the output directory.
//! 3. Build the client dll with cargo (unless skipped).
//! 4. Export `Brilliance.exe` with Godot.
//! 5. Optionally zip the output directory next to itself.
//!
//! Each step blocks until it finishes. The first failure ends the run; whatever was
//! already written to the output directory is left in place.

use std::fmt;
use std::path::{Path, PathBuf};
use log::{debug, info};
use crate::archive;
use crate::error::BuildError;
use crate::invariants::*;
use crate::layout;
use crate::manifest;
use crate::toolchain::{EXECUTABLE_NAME, Invocation, Toolchain};

/// Everything one invocation of the tool asks for.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub version: Option<String>,
    pub output_path: Option<PathBuf>,
    pub make_archive: bool,
    pub force_overwrite: bool,
    pub native_build: bool,
    /// Directory holding `brilliance-client/` and `brilliance-godot/`.
    pub project_root: PathBuf,
    pub cargo: String,
    pub godot: String,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            version: None,
            output_path: None,
            make_archive: false,
            force_overwrite: true,
            native_build: true,
            project_root: PathBuf::from("."),
            cargo: "cargo".to_string(),
            godot: "godot".to_string(),
        }
    }
}

/// Pipeline position, used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    VersionResolved,
    PathResolved,
    PathPrepared,
    NativeBuilt,
    Exported,
    Archived,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::VersionResolved => "version resolved",
            Stage::PathResolved => "path resolved",
            Stage::PathPrepared => "path prepared",
            Stage::NativeBuilt => "native built",
            Stage::Exported => "exported",
            Stage::Archived => "archived",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub version: String,
    pub output_dir: PathBuf,
    pub executable: PathBuf,
    pub archive: Option<PathBuf>,
}

/// Runs the whole pipeline for `request` against `toolchain`.
pub fn run(request: &BuildRequest, toolchain: &impl Toolchain) -> Result<BuildReport, BuildError> {
    let mut stage = Stage::Start;

    let version = manifest::resolve_version(request.version.as_deref(), &request.project_root)?;
    assert_invariant(!version.is_empty(), VERSION_NON_EMPTY, Some("Orchestrator"));
    info!("Client version: {}", version);
    advance(&mut stage, Stage::VersionResolved);

    let output_dir = layout::resolve_output_path(
        request.output_path.as_deref(),
        &version,
        toolchain.home_dir(),
    )?;
    advance(&mut stage, Stage::PathResolved);

    layout::prepare_output_dir(&output_dir, request.force_overwrite)?;
    advance(&mut stage, Stage::PathPrepared);

    if request.native_build {
        info!("Building dll");
        let invocation = Invocation::native_build(&request.cargo, &request.project_root);
        let outcome = toolchain
            .run(&invocation)
            .map_err(|e| BuildError::NativeBuild(format!("failed to run {}: {}", invocation.program, e)))?;
        if !outcome.success() {
            return Err(BuildError::NativeBuild(outcome.to_string()));
        }
        advance(&mut stage, Stage::NativeBuilt);
    } else {
        info!("Skipping dll build");
    }

    info!("Building exe");
    assert_invariant(output_dir.is_dir(), OUTPUT_DIR_EXISTS, Some("Orchestrator"));
    // Godot runs from its project directory, so relative destinations would land there.
    let executable = absolute(&output_dir)?.join(EXECUTABLE_NAME);
    let invocation = Invocation::export(&request.godot, &request.project_root, &executable);
    let outcome = toolchain
        .run(&invocation)
        .map_err(|e| BuildError::ExportFailed(format!("failed to run {}: {}", invocation.program, e)))?;
    if !outcome.success() {
        return Err(BuildError::ExportFailed(outcome.to_string()));
    }
    advance(&mut stage, Stage::Exported);

    let archive = if request.make_archive {
        info!("Creating zip");
        let zip_path = layout::archive_path(&output_dir);
        assert_invariant(!zip_path.starts_with(&output_dir), ARCHIVE_OUTSIDE_OUTPUT, Some("Archive"));

        let entries = archive::zip_directory(&output_dir, &zip_path).map_err(|e| BuildError::Archive {
            path: zip_path.clone(),
            reason: format!("{:#}", e),
        })?;
        info!("Wrote {:?} ({} entries)", zip_path, entries);
        advance(&mut stage, Stage::Archived);
        Some(zip_path)
    } else {
        None
    };

    advance(&mut stage, Stage::Done);
    info!("Completed");

    Ok(BuildReport { version, output_dir, executable, archive })
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("stage: {} -> {}", stage, next);
    *stage = next;
}

fn absolute(path: &Path) -> Result<PathBuf, BuildError> {
    std::path::absolute(path).map_err(|e| BuildError::io(path, e))
}
