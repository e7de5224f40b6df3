//! # Version Resolution
//!
//! The client version comes from `--version` when given. Otherwise it is read from
//! `package.version` in the client crate's `Cargo.toml`, located relative to the
//! project root.

use std::path::{Path, PathBuf};
use log::debug;
use serde::Deserialize;
use crate::error::BuildError;

/// Location of the client manifest, relative to the project root.
pub const MANIFEST_PATH: &str = "brilliance-client/Cargo.toml";

/// The subset of a Cargo manifest we care about.
#[derive(Debug, Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Debug, Deserialize)]
struct Package {
    version: String,
}

/// Returns the version to build.
///
/// An explicit version is used verbatim and the manifest is never opened.
/// A blank explicit version is rejected.
pub fn resolve_version(explicit: Option<&str>, project_root: &Path) -> Result<String, BuildError> {
    match explicit {
        Some(version) if version.trim().is_empty() => Err(BuildError::EmptyVersion),
        Some(version) => Ok(version.to_string()),
        None => read_manifest_version(&manifest_path(project_root)),
    }
}

/// Path of the client manifest under `project_root`.
pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(MANIFEST_PATH)
}

/// Reads `package.version` from the manifest at `path`.
///
/// Fails if the file is missing, is not valid TOML, lacks the field, or the field is blank.
pub fn read_manifest_version(path: &Path) -> Result<String, BuildError> {
    let fail = |reason: String| BuildError::ManifestRead { path: path.to_path_buf(), reason };

    debug!("Reading manifest {:?}", path);
    let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
    let manifest: Manifest = toml::from_str(&content).map_err(|e| fail(e.message().to_string()))?;

    let version = manifest.package.version;
    if version.trim().is_empty() {
        return Err(fail("package.version is empty".to_string()));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_manifest(content: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        let client = root.path().join("brilliance-client");
        std::fs::create_dir_all(&client).unwrap();
        std::fs::write(client.join("Cargo.toml"), content).unwrap();
        root
    }

    #[test]
    fn explicit_version_skips_manifest() {
        // No manifest exists under this root, so reading it would fail.
        let root = TempDir::new().unwrap();
        let version = resolve_version(Some("1.2.3"), root.path()).unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn blank_explicit_version_is_rejected() {
        let root = project_with_manifest("[package]\nversion = \"0.9.0\"\n");
        assert!(matches!(resolve_version(Some(""), root.path()), Err(BuildError::EmptyVersion)));
        assert!(matches!(resolve_version(Some("  "), root.path()), Err(BuildError::EmptyVersion)));
    }

    #[test]
    fn manifest_version_is_returned_as_written() {
        let root = project_with_manifest("[package]\nversion = \"1.0.0-rc.1+build.5\"\n");
        assert_eq!(resolve_version(None, root.path()).unwrap(), "1.0.0-rc.1+build.5");
    }

    #[test]
    fn reads_package_version() {
        let root = project_with_manifest(
            "[package]\nname = \"brilliance-client\"\nversion = \"0.9.0\"\nedition = \"2021\"\n\n[dependencies]\ngodot = \"0.2\"\n",
        );
        assert_eq!(resolve_version(None, root.path()).unwrap(), "0.9.0");
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let root = TempDir::new().unwrap();
        let err = resolve_version(None, root.path()).unwrap_err();
        assert!(matches!(err, BuildError::ManifestRead { .. }));
    }

    #[test]
    fn missing_version_field_is_an_error() {
        let root = project_with_manifest("[package]\nname = \"brilliance-client\"\n");
        let err = resolve_version(None, root.path()).unwrap_err();
        assert!(matches!(err, BuildError::ManifestRead { .. }));
    }

    #[test]
    fn workspace_inherited_version_is_an_error() {
        let root = project_with_manifest("[package]\nname = \"brilliance-client\"\nversion.workspace = true\n");
        assert!(resolve_version(None, root.path()).is_err());
    }

    #[test]
    fn blank_version_is_an_error() {
        let root = project_with_manifest("[package]\nversion = \"  \"\n");
        assert!(resolve_version(None, root.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let root = project_with_manifest("[package\nversion = ");
        let err = resolve_version(None, root.path()).unwrap_err();
        assert!(err.to_string().contains("Cargo.toml"));
    }
}
