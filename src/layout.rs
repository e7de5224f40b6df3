//! # Output Layout
//!
//! Decides where a build goes and gets that directory ready:
//! 1. Resolve the output directory (explicit, or under `~/Dropbox/Brilliance`).
//! 2. Apply the overwrite policy to whatever is already there.
//! 3. Create the directory and any missing parents.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use log::{info, warn};
use crate::error::BuildError;

/// Builds are collected under `<home>/Dropbox/Brilliance` unless `--path` is given.
const DROPBOX_DIR: &str = "Dropbox";
const BUILDS_DIR: &str = "Brilliance";

/// Returns the output directory for `version`.
///
/// An explicit path is used as given, minus any trailing separator, and must not be
/// empty. Otherwise the default `<home>/Dropbox/Brilliance/windows-build-<version>`
/// is used, which needs `home`.
pub fn resolve_output_path(
    explicit: Option<&Path>,
    version: &str,
    home: Option<PathBuf>,
) -> Result<PathBuf, BuildError> {
    if let Some(path) = explicit {
        if path.as_os_str().is_empty() {
            return Err(BuildError::EmptyPath);
        }
        return Ok(path.components().collect());
    }
    let home = home.ok_or(BuildError::NoHomeDirectory)?;
    Ok(default_output_path(&home, version))
}

/// `<home>/Dropbox/Brilliance/windows-build-<version>`
pub fn default_output_path(home: &Path, version: &str) -> PathBuf {
    home.join(DROPBOX_DIR)
        .join(BUILDS_DIR)
        .join(format!("windows-build-{}", version))
}

/// The sibling archive path, `<path>.zip`.
///
/// Appends to the file name rather than replacing an extension, so
/// `windows-build-2.0.0` becomes `windows-build-2.0.0.zip`.
pub fn archive_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".zip");
    PathBuf::from(name)
}

/// Makes `path` an existing, empty directory.
///
/// If something is already at `path`, it is removed when `force` is set; otherwise
/// `PathExists` is returned and nothing on disk changes.
pub fn prepare_output_dir(path: &Path, force: bool) -> Result<(), BuildError> {
    // symlink_metadata so a dangling symlink still counts as "exists"
    if let Ok(meta) = std::fs::symlink_metadata(path) {
        if !force {
            return Err(BuildError::PathExists(path.to_path_buf()));
        }

        warn!("Removing existing {:?}", path);
        let removed = if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        removed.map_err(|e| BuildError::io(path, e))?;
    }

    std::fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    info!("Output directory: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn default_path_layout() {
        let path = resolve_output_path(None, "2.0.0", Some(PathBuf::from("/home/ana"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/ana/Dropbox/Brilliance/windows-build-2.0.0"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_output_path(Some(Path::new("/tmp/out/")), "2.0.0", None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn empty_explicit_path_is_rejected() {
        let err = resolve_output_path(Some(Path::new("")), "2.0.0", Some(PathBuf::from("/home/ana"))).unwrap_err();
        assert!(matches!(err, BuildError::EmptyPath));
    }

    #[test]
    fn default_path_needs_home() {
        let err = resolve_output_path(None, "2.0.0", None).unwrap_err();
        assert!(matches!(err, BuildError::NoHomeDirectory));
    }

    #[test]
    fn archive_keeps_version_dots() {
        assert_eq!(
            archive_path(Path::new("/d/windows-build-2.0.0")),
            PathBuf::from("/d/windows-build-2.0.0.zip")
        );
    }

    #[test]
    fn creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("a").join("b").join("out");
        prepare_output_dir(&out, false).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn existing_path_without_force_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("stray.txt"), "keep me").unwrap();

        let err = prepare_output_dir(&out, false).unwrap_err();
        assert!(matches!(err, BuildError::PathExists(_)));
        assert_eq!(std::fs::read_to_string(out.join("stray.txt")).unwrap(), "keep me");
    }

    #[test]
    fn existing_path_with_force_is_emptied() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        std::fs::create_dir_all(out.join("nested")).unwrap();
        std::fs::write(out.join("nested").join("stray.txt"), "old").unwrap();

        prepare_output_dir(&out, true).unwrap();
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn existing_file_with_force_becomes_directory() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        std::fs::write(&out, "not a directory").unwrap();

        prepare_output_dir(&out, true).unwrap();
        assert!(out.is_dir());
    }

    proptest! {
        #[test]
        fn default_path_ends_with_version(
            user in "[a-z]{1,12}",
            version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}(-[a-z]{1,6})?"
        ) {
            let home = PathBuf::from("/home").join(&user);
            let path = resolve_output_path(None, &version, Some(home.clone())).unwrap();

            prop_assert!(path.starts_with(home.join("Dropbox").join("Brilliance")));
            let expected = format!("windows-build-{}", version);
            prop_assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(expected.as_str()));

            let zip = archive_path(&path);
            prop_assert_eq!(zip.parent(), path.parent());
            let suffix = format!("{}.zip", version);
            prop_assert!(zip.to_string_lossy().ends_with(&suffix));
        }
    }
}
