//! Zips a build directory.
//!
//! Entries are stored relative to the directory itself, so extracting the archive
//! yields `Brilliance.exe` and friends directly rather than a wrapping folder.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use anyhow::{Context, Result, bail};
use log::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compresses everything under `source_dir` into a new zip at `archive`.
///
/// An existing file at `archive` is replaced. Returns the number of entries written.
pub fn zip_directory(source_dir: &Path, archive: &Path) -> Result<usize> {
    if !source_dir.is_dir() {
        bail!("{:?} is not a directory", source_dir);
    }

    let file = File::create(archive).with_context(|| format!("creating {:?}", archive))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0;
    let walker = WalkDir::new(source_dir).min_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("walking {:?}", source_dir))?;
        let name = entry_name(source_dir, entry.path())?;

        if entry.file_type().is_dir() {
            debug!("zip: {}/", name);
            writer.add_directory(name, options)?;
        } else {
            debug!("zip: {}", name);
            writer.start_file(name, options)?;
            let mut input = File::open(entry.path())
                .with_context(|| format!("reading {:?}", entry.path()))?;
            std::io::copy(&mut input, &mut writer)?;
        }
        entries += 1;
    }

    writer.finish()?;
    Ok(entries)
}

/// Archive name for `path`: relative to `root`, `/`-separated on every platform.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{:?} is outside {:?}", path, root))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
