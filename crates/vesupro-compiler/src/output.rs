//! Output naming, package scanning and staged writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of the file generated next to a single source.
pub const OUTPUT_SUFFIX: &str = "_vesupro.go";

/// File generated inside a package directory.
pub const PACKAGE_OUTPUT_NAME: &str = "vesupro_dispatch.go";

/// Where output goes when no path was given.
///
/// `foo.go` and `foo` give `foo_vesupro.go`; a directory gives
/// `<dir>/vesupro_dispatch.go`.
pub fn default_output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.join(PACKAGE_OUTPUT_NAME);
    }
    let stem = match input.extension() {
        Some(ext) if ext == "go" => input.with_extension(""),
        _ => input.to_path_buf(),
    };
    let mut name = stem.into_os_string();
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Whether a file in a package directory is a source to distill.
///
/// Tests and earlier generated output are left out.
pub fn is_package_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.ends_with(OUTPUT_SUFFIX)
        && name != PACKAGE_OUTPUT_NAME
}

/// Package sources of `dir`, sorted by path.
pub fn scan_package(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_package_source(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Write `contents` to `path` through a sibling `.tmp` file.
///
/// The target is only replaced once the whole text is on disk. On any
/// failure the staged file is removed again.
pub fn write_staged(path: &Path, contents: &str) -> io::Result<()> {
    let mut staged = path.as_os_str().to_os_string();
    staged.push(".tmp");
    let staged = PathBuf::from(staged);

    if let Err(err) = fs::write(&staged, contents).and_then(|()| fs::rename(&staged, path)) {
        let _ = fs::remove_file(&staged);
        return Err(err);
    }
    Ok(())
}
