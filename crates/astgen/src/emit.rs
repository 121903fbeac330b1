//! Writing generated units to disk.
//!
//! Each grammar lands at `<out_dir>/<snake_case(base)>.rs`. Files are written
//! to a staging path next to the target and renamed over it, so a reader
//! never observes a partially written unit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::validation::to_snake_case;

/// Errors that can occur while writing generated units.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("output directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Returns the file name for a grammar (e.g. "expr.rs" for "Expr").
pub fn file_name(base: &str) -> String {
    format!("{}.rs", to_snake_case(base))
}

/// Returns the path a grammar is emitted to.
pub fn output_path(out_dir: &Path, base: &str) -> PathBuf {
    out_dir.join(file_name(base))
}

/// Fail unless `out_dir` is an existing directory.
pub fn ensure_dir(out_dir: &Path) -> Result<(), EmitError> {
    if out_dir.is_dir() {
        Ok(())
    } else {
        Err(EmitError::MissingDirectory(out_dir.to_path_buf()))
    }
}

/// Write `source` as the unit for `base`, replacing any previous content.
pub fn emit(out_dir: &Path, base: &str, source: &str) -> Result<PathBuf, EmitError> {
    ensure_dir(out_dir)?;

    let path = output_path(out_dir, base);
    let staging = path.with_extension("rs.tmp");

    if let Err(err) = fs::write(&staging, source) {
        let _ = fs::remove_file(&staging);
        return Err(EmitError::Write {
            path: staging,
            source: err,
        });
    }

    if let Err(err) = fs::rename(&staging, &path) {
        let _ = fs::remove_file(&staging);
        return Err(EmitError::Write { path, source: err });
    }

    debug!(path = %path.display(), bytes = source.len(), "emitted grammar");
    Ok(path)
}

/// Returns true if the unit for `base` on disk already equals `source`.
///
/// A missing file is reported as out of date, not as an error.
pub fn is_current(out_dir: &Path, base: &str, source: &str) -> Result<bool, EmitError> {
    let path = output_path(out_dir, base);
    match fs::read_to_string(&path) {
        Ok(existing) => Ok(existing == source),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(EmitError::Read { path, source }),
    }
}
