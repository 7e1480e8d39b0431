//! Write generated units into the Java package tree on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codegen::GeneratedUnit;
use crate::mapping;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("create directory {dir}: {source}")]
    CreateDir { dir: PathBuf, source: io::Error },
    #[error("write {file}: {source}")]
    WriteFile { file: PathBuf, source: io::Error },
}

/// Output path for a `pkg/Name` unit under `out_root`, following the Java
/// package layout: `org/msgforge/msgs/<pkg>/<Name>.java`.
pub fn java_file_path(out_root: &Path, qualified_name: &str) -> PathBuf {
    let (pkg, name) = match qualified_name.split_once('/') {
        Some((pkg, name)) => (pkg, name),
        None => ("", qualified_name),
    };
    let mut path = out_root.to_path_buf();
    for part in mapping::java_package(pkg).split('.') {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path.push(format!("{}.java", name));
    path
}

/// Write one generated unit, creating the package directory tree first.
/// `create_dir_all` succeeds when the directory already exists, so a
/// concurrent generator creating the same tree is not an error.
pub fn write_unit(out_root: &Path, unit: &GeneratedUnit) -> Result<PathBuf, OutputError> {
    let path = java_file_path(out_root, &unit.qualified_name);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| OutputError::CreateDir {
            dir: dir.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(&path, &unit.source).map_err(|e| OutputError::WriteFile {
        file: path.clone(),
        source: e,
    })?;
    Ok(path)
}
