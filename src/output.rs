//! Writing the inventory and reset script to disk.

use std::os::unix::fs::PermissionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Permissions;
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

const INVENTORY_EXTENSION: &str = "yaml";
const RESET_SCRIPT_PREFIX: &str = "reset-ssh-";
const RESET_SCRIPT_EXTENSION: &str = "sh";
const INVENTORY_MODE: u32 = 0o644;
const SCRIPT_MODE: u32 = 0o755;

/// Errors raised while writing output files.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum OutputError {
    /// Raised when the project name cannot be used as a file name.
    #[error("project name {name:?} cannot be used as a file name")]
    InvalidFileName {
        /// Offending project name.
        name: String,
    },
    /// Raised when file system operations fail.
    #[error("failed to write {path}: {message}")]
    Io {
        /// Path that could not be written.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

fn validate_project_name(project_name: &str) -> Result<(), OutputError> {
    let unusable = project_name.is_empty()
        || project_name == "."
        || project_name == ".."
        || project_name.contains(['/', '\0']);
    if unusable {
        return Err(OutputError::InvalidFileName {
            name: project_name.to_owned(),
        });
    }
    Ok(())
}

/// Inventory file name for a project: `<project>.yaml`.
///
/// # Errors
///
/// Returns [`OutputError::InvalidFileName`] for names that are empty, `.`,
/// `..`, or contain a path separator.
pub fn inventory_file_name(project_name: &str) -> Result<String, OutputError> {
    validate_project_name(project_name)?;
    Ok(format!("{project_name}.{INVENTORY_EXTENSION}"))
}

/// Reset script file name for a project: `reset-ssh-<project>.sh`.
///
/// # Errors
///
/// Returns [`OutputError::InvalidFileName`] under the same rules as
/// [`inventory_file_name`].
pub fn reset_script_file_name(project_name: &str) -> Result<String, OutputError> {
    validate_project_name(project_name)?;
    Ok(format!(
        "{RESET_SCRIPT_PREFIX}{project_name}.{RESET_SCRIPT_EXTENSION}"
    ))
}

/// Directory receiving output files. Existing files are overwritten.
#[derive(Debug)]
pub struct OutputDir {
    root: Utf8PathBuf,
    dir: Dir,
}

impl OutputDir {
    /// Opens an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] when the directory cannot be opened.
    pub fn open(root: &Utf8Path) -> Result<Self, OutputError> {
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|err| {
            OutputError::Io {
                path: root.to_path_buf(),
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    fn write_file(&self, file_name: &str, contents: &str, mode: u32) -> Result<Utf8PathBuf, OutputError> {
        let path = self.root.join(file_name);
        let io_error = |err: std::io::Error| OutputError::Io {
            path: path.clone(),
            message: err.to_string(),
        };
        self.dir.write(file_name, contents).map_err(io_error)?;
        self.dir
            .set_permissions(
                file_name,
                Permissions::from_std(std::fs::Permissions::from_mode(mode)),
            )
            .map_err(io_error)?;
        Ok(path)
    }

    /// Writes `<project>.yaml` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] when the name is unusable or the write fails.
    pub fn write_inventory(&self, project_name: &str, yaml: &str) -> Result<Utf8PathBuf, OutputError> {
        let file_name = inventory_file_name(project_name)?;
        self.write_file(&file_name, yaml, INVENTORY_MODE)
    }

    /// Writes `reset-ssh-<project>.sh`, marks it executable, and returns its
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] when the name is unusable or the write fails.
    pub fn write_reset_script(
        &self,
        project_name: &str,
        script: &str,
    ) -> Result<Utf8PathBuf, OutputError> {
        let file_name = reset_script_file_name(project_name)?;
        self.write_file(&file_name, script, SCRIPT_MODE)
    }
}
