//! yq-backed value editor
//!
//! yq reformats the whole document on write; that is a limitation of its
//! YAML library and is accepted as is.

use crate::error::{Error, Result};
use crate::patch::{EditOutput, ValueEdit, ValueEditor};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::env;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Default editor program
pub const DEFAULT_YQ: &str = "yq";

/// Runs `yq -i <expression> <file>`
#[derive(Debug, Clone)]
pub struct YqEditor {
    program: String,
}

impl YqEditor {
    /// Use the given program (a name looked up on PATH, or a path)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program that will be run
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// First executable named `name` in `dirs`
fn find_in_dirs(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Resolve a program name or path the way the shell would
fn resolve_program(program: &str) -> Option<PathBuf> {
    let program = program.trim();
    if program.is_empty() {
        return None;
    }
    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    let path_var = env::var_os("PATH")?;
    find_in_dirs(program, env::split_paths(&path_var))
}

impl Default for YqEditor {
    fn default() -> Self {
        Self::new(DEFAULT_YQ)
    }
}

#[async_trait]
impl ValueEditor for YqEditor {
    fn describe(&self, edit: &ValueEdit) -> String {
        format!(
            "{} -i '{}' {}",
            self.program,
            edit.expression(),
            edit.file_path
        )
    }

    fn locate(&self) -> Result<String> {
        resolve_program(&self.program)
            .map(|path| path.display().to_string())
            .ok_or_else(|| Error::EditorNotFound(self.program.clone()))
    }

    async fn apply(&self, edit: &ValueEdit) -> Result<EditOutput> {
        if !Path::new(&edit.file_path).is_file() {
            return Err(Error::Config(format!(
                "values file not found: {}",
                edit.file_path
            )));
        }

        debug!(program = %self.program, expression = %edit.expression(), "running value editor");
        let output = Command::new(&self.program)
            .arg("-i")
            .arg(edit.expression())
            .arg(&edit.file_path)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::EditorNotFound(self.program.clone()),
                _ => Error::Io(e),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::EditorFailed {
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(EditOutput { output: combined })
    }
}
