//! Value patching
//!
//! Sets one key path of a values file to a string, in place, by shelling
//! out to an external structured-text editor.

mod yq;

pub use yq::{DEFAULT_YQ, YqEditor};

use crate::error::Result;
use crate::submit::ProgressCallback;
use async_trait::async_trait;
use tracing::{debug, info};

/// A single value edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEdit {
    /// File to edit
    pub file_path: String,
    /// Key path, `.` or `/` delimited
    pub value_path: String,
    /// New string value
    pub new_value: String,
}

impl ValueEdit {
    /// Key path in yq's `.a.b.c` form
    pub fn key_expression(&self) -> String {
        let path = self.value_path.trim().replace('/', ".");
        if path.starts_with('.') {
            path
        } else {
            format!(".{path}")
        }
    }

    /// yq assignment writing `new_value` as a quoted string scalar
    pub fn expression(&self) -> String {
        let escaped = self.new_value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{} = \"{escaped}\"", self.key_expression())
    }
}

/// What the editor printed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutput {
    /// Combined stdout and stderr
    pub output: String,
}

/// Something that can apply a [`ValueEdit`] to a file
#[async_trait]
pub trait ValueEditor: Send + Sync {
    /// Human-readable form of the command that would run
    fn describe(&self, edit: &ValueEdit) -> String;

    /// Resolve the editor program without running it
    ///
    /// Returns the resolved location, or `Error::EditorNotFound`.
    fn locate(&self) -> Result<String>;

    /// Rewrite the file in place
    async fn apply(&self, edit: &ValueEdit) -> Result<EditOutput>;
}

/// Apply an edit, or only describe it on a dry run
///
/// The editor must be resolvable in both modes, so a dry run fails the same
/// way the real run would on a host without it.
pub async fn patch_value(
    editor: &dyn ValueEditor,
    edit: &ValueEdit,
    dry_run: bool,
    progress: &dyn ProgressCallback,
) -> Result<Option<EditOutput>> {
    let program = editor.locate()?;
    debug!(program = %program, "found value editor");
    let command = editor.describe(edit);

    if dry_run {
        progress
            .on_message(&format!("DRYRUN ENABLED, would run command: {command}"))
            .await;
        return Ok(None);
    }

    progress
        .on_message(&format!("Running command: {command}"))
        .await;
    let output = editor.apply(edit).await?;
    info!(file = %edit.file_path, path = %edit.value_path, "patched value");
    Ok(Some(output))
}
