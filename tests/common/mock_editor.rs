//! Recording value editor

#![allow(dead_code)]

use async_trait::async_trait;
use escargo::error::{Error, Result};
use escargo::patch::{EditOutput, ValueEdit, ValueEditor};
use std::sync::Mutex;

/// Editor stub that records applied edits and optionally rewrites the file
#[derive(Default)]
pub struct MockEditor {
    applied: Mutex<Vec<ValueEdit>>,
    replacement: Option<String>,
    fail: bool,
    missing: bool,
}

impl MockEditor {
    /// Records edits, leaves the file untouched
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the file with `contents` on apply
    pub fn writing(contents: &str) -> Self {
        Self {
            replacement: Some(contents.to_string()),
            ..Self::default()
        }
    }

    /// Fails every apply with a non-zero exit
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Not installed: lookup fails with `EditorNotFound`
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Edits applied so far
    pub fn applied(&self) -> Vec<ValueEdit> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValueEditor for MockEditor {
    fn describe(&self, edit: &ValueEdit) -> String {
        format!("mock-yq -i '{}' {}", edit.expression(), edit.file_path)
    }

    fn locate(&self) -> Result<String> {
        if self.missing {
            return Err(Error::EditorNotFound("mock-yq".to_string()));
        }
        Ok("/usr/bin/mock-yq".to_string())
    }

    async fn apply(&self, edit: &ValueEdit) -> Result<EditOutput> {
        self.applied.lock().unwrap().push(edit.clone());
        if self.fail {
            return Err(Error::EditorFailed {
                status: "exit status: 1".to_string(),
                output: "Error: bad expression".to_string(),
            });
        }
        if let Some(ref contents) = self.replacement {
            std::fs::write(&edit.file_path, contents)?;
        }
        Ok(EditOutput::default())
    }
}
