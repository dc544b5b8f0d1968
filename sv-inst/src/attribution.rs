//! Attributing a batch failure to the files that caused it.
//!
//! On failure the tool still prints results for the files it finished, in request order,
//! then stops. Aligning that prefix against the request positionally (not by name) gives the
//! failed indices even when the same file is requested more than once.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::defs::{scalar_text, FILE_NAME_KEY};

pub const FILES_KEY: &str = "files";

/// The failed indices could not be worked out. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("file attribution unavailable: {reason}")]
pub struct AttributionUnavailable {
    pub reason: String,
}

impl AttributionUnavailable {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Zero-based indices into `requested` that have no matching entry in `produced`.
///
/// `produced` is walked with a cursor that only advances on a match, so an entry is
/// compared against each following request until one matches it.
pub fn find_error_indices<P: AsRef<Path>, S: AsRef<str>>(
    requested: &[P],
    produced: &[S],
) -> BTreeSet<usize> {
    let mut errors = BTreeSet::new();
    let mut cursor = 0;

    for (k, file) in requested.iter().enumerate() {
        match produced.get(cursor) {
            Some(name) if Path::new(name.as_ref()) == file.as_ref() => cursor += 1,
            _ => {
                errors.insert(k);
            }
        }
    }

    errors
}

/// File names of the entries in a (possibly partial) YAML result stream, in order.
pub fn produced_file_names(stdout: &str) -> Result<Vec<String>, AttributionUnavailable> {
    let document: Value = serde_yaml::from_str(stdout)
        .map_err(|err| AttributionUnavailable::new(format!("unreadable output: {err}")))?;

    let entries = document
        .get(FILES_KEY)
        .and_then(Value::as_sequence)
        .ok_or_else(|| AttributionUnavailable::new(format!("output has no {FILES_KEY} list")))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .get(FILE_NAME_KEY)
                .and_then(scalar_text)
                .ok_or_else(|| AttributionUnavailable::new(format!("entry without {FILE_NAME_KEY}")))
        })
        .collect()
}

/// Failed indices for a batch, from the stdout the tool left behind.
pub fn attribute<P: AsRef<Path>>(
    requested: &[P],
    stdout: &str,
) -> Result<BTreeSet<usize>, AttributionUnavailable> {
    if requested.len() < 2 {
        return Err(AttributionUnavailable::new("fewer than two input files"));
    }
    let produced = produced_file_names(stdout)?;
    Ok(find_error_indices(requested, &produced))
}

/// A failed tool invocation, with the failed files when they could be worked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    /// Name of the tool, used in the message.
    pub tool: String,
    pub files: Vec<PathBuf>,
    /// Zero-based indices into `files`.
    pub error_set: Option<BTreeSet<usize>>,
    pub stderr: Option<String>,
    pub return_code: Option<i32>,
}

impl ToolFailure {
    pub fn new(tool: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            files,
            error_set: None,
            stderr: None,
            return_code: None,
        }
    }

    pub fn with_error_set(mut self, error_set: BTreeSet<usize>) -> Self {
        self.error_set = Some(error_set);
        self
    }

    /// Attach the tool's stderr. Empty stderr is not recorded.
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        self.stderr = (!stderr.is_empty()).then_some(stderr);
        self
    }

    pub fn with_return_code(mut self, return_code: i32) -> Self {
        self.return_code = Some(return_code);
        self
    }

    /// Files implicated in the failure, when known.
    pub fn failed_files(&self) -> Option<Vec<&Path>> {
        self.error_set.as_ref().map(|set| {
            set.iter()
                .filter_map(|&k| self.files.get(k).map(PathBuf::as_path))
                .collect()
        })
    }

    pub fn message(&self) -> String {
        let mut lines = Vec::new();

        if let Some(stderr) = &self.stderr {
            lines.push(stderr.clone());
        }

        if let Some(error_set) = &self.error_set {
            let indices = error_set
                .iter()
                .map(|k| (k + 1).to_string())
                .collect::<Vec<_>>()
                .join(", ");

            let names = self
                .files
                .iter()
                .enumerate()
                .map(|(k, file)| {
                    let name = display_name(file);
                    if error_set.contains(&k) {
                        error_text(&name)
                    } else {
                        name
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");

            lines.push(format!("Error in file(s) {}: [{}]", indices, names));
        }

        if let Some(code) = self.return_code {
            lines.push(format!("{} returned code {}.", self.tool, code));
        }

        lines.join("\n")
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn error_text(name: &str) -> String {
    format!("**{}**", name)
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}
