//! Backend for the `svinst` executable, which prints one YAML document per batch.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use serde_yaml::Value;

use crate::attribution::{self, ToolFailure};
use crate::runner::{ProcessRunner, Runner, ToolOutput};
use crate::{defs, tree, Backend, Error, FileDefinitions, FileTree, ParseRequest, Result};

pub const TOOL_NAME: &str = "svinst";

/// Top level of the success output.
#[derive(Debug, Deserialize)]
struct Output {
    #[serde(default)]
    files: Option<Vec<Value>>,
}

pub struct SvInst<R = ProcessRunner> {
    program: PathBuf,
    runner: R,
}

impl SvInst<ProcessRunner> {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, ProcessRunner)
    }
}

impl<R: Runner> SvInst<R> {
    pub fn with_runner(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The command line for `request`, without the program itself.
    pub fn arguments(&self, request: &ParseRequest, full_tree: bool) -> Vec<String> {
        let mut args: Vec<String> = request
            .files
            .iter()
            .map(|file| file.to_string_lossy().into_owned())
            .collect();

        for define in &request.defines {
            args.push("-d".to_string());
            args.push(define.to_string());
        }
        for dir in &request.includes {
            args.push("-i".to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        if request.ignore_include {
            args.push("--ignore-include".to_string());
        }
        if full_tree {
            args.push("--full-tree".to_string());
        }
        if request.separate {
            args.push("--separate".to_string());
        }
        if request.show_macro_defs {
            args.push("--show-macro-defs".to_string());
        }

        args
    }

    /// Run the tool and return its per-file entries, or the failure it reported.
    fn invoke(&self, request: &ParseRequest, full_tree: bool) -> Result<Vec<Value>> {
        let args = self.arguments(request, full_tree);
        let output = self
            .runner
            .run(&self.program, &args)
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.is_success() {
            return Err(Error::ToolInvocation(self.failure(request, &output)));
        }

        let decoded: Output = serde_yaml::from_str(&output.stdout)?;
        let entries = decoded.files.unwrap_or_default();
        debug!("{} reported {} file(s)", TOOL_NAME, entries.len());
        Ok(entries)
    }

    fn failure(&self, request: &ParseRequest, output: &ToolOutput) -> ToolFailure {
        let mut failure = ToolFailure::new(TOOL_NAME, request.files.clone())
            .with_stderr(output.stderr.clone())
            .with_return_code(output.status);

        if request.explain_error && request.files.len() > 1 {
            match attribution::attribute(&request.files, &output.stdout) {
                Ok(error_set) => failure = failure.with_error_set(error_set),
                Err(err) => warn!("{}", err),
            }
        }

        failure
    }
}

impl<R: Runner> Backend for SvInst<R> {
    fn definitions(&self, request: &ParseRequest) -> Result<Vec<FileDefinitions>> {
        let entries = self.invoke(request, false)?;
        defs::build_batch(&entries, request.show_macro_defs)
    }

    fn syntax_tree(&self, request: &ParseRequest) -> Result<Vec<FileTree>> {
        let entries = self.invoke(request, true)?;
        tree::build_batch(&entries)
    }
}
