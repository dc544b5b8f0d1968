pub mod attribution;
pub mod cli;
pub mod config;
pub mod defs;
pub mod model;
pub mod request;
pub mod runner;
pub mod slang;
pub mod svinst;
pub mod text;
pub mod tree;

pub use attribution::{find_error_indices, AttributionUnavailable, ToolFailure};
pub use cli::{parse_vcs_style_args, ParsedArgs};
pub use config::{ToolConfig, ToolKind};
pub use model::{
    Definition, DefinitionKind, FileItem, Instantiation, Leaf, MacroDefinition, TreeElement,
    TreeNode,
};
pub use request::{Define, ParseRequest};
pub use runner::{ProcessRunner, Runner, ToolOutput};
pub use slang::Slang;
pub use svinst::SvInst;

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong between handing files to a backend and getting a model back.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external tool reported a failure.
    #[error("{0}")]
    ToolInvocation(ToolFailure),

    /// A definition or instance record had none, or more than one, of the known keys.
    #[error("malformed record: {message}")]
    MalformedRecord { message: String },

    /// A syntax tree element was neither a leaf nor a single-key node.
    #[error("malformed syntax tree: {message}")]
    MalformedTree { message: String },

    #[error("could not decode tool output: {0}")]
    MalformedOutput(#[from] serde_yaml::Error),

    #[error("could not decode tool JSON output: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Rendered model text could not be read back.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Text {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The request does not fit the operation it was passed to.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    pub(crate) fn malformed_record(message: impl Into<String>) -> Self {
        Error::MalformedRecord {
            message: message.into(),
        }
    }

    pub(crate) fn malformed_tree(message: impl Into<String>) -> Self {
        Error::MalformedTree {
            message: message.into(),
        }
    }
}

/// A parser backend: one external tool invocation per call, fully buffered.
pub trait Backend: Send + Sync {
    /// Definitions (and macro definitions, when requested) for every file the tool reported.
    fn definitions(&self, request: &ParseRequest) -> Result<Vec<FileDefinitions>>;

    /// Full concrete syntax trees for every file the tool reported.
    fn syntax_tree(&self, request: &ParseRequest) -> Result<Vec<FileTree>>;

    /// Definitions for a single-file request, with the per-file list unwrapped.
    fn definitions_of(&self, request: &ParseRequest) -> Result<Vec<FileItem>> {
        expect_single_file(request)?;
        Ok(self
            .definitions(request)?
            .into_iter()
            .next()
            .map(|file| file.items)
            .unwrap_or_default())
    }

    /// Syntax tree roots for a single-file request, with the per-file list unwrapped.
    fn syntax_tree_of(&self, request: &ParseRequest) -> Result<Vec<TreeNode>> {
        expect_single_file(request)?;
        Ok(self
            .syntax_tree(request)?
            .into_iter()
            .next()
            .map(|file| file.roots)
            .unwrap_or_default())
    }
}

fn expect_single_file(request: &ParseRequest) -> Result<()> {
    match request.files.len() {
        1 => Ok(()),
        n => Err(Error::InvalidRequest(format!(
            "expected exactly one input file, found {}",
            n
        ))),
    }
}

/// The ordered items reported for one file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FileDefinitions {
    pub file_name: String,
    pub items: Vec<FileItem>,
}

/// The syntax tree roots reported for one file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FileTree {
    pub file_name: String,
    pub roots: Vec<TreeNode>,
}
