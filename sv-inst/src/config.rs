//! Backend selection.
//!
//! Nothing here reads the environment: the caller builds a [`ToolConfig`] (by hand, from a
//! TOML file, or from command-line flags) and asks it for a backend.
//!
//! ```toml
//! tool = "slang"
//! slang = "/opt/slang/bin/slang"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::{Backend, Error, Result, Slang, SvInst};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Svinst,
    Slang,
}

impl ToolKind {
    /// Executable name looked up on `PATH` when no explicit path is configured.
    pub fn default_program(self) -> &'static str {
        match self {
            ToolKind::Svinst => crate::svinst::TOOL_NAME,
            ToolKind::Slang => crate::slang::TOOL_NAME,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub tool: ToolKind,
    /// Path to the `svinst` executable.
    pub svinst: Option<PathBuf>,
    /// Path to the `slang` executable.
    pub slang: Option<PathBuf>,
}

impl ToolConfig {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        debug!("loaded {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| Error::Config {
            path: PathBuf::from("<string>"),
            message: err.to_string(),
        })
    }

    /// Override the executable of the selected tool.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        let program = Some(program.into());
        match self.tool {
            ToolKind::Svinst => self.svinst = program,
            ToolKind::Slang => self.slang = program,
        }
        self
    }

    /// Executable of the selected tool.
    pub fn program(&self) -> PathBuf {
        let configured = match self.tool {
            ToolKind::Svinst => &self.svinst,
            ToolKind::Slang => &self.slang,
        };
        configured
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.tool.default_program()))
    }

    pub fn backend(&self) -> Box<dyn Backend> {
        let program = self.program();
        debug!("using {} at {}", self.tool, program.display());
        match self.tool {
            ToolKind::Svinst => Box::new(SvInst::new(program)),
            ToolKind::Slang => Box::new(Slang::new(program)),
        }
    }
}
