use std::fmt;
use std::path::PathBuf;

/// A preprocessor define passed to the tool. `value` is `None` for a valueless define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parse `NAME` or `NAME=VALUE`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((name, value)) => Self::new(name, Some(value.to_string())),
            None => Self::new(text, None),
        }
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// One batch: everything the tool needs besides the choice of output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    pub files: Vec<PathBuf>,
    pub includes: Vec<PathBuf>,
    pub defines: Vec<Define>,
    /// Parse each file as its own compilation unit.
    pub separate: bool,
    pub show_macro_defs: bool,
    pub ignore_include: bool,
    /// Work out which files failed when a multi-file batch fails.
    pub explain_error: bool,
}

impl ParseRequest {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            includes: Vec::new(),
            defines: Vec::new(),
            separate: false,
            show_macro_defs: false,
            ignore_include: false,
            explain_error: true,
        }
    }

    pub fn include(mut self, dir: impl Into<PathBuf>) -> Self {
        self.includes.push(dir.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.defines
            .push(Define::new(name, value.map(str::to_string)));
        self
    }

    pub fn separate(mut self, separate: bool) -> Self {
        self.separate = separate;
        self
    }

    pub fn show_macro_defs(mut self, show: bool) -> Self {
        self.show_macro_defs = show;
        self
    }

    pub fn ignore_include(mut self, ignore: bool) -> Self {
        self.ignore_include = ignore;
        self
    }

    pub fn explain_error(mut self, explain: bool) -> Self {
        self.explain_error = explain;
        self
    }
}
