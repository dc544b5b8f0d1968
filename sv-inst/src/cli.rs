use std::path::PathBuf;

use log::warn;

use crate::request::{Define, ParseRequest};

#[derive(Debug, PartialEq)]
pub struct ParsedArgs {
    pub files: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<Define>,
}

impl ParsedArgs {
    /// A request with default flags for these files, includes and defines.
    pub fn into_request(self) -> ParseRequest {
        let mut request = ParseRequest::new(self.files);
        request.includes = self.include_dirs;
        request.defines = self.defines;
        request
    }
}

/// Split a mix of files, `+incdir+<dir>[+<dir>...]` and `+define+<NAME>[=<VALUE>][+...]`.
pub fn parse_vcs_style_args(raw_args: Vec<String>) -> Result<ParsedArgs, String> {
    let mut files = Vec::new();
    let mut include_dirs = Vec::new();
    let mut defines = Vec::new();

    for arg in raw_args {
        if let Some(incdir_paths) = arg.strip_prefix("+incdir+") {
            if incdir_paths.is_empty() {
                return Err("Empty path in +incdir+ directive".to_string());
            }
            for path in incdir_paths.split('+').filter(|p| !p.is_empty()) {
                include_dirs.push(PathBuf::from(path));
            }
        } else if let Some(define_str) = arg.strip_prefix("+define+") {
            if define_str.is_empty() {
                return Err("Empty define in +define+ directive".to_string());
            }
            for define in define_str.split('+').filter(|d| !d.is_empty()) {
                let define = Define::parse(define);
                if define.name.is_empty() {
                    return Err(format!("Missing macro name in +define+{}", define_str));
                }
                defines.push(define);
            }
        } else if arg.starts_with('+') {
            // Other VCS-style options that we don't support
            warn!("Unsupported VCS option: {}", arg);
        } else if arg.starts_with('-') {
            return Err(format!("Unknown option: {}", arg));
        } else {
            files.push(PathBuf::from(arg));
        }
    }

    if files.is_empty() {
        return Err("No input files specified".to_string());
    }

    Ok(ParsedArgs {
        files,
        include_dirs,
        defines,
    })
}
