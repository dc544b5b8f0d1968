//! Backend for `slang`.
//!
//! slang has no definitions report. Elaborating a file on its own makes every reference to a
//! module, package or interface defined elsewhere an "unknown ..." error, so those lines are
//! scanned, grouped by file, and turned into the same records `svinst` prints before they go
//! through the definition builder. Any other error fails the call.

use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use serde_yaml::{Mapping, Value};

use crate::attribution::ToolFailure;
use crate::defs::{
    DEFS_KEY, FILE_NAME_KEY, INSTS_KEY, INST_NAME_KEY, MOD_NAME_KEY, PKG_NAME_KEY,
};
use crate::runner::{ProcessRunner, Runner, ToolOutput};
use crate::{defs, Backend, Error, FileDefinitions, FileTree, ParseRequest, Result};

pub const TOOL_NAME: &str = "slang";

const ERROR_INDICATOR: &str = "error:";

/// What kind of definition an unresolved name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Module,
    Package,
    Interface,
}

const UNKNOWN_MARKERS: [(&str, ReferenceKind); 3] = [
    ("error: unknown module", ReferenceKind::Module),
    ("error: unknown package", ReferenceKind::Package),
    ("error: unknown interface", ReferenceKind::Interface),
];

/// Unresolved names reported for one file, first occurrence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReferences {
    pub file_name: String,
    pub references: Vec<(String, ReferenceKind)>,
}

impl FileReferences {
    fn record(&mut self, name: String, kind: ReferenceKind) {
        match self.references.iter_mut().find(|(seen, _)| *seen == name) {
            Some(entry) => entry.1 = kind,
            None => self.references.push((name, kind)),
        }
    }
}

/// Result of scanning slang's diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scan {
    pub files: Vec<FileReferences>,
    /// Lines belonging to errors other than unknown references.
    pub diagnostics: Vec<String>,
}

impl Scan {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    fn file_mut(&mut self, file_name: &str) -> &mut FileReferences {
        let index = match self.files.iter().position(|f| f.file_name == file_name) {
            Some(index) => index,
            None => {
                self.files.push(FileReferences {
                    file_name: file_name.to_string(),
                    references: Vec::new(),
                });
                self.files.len() - 1
            }
        };
        &mut self.files[index]
    }

    /// Records in the shape the definition builder reads: one module per file, named after
    /// the file stem, instantiating everything that file left unresolved.
    pub fn to_records(&self) -> Vec<Value> {
        self.files
            .iter()
            .map(|file| {
                let insts: Vec<Value> = file
                    .references
                    .iter()
                    .map(|(name, kind)| {
                        let mut inst = Mapping::new();
                        match kind {
                            // Interfaces are instantiated like modules.
                            ReferenceKind::Module | ReferenceKind::Interface => {
                                inst.insert(MOD_NAME_KEY.into(), name.as_str().into());
                                inst.insert(INST_NAME_KEY.into(), Value::Null);
                            }
                            ReferenceKind::Package => {
                                inst.insert(PKG_NAME_KEY.into(), name.as_str().into());
                            }
                        }
                        Value::Mapping(inst)
                    })
                    .collect();

                let mut def = Mapping::new();
                def.insert(MOD_NAME_KEY.into(), file_stem(&file.file_name).into());
                def.insert(INSTS_KEY.into(), Value::Sequence(insts));

                let mut entry = Mapping::new();
                entry.insert(FILE_NAME_KEY.into(), file.file_name.as_str().into());
                entry.insert(DEFS_KEY.into(), Value::Sequence(vec![Value::Mapping(def)]));
                Value::Mapping(entry)
            })
            .collect()
    }
}

/// Scan slang output for `<file>:<line>:<col>: error: unknown <kind> '<name>'` lines.
pub fn scan_diagnostics(output: &str) -> Result<Scan> {
    let mut scan = Scan::default();
    let mut in_error = false;

    for line in output.lines() {
        if !line.contains(ERROR_INDICATOR) {
            if in_error {
                scan.diagnostics.push(line.to_string());
            }
            continue;
        }

        let Some((start, marker, kind)) = UNKNOWN_MARKERS
            .iter()
            .find_map(|(marker, kind)| line.find(marker).map(|start| (start, *marker, *kind)))
        else {
            scan.diagnostics.push(line.to_string());
            in_error = true;
            continue;
        };
        in_error = false;

        let file_name = location_file(&line[..start]).ok_or_else(|| {
            Error::malformed_record(format!("no source location in slang diagnostic: {line}"))
        })?;
        let name = unquote(line[start + marker.len()..].trim()).to_string();

        scan.file_mut(&file_name).record(name, kind);
    }

    Ok(scan)
}

/// File part of `<file>:<line>:<col>:`. The file itself may contain colons.
fn location_file(location: &str) -> Option<String> {
    let parts: Vec<&str> = location.trim().split(':').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(parts[..parts.len() - 3].join(":"))
}

fn unquote(name: &str) -> &str {
    let mut chars = name.char_indices();
    match (chars.next(), chars.next_back()) {
        (Some((_, first)), Some((last, _))) => &name[first.len_utf8()..last],
        _ => name,
    }
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

pub struct Slang<R = ProcessRunner> {
    program: PathBuf,
    runner: R,
}

impl Slang<ProcessRunner> {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, ProcessRunner)
    }
}

impl<R: Runner> Slang<R> {
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
            args.push("-D".to_string());
            args.push(define.to_string());
        }
        for dir in &request.includes {
            args.push("-I".to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        if full_tree {
            args.push("--ast-json".to_string());
            args.push("-".to_string());
        }
        if !request.separate {
            args.push("--single-unit".to_string());
        }

        args
    }

    fn run(&self, request: &ParseRequest, full_tree: bool) -> Result<ToolOutput> {
        if request.ignore_include {
            warn!("{} cannot ignore includes, option ignored", TOOL_NAME);
        }
        if request.show_macro_defs {
            warn!("{} does not report macro definitions, option ignored", TOOL_NAME);
        }

        let args = self.arguments(request, full_tree);
        self.runner
            .run(&self.program, &args)
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// The AST slang dumps with `--ast-json`, undecoded.
    ///
    /// slang still prints the AST when it exits nonzero over unresolved references, so the
    /// status only matters when stdout holds no JSON.
    pub fn ast_json(&self, request: &ParseRequest) -> Result<serde_json::Value> {
        let output = self.run(request, true)?;
        match serde_json::from_str(&output.stdout) {
            Ok(ast) => {
                if !output.is_success() {
                    debug!("{} returned code {} with an AST", TOOL_NAME, output.status);
                }
                Ok(ast)
            }
            Err(_) if !output.is_success() => Err(Error::ToolInvocation(
                ToolFailure::new(TOOL_NAME, request.files.clone())
                    .with_stderr(output.stderr)
                    .with_return_code(output.status),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

impl<R: Runner> Backend for Slang<R> {
    fn definitions(&self, request: &ParseRequest) -> Result<Vec<FileDefinitions>> {
        // Unknown references make slang exit nonzero, so only the scan decides success.
        let output = self.run(request, false)?;
        let scan = scan_diagnostics(&output.stdout)?;

        if scan.has_errors() {
            for line in &scan.diagnostics {
                error!("{}", line);
            }
            let mut stderr = scan.diagnostics.join("\n");
            if !output.stderr.is_empty() {
                stderr.push('\n');
                stderr.push_str(&output.stderr);
            }
            return Err(Error::ToolInvocation(
                ToolFailure::new(TOOL_NAME, request.files.clone())
                    .with_stderr(stderr)
                    .with_return_code(output.status),
            ));
        }

        debug!("{} left references unresolved in {} file(s)", TOOL_NAME, scan.files.len());
        defs::build_batch(&scan.to_records(), false)
    }

    fn syntax_tree(&self, _request: &ParseRequest) -> Result<Vec<FileTree>> {
        Err(Error::Unsupported(format!(
            "{} does not emit a tagged syntax tree; use Slang::ast_json",
            TOOL_NAME
        )))
    }
}
