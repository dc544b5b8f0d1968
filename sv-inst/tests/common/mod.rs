use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_yaml::Value;
use sv_inst::model::{render_items, FileItem, TreeNode};
use sv_inst::{text, Backend, FileDefinitions, ParseRequest, Runner, SvInst, ToolOutput};

pub mod macros;

/// A `Runner` that replays one canned output and records how it was called.
pub struct FakeRunner {
    output: Option<ToolOutput>,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn new(output: ToolOutput) -> Self {
        Self {
            output: Some(output),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(ToolOutput::success(stdout))
    }

    #[allow(dead_code)]
    pub fn failure(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::new(ToolOutput::failure(status, stdout, stderr))
    }

    /// A runner whose program can never be started.
    #[allow(dead_code)]
    pub fn unspawnable() -> Self {
        Self {
            output: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn last_args(&self) -> Vec<String> {
        self.calls()
            .pop()
            .map(|(_, args)| args)
            .unwrap_or_else(|| panic!("runner was never called"))
    }
}

impl Runner for &FakeRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), args.to_vec()));
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such program")),
        }
    }
}

pub fn default_fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_files")
}

pub fn fixture_path(relative: &str) -> PathBuf {
    default_fixtures_root().join(relative)
}

pub fn read_fixture(relative: &str) -> String {
    let path = fixture_path(relative);
    fs::read_to_string(&path).unwrap_or_else(|err| {
        panic!("Failed to read fixture {}: {}", path.display(), err);
    })
}

#[allow(dead_code)]
pub fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap_or_else(|err| panic!("Invalid YAML in test: {}", err))
}

/// The `files` list of a recorded svinst output.
#[allow(dead_code)]
pub fn file_entries(relative: &str) -> Vec<Value> {
    let document = yaml(&read_fixture(relative));
    document["files"]
        .as_sequence()
        .unwrap_or_else(|| panic!("Fixture {} has no files list", relative))
        .clone()
}

#[allow(dead_code)]
pub fn expected_items(relative: &str) -> Vec<FileItem> {
    text::parse_items(&read_fixture(relative))
        .unwrap_or_else(|err| panic!("Failed to read expected items {}: {}", relative, err))
}

#[allow(dead_code)]
pub fn expected_tree(relative: &str) -> Vec<TreeNode> {
    text::parse_tree(&read_fixture(relative))
        .unwrap_or_else(|err| panic!("Failed to read expected tree {}: {}", relative, err))
}

/// Run a recorded svinst output through the backend.
#[allow(dead_code)]
pub fn definitions_from_fixture(relative: &str, request: &ParseRequest) -> Vec<FileDefinitions> {
    let runner = FakeRunner::success(read_fixture(relative));
    SvInst::with_runner("svinst", &runner)
        .definitions(request)
        .unwrap_or_else(|err| panic!("Failed to build definitions from {}: {}", relative, err))
}

#[allow(dead_code)]
pub fn assert_fixture_matches(recorded: &str, expected: &str) {
    let files = definitions_from_fixture(recorded, &ParseRequest::new(["fixture.sv"]));
    assert_eq!(files.len(), 1, "Expected one file in {}", recorded);

    let expected = expected_items(expected);
    assert_eq!(
        files[0].items,
        expected,
        "Definitions from {} differ:\n{}",
        recorded,
        render_items(&files[0].items)
    );
}
