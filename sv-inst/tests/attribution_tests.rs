mod common;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use common::read_fixture;
use sv_inst::attribution::{attribute, produced_file_names};
use sv_inst::{find_error_indices, ToolFailure};

fn set(indices: &[usize]) -> BTreeSet<usize> {
    indices.iter().copied().collect()
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_all_files_produced() {
    let errors = find_error_indices(&["a.sv", "b.sv", "c.sv"], &["a.sv", "b.sv", "c.sv"]);
    assert!(errors.is_empty());
}

#[test]
fn test_failure_at_first_file() {
    let errors = find_error_indices::<_, &str>(&["a.sv", "b.sv", "c.sv"], &[]);
    assert_eq!(errors, set(&[0, 1, 2]));
}

#[test]
fn test_failure_in_the_middle() {
    let errors = find_error_indices(&["a.sv", "b.sv", "c.sv"], &["a.sv"]);
    assert_eq!(errors, set(&[1, 2]));
}

#[test]
fn test_failure_at_last_file() {
    let errors = find_error_indices(&["a.sv", "b.sv", "c.sv"], &["a.sv", "b.sv"]);
    assert_eq!(errors, set(&[2]));
}

#[test]
fn test_duplicate_files_are_matched_by_position() {
    // The second request of f is where the tool stopped.
    let errors = find_error_indices(&["f.sv", "f.sv", "f.sv"], &["f.sv"]);
    assert_eq!(errors, set(&[1, 2]));

    let errors = find_error_indices(&["a.sv", "b.sv", "a.sv", "c.sv"], &["a.sv", "b.sv"]);
    assert_eq!(errors, set(&[2, 3]));
}

#[test]
fn test_broken_file_between_repeated_batch() {
    let requested = ["a.sv", "b.sv", "c.sv", "broken.sv", "a.sv", "b.sv", "c.sv"];
    let produced = produced_file_names(&read_fixture("svinst/partial.yaml")).unwrap();

    assert_eq!(produced, vec!["a.sv", "b.sv", "c.sv"]);
    assert_eq!(find_error_indices(&requested, &produced), set(&[3, 4, 5, 6]));
}

#[test]
fn test_unmatched_entries_skip_requests() {
    // An entry that matches nothing marks every remaining request as failed.
    let errors = find_error_indices(&["a.sv", "b.sv"], &["z.sv", "a.sv"]);
    assert_eq!(errors, set(&[0, 1]));
}

#[test]
fn test_paths_compare_by_components() {
    let errors = find_error_indices(&["dir//a.sv", "dir/./b.sv"], &["dir/a.sv", "dir/b.sv"]);
    assert!(errors.is_empty());

    let errors = find_error_indices(&["dir/a.sv"], &["a.sv"]);
    assert_eq!(errors, set(&[0]));
}

#[test]
fn test_produced_names_from_multi_file_output() {
    let names = produced_file_names(&read_fixture("svinst/multi.yaml")).unwrap();
    assert_eq!(names, vec!["a.sv", "b.sv", "c.sv"]);
}

#[test]
fn test_produced_names_unavailable() {
    assert!(produced_file_names("").is_err());
    assert!(produced_file_names("files: [").is_err());
    assert!(produced_file_names("other: 1\n").is_err());
    assert!(produced_file_names("files:\n  - defs:\n").is_err());
}

#[test]
fn test_attribute_needs_two_files() {
    let stdout = read_fixture("svinst/partial.yaml");

    let err = attribute(&["a.sv"], &stdout).unwrap_err();
    assert!(err.reason.contains("fewer than two"), "{}", err);

    let errors = attribute(&["a.sv", "b.sv", "c.sv", "d.sv"], &stdout).unwrap();
    assert_eq!(errors, set(&[3]));
}

#[test]
fn test_failure_message_with_everything() {
    let files = paths(&["src/a.sv", "src/b.sv", "src/c.sv", "src/broken.sv", "a.sv", "b.sv", "c.sv"]);
    let failure = ToolFailure::new("svinst", files)
        .with_stderr("parse failed")
        .with_error_set(set(&[3, 4, 5, 6]))
        .with_return_code(1);

    assert_eq!(
        failure.message(),
        "parse failed\n\
         Error in file(s) 4, 5, 6, 7: [a.sv, b.sv, c.sv, **broken.sv**, **a.sv**, **b.sv**, **c.sv**]\n\
         svinst returned code 1."
    );
    assert_eq!(failure.to_string(), failure.message());
}

#[test]
fn test_failure_message_without_attribution() {
    let failure = ToolFailure::new("svinst", paths(&["a.sv"]))
        .with_stderr("oops")
        .with_return_code(2);

    assert_eq!(failure.message(), "oops\nsvinst returned code 2.");
    assert_eq!(failure.failed_files(), None);
}

#[test]
fn test_failure_message_keeps_stderr_verbatim() {
    let failure = ToolFailure::new("slang", paths(&["a.sv"])).with_stderr("line 1\nline 2\n");
    assert_eq!(failure.message(), "line 1\nline 2\n");
}

#[test]
fn test_empty_stderr_is_left_out() {
    let failure = ToolFailure::new("slang", paths(&["a.sv"]))
        .with_stderr("")
        .with_return_code(1);

    assert_eq!(failure.stderr, None);
    assert_eq!(failure.message(), "slang returned code 1.");
}

#[test]
fn test_failed_files() {
    let failure = ToolFailure::new("svinst", paths(&["a.sv", "b.sv", "c.sv"]))
        .with_error_set(set(&[1, 2]));

    assert_eq!(
        failure.failed_files(),
        Some(vec![Path::new("b.sv"), Path::new("c.sv")])
    );
    assert!(failure.message().starts_with("Error in file(s) 2, 3: [a.sv, **b.sv**, **c.sv**]"));
}
