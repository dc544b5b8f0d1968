mod common;

use common::{expected_items, file_entries, yaml};
use sv_inst::defs::{
    build_batch, build_definition, build_definitions, build_file, build_instantiation,
    build_macro_definitions,
};
use sv_inst::{Definition, Error, FileItem, Instantiation, MacroDefinition};

svinst_fixture_tests! {
    test_module_definitions_fixture => ("svinst/test.yaml", "expected/test.txt"),
    test_package_definitions_fixture => ("svinst/pkg.yaml", "expected/pkg.txt"),
}

fn definitions(items: &[FileItem]) -> Vec<&Definition> {
    items.iter().filter_map(FileItem::as_definition).collect()
}

#[test]
fn test_definitions_keep_source_order() {
    let file = build_file(&file_entries("svinst/test.yaml")[0], false).unwrap();

    assert_eq!(file.file_name, "test.sv");
    let expected: Vec<FileItem> = vec![
        Definition::module("A").into(),
        Definition::module("B").into(),
        Definition::module("C")
            .with_instantiations([
                Instantiation::module("A", "I0"),
                Instantiation::module("B", "I1"),
            ])
            .into(),
        // X and Y are never defined; forward references are kept as-is
        Definition::module("D")
            .with_instantiations([
                Instantiation::module("X", "I0"),
                Instantiation::module("Y", "I1"),
            ])
            .into(),
    ];
    assert_eq!(file.items, expected);
}

#[test]
fn test_packages_interleave_with_modules() {
    let file = build_file(&file_entries("svinst/pkg.yaml")[0], false).unwrap();
    let defs = definitions(&file.items);
    let names: Vec<(&str, &str)> = defs
        .iter()
        .map(|def| (def.kind.tag(), def.name.as_str()))
        .collect();

    assert_eq!(
        names,
        vec![
            ("PkgDef", "i"),
            ("ModDef", "A"),
            ("PkgDef", "j"),
            ("ModDef", "B"),
            ("ModDef", "E"),
            ("PkgDef", "k"),
        ]
    );
    assert_eq!(
        defs[4].instantiations,
        vec![Instantiation::package("f"), Instantiation::package("g")]
    );
}

#[test]
fn test_interface_definitions() {
    let file = build_file(&file_entries("svinst/intf.yaml")[0], false).unwrap();

    let expected: Vec<FileItem> = vec![
        Definition::interface("b").into(),
        Definition::module("A").into(),
        Definition::interface("c").into(),
        Definition::module("E")
            .with_instantiations([Instantiation::module("c", "c_i")])
            .into(),
        Definition::interface("d").into(),
    ];
    assert_eq!(file.items, expected);
}

#[test]
fn test_instantiation_order_is_not_sorted() {
    let defs = build_definitions(&yaml(
        r#"
- mod_name: top
  insts:
    - mod_name: zeta
      inst_name: u0
    - pkg_name: alpha
    - mod_name: zeta
      inst_name: u1
    - mod_name: beta
      inst_name: u2
"#,
    ))
    .unwrap();

    assert_eq!(
        defs[0].instantiations,
        vec![
            Instantiation::module("zeta", "u0"),
            Instantiation::package("alpha"),
            Instantiation::module("zeta", "u1"),
            Instantiation::module("beta", "u2"),
        ]
    );
}

#[test]
fn test_macro_definitions_sorted_after_definitions() {
    let file = build_file(&file_entries("svinst/macros.yaml")[0], true).unwrap();

    assert_eq!(file.items.len(), 4);
    assert_eq!(
        file.items[0],
        FileItem::Definition(Definition::module("def_top").with_instantiations([
            Instantiation::module("module_name_from_define", "I0"),
            Instantiation::module("module_from_ifdef", "I1"),
        ]))
    );
    let macros: Vec<FileItem> = vec![
        MacroDefinition::new("`define EXTRA_INSTANCE").into(),
        MacroDefinition::new("`define MODULE_NAME module_name_from_define").into(),
        MacroDefinition::new("`define WIDTH 8").into(),
    ];
    assert_eq!(file.items[1..].to_vec(), macros);
}

#[test]
fn test_macro_definitions_ignored_unless_requested() {
    let file = build_file(&file_entries("svinst/macros.yaml")[0], false).unwrap();
    assert_eq!(file.items.len(), 1);
}

#[test]
fn test_macro_sort_independent_of_emission_order() {
    let forward = build_macro_definitions(&yaml("[b, a, c]")).unwrap();
    let backward = build_macro_definitions(&yaml("[c, b, a]")).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward[0], MacroDefinition::new("a"));
}

#[test]
fn test_missing_macro_list_is_empty() {
    let file = build_file(&yaml("file_name: x.sv\ndefs:\n"), true).unwrap();
    assert!(file.items.is_empty());
}

#[test]
fn test_null_definitions_are_empty() {
    assert!(build_definitions(&yaml("~")).unwrap().is_empty());

    let files = build_batch(&file_entries("svinst/multi.yaml"), false).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[1].file_name, "b.sv");
    assert!(files[1].items.is_empty());
}

#[test]
fn test_absent_instance_name() {
    let unnamed = build_instantiation(&yaml("mod_name: X\ninst_name: ~\n")).unwrap();
    let missing = build_instantiation(&yaml("mod_name: X\n")).unwrap();

    assert_eq!(unnamed, Instantiation::unnamed_module("X"));
    assert_eq!(unnamed, missing);
    assert_ne!(unnamed, Instantiation::module("X", "None"));
    assert_ne!(unnamed, Instantiation::module("X", ""));
}

#[test]
fn test_module_and_package_instances_differ() {
    assert_ne!(Instantiation::unnamed_module("p"), Instantiation::package("p"));
    assert_ne!(Definition::module("p"), Definition::package("p"));
}

#[test]
fn test_unquoted_numeric_names_keep_their_text() {
    let def = build_definition(&yaml("mod_name: 42\ninsts:\n")).unwrap();
    assert_eq!(def.name, "42");
}

#[test]
fn test_unknown_definition_key_is_rejected() {
    let err = build_definition(&yaml("prog_name: p\ninsts:\n")).unwrap_err();

    match err {
        Error::MalformedRecord { message } => {
            assert!(message.contains("unknown definition"), "{}", message);
            assert!(message.contains("prog_name"), "{}", message);
        }
        other => panic!("Expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_two_definition_keys_are_rejected() {
    let err = build_definition(&yaml("mod_name: m\npkg_name: p\n")).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }));
}

#[test]
fn test_unknown_instance_shape_is_rejected() {
    for record in ["inst_name: u0\n", "mod_name: m\npkg_name: p\n", "- m\n"] {
        let err = build_instantiation(&yaml(record)).unwrap_err();
        assert!(
            matches!(err, Error::MalformedRecord { .. }),
            "{:?} should be rejected",
            record
        );
    }
}

#[test]
fn test_non_sequence_lists_are_rejected() {
    assert!(matches!(
        build_definitions(&yaml("mod_name: A\n")),
        Err(Error::MalformedRecord { .. })
    ));
    assert!(matches!(
        build_definition(&yaml("mod_name: A\ninsts: B\n")),
        Err(Error::MalformedRecord { .. })
    ));
}

#[test]
fn test_file_entry_needs_file_name() {
    let err = build_file(&yaml("defs:\n  - mod_name: A\n"), false).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }));
}

#[test]
fn test_malformed_record_aborts_whole_batch() {
    let result = build_batch(&file_entries("svinst/malformed.yaml"), false);
    assert!(matches!(result, Err(Error::MalformedRecord { .. })));
}

#[test]
fn test_expected_fixture_reads_back() {
    let items = expected_items("expected/test.txt");
    assert_eq!(definitions(&items).len(), 4);
}
