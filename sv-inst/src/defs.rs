//! Definition builder: per-file YAML records to typed [`Definition`]s.
//!
//! Records are decoded once into a discriminant and matched exhaustively. A record with no
//! recognised key, or with more than one, aborts the whole batch.

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::model::{Definition, DefinitionKind, FileItem, Instantiation, MacroDefinition};
use crate::{Error, FileDefinitions, Result};

pub const FILE_NAME_KEY: &str = "file_name";
pub const DEFS_KEY: &str = "defs";
pub const MACRO_DEFS_KEY: &str = "macro_defs";
pub const INSTS_KEY: &str = "insts";
pub const MOD_NAME_KEY: &str = "mod_name";
pub const PKG_NAME_KEY: &str = "pkg_name";
pub const INTF_NAME_KEY: &str = "intf_name";
pub const INST_NAME_KEY: &str = "inst_name";

const DEFINITION_KEYS: [(&str, DefinitionKind); 3] = [
    (MOD_NAME_KEY, DefinitionKind::Module),
    (PKG_NAME_KEY, DefinitionKind::Package),
    (INTF_NAME_KEY, DefinitionKind::Interface),
];

/// Shape of one instance record.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InstanceRecord {
    Module {
        name: String,
        inst_name: Option<String>,
    },
    Package {
        name: String,
    },
}

/// Build the items of every file entry (`{file_name, defs, macro_defs}`) in order.
pub fn build_batch(entries: &[Value], show_macro_defs: bool) -> Result<Vec<FileDefinitions>> {
    entries
        .iter()
        .map(|entry| build_file(entry, show_macro_defs))
        .collect()
}

/// Build one file entry: definitions in source order, then sorted macro definitions.
pub fn build_file(entry: &Value, show_macro_defs: bool) -> Result<FileDefinitions> {
    let mapping = entry.as_mapping().ok_or_else(|| {
        Error::malformed_record(format!("expected a file entry, found:\n{}", dump(entry)))
    })?;

    let file_name = mapping
        .get(FILE_NAME_KEY)
        .and_then(scalar_text)
        .ok_or_else(|| {
            Error::malformed_record(format!("file entry without {FILE_NAME_KEY}:\n{}", dump(entry)))
        })?;

    let definitions = build_definitions(mapping.get(DEFS_KEY).unwrap_or(&Value::Null))?;
    let mut items: Vec<FileItem> = definitions.into_iter().map(FileItem::from).collect();

    if show_macro_defs {
        let macro_defs = mapping.get(MACRO_DEFS_KEY).unwrap_or(&Value::Null);
        let macros = build_macro_definitions(macro_defs)?;
        items.extend(macros.into_iter().map(FileItem::from));
    }

    debug!("{}: {} item(s)", file_name, items.len());
    Ok(FileDefinitions { file_name, items })
}

/// Build the definitions of one file. `null` means the file declared nothing.
pub fn build_definitions(records: &Value) -> Result<Vec<Definition>> {
    sequence(records, "definition records")?
        .iter()
        .map(build_definition)
        .collect()
}

pub fn build_definition(record: &Value) -> Result<Definition> {
    let mapping = record_mapping(record, "definition")?;

    let found: Vec<(DefinitionKind, &Value)> = DEFINITION_KEYS
        .iter()
        .filter_map(|(key, kind)| mapping.get(*key).map(|value| (*kind, value)))
        .collect();

    let (kind, name) = match found.as_slice() {
        [(kind, name)] => (*kind, name_text(name, record)?),
        [] => {
            return Err(Error::malformed_record(format!(
                "unknown definition:\n{}",
                dump(record)
            )))
        }
        _ => {
            return Err(Error::malformed_record(format!(
                "ambiguous definition:\n{}",
                dump(record)
            )))
        }
    };

    let mut definition = Definition::new(kind, name);
    for inst in sequence(mapping.get(INSTS_KEY).unwrap_or(&Value::Null), "instance records")? {
        definition.push(build_instantiation(inst)?);
    }
    Ok(definition)
}

pub fn build_instantiation(record: &Value) -> Result<Instantiation> {
    Ok(match decode_instance(record)? {
        InstanceRecord::Module { name, inst_name } => Instantiation::Module {
            definition_name: name,
            instance_name: inst_name,
        },
        InstanceRecord::Package { name } => Instantiation::Package {
            definition_name: name,
        },
    })
}

fn decode_instance(record: &Value) -> Result<InstanceRecord> {
    let mapping = record_mapping(record, "instance")?;

    match (mapping.get(MOD_NAME_KEY), mapping.get(PKG_NAME_KEY)) {
        (Some(name), None) => {
            let inst_name = match mapping.get(INST_NAME_KEY) {
                None | Some(Value::Null) => None,
                Some(value) => Some(name_text(value, record)?),
            };
            Ok(InstanceRecord::Module {
                name: name_text(name, record)?,
                inst_name,
            })
        }
        (None, Some(name)) => Ok(InstanceRecord::Package {
            name: name_text(name, record)?,
        }),
        _ => Err(Error::malformed_record(format!(
            "unknown instance:\n{}",
            dump(record)
        ))),
    }
}

/// Macro definitions of one file, sorted by their text.
pub fn build_macro_definitions(records: &Value) -> Result<Vec<MacroDefinition>> {
    let mut macros = sequence(records, "macro definitions")?
        .iter()
        .map(|record| {
            scalar_text(record).map(MacroDefinition::new).ok_or_else(|| {
                Error::malformed_record(format!("unknown macro definition:\n{}", dump(record)))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    macros.sort_by(|a, b| a.text.cmp(&b.text));
    Ok(macros)
}

fn sequence<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    match value {
        Value::Null => Ok(&[]),
        Value::Sequence(items) => Ok(items),
        other => Err(Error::malformed_record(format!(
            "expected a sequence of {what}, found:\n{}",
            dump(other)
        ))),
    }
}

fn record_mapping<'a>(record: &'a Value, what: &str) -> Result<&'a Mapping> {
    record.as_mapping().ok_or_else(|| {
        Error::malformed_record(format!("expected a {what} record, found:\n{}", dump(record)))
    })
}

fn name_text(value: &Value, record: &Value) -> Result<String> {
    scalar_text(value)
        .ok_or_else(|| Error::malformed_record(format!("expected a name in:\n{}", dump(record))))
}

/// Text of a YAML scalar. Unquoted numbers and booleans come back as the text they were.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// YAML dump of a value for error messages.
pub(crate) fn dump(value: &Value) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

