//! Typed model of what the external parsers report.
//!
//! Every entity has a canonical rendering (`render_*`), also used by its `Display` impl.
//! The rendering is stable and [`crate::text`] reads it back, so both sides share the tag
//! names defined here.

use std::fmt;

use serde::Serialize;

pub const MOD_DEF: &str = "ModDef";
pub const PKG_DEF: &str = "PkgDef";
pub const INTF_DEF: &str = "IntfDef";
pub const MOD_INST: &str = "ModInst";
pub const PKG_INST: &str = "PkgInst";
pub const MACRO_DEF: &str = "MacroDef";
pub const NODE: &str = "Node";
pub const LEAF: &str = "Leaf";

const INDENT: &str = "  ";

/// Which kind of design unit a [`Definition`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Module,
    Package,
    Interface,
}

impl DefinitionKind {
    pub fn tag(self) -> &'static str {
        match self {
            DefinitionKind::Module => MOD_DEF,
            DefinitionKind::Package => PKG_DEF,
            DefinitionKind::Interface => INTF_DEF,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            MOD_DEF => Some(DefinitionKind::Module),
            PKG_DEF => Some(DefinitionKind::Package),
            INTF_DEF => Some(DefinitionKind::Interface),
            _ => None,
        }
    }
}

/// A module, package or interface declared in a file, with what it instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// In declaration order.
    pub instantiations: Vec<Instantiation>,
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            instantiations: Vec::new(),
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self::new(DefinitionKind::Module, name)
    }

    pub fn package(name: impl Into<String>) -> Self {
        Self::new(DefinitionKind::Package, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(DefinitionKind::Interface, name)
    }

    pub fn with_instantiations(
        mut self,
        instantiations: impl IntoIterator<Item = Instantiation>,
    ) -> Self {
        self.instantiations.extend(instantiations);
        self
    }

    pub fn push(&mut self, instantiation: Instantiation) {
        self.instantiations.push(instantiation);
    }
}

/// A reference made from inside a definition body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instantiation {
    Module {
        definition_name: String,
        /// Absent when the tool only reports the referenced name.
        instance_name: Option<String>,
    },
    Package {
        definition_name: String,
    },
}

impl Instantiation {
    pub fn module(definition_name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Instantiation::Module {
            definition_name: definition_name.into(),
            instance_name: Some(instance_name.into()),
        }
    }

    pub fn unnamed_module(definition_name: impl Into<String>) -> Self {
        Instantiation::Module {
            definition_name: definition_name.into(),
            instance_name: None,
        }
    }

    pub fn package(definition_name: impl Into<String>) -> Self {
        Instantiation::Package {
            definition_name: definition_name.into(),
        }
    }

    pub fn definition_name(&self) -> &str {
        match self {
            Instantiation::Module {
                definition_name, ..
            }
            | Instantiation::Package { definition_name } => definition_name,
        }
    }
}

/// A macro definition captured verbatim from the tool's macro dump.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MacroDefinition {
    pub text: String,
}

impl MacroDefinition {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry of a file's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileItem {
    Definition(Definition),
    Macro(MacroDefinition),
}

impl FileItem {
    pub fn as_definition(&self) -> Option<&Definition> {
        match self {
            FileItem::Definition(definition) => Some(definition),
            FileItem::Macro(_) => None,
        }
    }
}

impl From<Definition> for FileItem {
    fn from(definition: Definition) -> Self {
        FileItem::Definition(definition)
    }
}

impl From<MacroDefinition> for FileItem {
    fn from(macro_def: MacroDefinition) -> Self {
        FileItem::Macro(macro_def)
    }
}

/// A named syntactic production and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub tag: String,
    pub children: Vec<TreeElement>,
}

impl TreeNode {
    pub fn new(tag: impl Into<String>, children: Vec<TreeElement>) -> Self {
        Self {
            tag: tag.into(),
            children,
        }
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                TreeElement::Node(node) => node.node_count(),
                TreeElement::Leaf(_) => 0,
            })
            .sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                TreeElement::Node(node) => node.leaf_count(),
                TreeElement::Leaf(_) => 1,
            })
            .sum()
    }

    /// Leaf texts in source order.
    pub fn tokens(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a str>) {
        for child in &self.children {
            match child {
                TreeElement::Node(node) => node.collect_tokens(out),
                TreeElement::Leaf(leaf) => out.push(&leaf.text),
            }
        }
    }
}

/// A raw lexeme and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaf {
    pub text: String,
    pub line: u64,
}

impl Leaf {
    pub fn new(text: impl Into<String>, line: u64) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeElement {
    Node(TreeNode),
    Leaf(Leaf),
}

impl From<TreeNode> for TreeElement {
    fn from(node: TreeNode) -> Self {
        TreeElement::Node(node)
    }
}

impl From<Leaf> for TreeElement {
    fn from(leaf: Leaf) -> Self {
        TreeElement::Leaf(leaf)
    }
}

/// Double-quote `text`, escaping backslashes, quotes and line breaks.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub fn render_instantiation(inst: &Instantiation) -> String {
    match inst {
        Instantiation::Module {
            definition_name,
            instance_name: Some(instance_name),
        } => format!(
            "{}({}, {})",
            MOD_INST,
            quote(definition_name),
            quote(instance_name)
        ),
        Instantiation::Module {
            definition_name,
            instance_name: None,
        } => format!("{}({})", MOD_INST, quote(definition_name)),
        Instantiation::Package { definition_name } => {
            format!("{}({})", PKG_INST, quote(definition_name))
        }
    }
}

pub fn render_definition(def: &Definition) -> String {
    let mut out = format!("{}({}, [", def.kind.tag(), quote(&def.name));
    if !def.instantiations.is_empty() {
        let insts: Vec<String> = def
            .instantiations
            .iter()
            .map(|inst| format!("\n{}{}", INDENT, render_instantiation(inst)))
            .collect();
        out.push_str(&insts.join(","));
        out.push('\n');
    }
    out.push_str("])");
    out
}

pub fn render_macro(macro_def: &MacroDefinition) -> String {
    format!("{}({})", MACRO_DEF, quote(&macro_def.text))
}

pub fn render_item(item: &FileItem) -> String {
    match item {
        FileItem::Definition(def) => render_definition(def),
        FileItem::Macro(macro_def) => render_macro(macro_def),
    }
}

/// Render a file's items as a comma-separated list, one item per line.
pub fn render_items(items: &[FileItem]) -> String {
    items
        .iter()
        .map(render_item)
        .collect::<Vec<_>>()
        .join(",\n")
}

pub fn render_leaf(leaf: &Leaf) -> String {
    format!("{}({}, line={})", LEAF, quote(&leaf.text), leaf.line)
}

pub fn render_tree(node: &TreeNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

/// Render several roots as a comma-separated list.
pub fn render_trees(roots: &[TreeNode]) -> String {
    roots
        .iter()
        .map(render_tree)
        .collect::<Vec<_>>()
        .join(",\n")
}

fn write_node(out: &mut String, node: &TreeNode, depth: usize) {
    let pad = INDENT.repeat(depth);
    out.push_str(&pad);
    out.push_str(&format!("{}({}, [", NODE, quote(&node.tag)));
    if node.children.is_empty() {
        out.push_str("])");
        return;
    }
    for (i, child) in node.children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('\n');
        match child {
            TreeElement::Node(child) => write_node(out, child, depth + 1),
            TreeElement::Leaf(leaf) => {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str(&render_leaf(leaf));
            }
        }
    }
    out.push('\n');
    out.push_str(&pad);
    out.push_str("])");
}

impl fmt::Display for Instantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_instantiation(self))
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_definition(self))
    }
}

impl fmt::Display for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_macro(self))
    }
}

impl fmt::Display for FileItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_item(self))
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_tree(self))
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_leaf(self))
    }
}
