//! Reading the canonical rendering from [`crate::model`] back into model values.
//!
//! Used to keep expected results as rendered text and compare them structurally.

use chumsky::prelude::*;

use crate::model::{
    Definition, DefinitionKind, FileItem, Instantiation, Leaf, MacroDefinition, TreeElement,
    TreeNode, LEAF, MACRO_DEF, MOD_INST, NODE, PKG_INST,
};
use crate::{Error, Result};

/// Parse a comma-separated list of rendered trees.
pub fn parse_tree(input: &str) -> Result<Vec<TreeNode>> {
    tree_parser()
        .separated_by(symbol(','))
        .allow_trailing()
        .padded()
        .then_ignore(end())
        .parse(input)
        .map_err(|errors| to_error(input, errors))
}

/// Parse a comma-separated list of rendered definitions and macro definitions.
pub fn parse_items(input: &str) -> Result<Vec<FileItem>> {
    item_parser()
        .separated_by(symbol(','))
        .allow_trailing()
        .padded()
        .then_ignore(end())
        .parse(input)
        .map_err(|errors| to_error(input, errors))
}

fn symbol(c: char) -> impl Parser<char, char, Error = Simple<char>> + Clone {
    just(c).padded()
}

fn string_literal() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('"'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
    )));

    filter(|c: &char| *c != '"' && *c != '\\')
        .or(escape)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
        .padded()
}

fn line_number() -> impl Parser<char, u64, Error = Simple<char>> + Clone {
    text::int(10)
        .try_map(|digits: String, span| {
            digits
                .parse::<u64>()
                .map_err(|err| Simple::custom(span, err.to_string()))
        })
        .padded()
}

fn leaf_parser() -> impl Parser<char, Leaf, Error = Simple<char>> + Clone {
    just(LEAF)
        .padded()
        .ignore_then(
            string_literal()
                .then_ignore(symbol(','))
                .then_ignore(just("line").padded())
                .then_ignore(symbol('='))
                .then(line_number())
                .delimited_by(symbol('('), symbol(')')),
        )
        .map(|(text, line)| Leaf::new(text, line))
}

fn tree_parser() -> impl Parser<char, TreeNode, Error = Simple<char>> + Clone {
    recursive(|node| {
        let element = choice((
            leaf_parser().map(TreeElement::Leaf),
            node.map(TreeElement::Node),
        ));

        just(NODE)
            .padded()
            .ignore_then(
                string_literal()
                    .then_ignore(symbol(','))
                    .then(
                        element
                            .separated_by(symbol(','))
                            .allow_trailing()
                            .delimited_by(symbol('['), symbol(']')),
                    )
                    .delimited_by(symbol('('), symbol(')')),
            )
            .map(|(tag, children)| TreeNode::new(tag, children))
    })
}

fn instantiation_parser() -> impl Parser<char, Instantiation, Error = Simple<char>> + Clone {
    let module = just(MOD_INST).padded().ignore_then(
        string_literal()
            .then(symbol(',').ignore_then(string_literal()).or_not())
            .delimited_by(symbol('('), symbol(')'))
            .map(|(definition_name, instance_name)| Instantiation::Module {
                definition_name,
                instance_name,
            }),
    );

    let package = just(PKG_INST).padded().ignore_then(
        string_literal()
            .delimited_by(symbol('('), symbol(')'))
            .map(|definition_name| Instantiation::Package { definition_name }),
    );

    choice((module, package))
}

fn item_parser() -> impl Parser<char, FileItem, Error = Simple<char>> + Clone {
    let macro_def = just(MACRO_DEF).padded().ignore_then(
        string_literal()
            .delimited_by(symbol('('), symbol(')'))
            .map(|text| FileItem::Macro(MacroDefinition::new(text))),
    );

    let kind = text::ident().padded().try_map(|tag: String, span| {
        DefinitionKind::from_tag(&tag)
            .ok_or_else(|| Simple::custom(span, format!("unknown definition '{}'", tag)))
    });

    let definition = kind
        .then(
            string_literal()
                .then_ignore(symbol(','))
                .then(
                    instantiation_parser()
                        .separated_by(symbol(','))
                        .allow_trailing()
                        .delimited_by(symbol('['), symbol(']')),
                )
                .delimited_by(symbol('('), symbol(')')),
        )
        .map(|(kind, (name, instantiations))| {
            FileItem::Definition(Definition::new(kind, name).with_instantiations(instantiations))
        });

    choice((macro_def, definition))
}

fn to_error(input: &str, errors: Vec<Simple<char>>) -> Error {
    let Some(error) = errors.into_iter().next() else {
        return Error::Text {
            line: 1,
            column: 1,
            message: "unknown syntax error".to_string(),
        };
    };

    // Spans count chars, not bytes.
    let prefix: String = input.chars().take(error.span().start).collect();
    let line = prefix.matches('\n').count() + 1;
    let column = prefix.split('\n').last().unwrap_or("").chars().count() + 1;

    Error::Text {
        line,
        column,
        message: error.to_string(),
    }
}
