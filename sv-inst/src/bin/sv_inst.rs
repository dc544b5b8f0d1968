use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{debug, LevelFilter};
use sv_inst::model::{render_items, render_trees};
use sv_inst::{parse_vcs_style_args, ToolConfig, ToolKind};

#[derive(Parser)]
#[command(name = "sv-inst")]
#[command(about = "List SystemVerilog definitions and instantiations using an external parser")]
#[command(version)]
struct Cli {
    /// Input files mixed with +incdir+<path> and +define+<macro>[=<value>] arguments
    #[arg(required = true)]
    args: Vec<String>,

    /// TOML file selecting the parser and its location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parser to run (overrides the configuration file)
    #[arg(long, value_enum)]
    tool: Option<ToolKind>,

    /// Path to the parser executable (overrides the configuration file)
    #[arg(long)]
    tool_path: Option<PathBuf>,

    /// Print the full syntax tree instead of definitions
    #[arg(long)]
    full_tree: bool,

    /// Parse each file as a separate compilation unit
    #[arg(long)]
    separate: bool,

    /// Also list macro definitions
    #[arg(long)]
    show_macro_defs: bool,

    /// Do not follow `include directives
    #[arg(long)]
    ignore_include: bool,

    /// Do not work out which files failed in a multi-file batch
    #[arg(long)]
    no_explain: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut builder = Builder::new();
    builder.filter_level(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    builder.parse_default_env();
    builder.init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let parsed = parse_vcs_style_args(cli.args).map_err(anyhow::Error::msg)?;
    if !parsed.include_dirs.is_empty() {
        debug!("Include directories: {:?}", parsed.include_dirs);
    }
    if !parsed.defines.is_empty() {
        debug!("Macro defines: {:?}", parsed.defines);
    }
    debug!("Files to parse: {:?}", parsed.files);

    let mut config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    if let Some(tool) = cli.tool {
        config.tool = tool;
    }
    if let Some(path) = cli.tool_path {
        config = config.with_program(path);
    }

    let request = parsed
        .into_request()
        .separate(cli.separate)
        .show_macro_defs(cli.show_macro_defs)
        .ignore_include(cli.ignore_include)
        .explain_error(!cli.no_explain);
    let backend = config.backend();

    if cli.full_tree {
        let trees = backend
            .syntax_tree(&request)
            .with_context(|| format!("{} could not parse the input", config.tool))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&trees)?);
        } else {
            for file in &trees {
                if trees.len() > 1 {
                    println!("// {}", file.file_name);
                }
                println!("{}", render_trees(&file.roots));
            }
        }
    } else {
        let files = backend
            .definitions(&request)
            .with_context(|| format!("{} could not parse the input", config.tool))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&files)?);
        } else {
            for file in &files {
                if files.len() > 1 {
                    println!("// {}", file.file_name);
                }
                println!("{}", render_items(&file.items));
            }
        }
    }

    Ok(())
}
