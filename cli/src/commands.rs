//! Clap command tree definition.

use clap::{Arg, ArgAction, Command, value_parser};
use marquee_core::types::KeyType;
use std::path::PathBuf;

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("marquee")
        .about("Operator tool for a Marquee search-key index")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Index directory (default: .marquee)")
                .value_parser(value_parser!(PathBuf))
                .default_value(".marquee")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: <data-dir>/config.toml)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log at debug level")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_rebuild())
        .subcommand(build_create())
        .subcommand(build_update())
        .subcommand(build_delete())
        .subcommand(build_sweep())
        .subcommand(build_search())
        .subcommand(build_show())
}

fn movies_file(help: &'static str) -> Arg {
    Arg::new("file")
        .required(true)
        .help(help)
        .value_parser(value_parser!(PathBuf))
}

fn build_rebuild() -> Command {
    Command::new("rebuild")
        .about("Index every movie in a JSON array (adds only)")
        .arg(movies_file("JSON array of movies"))
}

fn build_create() -> Command {
    Command::new("create")
        .about("Index movies as newly created")
        .arg(movies_file("JSON array of movies"))
}

fn build_update() -> Command {
    Command::new("update")
        .about("Re-index one movie after an update")
        .arg(
            Arg::new("before")
                .required(true)
                .help("Movie as it was before the update")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("after")
                .required(true)
                .help("Movie as it is after the update")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn build_delete() -> Command {
    Command::new("delete")
        .about("Remove deleted movies from the index")
        .arg(movies_file("JSON array of movies"))
}

fn build_sweep() -> Command {
    Command::new("sweep").about("Delete search keys no movie references")
}

fn build_search() -> Command {
    Command::new("search")
        .about("Autocomplete a partial query")
        .arg(Arg::new("query").required(true).help("Partial query"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .short('n')
                .help("Maximum results (capped by search.max_limit)")
                .value_parser(value_parser!(usize)),
        )
}

fn build_show() -> Command {
    Command::new("show")
        .about("Print one search key")
        .arg(Arg::new("text").required(true).help("Display text"))
        .arg(
            Arg::new("type")
                .long("type")
                .short('t')
                .help("Key type")
                .value_parser(parse_key_type)
                .default_value("movie"),
        )
}

fn parse_key_type(value: &str) -> Result<KeyType, String> {
    value.parse()
}
