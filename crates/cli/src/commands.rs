//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("sheaf")
        .about("Query repository snapshots and export them as archives")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("repo")
                .long("repo")
                .short('R')
                .help("Repository root (default: .)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_log())
        .subcommand(build_manifest())
        .subcommand(build_cat())
        .subcommand(build_info())
        .subcommand(build_branches())
        .subcommand(build_archive())
}

fn rev_arg() -> Arg {
    Arg::new("rev")
        .long("rev")
        .short('r')
        .help("Revision: number, id, id prefix, branch, or tip (default: tip)")
}

fn build_log() -> Command {
    Command::new("log")
        .about("Show history, newest first")
        .arg(rev_arg().help("Start revision (default: tip)"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .short('l')
                .help("Maximum number of changesets")
                .value_parser(clap::value_parser!(usize)),
        )
}

fn build_manifest() -> Command {
    Command::new("manifest")
        .about("List the files of a snapshot")
        .arg(rev_arg())
}

fn build_cat() -> Command {
    Command::new("cat")
        .about("Print the contents of a file")
        .arg(rev_arg())
        .arg(Arg::new("path").required(true).help("Repository-relative path"))
}

fn build_info() -> Command {
    Command::new("info")
        .about("Show metadata of a file")
        .arg(rev_arg())
        .arg(Arg::new("path").required(true).help("Repository-relative path"))
}

fn build_branches() -> Command {
    Command::new("branches").about("List branches and their newest changeset")
}

fn build_archive() -> Command {
    Command::new("archive")
        .about("Export a snapshot, with its subrepositories, as an archive")
        .arg(rev_arg())
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("tar, tgz, or zip")
                .default_value("tgz"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .help("Root directory name (default: <repo>-<short id>)"),
        )
        .arg(
            Arg::new("subrepos")
                .long("subrepos")
                .help("Include subrepositories")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-subrepos"),
        )
        .arg(
            Arg::new("no-subrepos")
                .long("no-subrepos")
                .help("Leave subrepositories out")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("container")
                .long("container")
                .help("Directory holding sibling repositories (default: the repository's parent)"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("URL the container is published under")
                .default_value("http://localhost/"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Composer configuration file (TOML)"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail instead of skipping unresolvable subrepositories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file, or - for stdout (default: <root><ext>)"),
        )
}
