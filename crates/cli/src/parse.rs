//! ArgMatches → CliAction conversion.
//!
//! Every subcommand maps onto one variant of a closed enum. Argument values
//! that can be checked without touching the repository (such as the archive
//! format) are checked here.

use std::path::PathBuf;

use clap::ArgMatches;
use sheaf_archive::ArchiveFormat;

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// History from a revision downward
    Log {
        rev: Option<String>,
        limit: Option<usize>,
    },
    /// File list of a snapshot
    Manifest { rev: Option<String> },
    /// File contents
    Cat { rev: Option<String>, path: String },
    /// File metadata
    Info { rev: Option<String>, path: String },
    /// Branch heads
    Branches,
    /// Archive export
    Archive(ArchiveArgs),
}

/// Arguments of `archive`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArgs {
    pub rev: Option<String>,
    pub format: ArchiveFormat,
    pub name: Option<String>,
    /// `None` keeps the format's default
    pub subrepos: Option<bool>,
    pub container: Option<PathBuf>,
    pub base_url: String,
    pub config: Option<PathBuf>,
    pub strict: bool,
    pub output: Option<PathBuf>,
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let rev = sub.get_one::<String>("rev").cloned();
    match sub_name {
        "log" => Ok(CliAction::Log {
            rev,
            limit: sub.get_one::<usize>("limit").copied(),
        }),
        "manifest" => Ok(CliAction::Manifest { rev }),
        "cat" => Ok(CliAction::Cat {
            rev,
            path: required(sub, "path")?,
        }),
        "info" => Ok(CliAction::Info {
            rev,
            path: required(sub, "path")?,
        }),
        "branches" => Ok(CliAction::Branches),
        "archive" => parse_archive(sub, rev),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_archive(sub: &ArgMatches, rev: Option<String>) -> Result<CliAction, String> {
    let format = sub
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("tgz")
        .parse::<ArchiveFormat>()
        .map_err(|e| e.to_string())?;
    let subrepos = if sub.get_flag("subrepos") {
        Some(true)
    } else if sub.get_flag("no-subrepos") {
        Some(false)
    } else {
        None
    };
    Ok(CliAction::Archive(ArchiveArgs {
        rev,
        format,
        name: sub.get_one::<String>("name").cloned(),
        subrepos,
        container: sub.get_one::<String>("container").map(PathBuf::from),
        base_url: sub
            .get_one::<String>("base-url")
            .cloned()
            .unwrap_or_else(|| "http://localhost/".to_string()),
        config: sub.get_one::<String>("config").map(PathBuf::from),
        strict: sub.get_flag("strict"),
        output: sub.get_one::<String>("output").map(PathBuf::from),
    }))
}

fn required(sub: &ArgMatches, name: &str) -> Result<String, String> {
    sub.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        let matches = build_cli()
            .try_get_matches_from(args)
            .map_err(|e| e.to_string())?;
        matches_to_action(&matches)
    }

    #[test]
    fn test_log() {
        assert_eq!(
            parse(&["sheaf", "log", "-r", "3", "--limit", "2"]).unwrap(),
            CliAction::Log {
                rev: Some("3".into()),
                limit: Some(2)
            }
        );
    }

    #[test]
    fn test_cat_requires_path() {
        assert!(parse(&["sheaf", "cat"]).is_err());
        assert_eq!(
            parse(&["sheaf", "--repo", "/srv/r", "cat", "README"]).unwrap(),
            CliAction::Cat {
                rev: None,
                path: "README".into()
            }
        );
    }

    #[test]
    fn test_archive_defaults() {
        match parse(&["sheaf", "archive"]).unwrap() {
            CliAction::Archive(args) => {
                assert_eq!(args.format, ArchiveFormat::Tgz);
                assert_eq!(args.subrepos, None);
                assert_eq!(args.base_url, "http://localhost/");
                assert!(!args.strict);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_archive_flags() {
        match parse(&[
            "sheaf", "archive", "-f", "zip", "--subrepos", "--strict", "--name", "bundle", "-o",
            "-",
        ])
        .unwrap()
        {
            CliAction::Archive(args) => {
                assert_eq!(args.format, ArchiveFormat::Zip);
                assert_eq!(args.subrepos, Some(true));
                assert_eq!(args.name.as_deref(), Some("bundle"));
                assert_eq!(args.output, Some(PathBuf::from("-")));
                assert!(args.strict);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_archive_unknown_format() {
        let err = parse(&["sheaf", "archive", "-f", "rar"]).unwrap_err();
        assert!(err.contains("Unsupported archive format"), "{}", err);
    }

    #[test]
    fn test_subrepo_flags_conflict() {
        assert!(parse(&["sheaf", "archive", "--subrepos", "--no-subrepos"]).is_err());
    }
}
