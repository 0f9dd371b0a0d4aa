//! Sheaf CLI: query repository snapshots and export archives.
//!
//! `sheaf [--repo PATH] [--json] COMMAND`. Logging goes to stderr and is
//! controlled by `SHEAF_LOG` (default `warn`).

mod commands;
mod format;
mod parse;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use sheaf_archive::{ArchiveComposer, ArchiveRequest, ComposerConfig};
use sheaf_storage::SnapshotStore;
use sheaf_subrepo::{DirectoryContainer, RepositoryContainer, ResolutionPolicy};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, Output, OutputMode};
use parse::{matches_to_action, ArchiveArgs, CliAction};

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let repo = matches
        .get_one::<String>("repo")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    // Argument errors are reported before the repository is touched
    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    match run(&repo, action) {
        Ok(Some(output)) => println!("{}", format_output(&output, mode)),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHEAF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn open_store(repo: &Path) -> Result<SnapshotStore, String> {
    SnapshotStore::open(repo)
        .map_err(|e| format!("Failed to open repository {}: {}", repo.display(), e))
}

/// Execute one action. `None` means the command already wrote its output.
fn run(repo: &Path, action: CliAction) -> Result<Option<Output>, String> {
    match action {
        CliAction::Log { rev, limit } => {
            let store = open_store(repo)?;
            let snapshots = store
                .log(rev.as_deref(), limit)
                .map_err(|e| e.to_string())?;
            Ok(Some(Output::Log(snapshots)))
        }
        CliAction::Manifest { rev } => {
            let store = open_store(repo)?;
            let snapshot = store.resolve(rev.as_deref()).map_err(|e| e.to_string())?;
            Ok(Some(Output::Files(store.files(&snapshot))))
        }
        CliAction::Cat { rev, path } => {
            let store = open_store(repo)?;
            let snapshot = store.resolve(rev.as_deref()).map_err(|e| e.to_string())?;
            let data = store.read(&snapshot, &path).map_err(|e| e.to_string())?;
            write_stdout(&data)?;
            Ok(None)
        }
        CliAction::Info { rev, path } => {
            let store = open_store(repo)?;
            let snapshot = store.resolve(rev.as_deref()).map_err(|e| e.to_string())?;
            let info = store
                .fileinfo(&snapshot, &path)
                .map_err(|e| e.to_string())?;
            Ok(Some(Output::Info(info)))
        }
        CliAction::Branches => {
            let store = open_store(repo)?;
            let branches = store.branches().map_err(|e| e.to_string())?;
            Ok(Some(Output::Branches(branches)))
        }
        CliAction::Archive(args) => run_archive(repo, args),
    }
}

fn run_archive(repo: &Path, args: ArchiveArgs) -> Result<Option<Output>, String> {
    let mut config = match &args.config {
        Some(path) => ComposerConfig::from_file(path).map_err(|e| e.to_string())?,
        None => ComposerConfig::default(),
    };
    if args.strict {
        config = config.with_policy(ResolutionPolicy::Strict);
    }

    let store = open_store(repo)?;
    let owner_name = store
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Repository {} has no directory name", repo.display()))?;
    let container_dir = match args.container {
        Some(dir) => dir,
        None => store
            .path()
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| format!("Repository {} has no parent directory", repo.display()))?,
    };
    let container =
        DirectoryContainer::parse(&container_dir, &args.base_url).map_err(|e| e.to_string())?;
    let owner = container.owner(&owner_name).map_err(|e| e.to_string())?;

    let mut request = ArchiveRequest::new(args.format);
    if let Some(rev) = args.rev {
        request = request.with_revision(rev);
    }
    if let Some(name) = args.name {
        request = request.with_name(name);
    }
    if let Some(include) = args.subrepos {
        request = request.with_subrepos(include);
    }

    let composer = ArchiveComposer::new(&container, config).map_err(|e| e.to_string())?;
    let archive = composer
        .compose(&store, &owner, &request)
        .map_err(|e| e.to_string())?;

    let destination = match args.output {
        Some(path) if path.as_os_str() == "-" => {
            write_stdout(&archive.bytes)?;
            // The summary would corrupt the stream
            return Ok(None);
        }
        Some(path) => path,
        None => PathBuf::from(&archive.file_name),
    };
    std::fs::write(&destination, &archive.bytes)
        .map_err(|e| format!("Failed to write {}: {}", destination.display(), e))?;
    Ok(Some(Output::Archive {
        archive,
        destination: destination.display().to_string(),
    }))
}

fn write_stdout(data: &[u8]) -> Result<(), String> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(data)
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("Failed to write output: {}", e))
}
