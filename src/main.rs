#![allow(clippy::collapsible_if)]

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Target};
use move_selection::{
    config::{DestinationSet, SourceDeletion},
    document::{Position, Selection},
    environment::Prompter,
    prompt::TerminalPrompter,
    move_selection_to_file, MoveConfig, MoveOutcome, Workspace,
};

/// Move a selected block of text out of a file into a new document or another file
#[derive(Parser, Debug)]
#[command(name = "move-selection", version)]
struct Cli {
    /// File containing the text to move, absolute or relative to the workspace
    file: String,

    /// Selection start as LINE:COLUMN, both starting at 1
    #[arg(long, value_parser = parse_position)]
    start: Position,

    /// Selection end as LINE:COLUMN, both starting at 1
    #[arg(long, value_parser = parse_position)]
    end: Position,

    /// Workspace root used for relative paths and the workspace file list
    #[arg(long, default_value = ".")]
    workspace: String,

    /// JSON config file
    #[arg(long)]
    config: Option<String>,

    /// Offer only "New File" and "Choose Existing File"
    #[arg(long)]
    no_workspace_search: bool,

    /// Remove the text from the source only after the destination has been written
    #[arg(long)]
    defer_delete: bool,

    /// Print the resulting changes as a diff instead of writing any file
    #[arg(long)]
    dry_run: bool,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (line, column) = s.split_once(':').unwrap_or((s, "1"));
    let line = line
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid line in {s:?}"))?;
    let column = column
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid column in {s:?}"))?;
    if line == 0 || column == 0 {
        return Err(format!("lines and columns start at 1, got {s:?}"));
    }
    Ok(Position::new(line - 1, column - 1))
}

fn init_logging() -> Result<()> {
    let mut builder = Builder::from_default_env();
    if let Ok(log_location) = std::env::var("LOG_LOCATION") {
        let path = PathBuf::from(&*shellexpand::tilde(&log_location));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        builder.target(Target::Pipe(Box::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )));
    } else {
        builder.target(Target::Stderr);
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MoveConfig::load(path)?,
        None => MoveConfig::default(),
    };
    if cli.no_workspace_search {
        config = config.with_destinations(DestinationSet::NewOrExisting);
    }
    if cli.defer_delete {
        config = config.with_source_deletion(SourceDeletion::AfterWrite);
    }
    log::debug!("{config:?}");

    let root = PathBuf::from(&*shellexpand::tilde(&cli.workspace));
    let prompter = TerminalPrompter::new(io::stdin().lock(), io::stderr(), &root);
    let mut workspace = Workspace::new(root, prompter)?.with_dry_run(cli.dry_run);
    workspace.open_session(&cli.file, Selection::new(cli.start, cli.end))?;

    match move_selection_to_file(&mut workspace, &config)? {
        MoveOutcome::Moved(destination) => match destination.path() {
            Some(path) => log::info!("{}: {}", destination.kind(), path.display()),
            None => log::info!("{}", destination.kind()),
        },
        MoveOutcome::Aborted(reason) => log::info!("move aborted: {reason}"),
    }

    write_results(&mut workspace, cli.dry_run, &mut io::stdout().lock())
}

/// Print a diff per changed document in a dry run. Otherwise save every dirty file and print
/// the untitled documents.
fn write_results<P: Prompter>(
    workspace: &mut Workspace<P>,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    if dry_run {
        for document in workspace.documents() {
            if let Some(diff) = workspace.diff(document.id()) {
                write!(out, "{diff}")?;
            }
        }
        return Ok(());
    }

    for path in workspace.save_all()? {
        log::info!("wrote {}", path.display());
    }
    for document in workspace.untitled_documents() {
        write!(out, "{}", document.text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use move_selection::prompt::{ScriptedAnswer, ScriptedPrompter};

    use super::*;

    fn moved_to_new_file(dry_run: bool) -> (tempfile::TempDir, Workspace<ScriptedPrompter>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "fn a() {}\n\nfn b() {}\n").unwrap();
        let mut workspace = Workspace::new(
            dir.path(),
            ScriptedPrompter::new([ScriptedAnswer::choose("New File")]),
        )
        .unwrap()
        .with_dry_run(dry_run);
        workspace
            .open_session(
                "lib.rs",
                Selection::new(Position::new(2, 0), Position::new(2, 9)),
            )
            .unwrap();
        move_selection_to_file(&mut workspace, &MoveConfig::default()).unwrap();
        (dir, workspace)
    }

    #[test]
    fn results_save_sources_and_print_untitled_documents() {
        let (dir, mut workspace) = moved_to_new_file(false);
        let mut out = vec![];

        write_results(&mut workspace, false, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "fn b() {}");
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "fn a() {}\n"
        );
    }

    #[test]
    fn dry_run_prints_diffs_and_writes_nothing() {
        let (dir, mut workspace) = moved_to_new_file(true);
        let mut out = vec![];

        write_results(&mut workspace, true, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("--- a/lib.rs"), "{out}");
        assert!(out.contains("-fn b() {}"), "{out}");
        assert!(out.contains("+++ b/untitled-1"), "{out}");
        assert!(out.contains("+fn b() {}"), "{out}");
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "fn a() {}\n\nfn b() {}\n"
        );
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_position("3:5"), Ok(Position::new(2, 4)));
        assert_eq!(parse_position("7"), Ok(Position::new(6, 0)));
        assert!(parse_position("0:1").is_err());
        assert!(parse_position("a:1").is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "move-selection",
            "src/lib.rs",
            "--start",
            "2:1",
            "--end",
            "4:10",
            "--defer-delete",
        ])
        .unwrap();
        assert_eq!(cli.start, Position::new(1, 0));
        assert_eq!(cli.end, Position::new(3, 9));
        assert!(cli.defer_delete);
        assert!(!cli.no_workspace_search);
        assert_eq!(cli.workspace, ".");
    }
}
